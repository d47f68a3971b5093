/*!

A streaming decoder for radiotap-wrapped 802.11 captures in the classic
tcpdump/libpcap container format.

Two entry points share one decode state machine (`FrameAssembler`):

* [`FrameReader`](frame::FrameReader) — a lazy `Iterator` over an
  `io::Read`, for offline files. Transparently inflates gzip input.
* [`Packetizer`](frame::Packetizer) — push bytes in as they arrive (e.g.
  from a live `tcpdump` pipe) and get a callback per decoded frame.

Each [`Frame`](frame::Frame) carries the pcap record metadata, the
radiotap-derived PHY fields (rate, channel, signal strength, derived
airtime) and the 802.11 MAC header fields relevant to a passive
observer (addresses, sequence number, frame type, beacon SSID).

[`top::TopAggregator`] and [`airtime::AirtimeVisualizer`] are two
consumers built on top of the frame stream: the former tracks per-link
packet/rate/signal histograms, the latter renders a scrolling
utilization strip. Neither owns any I/O or terminal rendering; see
`demos/` for runnable programs built around them.
*/

pub mod airtime;
pub mod buffer;
pub mod dot11;
pub mod error;
pub mod frame;
pub mod mac;
pub mod pcap;
pub mod radiotap;
pub mod rate;
pub mod stream;
pub mod top;

pub use error::{Error, FileError, PacketError, Result};
pub use frame::{Frame, FrameAssembler, FrameReader, Packetizer};
pub use mac::MacAddr;
