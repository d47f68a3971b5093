use thiserror::Error;

/// A structural container problem. Unrecoverable: the current input is
/// unusable and the stream terminates.
#[derive(Debug, Error)]
pub enum FileError {
    #[error("unexpected tcpdump magic {0:?}")]
    UnexpectedMagic([u8; 4]),
    #[error("unexpected tcpdump version {0}.{1}")]
    UnexpectedVersion(u16, u16),
    #[error("unexpected tcpdump network type {0}")]
    UnexpectedNetwork(u32),
    #[error("packet incl_len({incl_len}) > orig_len({orig_len})")]
    InclLenExceedsOrigLen { incl_len: u32, orig_len: u32 },
    #[error("packet incl_len({incl_len}) > snaplen({snaplen})")]
    InclLenExceedsSnaplen { incl_len: u32, snaplen: u32 },
}

/// A single record was corrupt in a recoverable way. The assembler logs
/// this and advances to the next pcap record; it never reaches the caller
/// as an `Err`.
#[derive(Debug, Error)]
pub enum PacketError {
    #[error("unknown radiotap version {0}")]
    UnknownRadiotapVersion(u8),
}

/// Errors that can surface from the public pull/push interfaces.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    File(#[from] FileError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
