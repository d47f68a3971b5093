#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let reader = wavetap::FrameReader::new(std::io::Cursor::new(data));
    if let Ok(reader) = reader {
        for _ in reader {}
    }
});
