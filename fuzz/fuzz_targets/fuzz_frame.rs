#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // The wire format is text; only valid UTF-8 can arrive as a frame.
    if let Ok(frame) = std::str::from_utf8(data) {
        // Neither direction's decoder may panic on arbitrary input.
        let _ = bombgrid_client::ServerMessage::decode(frame);
        let _ = bombgrid_client::ClientMessage::decode(frame);
    }
});
