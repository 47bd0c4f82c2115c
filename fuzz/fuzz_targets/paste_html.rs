#![no_main]

use blockdoc::{clipboard, codec};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let input = String::from_utf8_lossy(data);
    for block in clipboard::parse_html_blocks(&input) {
        assert!(codec::is_normalized(&block.content));
    }
});
