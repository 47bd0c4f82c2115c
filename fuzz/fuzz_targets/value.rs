#![no_main]

use blockdoc::Document;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let input = String::from_utf8_lossy(data);
    let doc = Document::from_value_lossy(&input);
    assert!(doc.block_count() >= 1);
    assert_eq!(Document::from_value_lossy(&doc.to_json()), doc);
});
