#![no_main]

use blockdoc::codec;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let input = String::from_utf8_lossy(data);
    let runs = codec::from_markup(&input);
    assert!(codec::is_normalized(&runs));
    assert_eq!(codec::from_markup(&codec::to_markup(&runs)), runs);
});
