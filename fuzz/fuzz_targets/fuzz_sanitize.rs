#![no_main]
use libfuzzer_sys::fuzz_target;
use ksesrs::{sanitize, PolicyPreset};

fuzz_target!(|data: &[u8]| {
    let input = String::from_utf8_lossy(data);
    let output = sanitize(&input, PolicyPreset::Post, None, None);
    assert!(!output.to_ascii_lowercase().contains("<script"));
});
