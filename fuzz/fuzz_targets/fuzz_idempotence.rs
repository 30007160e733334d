#![no_main]
use libfuzzer_sys::fuzz_target;
use ksesrs::{Kses, PolicyPreset};

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    let kses = Kses::new(PolicyPreset::Post, None, None);
    let once = kses.filter(input);
    assert_eq!(kses.filter(&once), once);
});
