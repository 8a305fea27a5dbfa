#![no_main]

use libfuzzer_sys::fuzz_target;
use propmap::property::classifier::{decapitalize, prefixed_name, Direction};

fuzz_target!(|data: &[u8]| {
    let Ok(name) = std::str::from_utf8(data) else {
        return;
    };

    let _ = decapitalize(name);
    for direction in [Direction::Reader, Direction::Writer] {
        if let Some((_, property)) = prefixed_name(name, direction) {
            assert!(!property.is_empty());
        }
    }
});
