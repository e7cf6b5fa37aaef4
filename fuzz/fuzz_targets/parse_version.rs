#![no_main]

use libfuzzer_sys::fuzz_target;
use shapegen_core::SemanticVersion;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(version) = SemanticVersion::parse(s) {
            // Anything that parses must render back to something that parses to an equal version
            let reparsed = SemanticVersion::parse(&version.to_string()).expect("rendered version parses");
            assert_eq!(version.compare(&reparsed), std::cmp::Ordering::Equal);
        }
    }
});
