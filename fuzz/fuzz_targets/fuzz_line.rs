#![no_main]

use libfuzzer_sys::fuzz_target;
use vw1871_rs::{Extractor, Pipeline};

fuzz_target!(|data: &[u8]| {
    // Arbitrary bridge output must never abort the line loop
    if let Ok(text) = std::str::from_utf8(data) {
        let mut pipeline = Pipeline::new(Extractor::default());
        for line in text.lines() {
            let _ = pipeline.process_line(line);
        }
    }
});
