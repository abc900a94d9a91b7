#![no_main]

use libfuzzer_sys::fuzz_target;
use vw1871_rs::Extractor;

fuzz_target!(|data: &[u8]| {
    let extractor = Extractor::default();
    let Ok(extraction) = extractor.extract(data) else {
        // Only non-empty buffers shorter than a marker may be refused
        assert!(!data.is_empty() && data.len() < 4);
        return;
    };

    // Every telegram is a slice of the input, in byte order
    let mut next = 0;
    for telegram in &extraction.telegrams {
        let start = telegram.offset();
        assert!(start >= next);
        assert_eq!(&data[start..start + telegram.len()], telegram.as_bytes());
        assert!(telegram.len() >= extractor.config().min_telegram_len);
        next = start + 1;
    }

    // Same input, same result
    assert_eq!(extractor.extract(data).ok(), Some(extraction));
});
