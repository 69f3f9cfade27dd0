#![no_main]

use libfuzzer_sys::fuzz_target;
use partstream::{Limits, MemorySink, MultipartScanner, NoopObserver};

fuzz_target!(|data: &[u8]| {
    let (split, data) = match data.split_first() {
        Some((&split, data)) => (split as usize % (data.len() + 1), data),
        None => return,
    };

    let mut sink = MemorySink::new();
    let mut scanner = MultipartScanner::new("X-BOUNDARY", Limits::default()).expect("scanner");

    let (first, second) = data.split_at(split);
    for chunk in [first, second, &[][..]] {
        if scanner.on_data(chunk, &mut sink, &NoopObserver).is_err() {
            return;
        }
        assert!(scanner.buffered() <= Limits::default().buffer_limit());
    }
});
