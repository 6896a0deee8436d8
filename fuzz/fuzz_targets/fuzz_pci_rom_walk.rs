#![no_main]

use arbitrary::Unstructured;
use libfuzzer_sys::fuzz_target;

use pcirom::{walk, RomWalker, StopReason};

fuzz_target!(|data: &[u8]| {
    let mut u = Unstructured::new(data);

    // Optionally stamp a header signature at a 512-byte boundary so the fuzzer spends more time
    // past the header locator.
    let stamp: Option<u8> = u.arbitrary().unwrap_or(None);
    let rest_len = u.len();
    let mut rom = u.bytes(rest_len).unwrap_or(&[]).to_vec();
    if let Some(block) = stamp {
        let at = usize::from(block) * 512;
        if at + 2 <= rom.len() {
            rom[at] = 0x55;
            rom[at + 1] = 0xAA;
        }
    }

    let result = walk(&rom);

    let mut prev_end = 0usize;
    for image in &result.images {
        assert!(image.offset >= prev_end, "images overlap or go backwards");
        assert!(image.offset < rom.len());
        assert!(image.length_bytes > 0 || image.last_image);
        prev_end = image.end();
    }
    if result.stop == StopReason::Empty {
        assert!(rom.is_empty());
    }

    // The lazy walker must agree with the eager one.
    let mut walker = RomWalker::new(&rom);
    let lazy: Vec<_> = walker.by_ref().collect();
    assert_eq!(lazy, result.images);
    assert_eq!(walker.stop_reason(), Some(result.stop));
});
