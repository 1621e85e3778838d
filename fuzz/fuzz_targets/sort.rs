#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    patchsort_fuzz::fuzz_from_bytes(data);
});
