#![no_main]
use libfuzzer_sys::fuzz_target;
use tapelib_core::command::Request;
use tapelib_core::test_utils::*;

fuzz_target!(|input: (String, Vec<(String, String)>)| {
    // Arbitrary names and parameters must be rejected cleanly, never panic.
    let (name, params) = input;
    let mut request = Request::new(name);
    for (key, value) in params.into_iter().take(8) {
        request = request.param(key, value);
    }
    let mut lib = fresh_library();
    let before = lib.queue_len();
    if lib.handle(&request).is_err() {
        assert_eq!(lib.queue_len(), before);
    }
    lib.advance(16);
});
