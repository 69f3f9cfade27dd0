#![no_main]

use libfuzzer_sys::fuzz_target;
use partstream::{MemorySink, RequestMachine, RequestState};

fuzz_target!(|data: &[u8]| {
    let mut machine = RequestMachine::new(MemorySink::new());

    for chunk in data.chunks(61) {
        match machine.on_data(chunk) {
            Ok(Some(_)) | Err(_) => {
                assert_eq!(machine.state(), RequestState::Done);
                break;
            }
            Ok(None) => continue,
        }
    }
});
