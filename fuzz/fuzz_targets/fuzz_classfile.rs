#![no_main]

use libfuzzer_sys::fuzz_target;

mod utils;

fuzz_target!(|data: &[u8]| {
    let cap = data.len().min(utils::MAX_INPUT_SIZE);
    let input = &data[..cap];

    // Goal: never panic and never hang on arbitrary bytes; either a model
    // comes back or a typed error does.
    let _ = okapi_classfile::ClassFile::parse(input);
    let _ = okapi_reader::read_class(input);
});
