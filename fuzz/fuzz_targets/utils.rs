use std::str;

pub const MAX_INPUT_SIZE: usize = 256 * 1024;

/// Returns a UTF-8 view of `data` truncated to `MAX_INPUT_SIZE`.
///
/// The fuzzer input is capped to avoid OOM on pathological inputs. If the
/// cap splits a multibyte codepoint we only try trimming up to 3 bytes to
/// recover.
#[inline]
#[allow(dead_code)]
pub fn truncate_utf8(data: &[u8]) -> Option<&str> {
    let cap = data.len().min(MAX_INPUT_SIZE);
    for trim in 0..=3 {
        if cap < trim {
            break;
        }
        let slice = &data[..cap - trim];
        if let Ok(text) = str::from_utf8(slice) {
            return Some(text);
        }
    }
    None
}
