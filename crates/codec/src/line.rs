use jabberfeed_common::Event;

use crate::{Codec, Result};

/// Splits the body on newlines, emitting one event per non-empty line.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineCodec;

impl Codec for LineCodec {
    fn name(&self) -> &'static str {
        "line"
    }

    fn decode(&self, body: &str, emit: &mut dyn FnMut(Event)) -> Result<()> {
        for line in body.lines() {
            if line.trim().is_empty() {
                continue;
            }
            emit(Event::with_message(line));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use {super::*, crate::decode_all, rstest::rstest};

    #[rstest]
    #[case("one", &["one"])]
    #[case("one\ntwo", &["one", "two"])]
    #[case("one\r\ntwo\r\n", &["one", "two"])]
    #[case("one\n\n  \nthree", &["one", "three"])]
    #[case("\n\n", &[])]
    fn splits_lines(#[case] body: &str, #[case] expected: &[&str]) {
        let events = decode_all(&LineCodec, body).unwrap();
        let messages: Vec<_> = events.iter().filter_map(|e| e.get_str("message")).collect();
        assert_eq!(messages, expected);
    }
}
