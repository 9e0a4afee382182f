//! Heuristic token estimation: `chars / 4` over serialized message content.

use crate::message::Message;

const CHARS_PER_TOKEN: usize = 4;

/// Rough token count for one message.
pub fn estimate_message_tokens(message: &Message) -> usize {
    message.approx_char_len() / CHARS_PER_TOKEN
}

/// Rough token count for a whole working list.
pub fn estimate_tokens(messages: &[Message]) -> usize {
    messages.iter().map(estimate_message_tokens).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimate_tokens_sums_per_message_heuristic() {
        let messages = vec![Message::user_text("12345678"), Message::assistant_text("1234")];
        assert_eq!(estimate_tokens(&messages), 2 + 1);
    }
}
