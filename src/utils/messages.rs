//! Message list helpers shared by pipe request translators.

use crate::types::Message;

/// System prompt substituted when the host request carries none.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// Split a leading system message off the front of a message list.
///
/// Hosts place at most one system message, and always first. Returns that
/// message (when present) and the remaining messages in their original
/// order; a system message anywhere else is left where it is.
pub fn pop_system_message(messages: &[Message]) -> (Option<&Message>, &[Message]) {
    match messages.split_first() {
        Some((first, rest)) if first.role == "system" => (Some(first), rest),
        _ => (None, messages),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_leading_system_message() {
        let messages = vec![
            Message::system("be brief"),
            Message::user("hi"),
            Message::assistant("hello"),
        ];

        let (system, rest) = pop_system_message(&messages);
        assert_eq!(system.map(|m| m.content.as_str()), Some("be brief"));
        assert_eq!(rest.len(), 2);
        assert_eq!(rest[0].role, "user");
    }

    #[test]
    fn returns_all_messages_when_none_leads() {
        let messages = vec![Message::user("hi"), Message::system("late")];

        let (system, rest) = pop_system_message(&messages);
        assert!(system.is_none());
        assert_eq!(rest.len(), 2);
    }

    #[test]
    fn handles_empty_list() {
        let (system, rest) = pop_system_message(&[]);
        assert!(system.is_none());
        assert!(rest.is_empty());
    }
}
