//! In-memory chat transcript for questions about the current results.

use serde::Serialize;

use crate::types::ChatMessage;

/// Shown in place of an empty assistant reply.
pub const EMPTY_REPLY: &str = "No response.";

/// Body of a `/api/chat` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    pub message: String,
    /// Transcript as it stood before `message` was added.
    pub history: Vec<ChatMessage>,
}

/// Transcript plus the in-flight/error state of the chat panel.
#[derive(Debug, Clone, Default)]
pub struct ChatTranscript {
    history: Vec<ChatMessage>,
    pending: bool,
    error: Option<String>,
}

impl ChatTranscript {
    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.history
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Start a turn: the user's message is appended right away.
    ///
    /// Returns `None` (and changes nothing) for a blank message or while a
    /// previous turn is still pending.
    pub fn begin(&mut self, message: &str) -> Option<ChatRequest> {
        let message = message.trim();
        if message.is_empty() || self.pending {
            return None;
        }
        let request = ChatRequest {
            message: message.to_string(),
            history: self.history.clone(),
        };
        self.pending = true;
        self.error = None;
        self.history.push(ChatMessage::user(message));
        Some(request)
    }

    /// Finish the pending turn with the assistant's reply.
    pub fn complete(&mut self, reply: Option<String>) {
        let reply = reply
            .filter(|r| !r.trim().is_empty())
            .unwrap_or_else(|| EMPTY_REPLY.to_string());
        self.history.push(ChatMessage::assistant(reply));
        self.pending = false;
    }

    /// Finish the pending turn with an error; the user's message stays.
    pub fn fail(&mut self, error: impl Into<String>) {
        self.error = Some(error.into());
        self.pending = false;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChatRole;

    #[test]
    fn begin_appends_user_message_and_sends_prior_history() {
        let mut chat = ChatTranscript::default();
        let first = chat.begin("  Why is DE higher?  ").unwrap();
        assert_eq!(first.message, "Why is DE higher?");
        assert!(first.history.is_empty());
        assert_eq!(chat.messages().len(), 1);
        assert!(chat.is_pending());

        chat.complete(Some("Because of subsidies.".to_string()));
        let second = chat.begin("And the US?").unwrap();
        assert_eq!(second.history.len(), 2);
        assert_eq!(second.history[0].role, ChatRole::User);
        assert_eq!(second.history[1].content, "Because of subsidies.");
        assert_eq!(chat.messages().len(), 3);
    }

    #[test]
    fn blank_message_is_ignored() {
        let mut chat = ChatTranscript::default();
        assert!(chat.begin("   ").is_none());
        assert!(chat.messages().is_empty());
        assert!(!chat.is_pending());
    }

    #[test]
    fn second_message_while_pending_is_ignored() {
        let mut chat = ChatTranscript::default();
        chat.begin("one").unwrap();
        assert!(chat.begin("two").is_none());
        assert_eq!(chat.messages().len(), 1);
    }

    #[test]
    fn empty_reply_becomes_placeholder() {
        let mut chat = ChatTranscript::default();
        chat.begin("hello").unwrap();
        chat.complete(Some(String::new()));
        assert_eq!(chat.messages()[1].content, EMPTY_REPLY);

        chat.begin("again").unwrap();
        chat.complete(None);
        assert_eq!(chat.messages()[3].content, EMPTY_REPLY);
    }

    #[test]
    fn failure_keeps_user_message_and_sets_error() {
        let mut chat = ChatTranscript::default();
        chat.begin("hello").unwrap();
        chat.fail("connection refused");
        assert_eq!(chat.messages().len(), 1);
        assert_eq!(chat.error(), Some("connection refused"));
        assert!(!chat.is_pending());

        chat.begin("retry by hand").unwrap();
        assert!(chat.error().is_none());
    }

    #[test]
    fn request_serializes_backend_shape() {
        let mut chat = ChatTranscript::default();
        chat.begin("first").unwrap();
        chat.complete(Some("reply".to_string()));
        let request = chat.begin("second").unwrap();
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["message"], "second");
        assert_eq!(json["history"][0]["role"], "user");
        assert_eq!(json["history"][1]["role"], "assistant");
    }
}
