//! Chat replies and transcripts
//!
//! Both assistants answer `{ "success": bool, "answer" | "response": text }`.
//! A reply is only usable when `success` is true and the text is present.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::text;
use crate::error::{Error, Result};

/// Extract the assistant text from a chat reply
pub fn normalize_chat_reply(body: &Value) -> Result<String> {
    let success = body.get("success").and_then(Value::as_bool).unwrap_or(false);
    if !success {
        let message =
            text(body.get("error")).unwrap_or_else(|| "Failed to get response".to_string());
        return Err(Error::Backend(message));
    }
    text(body.get("answer"))
        .or_else(|| text(body.get("response")))
        .ok_or_else(|| Error::SchemaMismatch("chat reply has no answer text".into()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Ordered conversation, oldest first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatTranscript {
    messages: Vec<ChatMessage>,
}

impl ChatTranscript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transcript opening with an assistant greeting
    pub fn with_greeting(greeting: &str) -> Self {
        Self {
            messages: vec![ChatMessage::assistant(greeting)],
        }
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_answer_and_response_keys() {
        assert_eq!(
            normalize_chat_reply(&json!({"success": true, "answer": "They eat squid."})).unwrap(),
            "They eat squid."
        );
        assert_eq!(
            normalize_chat_reply(&json!({"success": true, "response": "Quota is 20%."})).unwrap(),
            "Quota is 20%."
        );
    }

    #[test]
    fn test_unsuccessful_reply() {
        let err = normalize_chat_reply(&json!({"success": false, "error": "Bedrock throttled"}))
            .unwrap_err();
        assert_eq!(err.to_string(), "Bedrock throttled");
        let err = normalize_chat_reply(&json!({"answer": "ignored"})).unwrap_err();
        assert_eq!(err.to_string(), "Failed to get response");
    }

    #[test]
    fn test_success_without_text() {
        let err = normalize_chat_reply(&json!({"success": true})).unwrap_err();
        assert!(matches!(err, Error::SchemaMismatch(_)));
    }

    #[test]
    fn test_transcript_order() {
        let mut transcript = ChatTranscript::with_greeting("Hello!");
        transcript.push(ChatMessage::user("What is bycatch?"));
        transcript.push(ChatMessage::assistant("Unintended catch."));
        let roles: Vec<ChatRole> = transcript.messages().iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![ChatRole::Assistant, ChatRole::User, ChatRole::Assistant]
        );
        assert_eq!(transcript.last().unwrap().text, "Unintended catch.");
        assert!(transcript.messages()[0].timestamp <= transcript.messages()[2].timestamp);
    }

    #[test]
    fn test_role_serializes_lowercase() {
        let value = serde_json::to_value(ChatMessage::user("hi")).unwrap();
        assert_eq!(value["role"], "user");
    }
}
