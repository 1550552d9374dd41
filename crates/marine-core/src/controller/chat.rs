//! Fisheries assistant chat

use std::sync::Mutex;

use tracing::{debug, warn};

use crate::backend::{MarineBackend, MarineClient};
use crate::normalize::{ChatMessage, ChatTranscript};

use super::{lock, BusyFlag, Dispatch};

pub const GREETING: &str = "Hello! I am your Fisheries AI Assistant. Ask me anything about sustainable fishing, species, or regulations.";
pub const APOLOGY: &str =
    "Sorry, I encountered an error connecting to the knowledge base. Please try again.";

pub struct ChatController {
    client: MarineClient,
    busy: BusyFlag,
    transcript: Mutex<ChatTranscript>,
}

impl ChatController {
    /// Start a conversation with the assistant's greeting
    pub fn new(client: MarineClient) -> Self {
        Self {
            client,
            busy: BusyFlag::new(),
            transcript: Mutex::new(ChatTranscript::with_greeting(GREETING)),
        }
    }

    pub fn transcript(&self) -> ChatTranscript {
        lock(&self.transcript).clone()
    }

    /// Send a question; any failure becomes the canned apology
    pub async fn send(&self, text: &str) -> Dispatch<String> {
        let text = text.trim();
        if text.is_empty() {
            return Dispatch::NoInput;
        }
        let Some(_guard) = self.busy.try_acquire() else {
            debug!("Assistant reply pending, ignoring");
            return Dispatch::Busy;
        };
        lock(&self.transcript).push(ChatMessage::user(text));

        let reply = match self.client.ask_fisheries_agent(text).await {
            Ok(answer) => answer,
            Err(e) => {
                warn!(error = %e, "Fisheries assistant failed");
                APOLOGY.to_string()
            }
        };

        lock(&self.transcript).push(ChatMessage::assistant(reply.clone()));
        Dispatch::Completed(reply)
    }
}
