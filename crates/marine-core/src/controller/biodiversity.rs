//! Biodiversity page: eDNA analysis and species chat

use std::sync::Mutex;

use serde::Serialize;
use tracing::debug;

use crate::backend::{MarineBackend, MarineClient};
use crate::error::Error;
use crate::fallback::{Fallback, ResultSource};
use crate::normalize::{ChatMessage, ChatTranscript, EdnaAnalysis};
use crate::upload::FilePayload;

use super::{lock, BusyFlag, Dispatch};

const CHAT_REJECTED: &str = "Sorry, I encountered an error. Please try again.";
const CHAT_UNREACHABLE: &str = "Unable to connect to the chatbot service. Please try again later.";

#[derive(Debug, Clone, Default, Serialize)]
pub struct BiodiversityState {
    #[serde(skip)]
    pub sequences: Option<FilePayload>,
    pub analysis: Option<EdnaAnalysis>,
    pub source: Option<ResultSource>,
    pub alert: Option<String>,
    pub transcript: ChatTranscript,
}

impl BiodiversityState {
    /// Species chat needs a profile to talk about
    pub fn chat_available(&self) -> bool {
        self.analysis
            .as_ref()
            .is_some_and(|a| a.analysis.is_some())
    }
}

pub struct BiodiversityController {
    client: MarineClient,
    analysis_busy: BusyFlag,
    chat_busy: BusyFlag,
    state: Mutex<BiodiversityState>,
}

impl BiodiversityController {
    pub fn new(client: MarineClient) -> Self {
        Self {
            client,
            analysis_busy: BusyFlag::new(),
            chat_busy: BusyFlag::new(),
            state: Mutex::new(BiodiversityState::default()),
        }
    }

    pub fn snapshot(&self) -> BiodiversityState {
        lock(&self.state).clone()
    }

    /// Select a sequence file; resets results, alert and conversation
    pub fn select_sequences(&self, sequences: FilePayload) {
        let mut state = lock(&self.state);
        *state = BiodiversityState {
            sequences: Some(sequences),
            ..Default::default()
        };
    }

    /// Analyze the selected file. Always yields a result once dispatched.
    pub async fn analyze(&self) -> Dispatch<Fallback<EdnaAnalysis>> {
        let Some(sequences) = lock(&self.state).sequences.clone() else {
            return Dispatch::NoInput;
        };
        let Some(_guard) = self.analysis_busy.try_acquire() else {
            debug!("eDNA analysis pending, ignoring");
            return Dispatch::Busy;
        };

        let result = self.client.analyze_edna(&sequences).await;

        let mut state = lock(&self.state);
        state.alert = result.value.alert().map(str::to_string);
        state.analysis = Some(result.value.clone());
        state.source = Some(result.source.clone());
        state.transcript.clear();
        Dispatch::Completed(result)
    }

    /// Ask about the analysed species; returns the assistant's transcript entry
    ///
    /// Failures never surface as errors: an apology is appended instead.
    pub async fn ask(&self, question: &str) -> Dispatch<String> {
        let question = question.trim();
        if question.is_empty() {
            return Dispatch::NoInput;
        }
        let Some(profile) = lock(&self.state)
            .analysis
            .as_ref()
            .and_then(|a| a.analysis.clone())
        else {
            return Dispatch::NoInput;
        };
        let Some(_guard) = self.chat_busy.try_acquire() else {
            debug!("Species chat pending, ignoring");
            return Dispatch::Busy;
        };
        lock(&self.state)
            .transcript
            .push(ChatMessage::user(question));

        let reply = match self.client.ask_species(&profile, question).await {
            Ok(answer) => answer,
            Err(e) => chat_apology(&e).to_string(),
        };

        lock(&self.state)
            .transcript
            .push(ChatMessage::assistant(reply.clone()));
        Dispatch::Completed(reply)
    }
}

fn chat_apology(error: &Error) -> &'static str {
    if error.is_transport() {
        CHAT_UNREACHABLE
    } else {
        CHAT_REJECTED
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::ChatRole;
    use crate::test_utils::{MockMarineServer, RouteBehavior};
    use serde_json::json;

    fn fasta() -> FilePayload {
        FilePayload::new("sample.fasta", b">SEQ_001\nATGGCAAGCCTACGAAAAACACACC\n".to_vec())
    }

    async fn analysed(server: &MockMarineServer) -> BiodiversityController {
        let controller =
            BiodiversityController::new(MarineClient::from_config(&server.config()).unwrap());
        controller.select_sequences(fasta());
        controller.analyze().await;
        controller
    }

    #[tokio::test]
    async fn test_alert_from_backend() {
        let server = MockMarineServer::start().await;
        let controller = analysed(&server).await;
        let state = controller.snapshot();
        assert_eq!(state.alert.as_deref(), Some("Pterois volitans"));
        assert!(state.chat_available());
        assert_eq!(
            state.source,
            Some(ResultSource::Endpoint("/api/v1/edna/analyze".into()))
        );
    }

    #[tokio::test]
    async fn test_unreachable_falls_back_to_sample() {
        let server = MockMarineServer::start().await;
        server.set("/api/v1/edna/analyze", RouteBehavior::Status(503));
        let controller = analysed(&server).await;
        let state = controller.snapshot();
        assert_eq!(state.source, Some(ResultSource::Synthetic));
        assert_eq!(state.alert.as_deref(), Some("Pterois volitans"));
        assert!(!state.chat_available());
        assert!(matches!(controller.ask("Diet?").await, Dispatch::NoInput));
    }

    #[tokio::test]
    async fn test_chat_answer_appended() {
        let server = MockMarineServer::start().await;
        let controller = analysed(&server).await;

        let reply = controller.ask("What does it eat?").await.completed().unwrap();
        assert!(reply.contains("squid"));
        let transcript = controller.snapshot().transcript;
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript.messages()[0].role, ChatRole::User);
        assert_eq!(transcript.messages()[1].text, reply);
    }

    #[tokio::test]
    async fn test_chat_apologies() {
        let server = MockMarineServer::start().await;
        let controller = analysed(&server).await;

        server.set(
            "/api/v1/edna/chat",
            RouteBehavior::Json(json!({"success": false, "error": "quota"})),
        );
        assert_eq!(
            controller.ask("Habitat?").await.completed().unwrap(),
            CHAT_REJECTED
        );

        server.set("/api/v1/edna/chat", RouteBehavior::Malformed);
        assert_eq!(
            controller.ask("Habitat?").await.completed().unwrap(),
            CHAT_UNREACHABLE
        );
        assert_eq!(controller.snapshot().transcript.len(), 4);
    }

    #[tokio::test]
    async fn test_blank_question_ignored() {
        let server = MockMarineServer::start().await;
        let controller = analysed(&server).await;
        assert!(matches!(controller.ask("   ").await, Dispatch::NoInput));
        assert_eq!(server.hits("/api/v1/edna/chat"), 0);
    }

    #[tokio::test]
    async fn test_new_file_resets_everything() {
        let server = MockMarineServer::start().await;
        let controller = analysed(&server).await;
        controller.ask("Range?").await;

        controller.select_sequences(fasta());
        let state = controller.snapshot();
        assert!(state.analysis.is_none());
        assert!(state.alert.is_none());
        assert!(state.transcript.is_empty());
    }
}
