//! Submission flows for the three input surfaces.
//!
//! Each flow ends in something visible: a rendered result, an inline error, or
//! a bot turn. No error escapes to the caller.

use crate::chat_command::{ChatCommandParser, ChatInput};
use crate::config::Capabilities;
use crate::conversation::{ChatTurn, ConversationStore, SubmissionState};
use crate::errors::ClientError;
use crate::models::{ManualInputs, OcrInputs, PredictionResponse};
use crate::prediction_client::PredictionClient;
use crate::renderer::{render, DisplayModel};
use crate::request_builder::RequestBuilder;
use std::sync::{Arc, Mutex, PoisonError};
use uuid::Uuid;

/// How a form submission ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The surface was already sending; nothing was done.
    Ignored,
    /// A new result replaced the previous one.
    Rendered,
    /// An error message replaced the previous result.
    Failed,
}

/// State of one form surface (manual or OCR).
#[derive(Debug, Clone, Default)]
pub struct PredictionSurface {
    state: SubmissionState,
    result: Option<DisplayModel>,
    error: Option<String>,
}

impl PredictionSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SubmissionState {
        self.state
    }

    pub fn result(&self) -> Option<&DisplayModel> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Moves Idle to Sending and clears the previous outcome.
    ///
    /// Returns false, changing nothing, when a submission is already out.
    pub fn start(&mut self) -> bool {
        if self.state == SubmissionState::Sending {
            return false;
        }
        self.state = SubmissionState::Sending;
        self.result = None;
        self.error = None;
        true
    }

    /// Records the outcome of the outstanding call and returns to Idle.
    pub fn finish(&mut self, outcome: Result<PredictionResponse, ClientError>) -> SubmitOutcome {
        self.state = SubmissionState::Idle;
        match outcome {
            Ok(response) => {
                self.result = Some(render(&response));
                self.error = None;
                SubmitOutcome::Rendered
            }
            Err(e) => {
                tracing::warn!("Prediction failed: {}", e);
                self.result = None;
                self.error = Some(e.user_message());
                SubmitOutcome::Failed
            }
        }
    }
}

/// Builds, dispatches and renders form submissions.
#[derive(Clone)]
pub struct PredictionWorkflow {
    client: PredictionClient,
    builder: RequestBuilder,
}

impl PredictionWorkflow {
    pub fn new(client: PredictionClient, capabilities: Capabilities) -> Self {
        Self {
            client,
            builder: RequestBuilder::new(capabilities),
        }
    }

    pub async fn submit_manual(
        &self,
        surface: &mut PredictionSurface,
        inputs: &ManualInputs,
    ) -> SubmitOutcome {
        if !surface.start() {
            tracing::debug!("Manual form is already sending, ignoring submission");
            return SubmitOutcome::Ignored;
        }

        let request = self.builder.build_manual_request(inputs);
        let outcome = self.client.predict(&request).await;
        surface.finish(outcome)
    }

    /// Missing documents fail locally, without a network call.
    pub async fn submit_ocr(
        &self,
        surface: &mut PredictionSurface,
        inputs: &OcrInputs,
    ) -> SubmitOutcome {
        if !surface.start() {
            tracing::debug!("OCR form is already sending, ignoring submission");
            return SubmitOutcome::Ignored;
        }

        let outcome = match self.builder.build_ocr_request(inputs) {
            Ok(request) => self.client.predict(&request).await,
            Err(e) => Err(e),
        };
        surface.finish(outcome)
    }
}

/// Chat surface: a transcript plus the calls that extend it.
///
/// Clones share the same transcript, so several sends may be in flight at once;
/// each reply is appended when its call completes.
#[derive(Clone)]
pub struct ChatSession {
    workflow: PredictionWorkflow,
    parser: ChatCommandParser,
    store: Arc<Mutex<ConversationStore>>,
}

impl ChatSession {
    pub fn new(client: PredictionClient, capabilities: Capabilities) -> Self {
        Self {
            workflow: PredictionWorkflow::new(client, capabilities),
            parser: ChatCommandParser::new(capabilities),
            store: Arc::new(Mutex::new(ConversationStore::new())),
        }
    }

    pub fn id(&self) -> Uuid {
        self.with_store(|store| store.id())
    }

    pub fn transcript(&self) -> Vec<ChatTurn> {
        self.with_store(|store| store.all().to_vec())
    }

    pub fn state(&self) -> SubmissionState {
        self.with_store(|store| store.state())
    }

    /// Sends one chat submission and returns the bot turn it produced.
    ///
    /// Blank text is ignored.
    pub async fn send(&self, text: &str) -> Option<ChatTurn> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        self.with_store(|store| store.begin_exchange(text));
        let reply = self.reply_to(text).await;
        Some(self.with_store(|store| store.complete_exchange(reply)))
    }

    async fn reply_to(&self, text: &str) -> String {
        let conversation = self.id();

        match self.parser.parse(text) {
            Err(e) => {
                tracing::info!(%conversation, "Answering malformed predict command with hint");
                e.user_message()
            }
            Ok(ChatInput::Conversational(message)) => {
                match self.workflow.client.chat(&message).await {
                    Ok(reply) => reply.reply,
                    Err(e) => {
                        tracing::warn!(%conversation, "Chat failed: {}", e);
                        e.user_message()
                    }
                }
            }
            Ok(ChatInput::Command(command)) => {
                tracing::info!(%conversation, "Running predict command from chat");
                let request = self.workflow.builder.build_manual_request(&command.inputs);
                match self.workflow.client.predict(&request).await {
                    Ok(response) => render(&response).chat_summary(),
                    Err(e) => {
                        tracing::warn!(%conversation, "Chat prediction failed: {}", e);
                        e.user_message()
                    }
                }
            }
        }
    }

    fn with_store<T>(&self, f: impl FnOnce(&mut ConversationStore) -> T) -> T {
        let mut store = self.store.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut store)
    }
}
