//! services/client/src/chat/controller.rs
//!
//! The chat controller: drives one submit cycle from user input to the
//! assistant's reply.
//!
//! A turn goes `Idle` → (`AwaitingConversationCreation`, first turn only) →
//! `AwaitingResponse` → `Idle`. Failures while producing the reply pass
//! through `Error`, append an apology and land back in `Idle`.

use futures::StreamExt;
use openhands_client_core::{
    domain::{Conversation, ConversationStatus, Message},
    ports::{BackendApi, PortError, PortResult, ResponseSource},
};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::chat::state::{ChatPhase, ChatSession};

/// Shown in place of the assistant reply when producing it failed.
pub const ERROR_REPLY: &str =
    "Sorry, I encountered an error while processing your request. Please try again.";

/// What a call to `submit` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The trimmed input was empty; nothing happened.
    Empty,
    /// A turn was already in flight; nothing happened.
    Ignored,
    /// The assistant reply was appended.
    Replied,
    /// The error message was appended instead of a reply.
    Failed,
}

pub struct ChatController {
    backend: Arc<dyn BackendApi>,
    responder: Arc<dyn ResponseSource>,
    session: Arc<Mutex<ChatSession>>,
}

impl ChatController {
    pub fn new(backend: Arc<dyn BackendApi>, responder: Arc<dyn ResponseSource>) -> Self {
        Self::with_session(backend, responder, Arc::new(Mutex::new(ChatSession::new())))
    }

    /// Builds a controller around an existing session handle.
    pub fn with_session(
        backend: Arc<dyn BackendApi>,
        responder: Arc<dyn ResponseSource>,
        session: Arc<Mutex<ChatSession>>,
    ) -> Self {
        Self {
            backend,
            responder,
            session,
        }
    }

    /// A handle to the session for rendering.
    pub fn session(&self) -> Arc<Mutex<ChatSession>> {
        self.session.clone()
    }

    pub async fn set_input(&self, text: &str) {
        self.session.lock().await.set_input(text);
    }

    /// Replaces the input buffer with `text` and submits it.
    pub async fn send(&self, text: &str) -> SubmitOutcome {
        self.set_input(text).await;
        self.submit().await
    }

    /// Submits the current input buffer.
    pub async fn submit(&self) -> SubmitOutcome {
        let start_time = Instant::now();

        // --- 1. Optimistic append ---
        let (user_message, needs_conversation) = {
            let mut session = self.session.lock().await;
            if session.is_busy() {
                debug!("Submit ignored: a turn is already in flight.");
                return SubmitOutcome::Ignored;
            }
            let text = session.input().trim().to_string();
            if text.is_empty() {
                return SubmitOutcome::Empty;
            }
            session.take_input();
            session.set_last_error(None);

            let user_message = Message::user(text);
            session.push_message(user_message.clone());

            let needs_conversation = session.conversation().is_none();
            session.set_phase(if needs_conversation {
                ChatPhase::AwaitingConversationCreation
            } else {
                ChatPhase::AwaitingResponse
            });
            (user_message, needs_conversation)
        };
        let mut turn = TurnGuard::new(self.session.clone());
        info!("Chat turn started.");

        // --- 2. Lazily create the backend conversation ---
        if needs_conversation {
            self.open_conversation(&user_message).await;
        }

        let conversation_id = {
            let mut session = self.session.lock().await;
            session.set_phase(ChatPhase::AwaitingResponse);
            session.conversation().map(|c| c.id().to_string())
        };

        // --- 3. Produce the reply ---
        let reply = self
            .collect_reply(user_message.content(), conversation_id.as_deref())
            .await;

        // --- 4. Append and return to idle ---
        let outcome = {
            let mut session = self.session.lock().await;
            match reply {
                Ok(text) => {
                    session.push_message(Message::assistant(text));
                    session.set_conversation_status(ConversationStatus::Active);
                    SubmitOutcome::Replied
                }
                Err(e) => {
                    error!("Error sending message: {}", e);
                    session.set_phase(ChatPhase::Error);
                    session.set_last_error(Some(e.to_string()));
                    session.push_message(Message::error(ERROR_REPLY));
                    session.set_conversation_status(ConversationStatus::Error);
                    SubmitOutcome::Failed
                }
            }
        };
        self.session.lock().await.set_phase(ChatPhase::Idle);
        turn.finish();

        info!("⏱️ Chat turn took: {:?}", start_time.elapsed());
        outcome
    }

    /// Creates the backend conversation for the first turn.
    ///
    /// A failure is logged and swallowed: the turn carries on without a
    /// backend record and the next turn tries again.
    async fn open_conversation(&self, seed: &Message) {
        match self.backend.create_conversation(seed.content()).await {
            Ok(created) => {
                info!(
                    "Conversation {} created (status: {}).",
                    created.conversation_id, created.status
                );
                let conversation = Conversation::start(created.conversation_id, seed.clone());
                self.session.lock().await.start_conversation(conversation);
            }
            Err(e) => {
                warn!("Conversation creation failed, continuing without one: {}", e);
            }
        }
    }

    /// Drains the responder's stream into one string.
    async fn collect_reply(&self, prompt: &str, conversation_id: Option<&str>) -> PortResult<String> {
        let mut stream = self.responder.reply(prompt, conversation_id).await?;
        let mut reply = String::new();
        while let Some(chunk) = stream.next().await {
            reply.push_str(&chunk?);
        }
        if reply.is_empty() {
            return Err(PortError::Unexpected(
                "response source produced an empty reply".to_string(),
            ));
        }
        Ok(reply)
    }
}

/// Puts the session back to `Idle` when a turn is dropped before it finishes,
/// e.g. an aborted task or the losing branch of a `select!`.
struct TurnGuard {
    session: Arc<Mutex<ChatSession>>,
    finished: bool,
}

impl TurnGuard {
    fn new(session: Arc<Mutex<ChatSession>>) -> Self {
        Self {
            session,
            finished: false,
        }
    }

    fn finish(&mut self) {
        self.finished = true;
    }
}

impl Drop for TurnGuard {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        warn!("Chat turn dropped before completion; session returned to idle.");
        match self.session.try_lock() {
            Ok(mut session) => session.set_phase(ChatPhase::Idle),
            Err(_) => {
                // Someone holds the lock for a moment; reset once they let go.
                if let Ok(handle) = tokio::runtime::Handle::try_current() {
                    let session = self.session.clone();
                    handle.spawn(async move {
                        session.lock().await.set_phase(ChatPhase::Idle);
                    });
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "controller_test.rs"]
mod controller_test;
