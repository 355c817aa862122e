//! services/client/src/chat/state.rs
//!
//! Defines the state of one chat session. The controller owns the mutation
//! rules; renderers hold a handle to the same `ChatSession` and only read it.

use openhands_client_core::domain::{Conversation, ConversationStatus, Message};

//=========================================================================================
// ChatPhase
//=========================================================================================

/// Where the session is in the submit cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatPhase {
    Idle,
    /// First turn only: waiting for the backend to create the conversation.
    AwaitingConversationCreation,
    AwaitingResponse,
    /// Transient: the error message is being appended.
    Error,
}

//=========================================================================================
// ChatSession
//=========================================================================================

/// Everything a chat view renders from.
#[derive(Debug, Clone)]
pub struct ChatSession {
    messages: Vec<Message>,
    conversation: Option<Conversation>,
    input: String,
    phase: ChatPhase,
    last_error: Option<String>,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatSession {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            conversation: None,
            input: String::new(),
            phase: ChatPhase::Idle,
            last_error: None,
        }
    }

    /// Every message of the session, oldest first, including those sent
    /// before a backend conversation existed.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn conversation(&self) -> Option<&Conversation> {
        self.conversation.as_ref()
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn phase(&self) -> ChatPhase {
        self.phase
    }

    /// `true` while a turn is in flight; submitting is disabled.
    pub fn is_busy(&self) -> bool {
        self.phase != ChatPhase::Idle
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub(crate) fn set_phase(&mut self, phase: ChatPhase) {
        self.phase = phase;
    }

    pub(crate) fn set_last_error(&mut self, error: Option<String>) {
        self.last_error = error;
    }

    /// Empties the input buffer and returns what it held.
    pub(crate) fn take_input(&mut self) -> String {
        std::mem::take(&mut self.input)
    }

    /// Appends to the transcript and, once one exists, to the conversation.
    pub(crate) fn push_message(&mut self, message: Message) {
        if let Some(conversation) = self.conversation.as_mut() {
            conversation.append_message(message.clone());
        }
        self.messages.push(message);
    }

    /// Installs the backend conversation. Only the first one sticks.
    pub(crate) fn start_conversation(&mut self, conversation: Conversation) -> bool {
        if self.conversation.is_some() {
            return false;
        }
        self.conversation = Some(conversation);
        true
    }

    pub(crate) fn set_conversation_status(&mut self, status: ConversationStatus) {
        if let Some(conversation) = self.conversation.as_mut() {
            if conversation.status() != status {
                conversation.set_status(status);
            }
        }
    }
}
