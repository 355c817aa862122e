//! crates/openhands_client_core/src/domain.rs
//!
//! Defines the pure, core data structures for the chat client.
//! These structs are independent of any HTTP library or storage format.

use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

/// Maximum number of characters of the first user message kept in a title.
pub const TITLE_MAX_CHARS: usize = 50;

/// Marker appended to every derived title.
pub const TITLE_ELLIPSIS: &str = "...";

//=========================================================================================
// Messages
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageRole {
    User,
    Assistant,
    System,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
            MessageRole::System => "system",
        }
    }
}

/// How a message should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MessageKind {
    #[default]
    Text,
    Code,
    Error,
    Success,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Text => "text",
            MessageKind::Code => "code",
            MessageKind::Error => "error",
            MessageKind::Success => "success",
        }
    }
}

/// A single turn in a chat.
///
/// Fields are private: once built, a message's identity, role and timestamp
/// never change, and its content is read-only in this client.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    id: String,
    role: MessageRole,
    content: String,
    timestamp: DateTime<Utc>,
    kind: MessageKind,
}

impl Message {
    pub fn new(role: MessageRole, content: impl Into<String>, kind: MessageKind) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
            kind,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content, MessageKind::Text)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content, MessageKind::Text)
    }

    /// An assistant message rendered as a failure.
    pub fn error(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content, MessageKind::Error)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn role(&self) -> MessageRole {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn kind(&self) -> MessageKind {
        self.kind
    }
}

//=========================================================================================
// Conversations
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationStatus {
    Active,
    Completed,
    Error,
}

/// A backend-tracked conversation.
///
/// Only ever built from a backend-assigned identifier; before the first
/// successful creation call there is no `Conversation` at all.
#[derive(Debug, Clone)]
pub struct Conversation {
    id: String,
    title: String,
    messages: Vec<Message>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    status: ConversationStatus,
}

impl Conversation {
    /// Starts a conversation whose sole entry is the seed message.
    /// The title is derived from the seed's content.
    pub fn start(id: impl Into<String>, seed: Message) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            title: derive_title(seed.content()),
            messages: vec![seed],
            created_at: now,
            updated_at: now,
            status: ConversationStatus::Active,
        }
    }

    /// Appends a message at the end of the conversation.
    ///
    /// Returns `false` (and leaves the conversation untouched) when a message
    /// with the same identifier is already present.
    pub fn append_message(&mut self, message: Message) -> bool {
        if self.messages.iter().any(|m| m.id() == message.id()) {
            return false;
        }
        self.messages.push(message);
        self.updated_at = Utc::now();
        true
    }

    pub fn set_status(&mut self, status: ConversationStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn status(&self) -> ConversationStatus {
        self.status
    }
}

/// Builds a conversation title from the first user message.
///
/// Keeps the first `TITLE_MAX_CHARS` characters and always appends
/// `TITLE_ELLIPSIS`, even when nothing was cut.
pub fn derive_title(first_message: &str) -> String {
    let head: String = first_message.chars().take(TITLE_MAX_CHARS).collect();
    format!("{head}{TITLE_ELLIPSIS}")
}

/// The record returned by the backend after creating a conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedConversation {
    pub conversation_id: String,
    pub status: String,
    pub message: String,
}

//=========================================================================================
// Backend configuration
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FeatureFlags {
    pub enable_billing: bool,
    pub hide_llm_settings: bool,
}

/// Read-only configuration snapshot published by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ApiConfig {
    pub app_mode: String,
    pub github_client_id: String,
    pub posthog_client_key: String,
    pub feature_flags: FeatureFlags,
}

/// A response from one of the generic verb calls.
///
/// 4xx responses arrive here too; callers inspect `status` themselves.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status)
    }
}

//=========================================================================================
// Novel projects
//=========================================================================================

/// A chapter of a novel project.
#[derive(Debug, Clone, PartialEq)]
pub struct NovelChapter {
    pub id: String,
    pub title: String,
    pub content: String,
    pub word_count: usize,
    pub created_at: DateTime<Utc>,
}

/// A novel being written, with its chapters in order.
#[derive(Debug, Clone, PartialEq)]
pub struct NovelProject {
    pub id: String,
    pub title: String,
    pub genre: String,
    pub description: String,
    pub chapters: Vec<NovelChapter>,
    pub total_words: usize,
    pub created_at: DateTime<Utc>,
}

impl Default for NovelProject {
    fn default() -> Self {
        Self::new()
    }
}

impl NovelProject {
    /// An empty project with the default title and genre.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: "Untitled Novel".to_string(),
            genre: "Fantasy".to_string(),
            description: String::new(),
            chapters: Vec::new(),
            total_words: 0,
            created_at: Utc::now(),
        }
    }

    /// Appends an empty chapter named after its position.
    pub fn add_chapter(&mut self) -> &NovelChapter {
        let chapter = NovelChapter {
            id: Uuid::new_v4().to_string(),
            title: format!("Chapter {}", self.chapters.len() + 1),
            content: String::new(),
            word_count: 0,
            created_at: Utc::now(),
        };
        self.chapters.push(chapter);
        &self.chapters[self.chapters.len() - 1]
    }

    /// Replaces a chapter's text and recounts words.
    /// Returns `false` if no chapter has the given id.
    pub fn update_chapter_content(&mut self, chapter_id: &str, content: &str) -> bool {
        let Some(chapter) = self.chapters.iter_mut().find(|c| c.id == chapter_id) else {
            return false;
        };
        chapter.content = content.to_string();
        chapter.word_count = count_words(content);
        self.total_words = self.chapters.iter().map(|c| c.word_count).sum();
        true
    }
}

/// Number of whitespace-separated words in `text`.
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

#[cfg(test)]
#[path = "domain_test.rs"]
mod domain_test;
