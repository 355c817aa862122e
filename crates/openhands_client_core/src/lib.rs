pub mod domain;
pub mod ports;

pub use domain::{
    count_words, derive_title, ApiConfig, ApiResponse, Conversation, ConversationStatus,
    CreatedConversation, FeatureFlags, Message, MessageKind, MessageRole, NovelChapter,
    NovelProject,
};
pub use ports::{BackendApi, PortError, PortResult, ProjectStore, ReplyStream, ResponseSource};
