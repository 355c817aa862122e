//! crates/openhands_client_core/src/ports.rs
//!
//! Defines the service contracts (traits) the client logic depends on.
//! These traits form the boundary of the hexagonal architecture, so the chat
//! controller, settings probe and novel writer never see a concrete HTTP
//! library, reply transport or storage medium.

use async_trait::async_trait;
use futures::Stream;
use serde_json::Value;
use std::pin::Pin;

use crate::domain::{ApiConfig, ApiResponse, CreatedConversation, NovelProject};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    /// Caller input was rejected before any network call was made.
    #[error("Validation failed: {0}")]
    Validation(String),
    /// The request could not complete (timeout, DNS, connection refused).
    #[error("Network error: {0}")]
    Network(String),
    /// The backend answered with a status of 500 or above.
    #[error("Server error ({status} {status_text}): {message}")]
    Server {
        status: u16,
        status_text: String,
        message: String,
    },
    #[error("Failed to decode response: {0}")]
    Decode(String),
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

/// Chunks of assistant text, in order.
pub type ReplyStream = Pin<Box<dyn Stream<Item = PortResult<String>> + Send>>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Every outbound call to the OpenHands backend goes through this port.
#[async_trait]
pub trait BackendApi: Send + Sync {
    /// Returns the raw payload of the health endpoint (`"OK"` when healthy).
    async fn check_health(&self) -> PortResult<String>;

    async fn get_config(&self) -> PortResult<ApiConfig>;

    /// Creates a backend conversation seeded with the first user message.
    /// Empty input fails with `PortError::Validation` without touching the network.
    async fn create_conversation(&self, initial_message: &str) -> PortResult<CreatedConversation>;

    // --- Generic verbs (single attempt, 4xx passed through) ---
    async fn get(&self, path: &str) -> PortResult<ApiResponse>;

    async fn post(&self, path: &str, body: Option<Value>) -> PortResult<ApiResponse>;

    async fn put(&self, path: &str, body: Option<Value>) -> PortResult<ApiResponse>;

    async fn delete(&self, path: &str) -> PortResult<ApiResponse>;
}

/// Produces the assistant's reply to a user message.
///
/// The simulated responder and a future live streaming client both sit
/// behind this trait.
#[async_trait]
pub trait ResponseSource: Send + Sync {
    async fn reply(&self, prompt: &str, conversation_id: Option<&str>) -> PortResult<ReplyStream>;
}

/// Durable storage for the novel writer's project list.
#[async_trait]
pub trait ProjectStore: Send + Sync {
    /// Loads every saved project. A store that was never written yields an empty list.
    async fn load_projects(&self) -> PortResult<Vec<NovelProject>>;

    /// Replaces the saved list wholesale.
    async fn save_projects(&self, projects: &[NovelProject]) -> PortResult<()>;
}
