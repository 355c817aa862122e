//! services/client/src/lib.rs
//!
//! The OpenHands client library: adapters for the backend, the chat
//! controller, the settings probe and the novel writer.

pub mod adapters;
pub mod chat;
pub mod config;
pub mod error;
pub mod novel;
pub mod settings;
