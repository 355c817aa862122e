pub mod controller;
pub mod state;

pub use controller::{ChatController, SubmitOutcome, ERROR_REPLY};
pub use state::{ChatPhase, ChatSession};
