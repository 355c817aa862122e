//! services/client/src/adapters/simulated.rs
//!
//! A stand-in for the live reply stream. It implements the `ResponseSource`
//! port by waiting a fixed delay and answering with a templated echo of the
//! user's message.

use async_trait::async_trait;
use openhands_client_core::ports::{PortResult, ReplyStream, ResponseSource};
use std::time::Duration;
use tracing::debug;

/// Builds the canned assistant answer for `prompt`.
pub fn simulated_reply_text(prompt: &str) -> String {
    format!(
        "I understand you want me to help with: \"{prompt}\"\n\n\
         I'm a powerful AI agent that can execute code, browse the web, and interact with various tools. \
         Let me help you with that!\n\n\
         For example, if you need me to:\n\
         - Write and execute code\n\
         - Browse websites for information\n\
         - Manage files and directories\n\
         - Perform data analysis\n\
         - Automate tasks\n\n\
         Just let me know what specific task you'd like me to help with, and I'll get started right away!"
    )
}

/// Answers every prompt with `simulated_reply_text` after `delay`.
#[derive(Clone, Debug)]
pub struct SimulatedResponder {
    delay: Duration,
}

impl SimulatedResponder {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl ResponseSource for SimulatedResponder {
    async fn reply(&self, prompt: &str, conversation_id: Option<&str>) -> PortResult<ReplyStream> {
        debug!(
            "Scheduling simulated reply in {:?} (conversation: {:?})",
            self.delay, conversation_id
        );

        let delay = self.delay;
        let text = simulated_reply_text(prompt);
        let stream = async_stream::stream! {
            tokio::time::sleep(delay).await;
            let chunk: PortResult<String> = Ok(text);
            yield chunk;
        };
        Ok(Box::pin(stream))
    }
}
