use super::*;
use crate::adapters::simulated::{simulated_reply_text, SimulatedResponder};
use async_trait::async_trait;
use openhands_client_core::domain::{
    ApiConfig, ApiResponse, CreatedConversation, MessageKind, MessageRole,
};
use openhands_client_core::ports::ReplyStream;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Notify;

// =============================================================
// Fakes
// =============================================================

/// Backend whose conversation creation either succeeds with numbered ids or
/// fails with a fixed error.
#[derive(Default)]
struct FakeBackend {
    create_calls: AtomicUsize,
    create_error: Option<PortError>,
}

impl FakeBackend {
    fn failing(error: PortError) -> Self {
        Self {
            create_calls: AtomicUsize::new(0),
            create_error: Some(error),
        }
    }

    fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BackendApi for FakeBackend {
    async fn check_health(&self) -> PortResult<String> {
        Ok("OK".to_string())
    }

    async fn get_config(&self) -> PortResult<ApiConfig> {
        Ok(ApiConfig::default())
    }

    async fn create_conversation(&self, initial_message: &str) -> PortResult<CreatedConversation> {
        let n = self.create_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(err) = &self.create_error {
            return Err(err.clone());
        }
        Ok(CreatedConversation {
            conversation_id: format!("conv-{n}"),
            status: "ok".to_string(),
            message: initial_message.to_string(),
        })
    }

    async fn get(&self, _path: &str) -> PortResult<ApiResponse> {
        Err(PortError::Unexpected("unused".to_string()))
    }

    async fn post(&self, _path: &str, _body: Option<Value>) -> PortResult<ApiResponse> {
        Err(PortError::Unexpected("unused".to_string()))
    }

    async fn put(&self, _path: &str, _body: Option<Value>) -> PortResult<ApiResponse> {
        Err(PortError::Unexpected("unused".to_string()))
    }

    async fn delete(&self, _path: &str) -> PortResult<ApiResponse> {
        Err(PortError::Unexpected("unused".to_string()))
    }
}

/// Holds every reply until the gate is opened.
struct GatedResponder {
    gate: Arc<Notify>,
}

#[async_trait]
impl ResponseSource for GatedResponder {
    async fn reply(&self, prompt: &str, _conversation_id: Option<&str>) -> PortResult<ReplyStream> {
        let gate = self.gate.clone();
        let text = format!("echo: {prompt}");
        Ok(Box::pin(async_stream::stream! {
            gate.notified().await;
            let chunk: PortResult<String> = Ok(text);
            yield chunk;
        }))
    }
}

/// Fails before producing a stream.
struct BrokenResponder;

#[async_trait]
impl ResponseSource for BrokenResponder {
    async fn reply(&self, _prompt: &str, _conversation_id: Option<&str>) -> PortResult<ReplyStream> {
        Err(PortError::Network("stream unavailable".to_string()))
    }
}

/// Yields one chunk, then fails.
struct InterruptedResponder;

#[async_trait]
impl ResponseSource for InterruptedResponder {
    async fn reply(&self, _prompt: &str, _conversation_id: Option<&str>) -> PortResult<ReplyStream> {
        Ok(Box::pin(futures::stream::iter(vec![
            Ok("partial".to_string()),
            Err(PortError::Network("connection reset".to_string())),
        ])))
    }
}

fn instant_responder() -> Arc<SimulatedResponder> {
    Arc::new(SimulatedResponder::new(Duration::ZERO))
}

// =============================================================
// Happy path
// =============================================================

#[tokio::test]
async fn hello_appends_user_then_assistant_and_returns_to_idle() {
    let backend = Arc::new(FakeBackend::default());
    let controller = ChatController::new(backend.clone(), instant_responder());

    let outcome = controller.send("Hello").await;
    assert_eq!(outcome, SubmitOutcome::Replied);

    let session = controller.session();
    let session = session.lock().await;
    let messages = session.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role(), MessageRole::User);
    assert_eq!(messages[0].content(), "Hello");
    assert_eq!(messages[1].role(), MessageRole::Assistant);
    assert_eq!(messages[1].kind(), MessageKind::Text);
    assert_eq!(messages[1].content(), simulated_reply_text("Hello"));
    assert!(messages[1].content().contains("\"Hello\""));
    assert_eq!(session.phase(), ChatPhase::Idle);
    assert_eq!(session.input(), "");
}

#[tokio::test]
async fn first_turn_creates_conversation_with_seed_message() {
    let backend = Arc::new(FakeBackend::default());
    let controller = ChatController::new(backend.clone(), instant_responder());

    controller.send("  Build me a todo app  ").await;

    let session = controller.session();
    let session = session.lock().await;
    let conversation = session.conversation().expect("conversation created");
    assert_eq!(conversation.id(), "conv-1");
    assert_eq!(conversation.title(), "Build me a todo app...");
    assert_eq!(conversation.status(), ConversationStatus::Active);
    assert_eq!(conversation.messages()[0].id(), session.messages()[0].id());
    assert_eq!(backend.create_calls(), 1);
}

#[tokio::test]
async fn later_turns_reuse_the_conversation() {
    let backend = Arc::new(FakeBackend::default());
    let controller = ChatController::new(backend.clone(), instant_responder());

    controller.send("one").await;
    controller.send("two").await;

    let session = controller.session();
    let session = session.lock().await;
    assert_eq!(backend.create_calls(), 1);
    assert_eq!(session.messages().len(), 4);
    let conversation = session.conversation().unwrap();
    assert_eq!(conversation.messages().len(), 4);
    let contents: Vec<&str> = conversation.messages().iter().map(|m| m.content()).collect();
    assert_eq!(contents[0], "one");
    assert_eq!(contents[2], "two");
}

#[tokio::test]
async fn submit_uses_and_clears_the_input_buffer() {
    let controller = ChatController::new(Arc::new(FakeBackend::default()), instant_responder());

    controller.set_input("from the buffer").await;
    assert_eq!(controller.submit().await, SubmitOutcome::Replied);

    let session = controller.session();
    let session = session.lock().await;
    assert_eq!(session.input(), "");
    assert_eq!(session.messages()[0].content(), "from the buffer");
}

// =============================================================
// Guards
// =============================================================

#[tokio::test]
async fn blank_input_is_a_no_op() {
    let backend = Arc::new(FakeBackend::default());
    let controller = ChatController::new(backend.clone(), instant_responder());

    assert_eq!(controller.send("   \n").await, SubmitOutcome::Empty);

    let session = controller.session();
    assert!(session.lock().await.messages().is_empty());
    assert_eq!(backend.create_calls(), 0);
}

#[tokio::test]
async fn submit_while_awaiting_response_is_ignored() {
    let backend = Arc::new(FakeBackend::default());
    let gate = Arc::new(Notify::new());
    let responder = Arc::new(GatedResponder { gate: gate.clone() });
    let controller = Arc::new(ChatController::new(backend.clone(), responder));

    let first = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.send("first").await })
    };

    let session = controller.session();
    loop {
        if session.lock().await.phase() == ChatPhase::AwaitingResponse {
            break;
        }
        tokio::task::yield_now().await;
    }

    assert_eq!(controller.send("second").await, SubmitOutcome::Ignored);
    assert_eq!(session.lock().await.messages().len(), 1);

    gate.notify_one();
    assert_eq!(first.await.unwrap(), SubmitOutcome::Replied);

    let session = session.lock().await;
    let contents: Vec<&str> = session.messages().iter().map(|m| m.content()).collect();
    assert_eq!(contents, vec!["first", "echo: first"]);
    assert_eq!(backend.create_calls(), 1);
}

// =============================================================
// Failures
// =============================================================

#[tokio::test]
async fn conversation_creation_timeout_degrades_but_still_replies() {
    let backend = Arc::new(FakeBackend::failing(PortError::Network(
        "timeout of 30000ms exceeded".to_string(),
    )));
    let controller = ChatController::new(backend.clone(), instant_responder());

    assert_eq!(controller.send("Hello").await, SubmitOutcome::Replied);

    {
        let session = controller.session();
        let session = session.lock().await;
        assert!(session.conversation().is_none());
        assert_eq!(session.messages().len(), 2);
        assert_eq!(session.messages()[0].content(), "Hello");
        assert_eq!(session.messages()[1].role(), MessageRole::Assistant);
        assert_eq!(session.messages()[1].kind(), MessageKind::Text);
        assert_eq!(session.phase(), ChatPhase::Idle);
    }

    // The next turn tries to create the conversation again.
    controller.send("again").await;
    assert_eq!(backend.create_calls(), 2);
}

#[tokio::test]
async fn responder_failure_appends_error_message() {
    let controller = ChatController::new(Arc::new(FakeBackend::default()), Arc::new(BrokenResponder));

    assert_eq!(controller.send("Hello").await, SubmitOutcome::Failed);

    let session = controller.session();
    let session = session.lock().await;
    assert_eq!(session.messages().len(), 2);
    let last = &session.messages()[1];
    assert_eq!(last.role(), MessageRole::Assistant);
    assert_eq!(last.kind(), MessageKind::Error);
    assert_eq!(last.content(), ERROR_REPLY);
    assert_eq!(session.phase(), ChatPhase::Idle);
    assert!(session.last_error().unwrap().contains("stream unavailable"));
    assert_eq!(session.conversation().unwrap().status(), ConversationStatus::Error);
}

#[tokio::test]
async fn stream_error_mid_reply_discards_partial_text() {
    let controller =
        ChatController::new(Arc::new(FakeBackend::default()), Arc::new(InterruptedResponder));

    assert_eq!(controller.send("Hello").await, SubmitOutcome::Failed);

    let session = controller.session();
    let session = session.lock().await;
    assert!(session.messages().iter().all(|m| m.content() != "partial"));
    assert_eq!(session.messages()[1].content(), ERROR_REPLY);
}

#[tokio::test]
async fn controller_recovers_after_a_failed_turn() {
    let controller = ChatController::new(Arc::new(FakeBackend::default()), Arc::new(BrokenResponder));
    controller.send("first").await;

    assert_eq!(controller.send("second").await, SubmitOutcome::Failed);
    let session = controller.session();
    assert_eq!(session.lock().await.messages().len(), 4);
}

#[tokio::test]
async fn aborted_turn_returns_session_to_idle() {
    let backend = Arc::new(FakeBackend::default());
    let responder = Arc::new(GatedResponder {
        gate: Arc::new(Notify::new()),
    });
    let controller = Arc::new(ChatController::new(backend.clone(), responder));
    let session = controller.session();

    let turn = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.send("never answered").await })
    };
    loop {
        if session.lock().await.phase() == ChatPhase::AwaitingResponse {
            break;
        }
        tokio::task::yield_now().await;
    }

    turn.abort();
    assert!(turn.await.unwrap_err().is_cancelled());
    assert_eq!(session.lock().await.phase(), ChatPhase::Idle);

    // The same session accepts the next turn.
    let next = ChatController::with_session(backend, instant_responder(), session.clone());
    assert_eq!(next.send("hello again").await, SubmitOutcome::Replied);

    let session = session.lock().await;
    let contents: Vec<&str> = session.messages().iter().map(|m| m.content()).collect();
    assert_eq!(contents[0], "never answered");
    assert_eq!(contents[1], "hello again");
    assert_eq!(contents.len(), 3);
}
