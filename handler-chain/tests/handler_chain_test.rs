//! Integration tests for [`handler_chain::HandlerChain`].
//!
//! Covers: trigger selection, Continue falling through to the next matching handler, Stop ending
//! dispatch without sending, Reply being sent through the context's bot, and no-match returning Continue.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use handler_chain::{HandlerChain, Trigger};
use wagpt_core::{
    Bot, Context, GptSettings, Handler, HandlerResponse, Message, MessageKind, Payload, Session,
};

/// Bot that records every sent text.
#[derive(Default)]
struct RecordingBot {
    sent: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl Bot for RecordingBot {
    async fn send_text(&self, chat_id: &str, text: &str) -> wagpt_core::Result<String> {
        self.sent
            .lock()
            .unwrap()
            .push((chat_id.to_string(), text.to_string()));
        Ok("sent-1".to_string())
    }
}

fn context() -> (Context, Arc<RecordingBot>) {
    let bot = Arc::new(RecordingBot::default());
    (Context::new(GptSettings::default(), bot.clone()), bot)
}

/// Handler returning a fixed response and counting calls.
struct FixedHandler {
    response: HandlerResponse,
    calls: Arc<AtomicUsize>,
}

impl FixedHandler {
    fn new(response: HandlerResponse) -> (Arc<Self>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Arc::new(Self {
                response,
                calls: calls.clone(),
            }),
            calls,
        )
    }
}

#[async_trait]
impl Handler for FixedHandler {
    async fn handle(
        &self,
        _ctx: &Context,
        _message: &Message,
        _session: &mut Session,
    ) -> wagpt_core::Result<HandlerResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.response.clone())
    }
}

/// **Test: Only the handler whose trigger matches runs; its Reply is sent to the chat.**
#[tokio::test]
async fn test_matching_handler_replies() {
    let (ctx, bot) = context();
    let (help, help_calls) = FixedHandler::new(HandlerResponse::Reply("help text".to_string()));
    let (clear, clear_calls) = FixedHandler::new(HandlerResponse::Stop);

    let mut chain = HandlerChain::new();
    chain
        .add_handler(Trigger::exact("/help"), help)
        .add_handler(Trigger::exact("/clear"), clear);

    let message = Message::new_text("m1", "100@c.us", "/help");
    let mut session = Session::new("100@c.us");
    let result = chain.handle(&ctx, &message, &mut session).await.unwrap();

    assert_eq!(result, HandlerResponse::Reply("help text".to_string()));
    assert_eq!(help_calls.load(Ordering::SeqCst), 1);
    assert_eq!(clear_calls.load(Ordering::SeqCst), 0);
    assert_eq!(
        *bot.sent.lock().unwrap(),
        vec![("100@c.us".to_string(), "help text".to_string())]
    );
}

/// **Test: Continue falls through to the next matching handler; Stop sends nothing.**
#[tokio::test]
async fn test_continue_falls_through_and_stop_sends_nothing() {
    let (ctx, bot) = context();
    let (first, first_calls) = FixedHandler::new(HandlerResponse::Continue);
    let (second, second_calls) = FixedHandler::new(HandlerResponse::Stop);
    let (third, third_calls) = FixedHandler::new(HandlerResponse::Reply("late".to_string()));

    let mut chain = HandlerChain::new();
    chain
        .add_handler(Trigger::regex(r"^/weather\s+(.+)$").unwrap(), first)
        .add_handler(Trigger::regex(r"^/weather").unwrap(), second)
        .add_handler(Trigger::regex(r"weather").unwrap(), third);

    let message = Message::new_text("m1", "100@c.us", "/weather Berlin");
    let mut session = Session::new("100@c.us");
    let result = chain.handle(&ctx, &message, &mut session).await.unwrap();

    assert_eq!(result, HandlerResponse::Stop);
    assert_eq!(first_calls.load(Ordering::SeqCst), 1);
    assert_eq!(second_calls.load(Ordering::SeqCst), 1);
    assert_eq!(third_calls.load(Ordering::SeqCst), 0);
    assert!(bot.sent.lock().unwrap().is_empty());
}

/// **Test: No matching trigger returns Continue so the message can go to the model.**
#[tokio::test]
async fn test_no_match_returns_continue() {
    let (ctx, bot) = context();
    let (help, help_calls) = FixedHandler::new(HandlerResponse::Reply("help".to_string()));
    let mut chain = HandlerChain::new();
    chain.add_handler(Trigger::exact("/help"), help);

    let message = Message::new_text("m1", "100@c.us", "What is the capital of France?");
    let mut session = Session::new("100@c.us");
    let result = chain.handle(&ctx, &message, &mut session).await.unwrap();

    assert_eq!(result, HandlerResponse::Continue);
    assert_eq!(help_calls.load(Ordering::SeqCst), 0);
    assert!(bot.sent.lock().unwrap().is_empty());
    assert_eq!(chain.len(), 1);
}

/// **Test: Payload-type triggers select handlers by message kind.**
#[tokio::test]
async fn test_kind_trigger_dispatch() {
    let (ctx, _bot) = context();
    let (document, document_calls) = FixedHandler::new(HandlerResponse::Stop);
    let mut chain = HandlerChain::new();
    chain.add_handler(Trigger::kind(MessageKind::Document), document);

    let mut message = Message::new_text("m1", "100@c.us", "");
    message.text = None;
    message.payload = Payload::Document(Default::default());
    let mut session = Session::new("100@c.us");
    let result = chain.handle(&ctx, &message, &mut session).await.unwrap();

    assert_eq!(result, HandlerResponse::Stop);
    assert_eq!(document_calls.load(Ordering::SeqCst), 1);
}

/// **Test: Handlers can mutate the session they are given.**
#[tokio::test]
async fn test_handler_mutates_session() {
    struct ResetHandler;

    #[async_trait]
    impl Handler for ResetHandler {
        async fn handle(
            &self,
            _ctx: &Context,
            _message: &Message,
            session: &mut Session,
        ) -> wagpt_core::Result<HandlerResponse> {
            session.history = Some(Vec::new());
            Ok(HandlerResponse::Stop)
        }
    }

    let (ctx, _bot) = context();
    let mut chain = HandlerChain::new();
    chain.add_handler(Trigger::exact("/reset"), Arc::new(ResetHandler));

    let message = Message::new_text("m1", "100@c.us", "/reset");
    let mut session = Session::new("100@c.us");
    chain.handle(&ctx, &message, &mut session).await.unwrap();

    assert_eq!(session.history, Some(Vec::new()));
}
