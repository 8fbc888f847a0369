//! # Handler chain
//!
//! Dispatches a message to the handlers whose [`Trigger`] matches, in registration order. The
//! first handler returning Stop or Reply ends dispatch; a Reply is sent to the message's chat.
//! [`MessagePipeline`] and [`ResponsePipeline`] run middleware around the model call.

mod pipeline;
mod trigger;

pub use pipeline::{MessagePipeline, ResponsePipeline};
pub use trigger::Trigger;

use std::sync::Arc;

use tracing::{debug, info, instrument};
use wagpt_core::{Context, Handler, HandlerResponse, Message, Result, Session};

/// Ordered list of (trigger, handler) pairs.
#[derive(Clone, Default)]
pub struct HandlerChain {
    handlers: Vec<(Trigger, Arc<dyn Handler>)>,
}

impl HandlerChain {
    /// Creates an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a handler; handlers are tried in the order they were added.
    pub fn add_handler(&mut self, trigger: Trigger, handler: Arc<dyn Handler>) -> &mut Self {
        self.handlers.push((trigger, handler));
        self
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Runs matching handlers until one returns Stop or Reply. Reply text is sent through
    /// [`Context::send_text`]. Returns Continue when no handler took the message.
    #[instrument(skip_all, fields(chat_id = %message.chat_id, message_id = %message.id))]
    pub async fn handle(
        &self,
        ctx: &Context,
        message: &Message,
        session: &mut Session,
    ) -> Result<HandlerResponse> {
        for (trigger, handler) in &self.handlers {
            if !trigger.matches(message) {
                continue;
            }
            let handler_name = std::any::type_name_of_val(handler.as_ref());
            info!(
                handler = %handler_name,
                trigger = %trigger.describe(),
                "step: handler processing"
            );
            let response = handler.handle(ctx, message, session).await?;
            debug!(handler = %handler_name, response = ?response, "Handler processed");

            match response {
                HandlerResponse::Continue => continue,
                HandlerResponse::Stop => {
                    info!(handler = %handler_name, "step: handler chain stopped by handler");
                    return Ok(HandlerResponse::Stop);
                }
                HandlerResponse::Reply(text) => {
                    info!(
                        handler = %handler_name,
                        reply_len = text.len(),
                        "step: handler replied"
                    );
                    ctx.send_text(&message.chat_id, &text).await?;
                    return Ok(HandlerResponse::Reply(text));
                }
            }
        }
        Ok(HandlerResponse::Continue)
    }
}

// Integration tests live in tests/handler_chain_test.rs and tests/pipeline_test.rs
