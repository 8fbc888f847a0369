//! Ordered middleware pipelines around the model call.

use std::sync::Arc;

use tracing::{debug, instrument};
use wagpt_core::{
    Context, Message, MessageMiddleware, MessageStage, ResponseMiddleware, ResponseStage, Result,
    Session,
};

/// Message middleware run in registration order; each output feeds the next.
#[derive(Clone, Default)]
pub struct MessagePipeline {
    middleware: Vec<Arc<dyn MessageMiddleware>>,
}

impl MessagePipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, middleware: Arc<dyn MessageMiddleware>) -> &mut Self {
        self.middleware.push(middleware);
        self
    }

    pub fn len(&self) -> usize {
        self.middleware.len()
    }

    pub fn is_empty(&self) -> bool {
        self.middleware.is_empty()
    }

    #[instrument(skip_all, fields(chat_id = %message.chat_id))]
    pub async fn run(
        &self,
        ctx: &Context,
        message: &Message,
        mut stage: MessageStage,
        session: &Session,
    ) -> Result<MessageStage> {
        for mw in &self.middleware {
            let mw_name = std::any::type_name_of_val(mw.as_ref());
            debug!(middleware = %mw_name, "step: message middleware");
            stage = mw.process(ctx, message, stage, session).await?;
        }
        Ok(stage)
    }
}

/// Response middleware run in registration order; each output feeds the next.
#[derive(Clone, Default)]
pub struct ResponsePipeline {
    middleware: Vec<Arc<dyn ResponseMiddleware>>,
}

impl ResponsePipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, middleware: Arc<dyn ResponseMiddleware>) -> &mut Self {
        self.middleware.push(middleware);
        self
    }

    pub fn len(&self) -> usize {
        self.middleware.len()
    }

    pub fn is_empty(&self) -> bool {
        self.middleware.is_empty()
    }

    #[instrument(skip_all, fields(chat_id = %session.chat_id))]
    pub async fn run(
        &self,
        ctx: &Context,
        mut stage: ResponseStage,
        session: &Session,
    ) -> Result<ResponseStage> {
        for mw in &self.middleware {
            let mw_name = std::any::type_name_of_val(mw.as_ref());
            debug!(middleware = %mw_name, "step: response middleware");
            stage = mw.process(ctx, stage, session).await?;
        }
        Ok(stage)
    }
}
