//! Extension points: trigger [`Handler`]s and the two middleware kinds of the model pipeline.

use async_trait::async_trait;

use crate::context::Context;
use crate::error::Result;
use crate::types::{ChatRecord, Content, HandlerResponse, Message, Session};

/// Reacts to a message whose trigger matched. Returning [`HandlerResponse::Continue`] hands the
/// message to the next matching handler (and finally to the model).
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(
        &self,
        ctx: &Context,
        message: &Message,
        session: &mut Session,
    ) -> Result<HandlerResponse>;
}

/// Value threaded through the message pipeline: model input plus history.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageStage {
    pub content: Content,
    pub history: Vec<ChatRecord>,
}

/// Value threaded through the response pipeline: model output plus history.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseStage {
    pub response: String,
    pub history: Vec<ChatRecord>,
}

/// Transforms model input before the model call.
#[async_trait]
pub trait MessageMiddleware: Send + Sync {
    async fn process(
        &self,
        ctx: &Context,
        message: &Message,
        stage: MessageStage,
        session: &Session,
    ) -> Result<MessageStage>;
}

/// Transforms model output after the model call.
#[async_trait]
pub trait ResponseMiddleware: Send + Sync {
    async fn process(
        &self,
        ctx: &Context,
        stage: ResponseStage,
        session: &Session,
    ) -> Result<ResponseStage>;
}
