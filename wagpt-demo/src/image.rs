//! Image processor that steers the model toward suggesting a vision-capable model.

use std::sync::Arc;

use async_trait::async_trait;
use wagpt_bot::{LlmClient, MessageProcessor};
use wagpt_core::{Content, Context, Message, Result};

pub const IMAGE_NOTE: &str = "[The user sent an image";
pub const IMAGE_REDIRECT: &str = "[The user sent an image. Tell them that you are not the model \
they should be using and they should consider switching";

/// Rewrites the first image note of textual content; structured content is returned as is.
pub fn redirect_image_note(content: Content) -> Content {
    match content {
        Content::Text(text) => Content::Text(text.replacen(IMAGE_NOTE, IMAGE_REDIRECT, 1)),
        parts => parts,
    }
}

/// Wraps the default image processor.
pub struct EnhancedImageProcessor {
    inner: Arc<dyn MessageProcessor>,
}

impl EnhancedImageProcessor {
    pub fn new(inner: Arc<dyn MessageProcessor>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl MessageProcessor for EnhancedImageProcessor {
    async fn process(&self, ctx: &Context, message: &Message, model: &dyn LlmClient) -> Result<Content> {
        let content = self.inner.process(ctx, message, model).await?;
        Ok(redirect_image_note(content))
    }
}
