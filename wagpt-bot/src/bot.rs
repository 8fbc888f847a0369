//! [`WhatsappGptBot`]: routes each message through the handler chain and the model.

use std::sync::Arc;

use dashmap::DashMap;
use green_api_client::GreenApiClient;
use handler_chain::{HandlerChain, MessagePipeline, ResponsePipeline, Trigger};
use llm_client::{LlmClient, OpenAILlmClient};
use tracing::{error, info, instrument, warn};
use wagpt_core::{
    Bot, ChatRecord, Context, GptSettings, Handler, HandlerResponse, Inbox, Message, MessageKind,
    MessageMiddleware, MessageStage, ResponseMiddleware, ResponseStage, Result, Session,
    WagptError,
};

use crate::config::GptBotConfig;
use crate::history::cap_history;
use crate::processors::{MessageProcessor, ProcessorRegistry};
use crate::runner::ChatSender;
use crate::session::SessionStore;

/// Reply sent when the model call fails.
pub const MODEL_ERROR_REPLY: &str = "Sorry, I couldn't process your message. Please try again.";

/// WhatsApp GPT bot: handlers, processors, middleware and per-chat sessions.
///
/// Registration methods take `&mut self`; wrap the bot in an [`Arc`] before
/// [`WhatsappGptBot::run`].
pub struct WhatsappGptBot {
    pub(crate) ctx: Context,
    pub(crate) inbox: Arc<dyn Inbox>,
    model: Arc<dyn LlmClient>,
    sessions: SessionStore,
    handlers: HandlerChain,
    processors: ProcessorRegistry,
    message_pipeline: MessagePipeline,
    response_pipeline: ResponsePipeline,
    /// Queue of each chat's worker, keyed by chat id.
    pub(crate) chat_workers: DashMap<String, ChatSender>,
}

impl WhatsappGptBot {
    pub fn new(
        settings: GptSettings,
        bot: Arc<dyn Bot>,
        inbox: Arc<dyn Inbox>,
        model: Arc<dyn LlmClient>,
    ) -> Self {
        Self {
            ctx: Context::new(settings, bot),
            inbox,
            model,
            sessions: SessionStore::new(),
            handlers: HandlerChain::new(),
            processors: ProcessorRegistry::with_defaults(),
            message_pipeline: MessagePipeline::new(),
            response_pipeline: ResponsePipeline::new(),
            chat_workers: DashMap::new(),
        }
    }

    /// Bot over GREEN-API and OpenAI.
    pub fn from_config(config: GptBotConfig) -> Result<Self> {
        config.validate()?;
        let green_api = Arc::new(GreenApiClient::new(config.green_api));
        let model = match config.openai_base_url {
            Some(base_url) => OpenAILlmClient::with_base_url(config.openai_api_key, base_url),
            None => OpenAILlmClient::new(config.openai_api_key),
        }
        .with_model(config.settings.model.clone());
        info!(model = %model.model(), "Model client ready");

        Ok(Self::new(
            config.settings,
            green_api.clone(),
            green_api,
            Arc::new(model),
        ))
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    pub fn settings(&self) -> &GptSettings {
        self.ctx.settings()
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Handler for text messages equal to `text` (after trimming).
    pub fn on_text(&mut self, text: impl Into<String>, handler: Arc<dyn Handler>) -> &mut Self {
        self.handlers.add_handler(Trigger::exact(text), handler);
        self
    }

    /// Handler for text messages matching `pattern`.
    pub fn on_regex(&mut self, pattern: &str, handler: Arc<dyn Handler>) -> Result<&mut Self> {
        let trigger = Trigger::regex(pattern)
            .map_err(|e| WagptError::Config(format!("invalid pattern {:?}: {}", pattern, e)))?;
        self.handlers.add_handler(trigger, handler);
        Ok(self)
    }

    /// Handler for every message of `kind`.
    pub fn on_type(&mut self, kind: MessageKind, handler: Arc<dyn Handler>) -> &mut Self {
        self.handlers.add_handler(Trigger::kind(kind), handler);
        self
    }

    pub fn processor(&self, kind: MessageKind) -> Option<Arc<dyn MessageProcessor>> {
        self.processors.get(kind)
    }

    /// Replaces the processor of `kind` with one built around the current processor.
    pub fn replace_processor<F>(&mut self, kind: MessageKind, build: F) -> &mut Self
    where
        F: FnOnce(Arc<dyn MessageProcessor>) -> Arc<dyn MessageProcessor>,
    {
        self.processors.wrap(kind, build);
        self
    }

    pub fn add_message_middleware(&mut self, middleware: Arc<dyn MessageMiddleware>) -> &mut Self {
        self.message_pipeline.add(middleware);
        self
    }

    pub fn add_response_middleware(
        &mut self,
        middleware: Arc<dyn ResponseMiddleware>,
    ) -> &mut Self {
        self.response_pipeline.add(middleware);
        self
    }

    /// Processes one message under its chat's session lock.
    ///
    /// With `handlers_first`, handlers run first and the model only sees messages no handler
    /// took. Otherwise the model replies first and handlers run afterwards.
    #[instrument(skip_all, fields(chat_id = %message.chat_id, message_id = %message.id, kind = %message.kind()))]
    pub async fn process_message(&self, message: Message) -> Result<()> {
        let handle = self.sessions.get_or_create(&message.chat_id).await;
        let mut session = handle.lock().await;
        session.touch();

        if self.ctx.settings().handlers_first {
            let response = self.handlers.handle(&self.ctx, &message, &mut session).await?;
            if response != HandlerResponse::Continue {
                return Ok(());
            }
            self.reply_with_model(&message, &mut session).await
        } else {
            self.reply_with_model(&message, &mut session).await?;
            self.handlers
                .handle(&self.ctx, &message, &mut session)
                .await
                .map(|_| ())
        }
    }

    async fn reply_with_model(&self, message: &Message, session: &mut Session) -> Result<()> {
        let kind = message.kind();
        let Some(processor) = self.processors.get(kind) else {
            warn!(kind = %kind, "No processor registered, message ignored");
            return Ok(());
        };
        let content = match processor
            .process(&self.ctx, message, self.model.as_ref())
            .await
        {
            Ok(content) => content,
            Err(WagptError::Handler(reason)) => {
                info!(kind = %kind, reason = %reason, "Nothing to send to the model");
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        let settings = self.ctx.settings();
        let history = session
            .history
            .clone()
            .unwrap_or_else(|| vec![ChatRecord::system(settings.system_message.clone())]);

        info!("step: message middleware");
        let stage = self
            .message_pipeline
            .run(&self.ctx, message, MessageStage { content, history }, session)
            .await?;

        let mut history = stage.history;
        history.push(ChatRecord::user(stage.content));
        cap_history(&mut history, settings.max_history_length);

        info!(records = history.len(), "step: model completion");
        let response = match self.model.complete(&history, settings.temperature).await {
            Ok(response) => response,
            Err(e) => {
                error!(error = %e, "Model completion failed");
                session.history = Some(history);
                return self.ctx.send_text(&message.chat_id, MODEL_ERROR_REPLY).await;
            }
        };

        info!("step: response middleware");
        let stage = self
            .response_pipeline
            .run(&self.ctx, ResponseStage { response, history }, session)
            .await?;

        let mut history = stage.history;
        history.push(ChatRecord::assistant(stage.response.clone()));
        cap_history(&mut history, settings.max_history_length);
        session.history = Some(history);

        self.ctx.send_text(&message.chat_id, &stage.response).await
    }
}
