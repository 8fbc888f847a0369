//! # wagpt-core
//!
//! Core types and traits for the WhatsApp GPT bot: [`Message`], [`Session`], [`ChatRecord`],
//! the [`Bot`]/[`Inbox`] transport traits, the [`Handler`] and middleware traits, the explicit
//! [`Context`] handed to both, and tracing initialisation. Transport-agnostic.

pub mod bot;
pub mod context;
pub mod error;
pub mod handler;
pub mod logger;
pub mod types;

pub use bot::{Bot, Inbox, Notification};
pub use context::{Context, GptSettings};
pub use error::{HandlerError, Result, WagptError};
pub use handler::{Handler, MessageMiddleware, MessageStage, ResponseMiddleware, ResponseStage};
pub use logger::init_tracing;
pub use types::{
    ChatRecord, Contact, Content, ContentPart, HandlerResponse, ImageUrl, Location, Media,
    Message, MessageKind, Payload, Role, Sender, Session,
};
