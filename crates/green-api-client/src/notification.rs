//! Adapters from GREEN-API notification bodies to [`wagpt_core::Message`].
//! Depends only on the webhook JSON shape and core type definitions.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use wagpt_core::{Contact, Location, Media, Message, Payload, Sender};

/// Webhook type of incoming chat messages; every other type is ignored by the bot.
pub const INCOMING_MESSAGE_RECEIVED: &str = "incomingMessageReceived";

/// Raw queue entry returned by `receiveNotification`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawNotification {
    pub receipt_id: u64,
    pub body: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WebhookBody {
    type_webhook: String,
    id_message: Option<String>,
    timestamp: Option<i64>,
    sender_data: Option<SenderData>,
    message_data: Option<MessageData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SenderData {
    chat_id: String,
    sender: Option<String>,
    sender_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MessageData {
    type_message: String,
    text_message_data: Option<TextMessageData>,
    extended_text_message_data: Option<ExtendedTextMessageData>,
    file_message_data: Option<FileMessageData>,
    location_message_data: Option<LocationMessageData>,
    contact_message_data: Option<ContactMessageData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TextMessageData {
    text_message: String,
}

#[derive(Debug, Deserialize)]
struct ExtendedTextMessageData {
    text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileMessageData {
    download_url: Option<String>,
    caption: Option<String>,
    file_name: Option<String>,
    mime_type: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LocationMessageData {
    name_location: Option<String>,
    address: Option<String>,
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContactMessageData {
    display_name: String,
    vcard: Option<String>,
}

impl From<FileMessageData> for Media {
    fn from(data: FileMessageData) -> Self {
        Media {
            download_url: data.download_url,
            file_name: data.file_name,
            mime_type: data.mime_type,
            caption: data.caption.filter(|c| !c.is_empty()),
        }
    }
}

/// Converts a notification body into a core message.
///
/// Returns `Ok(None)` for webhook types other than incoming messages and for bodies without
/// sender or message data; `Err` when the body does not match the webhook shape at all.
pub fn to_message(body: &Value) -> Result<Option<Message>, serde_json::Error> {
    let body: WebhookBody = serde_json::from_value(body.clone())?;
    if body.type_webhook != INCOMING_MESSAGE_RECEIVED {
        return Ok(None);
    }
    let (Some(sender_data), Some(message_data)) = (body.sender_data, body.message_data) else {
        return Ok(None);
    };

    let (text, payload) = convert_payload(message_data);
    let created_at = body
        .timestamp
        .and_then(|ts| DateTime::from_timestamp(ts, 0))
        .unwrap_or_else(Utc::now);

    Ok(Some(Message {
        id: body.id_message.unwrap_or_default(),
        sender: Sender {
            id: sender_data
                .sender
                .unwrap_or_else(|| sender_data.chat_id.clone()),
            name: sender_data.sender_name.filter(|n| !n.is_empty()),
        },
        chat_id: sender_data.chat_id,
        text,
        payload,
        created_at,
    }))
}

fn convert_payload(data: MessageData) -> (Option<String>, Payload) {
    let type_message = data.type_message;
    match type_message.as_str() {
        "textMessage" => (data.text_message_data.map(|d| d.text_message), Payload::Text),
        "extendedTextMessage" | "quotedMessage" => (
            data.extended_text_message_data.map(|d| d.text),
            Payload::Text,
        ),
        "imageMessage" | "audioMessage" | "documentMessage" => {
            let Some(file) = data.file_message_data else {
                return (None, Payload::Unsupported { type_message });
            };
            let media = Media::from(file);
            let caption = media.caption.clone();
            let payload = match type_message.as_str() {
                "imageMessage" => Payload::Image(media),
                "audioMessage" => Payload::Audio(media),
                _ => Payload::Document(media),
            };
            (caption, payload)
        }
        "locationMessage" => match data.location_message_data {
            Some(loc) => (
                None,
                Payload::Location(Location {
                    latitude: loc.latitude,
                    longitude: loc.longitude,
                    name: loc.name_location.filter(|n| !n.is_empty()),
                    address: loc.address.filter(|a| !a.is_empty()),
                }),
            ),
            None => (None, Payload::Unsupported { type_message }),
        },
        "contactMessage" => match data.contact_message_data {
            Some(contact) => (
                None,
                Payload::Contact(Contact {
                    display_name: contact.display_name,
                    vcard: contact.vcard,
                }),
            ),
            None => (None, Payload::Unsupported { type_message }),
        },
        _ => (None, Payload::Unsupported { type_message }),
    }
}
