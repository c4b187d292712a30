//! Domain models for outgoing mail

mod attachment;
mod message;

pub use attachment::{FileAttachment, content_type_for_path};
pub use message::{
    BodyContentType, EmailAddress, Importance, ItemBody, MessageError, OutgoingMessage,
    OutgoingMessageBuilder, Recipient,
};
