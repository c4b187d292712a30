//! Outgoing message model and builder

use serde::{Deserialize, Serialize};

use super::FileAttachment;

/// Message importance as understood by Graph
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    Low,
    #[default]
    Normal,
    High,
}

/// Format of the message body
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyContentType {
    #[default]
    Html,
    Text,
}

/// An email address with optional display name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailAddress {
    /// Email address (e.g., "jane@example.com")
    pub address: String,
    /// Display name (e.g., "Jane Doe")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl EmailAddress {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            name: None,
        }
    }

    pub fn with_name(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            name: Some(name.into()),
        }
    }
}

/// Graph `recipient` resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipient {
    pub email_address: EmailAddress,
}

impl From<EmailAddress> for Recipient {
    fn from(email_address: EmailAddress) -> Self {
        Self { email_address }
    }
}

/// Graph `itemBody` resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemBody {
    pub content_type: BodyContentType,
    pub content: String,
}

/// Validation failures when building an outgoing message
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum MessageError {
    #[error("message body content must be set")]
    MissingContent,
    #[error("message needs at least one recipient")]
    NoRecipients,
}

/// A validated message ready to be created as a draft
///
/// Built once through [`OutgoingMessage::builder`] and never mutated, so the
/// same value can be posted repeatedly without cross-request leakage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutgoingMessage {
    subject: String,
    importance: Importance,
    body: ItemBody,
    to_recipients: Vec<Recipient>,
    attachments: Vec<FileAttachment>,
}

impl OutgoingMessage {
    pub fn builder() -> OutgoingMessageBuilder {
        OutgoingMessageBuilder::default()
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn importance(&self) -> Importance {
        self.importance
    }

    pub fn body(&self) -> &ItemBody {
        &self.body
    }

    pub fn to_recipients(&self) -> &[Recipient] {
        &self.to_recipients
    }

    pub fn attachments(&self) -> &[FileAttachment] {
        &self.attachments
    }
}

/// Builder for [`OutgoingMessage`]
#[derive(Debug, Clone, Default)]
pub struct OutgoingMessageBuilder {
    subject: String,
    importance: Importance,
    content_type: BodyContentType,
    content: String,
    to: Vec<Recipient>,
    attachments: Vec<FileAttachment>,
}

impl OutgoingMessageBuilder {
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    pub fn importance(mut self, importance: Importance) -> Self {
        self.importance = importance;
        self
    }

    /// Set an HTML body
    pub fn html_body(mut self, content: impl Into<String>) -> Self {
        self.content_type = BodyContentType::Html;
        self.content = content.into();
        self
    }

    /// Set a plain text body
    pub fn text_body(mut self, content: impl Into<String>) -> Self {
        self.content_type = BodyContentType::Text;
        self.content = content.into();
        self
    }

    pub fn recipient(mut self, address: impl Into<EmailAddress>) -> Self {
        self.to.push(Recipient::from(address.into()));
        self
    }

    /// Add an inline attachment (already size-checked on construction)
    pub fn attachment(mut self, attachment: FileAttachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    pub fn build(self) -> Result<OutgoingMessage, MessageError> {
        if self.content.is_empty() {
            return Err(MessageError::MissingContent);
        }
        if self.to.is_empty() {
            return Err(MessageError::NoRecipients);
        }

        Ok(OutgoingMessage {
            subject: self.subject,
            importance: self.importance,
            body: ItemBody {
                content_type: self.content_type,
                content: self.content,
            },
            to_recipients: self.to,
            attachments: self.attachments,
        })
    }
}

impl From<&str> for EmailAddress {
    fn from(address: &str) -> Self {
        Self::new(address)
    }
}

impl From<String> for EmailAddress {
    fn from(address: String) -> Self {
        Self::new(address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_build_serializes_graph_shape() {
        let message = OutgoingMessage::builder()
            .subject("Quarterly report")
            .importance(Importance::High)
            .text_body("See attached")
            .recipient("ops@example.com")
            .build()
            .unwrap();

        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(
            value,
            json!({
                "subject": "Quarterly report",
                "importance": "high",
                "body": { "contentType": "text", "content": "See attached" },
                "toRecipients": [{ "emailAddress": { "address": "ops@example.com" } }],
                "attachments": []
            })
        );
    }

    #[test]
    fn test_defaults_are_html_and_normal() {
        let message = OutgoingMessage::builder()
            .html_body("<p>hi</p>")
            .recipient(EmailAddress::with_name("Jane", "jane@example.com"))
            .build()
            .unwrap();

        assert_eq!(message.importance(), Importance::Normal);
        assert_eq!(message.body().content_type, BodyContentType::Html);
        assert_eq!(message.subject(), "");
        assert_eq!(message.to_recipients()[0].email_address.name.as_deref(), Some("Jane"));
    }

    #[test]
    fn test_missing_content() {
        let result = OutgoingMessage::builder().recipient("a@example.com").build();
        assert_eq!(result.unwrap_err(), MessageError::MissingContent);
    }

    #[test]
    fn test_missing_recipients() {
        let result = OutgoingMessage::builder().text_body("hello").build();
        assert_eq!(result.unwrap_err(), MessageError::NoRecipients);
    }

    #[test]
    fn test_builder_reuse_does_not_leak() {
        let base = OutgoingMessage::builder().text_body("hello").recipient("a@example.com");
        let first = base.clone().build().unwrap();
        let second = base.recipient("b@example.com").build().unwrap();

        assert_eq!(first.to_recipients().len(), 1);
        assert_eq!(second.to_recipients().len(), 2);
    }
}
