//! Microsoft Graph mail integration
//!
//! This module provides:
//! - The `TokenProvider` seam for bearer tokens
//! - Endpoint paths for `/me` and `/users/{address}` mailboxes
//! - `GraphClient` for listing, creating, sending and attaching

mod auth;
mod client;
mod endpoints;

pub use auth::{StaticToken, TokenProvider};
pub use client::{AttachOutcome, GraphClient, MessagePages};
pub use endpoints::{INBOX, Mailbox};

/// Graph API request/response types
pub mod api {
    use serde::{Deserialize, Serialize};

    use crate::models::{BodyContentType, Importance, Recipient};

    /// One page of a message collection
    #[derive(Debug, Deserialize)]
    pub struct MessagesPage {
        #[serde(default)]
        pub value: Vec<GraphMessage>,
        #[serde(rename = "@odata.nextLink")]
        pub next_link: Option<String>,
    }

    /// Message as returned by Graph (fields depend on `$select`)
    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct GraphMessage {
        pub id: String,
        pub subject: Option<String>,
        pub from: Option<Recipient>,
        pub to_recipients: Option<Vec<Recipient>>,
        pub body_preview: Option<String>,
        pub body: Option<MessageBody>,
        pub importance: Option<Importance>,
        pub is_read: Option<bool>,
        pub has_attachments: Option<bool>,
        pub received_date_time: Option<String>,
        pub parent_folder_id: Option<String>,
        pub attachments: Option<Vec<AttachmentInfo>>,
    }

    /// Message body content
    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct MessageBody {
        pub content_type: Option<BodyContentType>,
        pub content: Option<String>,
    }

    /// Attachment metadata (content omitted)
    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct AttachmentInfo {
        pub id: String,
        pub name: Option<String>,
        pub content_type: Option<String>,
        pub size: Option<u64>,
        pub is_inline: Option<bool>,
    }

    /// Body of `createUploadSession`
    #[derive(Debug, Serialize)]
    pub struct CreateUploadSessionRequest<'a> {
        #[serde(rename = "AttachmentItem")]
        pub attachment_item: AttachmentItem<'a>,
    }

    /// Describes the file an upload session is created for
    #[derive(Debug, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct AttachmentItem<'a> {
        pub attachment_type: &'static str,
        pub name: &'a str,
        pub size: u64,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub content_type: Option<&'a str>,
    }

    /// Body of the `move` action
    #[derive(Debug, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct MoveRequest<'a> {
        pub destination_id: &'a str,
    }

    /// PATCH body for flag updates
    #[derive(Debug, Default, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct MessageUpdate {
        #[serde(skip_serializing_if = "Option::is_none")]
        pub is_read: Option<bool>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub importance: Option<Importance>,
    }
}

#[cfg(test)]
mod tests {
    use super::api::*;
    use crate::models::Importance;

    #[test]
    fn test_parse_messages_page() {
        let json = r#"{
            "@odata.context": "https://graph.microsoft.com/v1.0/$metadata#users('a')/messages",
            "value": [
                {
                    "id": "AAMkAD1",
                    "hasAttachments": true,
                    "from": { "emailAddress": { "name": "Jane", "address": "jane@example.com" } }
                },
                { "id": "AAMkAD2", "hasAttachments": false, "importance": "high" }
            ],
            "@odata.nextLink": "https://graph.microsoft.com/v1.0/users/a/messages?$skip=10"
        }"#;

        let page: MessagesPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.value.len(), 2);
        assert_eq!(page.value[0].has_attachments, Some(true));
        assert_eq!(
            page.value[0].from.as_ref().unwrap().email_address.address,
            "jane@example.com"
        );
        assert_eq!(page.value[1].importance, Some(Importance::High));
        assert!(page.next_link.unwrap().contains("$skip=10"));
    }

    #[test]
    fn test_last_page_has_no_next_link() {
        let page: MessagesPage = serde_json::from_str(r#"{ "value": [] }"#).unwrap();
        assert!(page.value.is_empty());
        assert!(page.next_link.is_none());
    }

    #[test]
    fn test_create_upload_session_body() {
        let body = CreateUploadSessionRequest {
            attachment_item: AttachmentItem {
                attachment_type: "file",
                name: "report.pdf",
                size: 10_485_760,
                content_type: None,
            },
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({
                "AttachmentItem": { "attachmentType": "file", "name": "report.pdf", "size": 10485760 }
            })
        );
    }

    #[test]
    fn test_message_update_skips_unset_fields() {
        let update = MessageUpdate {
            is_read: Some(true),
            ..Default::default()
        };
        assert_eq!(serde_json::to_string(&update).unwrap(), r#"{"isRead":true}"#);
    }
}
