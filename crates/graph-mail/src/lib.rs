//! Graph mail crate - Microsoft Graph mail client
//!
//! This crate provides:
//! - Outgoing message and attachment models
//! - OData query building for message listings
//! - A Graph client for listing, creating, sending and moving messages
//! - Large attachment uploads through chunked upload sessions
//!
//! HTTP is synchronous (ureq) so the crate stays executor-agnostic.

pub mod config;
pub mod graph;
pub mod models;
pub mod query;
pub mod upload;

pub use config::GraphSettings;
pub use graph::{AttachOutcome, GraphClient, INBOX, Mailbox, StaticToken, TokenProvider};
pub use models::{
    EmailAddress, FileAttachment, Importance, MessageError, OutgoingMessage, Recipient,
};
pub use query::{EmailParams, EqualityOperator, Filter, MessageQuery};
pub use upload::{
    ChunkedUploader, LogObserver, MIN_UPLOAD_SESSION_SIZE, UPLOAD_CHUNK_SIZE, UploadError,
    UploadObserver, UploadOptions, UploadReport, UploadSession, UploadSource, UploadTransport,
    UreqTransport, check_inline_size, check_session_size,
};
