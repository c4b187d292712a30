//! Microsoft Graph mail HTTP client
//!
//! Provides methods for listing, creating, sending and attaching to messages.
//! Uses synchronous HTTP (ureq) to be executor-agnostic.

use anyhow::{Context, Result, bail};
use log::{debug, info};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use ureq::http::{Method, Response};
use ureq::Body;

use super::api::{
    AttachmentInfo, AttachmentItem, CreateUploadSessionRequest, GraphMessage, MessageUpdate,
    MessagesPage, MoveRequest,
};
use super::endpoints::{Endpoint, INBOX, Mailbox};
use super::TokenProvider;
use crate::config::GraphSettings;
use crate::models::{FileAttachment, Importance, OutgoingMessage};
use crate::query::{EmailParams, MessageQuery};
use crate::upload::{
    ChunkedUploader, MIN_UPLOAD_SESSION_SIZE, UploadError, UploadOptions, UploadReport,
    UploadSession, UploadSource, UploadTransport, UreqTransport, check_session_size,
};

/// How `attach_file` delivered an attachment
#[derive(Debug)]
pub enum AttachOutcome {
    /// Small file embedded with a single POST
    Inline(AttachmentInfo),
    /// Large file streamed through an upload session
    Session(UploadReport),
}

/// Graph mail client bound to one mailbox
pub struct GraphClient {
    auth: Arc<dyn TokenProvider>,
    mailbox: Mailbox,
    base_url: String,
    agent: ureq::Agent,
    transport: Arc<dyn UploadTransport>,
}

impl GraphClient {
    /// Graph v1.0 base URL
    pub const DEFAULT_BASE_URL: &'static str = "https://graph.microsoft.com/v1.0";

    /// Create a client with default base URL and timeouts
    pub fn new(auth: Arc<dyn TokenProvider>, mailbox: Mailbox) -> Self {
        Self {
            auth,
            mailbox,
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            agent: build_agent(UreqTransport::DEFAULT_TIMEOUT),
            transport: Arc::new(UreqTransport::new()),
        }
    }

    /// Create a client from loaded settings
    ///
    /// # Errors
    /// Fails if the settings carry no access token.
    pub fn from_settings(settings: &GraphSettings) -> Result<Self> {
        let token = settings
            .access_token
            .clone()
            .filter(|t| !t.trim().is_empty())
            .context("No access token configured")?;

        Ok(Self::new(Arc::new(super::StaticToken::new(token)), settings.mailbox())
            .with_base_url(&settings.base_url)
            .with_timeout(settings.timeout()))
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Bound every request (API calls and upload chunks) by `timeout`
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.agent = build_agent(timeout);
        self.transport = Arc::new(UreqTransport::with_timeout(timeout));
        self
    }

    /// Replace the transport used for upload session PUTs
    pub fn with_upload_transport(mut self, transport: Arc<dyn UploadTransport>) -> Self {
        self.transport = transport;
        self
    }

    pub fn mailbox(&self) -> &Mailbox {
        &self.mailbox
    }

    fn url(&self, endpoint: Endpoint<'_>) -> String {
        format!("{}{}", self.base_url, endpoint.path(&self.mailbox))
    }

    fn bearer(&self) -> Result<String> {
        let token = self
            .auth
            .access_token()
            .context("Failed to obtain Graph access token")?;
        Ok(format!("Bearer {}", token))
    }

    // === Listing ===

    /// Fetch the first page of messages in `folder`
    ///
    /// # Arguments
    /// * `folder` - Folder id or well-known name (e.g. `INBOX`)
    /// * `query` - OData options applied to the listing
    pub fn list_messages(&self, folder: &str, query: &MessageQuery) -> Result<MessagesPage> {
        let url = query.apply_to(&self.url(Endpoint::FolderMessages { folder }));
        info!("Retrieving mail w/ endpoint {}", url);
        self.get_json(&url, "list messages")
    }

    /// Fetch one page by absolute URL (typically an `@odata.nextLink`)
    pub fn next_page(&self, next_link: &str) -> Result<MessagesPage> {
        url::Url::parse(next_link)
            .with_context(|| format!("Invalid nextLink: {}", next_link))?;
        self.get_json(next_link, "list messages page")
    }

    /// Iterate over pages of messages in `folder`
    ///
    /// Pages are fetched lazily; iteration stops after the last page or the
    /// first error.
    pub fn pages(&self, folder: &str, query: &MessageQuery) -> MessagePages<'_> {
        MessagePages {
            client: self,
            next: Some(query.apply_to(&self.url(Endpoint::FolderMessages { folder }))),
        }
    }

    /// List ALL messages in `folder`, following `@odata.nextLink`
    ///
    /// # Arguments
    /// * `max_messages` - Optional cap on the total returned
    /// * `progress_callback` - Called with the running count after each page
    pub fn list_messages_all<F>(
        &self,
        folder: &str,
        query: &MessageQuery,
        max_messages: Option<usize>,
        mut progress_callback: F,
    ) -> Result<Vec<GraphMessage>>
    where
        F: FnMut(usize),
    {
        let mut all_messages = Vec::new();

        for page in self.pages(folder, query) {
            all_messages.extend(page?);
            progress_callback(all_messages.len());

            if let Some(max) = max_messages
                && all_messages.len() >= max
            {
                all_messages.truncate(max);
                break;
            }
        }

        Ok(all_messages)
    }

    /// All inbox messages, filtered and expanded per `params`
    pub fn get_emails(&self, params: &EmailParams) -> Result<Vec<GraphMessage>> {
        let query = MessageQuery::from_params(params);
        self.list_messages_all(INBOX, &query, None, |count| {
            debug!("Fetched {} messages", count);
        })
    }

    // === Message mutations ===

    /// Create a draft message in `folder`
    pub fn create_message(&self, folder: &str, message: &OutgoingMessage) -> Result<GraphMessage> {
        let url = self.url(Endpoint::FolderMessages { folder });
        let response = self.send_json(Method::POST, &url, message, "create message")?;
        read_json(response, "create message")
    }

    /// Send a previously created draft
    pub fn send_message(&self, id: &str) -> Result<()> {
        info!("Sending message {}", id);
        let url = self.url(Endpoint::Send { id });
        let response = self
            .agent
            .post(&url)
            .header("Authorization", &self.bearer()?)
            .send_empty()
            .context("Failed to send send-message request")?;
        check_status(response, "send message")?;
        Ok(())
    }

    pub fn mark_as_read(&self, id: &str) -> Result<GraphMessage> {
        let update = MessageUpdate {
            is_read: Some(true),
            ..Default::default()
        };
        self.update_message(id, &update, "mark as read")
    }

    pub fn mark_as_important(&self, id: &str) -> Result<GraphMessage> {
        let update = MessageUpdate {
            importance: Some(Importance::High),
            ..Default::default()
        };
        self.update_message(id, &update, "mark as important")
    }

    /// Move a message to another folder
    ///
    /// Returns the moved message, which has a new id.
    pub fn move_to_folder(&self, id: &str, folder_id: &str) -> Result<GraphMessage> {
        info!("Moving message {} to folder {}", id, folder_id);
        let url = self.url(Endpoint::Move { id });
        let body = MoveRequest {
            destination_id: folder_id,
        };
        let response = self.send_json(Method::POST, &url, &body, "move message")?;
        read_json(response, "move message")
    }

    fn update_message(&self, id: &str, update: &MessageUpdate, what: &str) -> Result<GraphMessage> {
        let url = self.url(Endpoint::Message { id });
        let response = self.send_json(Method::PATCH, &url, update, what)?;
        read_json(response, what)
    }

    // === Attachments ===

    /// Attach a small file inline with one request
    pub fn add_attachment(&self, message_id: &str, attachment: &FileAttachment) -> Result<AttachmentInfo> {
        info!(
            "Attaching {} ({} bytes) to message {}",
            attachment.name(),
            attachment.size(),
            message_id
        );
        let url = self.url(Endpoint::Attachments { id: message_id });
        let response = self.send_json(Method::POST, &url, attachment, "add attachment")?;
        read_json(response, "add attachment")
    }

    /// Create an upload session for a large attachment
    ///
    /// # Errors
    /// - `AttachmentTooSmallForSession` if `size` is at or below the 3 MiB threshold
    /// - `AttachmentUnreadable` if `size` is zero
    /// - `Transport` if the request fails
    pub fn create_upload_session(
        &self,
        message_id: &str,
        name: &str,
        size: u64,
    ) -> Result<UploadSession, UploadError> {
        check_session_size(size)?;

        let url = self.url(Endpoint::CreateUploadSession { id: message_id });
        let body = CreateUploadSessionRequest {
            attachment_item: AttachmentItem {
                attachment_type: "file",
                name,
                size,
                content_type: None,
            },
        };

        let response = self.send_json(Method::POST, &url, &body, "create upload session")?;
        let mut session: UploadSession = read_json(response, "create upload session")?;
        session.total_size = size;

        debug!(
            "Created upload session for {} ({} bytes), expires {:?}",
            name, size, session.expiration_date_time
        );
        Ok(session)
    }

    /// Stream `source` into an existing upload session
    pub fn upload_to_session<R: Read>(
        &self,
        session: &UploadSession,
        source: UploadSource<R>,
        options: UploadOptions,
    ) -> Result<UploadReport, UploadError> {
        ChunkedUploader::new(self.transport.clone())
            .with_options(options)
            .upload(session, source)
    }

    /// Open `path`, create a session sized to it and upload it
    pub fn upload_large_attachment(
        &self,
        message_id: &str,
        path: &Path,
        options: UploadOptions,
    ) -> Result<UploadReport, UploadError> {
        let source = UploadSource::from_path(path)?;
        let session = self.create_upload_session(message_id, source.name(), source.len())?;
        self.upload_to_session(&session, source, options)
    }

    /// Attach a file, inline when small enough and through a session otherwise
    pub fn attach_file(
        &self,
        message_id: &str,
        path: &Path,
        options: UploadOptions,
    ) -> Result<AttachOutcome, UploadError> {
        let mut source = UploadSource::from_path(path)?;

        // Inline content comes from the same handle the size was taken from
        if source.len() <= MIN_UPLOAD_SESSION_SIZE {
            let bytes = source.read_all()?;
            let attachment = FileAttachment::from_bytes(source.name(), source.mime_type(), bytes)?;
            let info = self.add_attachment(message_id, &attachment)?;
            return Ok(AttachOutcome::Inline(info));
        }

        let session = self.create_upload_session(message_id, source.name(), source.len())?;
        let report = self.upload_to_session(&session, source, options)?;
        Ok(AttachOutcome::Session(report))
    }

    // === HTTP helpers ===

    fn get_json<T: DeserializeOwned>(&self, url: &str, what: &str) -> Result<T> {
        let response = self
            .agent
            .get(url)
            .header("Authorization", &self.bearer()?)
            .header("Accept", "application/json")
            .call()
            .with_context(|| format!("Failed to send {} request", what))?;
        read_json(response, what)
    }

    fn send_json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: &str,
        body: &B,
        what: &str,
    ) -> Result<Response<Body>> {
        let request = match method {
            Method::POST => self.agent.post(url),
            Method::PATCH => self.agent.patch(url),
            other => bail!("Unsupported method {} for {} request", other, what),
        };

        let response = request
            .header("Authorization", &self.bearer()?)
            .header("Accept", "application/json")
            .send_json(body)
            .with_context(|| format!("Failed to send {} request", what))?;
        check_status(response, what)
    }
}

/// Lazy iterator over message collection pages
pub struct MessagePages<'a> {
    client: &'a GraphClient,
    next: Option<String>,
}

impl Iterator for MessagePages<'_> {
    type Item = Result<Vec<GraphMessage>>;

    fn next(&mut self) -> Option<Self::Item> {
        let url = self.next.take()?;
        match self.client.next_page(&url) {
            Ok(page) => {
                self.next = page.next_link;
                Some(Ok(page.value))
            }
            Err(e) => Some(Err(e)),
        }
    }
}

fn build_agent(timeout: Duration) -> ureq::Agent {
    ureq::Agent::config_builder()
        .http_status_as_error(false)
        .timeout_global(Some(timeout))
        .build()
        .into()
}

/// Turn a non-2xx response into an error carrying a body snippet
fn check_status(mut response: Response<Body>, what: &str) -> Result<Response<Body>> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.body_mut().read_to_string().unwrap_or_default();
    bail!(
        "Graph {} request failed: status={} body={}",
        what,
        status.as_u16(),
        crate::upload::body_snippet(body.as_bytes())
    )
}

fn read_json<T: DeserializeOwned>(response: Response<Body>, what: &str) -> Result<T> {
    let mut response = check_status(response, what)?;
    response
        .body_mut()
        .read_json()
        .with_context(|| format!("Failed to parse {} response", what))
}
