//! Graph mail endpoint paths

/// Whose mailbox requests address
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mailbox {
    /// The signed-in user (`/me`), for delegated tokens
    Me,
    /// A specific user (`/users/{address}`), for application tokens
    User(String),
}

impl Mailbox {
    fn prefix(&self) -> String {
        match self {
            Self::Me => "/me".to_string(),
            Self::User(address) => format!("/users/{}", address),
        }
    }
}

/// Well-known folder holding received mail
pub const INBOX: &str = "INBOX";

/// Resource paths relative to the Graph base URL
#[derive(Debug, Clone, Copy)]
pub(crate) enum Endpoint<'a> {
    FolderMessages { folder: &'a str },
    Message { id: &'a str },
    Send { id: &'a str },
    Move { id: &'a str },
    Attachments { id: &'a str },
    CreateUploadSession { id: &'a str },
}

impl Endpoint<'_> {
    pub(crate) fn path(&self, mailbox: &Mailbox) -> String {
        let prefix = mailbox.prefix();
        // Message ids are base64-like and may contain '/', '+' and '='
        match self {
            Self::FolderMessages { folder } => {
                format!("{}/mailFolders('{}')/messages", prefix, urlencoding::encode(folder))
            }
            Self::Message { id } => format!("{}/messages/{}", prefix, urlencoding::encode(id)),
            Self::Send { id } => format!("{}/messages/{}/send", prefix, urlencoding::encode(id)),
            Self::Move { id } => format!("{}/messages/{}/move", prefix, urlencoding::encode(id)),
            Self::Attachments { id } => {
                format!("{}/messages/{}/attachments", prefix, urlencoding::encode(id))
            }
            Self::CreateUploadSession { id } => format!(
                "{}/messages/{}/attachments/createUploadSession",
                prefix,
                urlencoding::encode(id)
            ),
        }
    }
}
