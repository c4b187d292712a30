//! Bearer token supply for Graph requests
//!
//! Token acquisition (authorization code, client credentials, caching) lives
//! outside this crate. The client only asks a `TokenProvider` for a valid
//! access token before every request.

use anyhow::{Result, bail};

/// Source of OAuth2 access tokens for Microsoft Graph
pub trait TokenProvider: Send + Sync {
    /// Return a currently valid access token
    fn access_token(&self) -> Result<String>;
}

/// A fixed, externally obtained access token
pub struct StaticToken {
    token: String,
}

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl TokenProvider for StaticToken {
    fn access_token(&self) -> Result<String> {
        if self.token.trim().is_empty() {
            bail!("No access token configured");
        }
        Ok(self.token.clone())
    }
}

/// Any closure returning a token can act as a provider
impl<F> TokenProvider for F
where
    F: Fn() -> Result<String> + Send + Sync,
{
    fn access_token(&self) -> Result<String> {
        self()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_token() {
        assert_eq!(StaticToken::new("abc").access_token().unwrap(), "abc");
        assert!(StaticToken::new("  ").access_token().is_err());
    }

    #[test]
    fn test_closure_provider() {
        let provider = || -> Result<String> { Ok("from-cache".to_string()) };
        assert_eq!(provider.access_token().unwrap(), "from-cache");
    }
}
