//! OData query options for message collections

use super::Filter;

/// Fields requested when the caller does not choose any
pub const DEFAULT_SELECT: [&str; 3] = ["id", "hasAttachments", "from"];

/// Options shaping a mailbox listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmailParams {
    /// Only return messages that have attachments
    pub with_attachments: bool,
    /// Expand the attachments collection inline
    pub include_attachments: bool,
}

/// Immutable set of OData query options (`$select`, `$filter`, `$expand`, `$top`)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageQuery {
    select: Vec<String>,
    filters: Vec<Filter>,
    expand: Vec<String>,
    top: Option<u32>,
}

impl MessageQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Query selecting `DEFAULT_SELECT` with `params` applied
    pub fn from_params(params: &EmailParams) -> Self {
        let mut query = Self::new().select(DEFAULT_SELECT);
        if params.with_attachments {
            query = query.filter(Filter::has_attachments());
        }
        if params.include_attachments {
            query = query.expand("attachments");
        }
        query
    }

    pub fn select<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.select.extend(fields.into_iter().map(Into::into));
        self
    }

    /// Add a filter clause; clauses are joined with `and`
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn expand(mut self, relation: impl Into<String>) -> Self {
        self.expand.push(relation.into());
        self
    }

    /// Page size; Graph caps this server-side
    pub fn top(mut self, top: u32) -> Self {
        self.top = Some(top);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.select.is_empty() && self.filters.is_empty() && self.expand.is_empty() && self.top.is_none()
    }

    /// Render as a query string without the leading `?`
    ///
    /// Values are percent-encoded; `$`-prefixed option names are not.
    pub fn to_query_string(&self) -> String {
        let mut parts = Vec::new();

        if !self.select.is_empty() {
            parts.push(format!("$select={}", urlencoding::encode(&self.select.join(","))));
        }

        if !self.filters.is_empty() {
            let clauses: Vec<String> = self.filters.iter().map(|f| f.to_string()).collect();
            parts.push(format!("$filter={}", urlencoding::encode(&clauses.join(" and "))));
        }

        if !self.expand.is_empty() {
            parts.push(format!("$expand={}", urlencoding::encode(&self.expand.join(","))));
        }

        if let Some(top) = self.top {
            parts.push(format!("$top={}", top));
        }

        parts.join("&")
    }

    /// Append this query to an endpoint path
    pub fn apply_to(&self, endpoint: &str) -> String {
        if self.is_empty() {
            endpoint.to_string()
        } else {
            format!("{}?{}", endpoint, self.to_query_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::EqualityOperator;

    #[test]
    fn test_empty_query() {
        let query = MessageQuery::new();
        assert_eq!(query.to_query_string(), "");
        assert_eq!(query.apply_to("/me/messages"), "/me/messages");
    }

    #[test]
    fn test_select_only() {
        let query = MessageQuery::new().select(["id", "subject"]);
        assert_eq!(query.to_query_string(), "$select=id%2Csubject");
    }

    #[test]
    fn test_filters_joined_with_and() {
        let query = MessageQuery::new()
            .filter(Filter::has_attachments())
            .filter(Filter::new("isRead", EqualityOperator::Equals, "false"));
        assert_eq!(
            query.to_query_string(),
            "$filter=hasAttachments%20eq%20true%20and%20isRead%20eq%20false"
        );
    }

    #[test]
    fn test_from_params() {
        let params = EmailParams {
            with_attachments: true,
            include_attachments: true,
        };
        let query = MessageQuery::from_params(&params).top(50);
        assert_eq!(
            query.to_query_string(),
            "$select=id%2ChasAttachments%2Cfrom&$filter=hasAttachments%20eq%20true&$expand=attachments&$top=50"
        );
    }

    #[test]
    fn test_from_default_params_selects_defaults_only() {
        let query = MessageQuery::from_params(&EmailParams::default());
        assert_eq!(query.apply_to("/me/messages"), "/me/messages?$select=id%2ChasAttachments%2Cfrom");
    }
}
