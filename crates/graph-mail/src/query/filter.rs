//! OData `$filter` expressions

use std::fmt;

/// Comparison operators usable in a filter clause
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EqualityOperator {
    Equals,
    NotEquals,
    Not,
    In,
    Has,
}

impl EqualityOperator {
    /// OData keyword for this operator
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Equals => "eq",
            Self::NotEquals => "ne",
            Self::Not => "not",
            Self::In => "in",
            Self::Has => "has",
        }
    }

    /// Parse the shorthand used in user-facing filters (`=`, `!=`, `!`, `in`, `has`)
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol.trim() {
            "=" | "eq" => Some(Self::Equals),
            "!=" | "ne" => Some(Self::NotEquals),
            "!" | "not" => Some(Self::Not),
            "in" => Some(Self::In),
            "has" => Some(Self::Has),
            _ => None,
        }
    }
}

impl fmt::Display for EqualityOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single `field op value` clause
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    field: String,
    operator: EqualityOperator,
    value: String,
}

impl Filter {
    /// Build a clause; `value` is inserted verbatim, so string literals must
    /// carry their own quotes (e.g. `"'Inbox'"`)
    pub fn new(field: impl Into<String>, operator: EqualityOperator, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }

    /// `field eq value`
    pub fn equals(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, EqualityOperator::Equals, value)
    }

    /// Messages that carry attachments
    pub fn has_attachments() -> Self {
        Self::equals("hasAttachments", "true")
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.field, self.operator, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_symbol() {
        assert_eq!(EqualityOperator::from_symbol("="), Some(EqualityOperator::Equals));
        assert_eq!(EqualityOperator::from_symbol("!="), Some(EqualityOperator::NotEquals));
        assert_eq!(EqualityOperator::from_symbol("!"), Some(EqualityOperator::Not));
        assert_eq!(EqualityOperator::from_symbol(" has "), Some(EqualityOperator::Has));
        assert_eq!(EqualityOperator::from_symbol("<>"), None);
    }

    #[test]
    fn test_filter_display() {
        assert_eq!(Filter::has_attachments().to_string(), "hasAttachments eq true");
        assert_eq!(
            Filter::new("importance", EqualityOperator::NotEquals, "'low'").to_string(),
            "importance ne 'low'"
        );
    }
}
