//! Error types for the PMIS model
//!
//! Only textual parsing can fail at this layer. Numeric inputs are never
//! rejected: out-of-range percentages are clamped by [`crate::Percent`].

/// Failure to parse a model value from its textual form
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// Unknown enumeration value
    #[error("unknown {kind} '{value}'")]
    UnknownVariant {
        /// Name of the enumeration
        kind: &'static str,
        /// Rejected input
        value: String,
    },

    /// Node reference not of the form `category:id`
    #[error("invalid node reference '{0}', expected <category>:<id>")]
    InvalidNodeRef(String),

    /// Fiscal year not of the form `YYYY-YYYY` with consecutive years
    #[error("invalid fiscal year '{0}', expected YYYY-YYYY")]
    InvalidFiscalYear(String),

    /// Fiscal quarter outside 1..=4
    #[error("invalid fiscal quarter '{0}', expected q1..q4")]
    InvalidQuarter(String),

    /// Calendar date that does not exist
    #[error("invalid date '{0}'")]
    InvalidDate(String),
}

impl ParseError {
    /// Construct an unknown-variant error
    #[inline]
    #[must_use]
    pub fn unknown(kind: &'static str, value: impl Into<String>) -> Self {
        Self::UnknownVariant {
            kind,
            value: value.into(),
        }
    }
}
