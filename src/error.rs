//! Error types for the join-and-render core.
//!
//! Only conditions that stop a render pass are errors. Partial data coverage
//! (missing rows, missing names, duplicate rows, out-of-range values) is
//! recorded as a [`crate::join::JoinAnomaly`] instead.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChoroplethError {
    /// The data provider is still loading or reported an error.
    #[error("data not ready: {reason}")]
    DataNotReady { reason: String },

    /// The metric collection arrived without its metadata section.
    #[error("metric metadata is missing from the provider response")]
    MissingMetadata,

    #[error("invalid palette: {0}")]
    InvalidPalette(String),

    /// The configured no-data color equals one of the palette colors.
    #[error("no-data color {0} is also a palette color")]
    NoDataColorAliasesPalette(String),

    #[error("invalid color: {0}")]
    InvalidColor(String),
}

pub type Result<T, E = ChoroplethError> = std::result::Result<T, E>;
