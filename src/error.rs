//! # Error Types
//!
//! Errors surfaced by the interaction core. Most gesture misuse is absorbed and
//! logged (see [`crate::visualization::extrusion`]); what remains here are
//! configuration problems that have no graceful fallback.

use thiserror::Error;
use uuid::Uuid;

/// Errors raised by the interaction core
#[derive(Error, Debug)]
pub enum InteractionError {
    /// The attribute is not one of the data source's dimensions
    #[error("attribute '{0}' is not registered in the data source")]
    UnknownAttribute(String),

    /// A discrete (string/date) attribute has no category table
    #[error("discrete attribute '{0}' has no category table")]
    MissingCategoryTable(String),

    /// No visualization with this identifier is registered
    #[error("visualization {0} not found")]
    VisualizationNotFound(Uuid),

    /// The data source exposes no dimensions to bind
    #[error("data source has no dimensions")]
    EmptyDataSource,

    /// The configuration file could not be parsed
    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// The configuration could not be written out
    #[error("could not serialize configuration: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    /// The configuration file could not be read or written
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, InteractionError>;
