//! Error kinds for the load and chat operations.
//!
//! Every failure the pipeline can hit is a [`ChatError`] variant. The
//! operation boundaries ([`Session::load`](crate::session::Session::load),
//! [`Session::chat`](crate::session::Session::chat), the HTTP handlers)
//! turn them into user-facing text with [`ChatError::user_message`]; none
//! of them escape as panics.

use std::path::PathBuf;

use thiserror::Error;

/// Returned when the user asks before any documents are indexed.
pub const NOT_INDEXED_MESSAGE: &str = "Please load documents first.";

/// Returned when a message carries no `N units of <product>` request.
pub const CLARIFICATION_MESSAGE: &str =
    "I'm sorry, but I couldn't determine the quantity you requested.";

/// Returned by a load that found nothing to index.
pub const NO_DOCUMENTS_MESSAGE: &str = "No documents found in the selected files.";

/// Returned by a load called with an empty path list.
pub const NO_FILES_MESSAGE: &str = "Error: No files selected.";

#[derive(Debug, Error)]
pub enum ChatError {
    /// Load was called with an empty path list.
    #[error("no files selected")]
    NoFilesSelected,

    /// Nothing survived loading and chunking.
    #[error("no documents to index")]
    EmptyInput,

    /// The embedding collaborator failed or returned malformed output.
    #[error("embedding failed: {0}")]
    Embedding(String),

    /// A chat turn arrived before any successful load.
    #[error("no documents have been indexed")]
    NotIndexed,

    /// Retrieval produced no usable price facts.
    #[error("no pricing facts available")]
    NoFactsAvailable,

    /// The message has no `N units of <product>` pattern.
    #[error("could not find a unit count in the request")]
    UnparseableRequest,

    /// A recognized document could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ChatError {
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Embedding(message.into())
    }

    /// Text shown to the user in place of an answer.
    pub fn user_message(&self, product: &str) -> String {
        match self {
            Self::NoFilesSelected => NO_FILES_MESSAGE.to_string(),
            Self::EmptyInput => NO_DOCUMENTS_MESSAGE.to_string(),
            Self::NotIndexed => NOT_INDEXED_MESSAGE.to_string(),
            Self::UnparseableRequest => CLARIFICATION_MESSAGE.to_string(),
            Self::NoFactsAvailable => format!(
                "I'm sorry, but I couldn't find any pricing for {} in the loaded documents.",
                product
            ),
            Self::Embedding(_) | Self::Io { .. } => format!("Error processing query: {}", self),
        }
    }
}
