/// Error taxonomy for the core crate.
///
/// Per-root statistics failures never appear here: the inventory recovers
/// from them locally by skipping the root.
use std::io;
use thiserror::Error;

/// Failure of a whole inventory query.
#[derive(Debug, Error)]
pub enum InventoryError {
    /// The OS storage-root listing itself failed (e.g. the mount table is
    /// unreadable, or the platform refused the directory query).
    #[error("failed to enumerate storage roots: {source}")]
    Enumeration { source: io::Error },
}

/// Failure of a dispatched method call.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The caller named a method this backend does not recognise.
    #[error("method `{method}` is not implemented")]
    NotImplemented { method: String },

    #[error(transparent)]
    Inventory(#[from] InventoryError),
}

impl DispatchError {
    /// Stable machine-readable code used on the message channel.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotImplemented { .. } => "notImplemented",
            Self::Inventory(InventoryError::Enumeration { .. }) => "enumerationFailed",
        }
    }
}
