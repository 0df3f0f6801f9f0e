/// StoreSleuth Core: storage root enumeration, free-space metrics and
/// storage-access probing.
///
/// This crate contains all business logic with zero UI dependencies.
/// It is designed to be reusable across different frontends (CLI, an
/// embedding host's message channel, tests with a mocked OS).
///
/// # Modules
///
/// - [`model`]: Storage roots, block statistics, platform info, size formatting.
/// - [`platform`]: The `StorageBackend` OS seam and one backend per OS family.
/// - [`inventory`]: The three read-only storage queries.
/// - [`dispatch`]: Method-name dispatch onto a tagged request type.
/// - [`channel`]: JSON-lines request/response loop.
/// - [`config`]: Optional TOML configuration file.
/// - [`error`]: Error taxonomy.
pub mod channel;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod inventory;
pub mod model;
pub mod platform;

pub use config::Config;
pub use dispatch::{dispatch, Request, Response};
pub use error::{DispatchError, InventoryError};
pub use inventory::{RootUsage, Snapshot, StorageInventory};
pub use model::{BlockStats, PlatformInfo, StorageRoot};
pub use platform::{NativeBackend, StorageBackend};
