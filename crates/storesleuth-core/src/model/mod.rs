/// Data model for StoreSleuth storage queries.
///
/// Every value here is an immutable snapshot; nothing is cached between
/// queries.
pub mod platform_info;
pub mod size;
pub mod storage_root;

pub use platform_info::{PlatformInfo, UNKNOWN_VERSION};
pub use storage_root::{BlockStats, StorageRoot};
