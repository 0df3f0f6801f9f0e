/// Method dispatch: maps host method names onto a tagged request type and
/// runs it against a `StorageInventory`.
///
/// The method table is exhaustive: anything not listed in
/// [`Request::from_method`] is `NotImplemented`, never a default value.
use crate::error::DispatchError;
use crate::inventory::StorageInventory;
use crate::model::StorageRoot;
use crate::platform::StorageBackend;
use serde::{Deserialize, Serialize};

/// One supported host call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Request {
    PlatformVersion,
    IsExternalStorageManager,
    ExtStorageData,
}

impl Request {
    pub const ALL: [Request; 3] = [
        Request::PlatformVersion,
        Request::IsExternalStorageManager,
        Request::ExtStorageData,
    ];

    /// Wire name of the method.
    pub fn method_name(self) -> &'static str {
        match self {
            Self::PlatformVersion => "getPlatformVersion",
            Self::IsExternalStorageManager => "isExternalStorageManager",
            Self::ExtStorageData => "getExtStorageData",
        }
    }

    pub fn from_method(method: &str) -> Result<Self, DispatchError> {
        Self::ALL
            .into_iter()
            .find(|request| request.method_name() == method)
            .ok_or_else(|| DispatchError::NotImplemented {
                method: method.to_string(),
            })
    }
}

/// Successful reply payload. Serializes as the bare value the host expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Response {
    PlatformVersion(String),
    StorageManager(bool),
    ExtStorageData(Vec<ExtStorageEntry>),
}

/// One element of the `getExtStorageData` reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtStorageEntry {
    /// Reserved; always empty.
    pub root_path: String,
    pub path: String,
    pub available_bytes: u64,
}

impl From<&StorageRoot> for ExtStorageEntry {
    fn from(root: &StorageRoot) -> Self {
        Self {
            root_path: String::new(),
            path: root.path.to_string_lossy().into_owned(),
            available_bytes: root.available_bytes,
        }
    }
}

/// Run a decoded request.
pub fn handle<B: StorageBackend>(
    inventory: &StorageInventory<B>,
    request: Request,
) -> Result<Response, DispatchError> {
    let response = match request {
        Request::PlatformVersion => {
            Response::PlatformVersion(inventory.get_platform_info().to_string())
        }
        Request::IsExternalStorageManager => {
            Response::StorageManager(inventory.is_full_storage_access_granted())
        }
        Request::ExtStorageData => Response::ExtStorageData(
            inventory
                .enumerate_external_storage_roots()?
                .iter()
                .map(ExtStorageEntry::from)
                .collect(),
        ),
    };
    Ok(response)
}

/// Decode `method` and run it.
pub fn dispatch<B: StorageBackend>(
    inventory: &StorageInventory<B>,
    method: &str,
) -> Result<Response, DispatchError> {
    let request = Request::from_method(method)?;
    tracing::debug!("Dispatching {}", request.method_name());
    handle(inventory, request)
}
