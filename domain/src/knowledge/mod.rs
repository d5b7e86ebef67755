//! Knowledge base domain.
//!
//! - [`files::FileBatch`]: absolute file paths sent to `AddFiles`/`RemoveFiles`
//! - [`files::FileList`]: the uploaded-file listing returned by `GetFileList`
//! - [`transfer::TransferUpdate`]: one progress message of an upload or download

pub mod files;
pub mod transfer;
