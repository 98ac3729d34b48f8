mod error;
mod key;
mod traits;

pub mod filesystem;

pub use error::StorageError;
pub use key::{EntityKind, ImageExtension};
pub use traits::{BoxReader, ImageStore};
