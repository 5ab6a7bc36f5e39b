pub mod codec;
mod pool_file;

pub use codec::{Error as StorageError, Snapshot};
pub use pool_file::{load, open, save, Origin};
