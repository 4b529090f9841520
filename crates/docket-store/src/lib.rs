//! Docket Storage Layer
//!
//! Implementations of [`DocumentStore`](docket_domain::DocumentStore).
//!
//! - [`LocalDirStore`]: containers are folders under a root directory
//! - [`MemoryStore`]: in-process store for tests, with download
//!   concurrency tracking
//!
//! # Examples
//!
//! ```no_run
//! use docket_domain::DocumentStore;
//! use docket_store::LocalDirStore;
//!
//! # async fn example() -> Result<(), docket_domain::StoreError> {
//! let store = LocalDirStore::new("/data/incoming");
//! for file in store.list_files("batch-42").await? {
//!     println!("{} ({} bytes)", file.path, file.size);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod local;
mod memory;

pub use local::LocalDirStore;
pub use memory::MemoryStore;
