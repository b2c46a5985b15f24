//! Local session state and its persistence.
//!
//! - `state.rs` - [`Session`]: connectivity, snapshots, favorites, tickets
//! - `store.rs` - [`KeyValueStore`] with file and in-memory backends

mod state;
mod store;

pub use state::{FavoriteEntry, Session, SessionSnapshot, SnapshotKind, Ticket};
pub use store::{JsonFileStore, KeyValueStore, MemoryStore, StoreError, StoreResult};
