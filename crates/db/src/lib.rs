//! Persistence for snapshelf album tables.
//!
//! [`SqlAlbumStore`] is the durable SQLite implementation of the
//! [`AlbumStore`](snapshelf_core::store::AlbumStore) contract;
//! [`InMemoryAlbumStore`] backs tests and transportless development.

pub mod connection;
pub mod fixtures;
pub mod memory;
pub mod migrations;
pub mod store;

pub use connection::{connect, connect_with_settings, DbPool};
pub use memory::InMemoryAlbumStore;
pub use store::SqlAlbumStore;
