use async_trait::async_trait;

use crate::errors::StoreError;

/// A named, ordered collection of image urls. `title` is the unique key
/// within its table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Album {
    pub title: String,
    pub urls: Vec<String>,
}

/// CRUD contract against an album table. The table name is an explicit
/// parameter on every call; implementations hold no per-table state, and
/// every mutation is a single durable write (one album is one row).
#[async_trait]
pub trait AlbumStore: Send + Sync {
    /// Every album title, in a listing order that is stable across calls so
    /// that a menu built from one listing can resolve indices later.
    async fn list_titles(&self, table: &str) -> Result<Vec<String>, StoreError>;

    /// The album's full ordered url list.
    async fn get_images(&self, table: &str, title: &str) -> Result<Vec<String>, StoreError>;

    /// Creates an empty album. Fails with `AlreadyExists` on a title
    /// collision.
    async fn create_album(&self, table: &str, title: &str) -> Result<(), StoreError>;

    /// Removes the album row. Not idempotent: fails with `AlbumNotFound`
    /// when the title is absent.
    async fn delete_album(&self, table: &str, title: &str) -> Result<(), StoreError>;

    /// Atomically rekeys `old` to `new`, preserving the url list. Fails with
    /// `AlbumNotFound` when `old` is absent and `AlreadyExists` when `new`
    /// is taken.
    async fn rename_album(&self, table: &str, old: &str, new: &str) -> Result<(), StoreError>;

    /// Appends `url` to the album. Duplicates are allowed.
    async fn add_image(&self, table: &str, title: &str, url: &str) -> Result<(), StoreError>;

    /// Removes the first entry equal to `url`. Fails with `ImageNotFound`
    /// when the url is not present.
    async fn remove_image(&self, table: &str, title: &str, url: &str) -> Result<(), StoreError>;
}
