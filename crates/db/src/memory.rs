use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use snapshelf_core::errors::StoreError;
use snapshelf_core::store::{Album, AlbumStore};

/// In-memory album store for tests and transportless development. Listing
/// order is insertion order, matching the SQLite store's rowid order.
#[derive(Default)]
pub struct InMemoryAlbumStore {
    tables: RwLock<HashMap<String, Vec<Album>>>,
}

#[async_trait]
impl AlbumStore for InMemoryAlbumStore {
    async fn list_titles(&self, table: &str) -> Result<Vec<String>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .get(table)
            .map(|albums| albums.iter().map(|album| album.title.clone()).collect())
            .unwrap_or_default())
    }

    async fn get_images(&self, table: &str, title: &str) -> Result<Vec<String>, StoreError> {
        let tables = self.tables.read().await;
        tables
            .get(table)
            .and_then(|albums| albums.iter().find(|album| album.title == title))
            .map(|album| album.urls.clone())
            .ok_or_else(|| StoreError::AlbumNotFound(title.to_owned()))
    }

    async fn create_album(&self, table: &str, title: &str) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        let albums = tables.entry(table.to_owned()).or_default();
        if albums.iter().any(|album| album.title == title) {
            return Err(StoreError::AlreadyExists(title.to_owned()));
        }
        albums.push(Album { title: title.to_owned(), urls: Vec::new() });
        Ok(())
    }

    async fn delete_album(&self, table: &str, title: &str) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        let albums = tables.get_mut(table).ok_or_else(|| album_not_found(title))?;
        let Some(position) = albums.iter().position(|album| album.title == title) else {
            return Err(album_not_found(title));
        };
        albums.remove(position);
        Ok(())
    }

    async fn rename_album(&self, table: &str, old: &str, new: &str) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        let albums = tables.get_mut(table).ok_or_else(|| album_not_found(old))?;
        if albums.iter().any(|album| album.title == new) {
            return Err(StoreError::AlreadyExists(new.to_owned()));
        }
        let album = albums
            .iter_mut()
            .find(|album| album.title == old)
            .ok_or_else(|| album_not_found(old))?;
        album.title = new.to_owned();
        Ok(())
    }

    async fn add_image(&self, table: &str, title: &str, url: &str) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        let album = tables
            .get_mut(table)
            .and_then(|albums| albums.iter_mut().find(|album| album.title == title))
            .ok_or_else(|| album_not_found(title))?;
        album.urls.push(url.to_owned());
        Ok(())
    }

    async fn remove_image(&self, table: &str, title: &str, url: &str) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        let album = tables
            .get_mut(table)
            .and_then(|albums| albums.iter_mut().find(|album| album.title == title))
            .ok_or_else(|| album_not_found(title))?;
        let Some(position) = album.urls.iter().position(|candidate| candidate == url) else {
            return Err(StoreError::ImageNotFound {
                title: title.to_owned(),
                url: url.to_owned(),
            });
        };
        album.urls.remove(position);
        Ok(())
    }
}

fn album_not_found(title: &str) -> StoreError {
    StoreError::AlbumNotFound(title.to_owned())
}
