use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;

use snapshelf_core::errors::StoreError;
use snapshelf_core::store::AlbumStore;

use crate::DbPool;

/// SQLite-backed album store. One album is one row, so every mutation is a
/// single durable write and no multi-row transactions are needed. Listing
/// order is rowid order, which survives renames.
pub struct SqlAlbumStore {
    pool: DbPool,
}

impl SqlAlbumStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn load_urls(&self, table: &str, title: &str) -> Result<Vec<String>, StoreError> {
        let row = sqlx::query("SELECT urls FROM albums WHERE collection = ?1 AND title = ?2")
            .bind(table)
            .bind(title)
            .fetch_optional(&self.pool)
            .await
            .map_err(unavailable)?;

        let Some(row) = row else {
            return Err(StoreError::AlbumNotFound(title.to_owned()));
        };
        decode_urls(&row.get::<String, _>("urls"))
    }

    async fn save_urls(&self, table: &str, title: &str, urls: &[String]) -> Result<(), StoreError> {
        let encoded = serde_json::to_string(urls)
            .map_err(|error| StoreError::Unavailable(format!("url list encode: {error}")))?;

        let result =
            sqlx::query("UPDATE albums SET urls = ?3 WHERE collection = ?1 AND title = ?2")
                .bind(table)
                .bind(title)
                .bind(encoded)
                .execute(&self.pool)
                .await
                .map_err(unavailable)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::AlbumNotFound(title.to_owned()));
        }
        Ok(())
    }
}

#[async_trait]
impl AlbumStore for SqlAlbumStore {
    async fn list_titles(&self, table: &str) -> Result<Vec<String>, StoreError> {
        let rows = sqlx::query("SELECT title FROM albums WHERE collection = ?1 ORDER BY rowid")
            .bind(table)
            .fetch_all(&self.pool)
            .await
            .map_err(unavailable)?;

        Ok(rows.into_iter().map(|row| row.get::<String, _>("title")).collect())
    }

    async fn get_images(&self, table: &str, title: &str) -> Result<Vec<String>, StoreError> {
        self.load_urls(table, title).await
    }

    async fn create_album(&self, table: &str, title: &str) -> Result<(), StoreError> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO albums (collection, title, urls, created_at) \
             VALUES (?1, ?2, '[]', ?3)",
        )
        .bind(table)
        .bind(title)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(unavailable)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::AlreadyExists(title.to_owned()));
        }
        Ok(())
    }

    async fn delete_album(&self, table: &str, title: &str) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM albums WHERE collection = ?1 AND title = ?2")
            .bind(table)
            .bind(title)
            .execute(&self.pool)
            .await
            .map_err(unavailable)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::AlbumNotFound(title.to_owned()));
        }
        Ok(())
    }

    async fn rename_album(&self, table: &str, old: &str, new: &str) -> Result<(), StoreError> {
        let taken = sqlx::query("SELECT 1 FROM albums WHERE collection = ?1 AND title = ?2")
            .bind(table)
            .bind(new)
            .fetch_optional(&self.pool)
            .await
            .map_err(unavailable)?;
        if taken.is_some() {
            return Err(StoreError::AlreadyExists(new.to_owned()));
        }

        let result =
            sqlx::query("UPDATE albums SET title = ?3 WHERE collection = ?1 AND title = ?2")
                .bind(table)
                .bind(old)
                .bind(new)
                .execute(&self.pool)
                .await
                .map_err(unavailable)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::AlbumNotFound(old.to_owned()));
        }
        Ok(())
    }

    async fn add_image(&self, table: &str, title: &str, url: &str) -> Result<(), StoreError> {
        let mut urls = self.load_urls(table, title).await?;
        urls.push(url.to_owned());
        self.save_urls(table, title, &urls).await
    }

    async fn remove_image(&self, table: &str, title: &str, url: &str) -> Result<(), StoreError> {
        let mut urls = self.load_urls(table, title).await?;
        let Some(position) = urls.iter().position(|candidate| candidate == url) else {
            return Err(StoreError::ImageNotFound {
                title: title.to_owned(),
                url: url.to_owned(),
            });
        };
        urls.remove(position);
        self.save_urls(table, title, &urls).await
    }
}

fn unavailable(error: sqlx::Error) -> StoreError {
    StoreError::Unavailable(error.to_string())
}

fn decode_urls(raw: &str) -> Result<Vec<String>, StoreError> {
    serde_json::from_str(raw)
        .map_err(|error| StoreError::Unavailable(format!("corrupt url list: {error}")))
}

#[cfg(test)]
mod tests {
    use snapshelf_core::store::AlbumStore;

    use super::SqlAlbumStore;
    use crate::{connect_with_settings, migrations};

    const TABLE: &str = "Albums";

    async fn store() -> SqlAlbumStore {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrate");
        SqlAlbumStore::new(pool)
    }

    #[tokio::test]
    async fn listing_order_survives_a_rename() {
        let store = store().await;
        for title in ["first", "second", "third"] {
            store.create_album(TABLE, title).await.expect("create");
        }

        store.rename_album(TABLE, "second", "renamed").await.expect("rename");

        let titles = store.list_titles(TABLE).await.expect("list");
        assert_eq!(titles, vec!["first", "renamed", "third"]);
    }

    #[tokio::test]
    async fn duplicate_urls_are_allowed_and_removed_one_at_a_time() {
        let store = store().await;
        store.create_album(TABLE, "dupes").await.expect("create");
        store.add_image(TABLE, "dupes", "https://a.png").await.expect("add");
        store.add_image(TABLE, "dupes", "https://a.png").await.expect("add again");

        store.remove_image(TABLE, "dupes", "https://a.png").await.expect("remove first match");

        let urls = store.get_images(TABLE, "dupes").await.expect("images");
        assert_eq!(urls, vec!["https://a.png"]);
    }

    #[tokio::test]
    async fn tables_are_isolated_from_each_other() {
        let store = store().await;
        store.create_album("AlbumsA", "shared-title").await.expect("create in A");
        store.create_album("AlbumsB", "shared-title").await.expect("create in B");

        store.delete_album("AlbumsA", "shared-title").await.expect("delete in A");

        assert_eq!(store.list_titles("AlbumsA").await.expect("list A"), Vec::<String>::new());
        assert_eq!(store.list_titles("AlbumsB").await.expect("list B"), vec!["shared-title"]);
    }
}
