use snapshelf_core::errors::StoreError;
use snapshelf_core::store::AlbumStore;

/// Table name used by the contract tests and local demos.
pub const SAMPLE_TABLE: &str = "Albums";

/// Urls seeded into the `_test` album, smallest first.
pub const SAMPLE_URLS: [&str; 3] =
    ["https://test1.png", "https://test2.png", "https://test3.png"];

/// Seeds the deterministic `_test` album used by contract tests.
pub async fn seed_sample_albums(store: &dyn AlbumStore, table: &str) -> Result<(), StoreError> {
    store.create_album(table, "_test").await?;
    for url in SAMPLE_URLS {
        store.add_image(table, "_test", url).await?;
    }
    Ok(())
}
