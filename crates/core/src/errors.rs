use thiserror::Error;

/// Failures surfaced by an [`AlbumStore`](crate::store::AlbumStore)
/// implementation.
///
/// `AlbumNotFound` and `ImageNotFound` are both "not found" outcomes; they
/// stay distinct so callers can tell an album miss from an image miss.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("album `{0}` was not found")]
    AlbumNotFound(String),
    #[error("image `{url}` is not in album `{title}`")]
    ImageNotFound { title: String, url: String },
    #[error("album `{0}` already exists")]
    AlreadyExists(String),
    #[error("album store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::AlbumNotFound(_) | Self::ImageNotFound { .. })
    }
}
