use crate::pagination::{self, PAGE_SIZE};

/// Browsing state for one channel: the album chosen from the menu, a url
/// snapshot taken at selection time, and the current page.
///
/// The snapshot is deliberately not refreshed while paging; images added
/// after selection appear the next time the album is opened. The page index
/// never leaves `[0, max_page_index]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BrowseSession {
    channel_id: String,
    album_title: String,
    cached_urls: Vec<String>,
    page_index: usize,
}

impl BrowseSession {
    pub fn new(
        channel_id: impl Into<String>,
        album_title: impl Into<String>,
        urls: Vec<String>,
    ) -> Self {
        Self {
            channel_id: channel_id.into(),
            album_title: album_title.into(),
            cached_urls: urls,
            page_index: 0,
        }
    }

    pub fn channel_id(&self) -> &str {
        &self.channel_id
    }

    pub fn album_title(&self) -> &str {
        &self.album_title
    }

    pub fn page_index(&self) -> usize {
        self.page_index
    }

    pub fn total_images(&self) -> usize {
        self.cached_urls.len()
    }

    pub fn max_page_index(&self) -> usize {
        pagination::max_page_index(self.cached_urls.len(), PAGE_SIZE)
    }

    pub fn has_next_page(&self) -> bool {
        pagination::has_next_page(self.page_index, self.cached_urls.len(), PAGE_SIZE)
    }

    pub fn has_prev_page(&self) -> bool {
        pagination::has_prev_page(self.page_index)
    }

    /// Moves one page forward. Returns `false` (and stays put) when already
    /// on the last page.
    pub fn advance(&mut self) -> bool {
        if !self.has_next_page() {
            return false;
        }
        self.page_index += 1;
        true
    }

    /// Moves one page back. Returns `false` (and stays put) when already on
    /// the first page.
    pub fn retreat(&mut self) -> bool {
        if !self.has_prev_page() {
            return false;
        }
        self.page_index -= 1;
        true
    }

    /// Urls visible on the current page together with their 1-based
    /// inclusive positions, or `None` for an empty album.
    pub fn visible_page(&self) -> Option<(&[String], usize, usize)> {
        let (start, end) =
            pagination::visible_range(self.page_index, self.cached_urls.len(), PAGE_SIZE)?;
        Some((&self.cached_urls[start - 1..end], start, end))
    }
}
