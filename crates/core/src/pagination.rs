//! Page math for album browsing.
//!
//! All functions are total. Callers clamp the page index before calling; a
//! [`BrowseSession`](crate::session::BrowseSession) never holds an index
//! past [`max_page_index`].

/// Number of images shown on one page.
pub const PAGE_SIZE: usize = 5;

/// Highest valid zero-based page index for `total` images.
pub fn max_page_index(total: usize, page_size: usize) -> usize {
    if total == 0 {
        0
    } else {
        (total - 1) / page_size
    }
}

/// 1-based inclusive positions visible on `page_index`, or `None` when the
/// list is empty. The end is clamped to `total` on the last page.
pub fn visible_range(page_index: usize, total: usize, page_size: usize) -> Option<(usize, usize)> {
    if total == 0 {
        return None;
    }
    let start = page_index * page_size + 1;
    let end = (start + page_size - 1).min(total);
    Some((start, end))
}

pub fn has_next_page(page_index: usize, total: usize, page_size: usize) -> bool {
    page_index < max_page_index(total, page_size)
}

pub fn has_prev_page(page_index: usize) -> bool {
    page_index > 0
}
