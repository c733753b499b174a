//! Numbered-emoji vocabulary for menu selection, plus the paging arrows.
//!
//! Exactly ten glyphs map bidirectionally to menu positions 1 through 10,
//! which is what bounds the selectable menu.

const NUMBER_GLYPHS: [&str; 10] =
    ["1️⃣", "2️⃣", "3️⃣", "4️⃣", "5️⃣", "6️⃣", "7️⃣", "8️⃣", "9️⃣", "🔟"];

/// Reaction glyph that advances to the next page.
pub const NEXT_PAGE: &str = "➡️";
/// Reaction glyph that goes back one page.
pub const PREV_PAGE: &str = "⬅";

/// Glyph for a 1-based menu position. Positions above ten have no glyph and
/// render as their decimal numeral; position zero renders as a placeholder.
pub fn number_glyph(position: usize) -> String {
    match position {
        0 => "❓".to_owned(),
        1..=10 => NUMBER_GLYPHS[position - 1].to_owned(),
        other => other.to_string(),
    }
}

/// Zero-based menu index for a numbered glyph, `None` for any other string.
pub fn index_from_glyph(glyph: &str) -> Option<usize> {
    NUMBER_GLYPHS.iter().position(|candidate| *candidate == glyph)
}
