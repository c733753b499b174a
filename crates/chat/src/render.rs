//! User-visible message texts, kept apart from the controller so wording
//! changes never touch transition logic.

use snapshelf_core::emoji;

pub fn menu_lines(titles: &[String]) -> String {
    titles
        .iter()
        .enumerate()
        .map(|(index, title)| format!("{} {title}", emoji::number_glyph(index + 1)))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn hidden_titles_note(hidden: usize) -> String {
    format!("({hidden} more albums are not shown)")
}

pub fn menu_prompt() -> String {
    "Pick an album by number!".to_owned()
}

pub fn empty_menu(call_command: &str) -> String {
    format!("No albums yet. Create one with `{call_command} create <title>`.")
}

pub fn page_text(urls: &[String], start: usize, end: usize, total: usize) -> String {
    let mut text = urls.join("\n");
    text.push('\n');
    text.push_str(&format!("Showing images {start}-{end} of {total}"));
    text
}

pub fn empty_album_text(title: &str) -> String {
    format!("Album `{title}` has no images yet.")
}

pub fn no_next_page() -> String {
    "There is no next page.".to_owned()
}

pub fn no_prev_page() -> String {
    "There is no previous page.".to_owned()
}

pub fn help_text(call_command: &str) -> String {
    format!(
        "{call_command}\n - pick an album to browse from the numbered menu\n\
         {call_command} create <title>\n - create an empty album\n\
         {call_command} add <title>\n - add the attached images to an existing album"
    )
}

pub fn created_text(title: &str) -> String {
    format!("Created album `{title}`!")
}

pub fn create_usage(call_command: &str) -> String {
    format!("Usage: {call_command} create <title>")
}

pub fn add_usage(call_command: &str) -> String {
    format!("Usage: {call_command} add <title> (attach the images to the same message)")
}

pub fn unknown_album_text(title: &str, call_command: &str) -> String {
    format!(
        "There is no album named `{title}`. You can create it with `{call_command} create {title}`."
    )
}

pub fn no_attachments_text() -> String {
    "No images were attached.".to_owned()
}

pub fn image_added_text(url: &str, title: &str) -> String {
    format!("Added {url} to `{title}`.")
}

pub fn ignored_attachments_text(filenames: &[String]) -> String {
    format!("These attachments are not images and were ignored:\n{}", filenames.join("\n"))
}

pub fn unknown_verb_text(verb: &str, call_command: &str) -> String {
    format!("Unknown subcommand `{verb}`. Try `{call_command} help`.")
}

pub fn error_text(error: &impl std::fmt::Display) -> String {
    format!("Error: {error}")
}

#[cfg(test)]
mod tests {
    use super::{menu_lines, page_text};

    #[test]
    fn menu_lines_number_titles_from_one() {
        let titles = vec!["trip".to_owned(), "pets".to_owned()];
        assert_eq!(menu_lines(&titles), "1️⃣ trip\n2️⃣ pets");
    }

    #[test]
    fn page_text_lists_urls_and_the_visible_range() {
        let urls = vec!["https://a.png".to_owned(), "https://b.png".to_owned()];
        let text = page_text(&urls, 6, 7, 7);
        assert_eq!(text, "https://a.png\nhttps://b.png\nShowing images 6-7 of 7");
    }
}
