pub const DEFAULT_PREVIEW_CHARS: usize = 500;

/// First `limit` characters of `text`, with `...` appended when truncated.
pub fn preview(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::preview;

    #[test]
    fn short_text_is_returned_unchanged() {
        assert_eq!(preview("hello", 500), "hello");
        assert_eq!(preview("", 500), "");
    }

    #[test]
    fn text_at_exact_limit_has_no_ellipsis() {
        assert_eq!(preview("abcde", 5), "abcde");
    }

    #[test]
    fn long_text_is_cut_and_marked() {
        assert_eq!(preview("abcdefgh", 5), "abcde...");
    }

    #[test]
    fn cuts_on_character_boundaries() {
        assert_eq!(preview("読み上げテスト", 4), "読み上げ...");
    }
}
