//! Reading-time estimate shown on post cards and the post page.

/// Assumed reading speed.
pub const WORDS_PER_MINUTE: usize = 200;

/// Estimate whole minutes needed to read `content`, rounding up, never below one.
pub fn reading_time_minutes(content: &str) -> usize {
    let words = content.split_whitespace().count();
    words.div_ceil(WORDS_PER_MINUTE).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(count: usize) -> String {
        vec!["palabra"; count].join(" ")
    }

    #[test]
    fn empty_content_reads_in_one_minute() {
        assert_eq!(reading_time_minutes(""), 1);
        assert_eq!(reading_time_minutes("   \n\t "), 1);
    }

    #[test]
    fn rounds_up_partial_minutes() {
        assert_eq!(reading_time_minutes(&words(400)), 2);
        assert_eq!(reading_time_minutes(&words(401)), 3);
        assert_eq!(reading_time_minutes(&words(199)), 1);
    }

    #[test]
    fn counts_words_across_markup_and_newlines() {
        let content = format!("# Title\n\n{}\n\n- item", words(200));
        assert_eq!(reading_time_minutes(&content), 2);
    }
}
