/// Cut `text` to at most `max_chars` characters, ending in `…` when cut
pub fn shorten(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut short: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    short.push('…');
    short
}

/// Keep the end of a long path, prefixed with `...`
pub fn truncate_path_start(text: &str, max_chars: usize) -> String {
    let len = text.chars().count();
    if len <= max_chars {
        return text.to_string();
    }
    if max_chars <= 3 {
        return ".".repeat(max_chars);
    }
    let tail: String = text.chars().skip(len - (max_chars - 3)).collect();
    format!("...{}", tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shorten() {
        assert_eq!(shorten("", 10), "");
        assert_eq!(shorten("hello", 10), "hello");
        assert_eq!(shorten("hello", 5), "hello");
        assert_eq!(shorten("hello!", 5), "hell…");
        assert_eq!(shorten("hello world", 5), "hell…");
        assert_eq!(shorten("hello", 1), "…");
        assert_eq!(shorten("hello", 2), "h…");
    }

    #[test]
    fn test_shorten_counts_chars() {
        assert_eq!(shorten("ångström", 4), "ång…");
    }

    #[test]
    fn test_truncate_path_start() {
        assert_eq!(truncate_path_start("/a/b", 10), "/a/b");
        assert_eq!(truncate_path_start("/home/user/projects", 10), "...rojects");
        assert_eq!(truncate_path_start("/home/user/projects", 3), "...");
    }
}
