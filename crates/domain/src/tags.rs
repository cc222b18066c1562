//! Tag normalization
//!
//! Tags are stored lower-case without the leading "#", and rendered back with
//! a "#" prefix on every tag.

/// Normalize free text into a list of tags.
///
/// When the input contains a "#", each fragment following a "#" contributes
/// its first whitespace-delimited word, so `"#Foo #bar text"` yields
/// `["foo", "bar"]`. Text without any "#" is treated as a plain list of
/// whitespace-separated terms, which lets search strings like `"foo"` work.
/// Empty fragments are dropped. Order is preserved and duplicates are kept.
pub fn normalize_tags(input: &str) -> Vec<String> {
    let lower = input.to_lowercase();

    if !lower.contains('#') {
        return lower.split_whitespace().map(str::to_string).collect();
    }

    lower
        .split('#')
        .skip(1)
        .filter_map(|fragment| fragment.split_whitespace().next())
        .map(str::to_string)
        .collect()
}

/// Render stored tags for output, e.g. `["foo", "bar"]` -> `"#foo,#bar"`
pub fn render_tags(tags: &[String]) -> String {
    tags.iter()
        .map(|t| format!("#{}", t))
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_inline_tags() {
        assert_eq!(normalize_tags("#Foo #bar text"), vec!["foo", "bar"]);
    }

    #[test]
    fn test_normalize_adjacent_tags() {
        assert_eq!(normalize_tags("#one#Two##three"), vec!["one", "two", "three"]);
    }

    #[test]
    fn test_normalize_ignores_text_before_first_hash() {
        assert_eq!(normalize_tags("hello world #Rust"), vec!["rust"]);
    }

    #[test]
    fn test_normalize_plain_search_term() {
        assert_eq!(normalize_tags("Foo"), vec!["foo"]);
        assert_eq!(normalize_tags("  foo  bar "), vec!["foo", "bar"]);
    }

    #[test]
    fn test_normalize_drops_empty_fragments() {
        assert!(normalize_tags("").is_empty());
        assert!(normalize_tags("# # #").is_empty());
    }

    #[test]
    fn test_normalize_keeps_duplicates() {
        assert_eq!(normalize_tags("#a #A"), vec!["a", "a"]);
    }

    #[test]
    fn test_render_tags() {
        let tags = normalize_tags("#Foo #bar text");
        assert_eq!(render_tags(&tags), "#foo,#bar");
        assert_eq!(render_tags(&[]), "");
    }
}
