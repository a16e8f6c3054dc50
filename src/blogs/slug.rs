use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
    static ref NON_WORD: Regex = Regex::new(r"[^\w-]").unwrap();
}

/// Derive a URL-safe slug from a title: lowercase, whitespace to dashes,
/// everything else but word characters stripped.
pub fn slugify(title: &str) -> String {
    let lowered = title.trim().to_lowercase();
    let dashed = WHITESPACE.replace_all(&lowered, "-");
    NON_WORD.replace_all(&dashed, "").to_string()
}

/// Slug form of a category name used in category listings.
pub fn category_slug(category: &str) -> String {
    WHITESPACE
        .replace_all(&category.trim().to_lowercase(), "-")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_title() {
        assert_eq!(slugify("Hello World"), "hello-world");
    }

    #[test]
    fn collapses_whitespace_runs() {
        assert_eq!(slugify("a   multi\tword    title"), "a-multi-word-title");
    }

    #[test]
    fn strips_punctuation() {
        assert_eq!(slugify("Rust & Axum: A Guide!"), "rust--axum-a-guide");
    }

    #[test]
    fn keeps_existing_dashes_and_underscores() {
        assert_eq!(slugify("already-slugged_title"), "already-slugged_title");
    }

    #[test]
    fn trims_surrounding_whitespace() {
        assert_eq!(slugify("  Padded Title  "), "padded-title");
    }

    #[test]
    fn category_slug_lowers_and_dashes() {
        assert_eq!(category_slug("Systems Programming"), "systems-programming");
        assert_eq!(category_slug("Web"), "web");
    }
}
