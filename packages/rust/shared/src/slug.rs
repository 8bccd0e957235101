//! Ticker → page filename mapping.
//!
//! The renderer uses [`company_page_path`] to build index links and the
//! writer uses it to name files; nothing else may derive page names.

/// File name of the listing page.
pub const INDEX_PAGE: &str = "index.html";

/// Normalize a ticker into a lowercase, filesystem- and URL-safe slug.
///
/// Whitespace, `.`, `_` and `/` become `-`; any other character outside
/// `[a-z0-9-]` is dropped. Dash runs collapse and edge dashes are trimmed.
/// Returns an empty string when nothing usable remains.
pub fn ticker_slug(ticker: &str) -> String {
    let mut slug = String::with_capacity(ticker.len());

    for c in ticker.trim().chars().flat_map(char::to_lowercase) {
        let mapped = match c {
            'a'..='z' | '0'..='9' => c,
            '-' | '.' | '_' | '/' => '-',
            c if c.is_whitespace() => '-',
            _ => continue,
        };
        if mapped == '-' && (slug.is_empty() || slug.ends_with('-')) {
            continue;
        }
        slug.push(mapped);
    }

    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// Relative path of a company page inside the output directory.
pub fn company_page_path(ticker: &str) -> String {
    format!("{}.html", ticker_slug(ticker))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases() {
        assert_eq!(ticker_slug("AAPL"), "aapl");
    }

    #[test]
    fn trims_and_maps_whitespace() {
        assert_eq!(ticker_slug("  ABC DEF  "), "abc-def");
        assert_eq!(ticker_slug("ABC\t\tDEF"), "abc-def");
    }

    #[test]
    fn maps_separators() {
        assert_eq!(ticker_slug("BRK.B"), "brk-b");
        assert_eq!(ticker_slug("BRK/B"), "brk-b");
        assert_eq!(ticker_slug("BRK_B"), "brk-b");
    }

    #[test]
    fn drops_special_characters() {
        assert_eq!(ticker_slug("^GSPC"), "gspc");
        assert_eq!(ticker_slug("A&B<script>"), "abscript");
        assert_eq!(ticker_slug("../../etc"), "etc");
    }

    #[test]
    fn collapses_and_trims_dashes() {
        assert_eq!(ticker_slug("--A--B--"), "a-b");
        assert_eq!(ticker_slug("A . B"), "a-b");
    }

    #[test]
    fn empty_when_nothing_usable() {
        assert_eq!(ticker_slug(""), "");
        assert_eq!(ticker_slug("???"), "");
        assert_eq!(ticker_slug(" - "), "");
    }

    #[test]
    fn page_path_appends_extension() {
        assert_eq!(company_page_path("AAPL"), "aapl.html");
        assert_eq!(company_page_path("BRK.B"), "brk-b.html");
    }
}
