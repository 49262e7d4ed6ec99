//! Download name for a composed passport

use once_cell::sync::Lazy;
use regex::Regex;

static RE_NON_ALPHANUMERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9]+").expect("Invalid regex"));

const SUFFIX: &str = "_passport.pdf";
const FALLBACK: &str = "passport.pdf";

/// Deterministic filename from a display name
///
/// Runs of non-alphanumeric characters collapse to a single `_`, leading and
/// trailing separators are dropped and the result is lowercased.
///
/// ```
/// use memory_passport::passport::passport_filename;
///
/// assert_eq!(passport_filename("Ada  Lovelace!"), "ada_lovelace_passport.pdf");
/// assert_eq!(passport_filename("???"), "passport.pdf");
/// ```
pub fn passport_filename(display_name: &str) -> String {
    let slug = RE_NON_ALPHANUMERIC.replace_all(display_name, "_");
    let slug = slug.trim_matches('_').to_lowercase();
    if slug.is_empty() {
        FALLBACK.to_string()
    } else {
        format!("{}{}", slug, SUFFIX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_separators() {
        assert_eq!(
            passport_filename("Mary-Jane  O'Neil"),
            "mary_jane_o_neil_passport.pdf"
        );
        assert_eq!(passport_filename("  Ada  "), "ada_passport.pdf");
    }

    #[test]
    fn test_non_latin_names_fall_back() {
        assert_eq!(passport_filename("\u{5C71}\u{7530}"), "passport.pdf");
        assert_eq!(passport_filename(""), "passport.pdf");
    }

    #[test]
    fn test_is_deterministic() {
        assert_eq!(passport_filename("Zoë Smith"), passport_filename("Zoë Smith"));
        assert_eq!(passport_filename("Zoë Smith"), "zo_smith_passport.pdf");
    }
}
