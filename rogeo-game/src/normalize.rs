//! Canonical form for free-text guesses.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Canonicalize a guess for comparison.
///
/// Lower-cases, decomposes accented characters and drops their combining
/// marks, removes anything outside `[a-z0-9 _-]`, then trims. Total: an
/// empty input yields an empty output.
#[must_use]
pub fn normalize(text: &str) -> String {
    let folded: String = text
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .filter(|c| is_allowed(*c))
        .collect();
    folded.trim().to_string()
}

const fn is_allowed(c: char) -> bool {
    matches!(c, 'a'..='z' | '0'..='9' | ' ' | '_' | '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folds_case_and_diacritics() {
        assert_eq!(normalize("Morocc"), "morocc");
        assert_eq!(normalize("  Éinbröch  "), "einbroch");
        assert_eq!(normalize("Glast Heim!"), "glast heim");
        assert_eq!(normalize("niflheim_2-b"), "niflheim_2-b");
    }

    #[test]
    fn drops_non_latin_and_punctuation() {
        assert_eq!(normalize("Prontera (north)"), "prontera north");
        assert_eq!(normalize("普隆德拉"), "");
        assert_eq!(normalize("!!!"), "");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn trims_whitespace_left_after_filtering() {
        assert_eq!(normalize("\tPayon\n"), "payon");
        assert_eq!(normalize("¿Payon?"), "payon");
    }

    #[test]
    fn normalize_is_idempotent() {
        let samples = [
            "Bio Laboratory",
            "  Ayothaya · Dewata ",
            "Ñiflheim",
            "İzlude",
            "Ærøskøbing",
            "ÀÉÎÕÜ ç",
            "a\u{0301}b\u{0327}c",
            "-- _ --",
        ];
        for sample in samples {
            let once = normalize(sample);
            assert_eq!(normalize(&once), once, "not idempotent for {sample:?}");
        }
    }
}
