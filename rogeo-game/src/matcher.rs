//! Guess matching and autocomplete.

use std::collections::BTreeSet;

use crate::data::{Spot, SpotCatalog};
use crate::normalize::normalize;

/// Whether `guess` names `spot`, ignoring case, diacritics and punctuation.
///
/// A guess that normalizes to nothing never matches, even against a spot
/// whose names are entirely outside the normalized alphabet.
#[must_use]
pub fn matches(guess: &str, spot: &Spot) -> bool {
    let guess = normalize(guess);
    if guess.is_empty() {
        return false;
    }
    spot.answer_candidates()
        .any(|candidate| normalize(candidate) == guess)
}

/// Canonical names containing `query`, sorted and de-duplicated.
#[must_use]
pub fn suggest(catalog: &SpotCatalog, query: &str, limit: usize) -> Vec<String> {
    let needle = normalize(query);
    if needle.is_empty() {
        return Vec::new();
    }
    let names: BTreeSet<&str> = catalog.iter().map(|spot| spot.name.as_str()).collect();
    names
        .into_iter()
        .filter(|name| normalize(name).contains(&needle))
        .take(limit)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::SUGGESTION_LIMIT;

    fn biolab() -> Spot {
        Spot::new("biolab", "/images/bioLaboratory.png", "Bio Laboratory")
            .with_alias("biolab")
            .with_alias("lighthalzen bio")
            .with_localized_name("es", "Laboratorio Biológico")
    }

    #[test]
    fn matches_canonical_alias_and_localized_names() {
        let spot = biolab();
        assert!(matches("bio laboratory", &spot));
        assert!(matches("  BIO LABORATORY ", &spot));
        assert!(matches("BioLab", &spot));
        assert!(matches("Lighthalzen Bio!", &spot));
        assert!(matches("laboratorio biologico", &spot));
        assert!(matches("LABORATÓRIO BIOLÓGICO", &spot));
    }

    #[test]
    fn rejects_unrelated_and_partial_guesses() {
        let spot = biolab();
        assert!(!matches("prontera", &spot));
        assert!(!matches("bio", &spot));
        assert!(!matches("bio laboratory 2", &spot));
    }

    #[test]
    fn empty_normalized_guess_never_matches() {
        let spot = Spot::new("prontera", "/images/prontera.png", "普隆德拉");
        assert!(!matches("", &spot));
        assert!(!matches("???", &spot));
    }

    #[test]
    fn suggest_filters_by_normalized_substring() {
        let catalog = SpotCatalog::builtin().unwrap();
        assert_eq!(
            suggest(&catalog, "ein", SUGGESTION_LIMIT),
            vec!["Einbech".to_string(), "Einbroch".to_string()]
        );
        assert_eq!(suggest(&catalog, "GLAST", SUGGESTION_LIMIT), vec!["Glast Heim".to_string()]);
        assert!(suggest(&catalog, "", SUGGESTION_LIMIT).is_empty());
        assert!(suggest(&catalog, "zzz", SUGGESTION_LIMIT).is_empty());
    }

    #[test]
    fn suggest_respects_limit() {
        let catalog = SpotCatalog::builtin().unwrap();
        let hits = suggest(&catalog, "a", SUGGESTION_LIMIT);
        assert_eq!(hits.len(), SUGGESTION_LIMIT);
        let mut sorted = hits.clone();
        sorted.sort();
        assert_eq!(hits, sorted);
    }
}
