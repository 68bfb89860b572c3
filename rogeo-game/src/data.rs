use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

const BUILTIN_SPOTS_JSON: &str = include_str!("../assets/spots.json");

/// One guessable location with its screenshot and display names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spot {
    pub id: String,
    pub image: String,
    /// Canonical display name.
    #[serde(alias = "map")]
    pub name: String,
    /// Localized display names keyed by locale tag (`es`, `pt-BR`, ...).
    #[serde(default)]
    pub names: BTreeMap<String, String>,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub zone: Option<String>,
    #[serde(default)]
    pub coords: Option<String>,
    #[serde(default)]
    pub credit: Option<String>,
}

impl Spot {
    /// Minimal spot with no aliases or localized names.
    #[must_use]
    pub fn new(id: impl Into<String>, image: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            image: image.into(),
            name: name.into(),
            names: BTreeMap::new(),
            aliases: Vec::new(),
            zone: None,
            coords: None,
            credit: None,
        }
    }

    #[must_use]
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    #[must_use]
    pub fn with_localized_name(mut self, locale: impl Into<String>, name: impl Into<String>) -> Self {
        self.names.insert(locale.into(), name.into());
        self
    }

    #[must_use]
    pub fn with_zone(mut self, zone: impl Into<String>) -> Self {
        self.zone = Some(zone.into());
        self
    }

    #[must_use]
    pub fn with_coords(mut self, coords: impl Into<String>) -> Self {
        self.coords = Some(coords.into());
        self
    }

    #[must_use]
    pub fn with_credit(mut self, credit: impl Into<String>) -> Self {
        self.credit = Some(credit.into());
        self
    }

    /// Display name for `locale`, falling back to the canonical name.
    #[must_use]
    pub fn display_name(&self, locale: Option<&str>) -> &str {
        locale
            .and_then(|tag| self.names.get(tag))
            .map_or(self.name.as_str(), String::as_str)
    }

    /// Every string a correct guess may denote: canonical name, localized
    /// names, then aliases.
    pub fn answer_candidates(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str())
            .chain(self.names.values().map(String::as_str))
            .chain(self.aliases.iter().map(String::as_str))
    }

    /// Label shown while the answer is revealed: `zone · name coords`.
    #[must_use]
    pub fn answer_label(&self) -> String {
        let mut label = String::new();
        if let Some(zone) = &self.zone {
            label.push_str(zone);
            label.push_str(" · ");
        }
        label.push_str(&self.name);
        if let Some(coords) = &self.coords {
            label.push(' ');
            label.push_str(coords);
        }
        label
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("spot catalog is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("spot catalog is empty")]
    Empty,
    #[error("duplicate spot id `{0}`")]
    DuplicateId(String),
}

/// Ordered, validated, read-only list of spots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpotCatalog {
    spots: Vec<Spot>,
}

#[derive(Deserialize)]
struct CatalogFile {
    spots: Vec<Spot>,
}

impl SpotCatalog {
    /// Build a catalog from pre-parsed spots.
    ///
    /// # Errors
    ///
    /// Returns an error if `spots` is empty or two spots share an id.
    pub fn from_spots(spots: Vec<Spot>) -> Result<Self, CatalogError> {
        if spots.is_empty() {
            log::warn!("rejecting empty spot catalog");
            return Err(CatalogError::Empty);
        }
        let mut seen = HashSet::with_capacity(spots.len());
        for spot in &spots {
            if !seen.insert(spot.id.as_str()) {
                log::warn!("rejecting spot catalog: duplicate id `{}`", spot.id);
                return Err(CatalogError::DuplicateId(spot.id.clone()));
            }
        }
        Ok(Self { spots })
    }

    /// Load a catalog from a JSON document of the form `{"spots": [...]}`.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed or fails validation.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(json)?;
        Self::from_spots(file.spots)
    }

    /// The catalog of locations shipped with the game.
    ///
    /// # Errors
    ///
    /// Returns an error only if the embedded asset is malformed.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(BUILTIN_SPOTS_JSON)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.spots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.spots.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Spot> {
        self.spots.get(index)
    }

    #[must_use]
    pub fn position(&self, id: &str) -> Option<usize> {
        self.spots.iter().position(|spot| spot.id == id)
    }

    #[must_use]
    pub fn by_id(&self, id: &str) -> Option<&Spot> {
        self.spots.iter().find(|spot| spot.id == id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Spot> {
        self.spots.iter()
    }

    #[must_use]
    pub fn spots(&self) -> &[Spot] {
        &self.spots
    }
}

impl<'a> IntoIterator for &'a SpotCatalog {
    type Item = &'a Spot;
    type IntoIter = std::slice::Iter<'a, Spot>;

    fn into_iter(self) -> Self::IntoIter {
        self.spots.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_from_json_accepts_map_field_alias() {
        let json = r#"{
            "spots": [
                {
                    "id": "morocc",
                    "image": "/images/morocc.png",
                    "map": "Morocc",
                    "aliases": ["morroc"],
                    "zone": "Morocc"
                },
                {
                    "id": "payon",
                    "image": "/images/payon.png",
                    "name": "Payon",
                    "names": { "ko": "Payon Village" }
                }
            ]
        }"#;

        let catalog = SpotCatalog::from_json(json).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get(0).unwrap().name, "Morocc");
        assert_eq!(catalog.get(0).unwrap().aliases, vec!["morroc".to_string()]);
        assert_eq!(catalog.by_id("payon").unwrap().display_name(Some("ko")), "Payon Village");
        assert_eq!(catalog.position("payon"), Some(1));
    }

    #[test]
    fn catalog_rejects_empty_and_duplicates() {
        assert!(matches!(
            SpotCatalog::from_spots(Vec::new()),
            Err(CatalogError::Empty)
        ));
        let dup = vec![
            Spot::new("yuno", "/images/yuno.png", "Yuno"),
            Spot::new("yuno", "/images/yuno2.png", "Juno"),
        ];
        assert!(matches!(
            SpotCatalog::from_spots(dup),
            Err(CatalogError::DuplicateId(id)) if id == "yuno"
        ));
        assert!(matches!(
            SpotCatalog::from_json("{not json"),
            Err(CatalogError::Parse(_))
        ));
    }

    #[test]
    fn builtin_catalog_loads() {
        let catalog = SpotCatalog::builtin().unwrap();
        assert_eq!(catalog.len(), 27);
        let biolab = catalog.by_id("biolab").unwrap();
        assert_eq!(biolab.name, "Bio Laboratory");
        assert!(biolab.aliases.iter().any(|a| a == "lighthalzen bio"));
    }

    #[test]
    fn answer_label_includes_zone_and_coords() {
        let spot = Spot::new("geffenia", "/images/geffenia.png", "Geffenia")
            .with_zone("Geffen")
            .with_coords("(120, 88)");
        assert_eq!(spot.answer_label(), "Geffen · Geffenia (120, 88)");
        assert_eq!(Spot::new("a", "a.png", "Alberta").answer_label(), "Alberta");
    }

    #[test]
    fn display_name_falls_back_to_canonical() {
        let spot = Spot::new("prontera", "/images/prontera.png", "Prontera")
            .with_localized_name("zh", "普隆德拉");
        assert_eq!(spot.display_name(None), "Prontera");
        assert_eq!(spot.display_name(Some("fr")), "Prontera");
        assert_eq!(spot.display_name(Some("zh")), "普隆德拉");
        assert_eq!(spot.answer_candidates().count(), 2);
    }
}
