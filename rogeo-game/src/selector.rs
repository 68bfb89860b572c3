//! Spot selection, crop anchors and multiple-choice options.
//!
//! Everything here is pure: randomness comes in through an explicit
//! [`rand::Rng`] and crop anchors are derived from the round number alone,
//! so the same seed and round always reproduce the same picture.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::constants::{
    CHOICE_DISTRACTORS, CROP_LCG_INCREMENT, CROP_LCG_MODULUS, CROP_LCG_MULTIPLIER,
    CROP_LEGACY_Y_DIVISOR, CROP_MAX_PCT, CROP_MIN_PCT, CROP_SPAN_PCT, ZOOM_MAX, ZOOM_MIN,
};
use crate::data::SpotCatalog;

/// Labels offered in multiple-choice mode.
pub type ChoiceOptions = SmallVec<[String; 4]>;

/// Pick a catalog index uniformly, skipping `exclude` when other spots exist.
pub fn pick_next<R: Rng + ?Sized>(
    catalog: &SpotCatalog,
    exclude: Option<usize>,
    rng: &mut R,
) -> usize {
    let len = catalog.len();
    match exclude {
        Some(skip) if len > 1 && skip < len => {
            let roll = rng.gen_range(0..len - 1);
            if roll >= skip { roll + 1 } else { roll }
        }
        _ => rng.gen_range(0..len),
    }
}

/// Which vertical divisor the crop anchor uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CropFormula {
    /// Same divisor on both axes.
    #[default]
    Symmetric,
    /// Reproduces the legacy web build, whose vertical axis divides by
    /// 133280 and therefore leans towards the lower clamp edge.
    Legacy,
}

/// Crop anchor as percentages of the image size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropOrigin {
    pub x_pct: f64,
    pub y_pct: f64,
}

/// Deterministic crop anchor for `round`.
#[must_use]
pub fn crop_origin(round: u32, formula: CropFormula) -> CropOrigin {
    let seed = (u64::from(round) * CROP_LCG_MULTIPLIER + CROP_LCG_INCREMENT) % CROP_LCG_MODULUS;
    let y_divisor = match formula {
        CropFormula::Symmetric => CROP_LCG_MODULUS,
        CropFormula::Legacy => CROP_LEGACY_Y_DIVISOR,
    };
    CropOrigin {
        x_pct: scale_to_pct(seed, CROP_LCG_MODULUS),
        y_pct: scale_to_pct(seed, y_divisor),
    }
}

#[allow(clippy::cast_precision_loss)]
fn scale_to_pct(seed: u64, divisor: u64) -> f64 {
    let raw = (seed as f64 / divisor as f64).mul_add(CROP_SPAN_PCT, CROP_MIN_PCT);
    raw.clamp(CROP_MIN_PCT, CROP_MAX_PCT)
}

/// Background sizing for the zoomed crop of the current round.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropView {
    pub zoom: u8,
    pub background_size_pct: u32,
    pub origin: CropOrigin,
}

impl CropView {
    #[must_use]
    pub fn new(round: u32, zoom: u8, formula: CropFormula) -> Self {
        let zoom = zoom.clamp(ZOOM_MIN, ZOOM_MAX);
        Self {
            zoom,
            background_size_pct: u32::from(zoom) * 100,
            origin: crop_origin(round, formula),
        }
    }

    /// CSS-style `background-position` value.
    #[must_use]
    pub fn background_position(&self) -> String {
        format!("{}% {}%", self.origin.x_pct, self.origin.y_pct)
    }
}

/// The answer's name plus up to three distinct distractors, shuffled.
pub fn multiple_choice_options<R: Rng + ?Sized>(
    catalog: &SpotCatalog,
    answer: usize,
    rng: &mut R,
) -> ChoiceOptions {
    let Some(answer_spot) = catalog.get(answer) else {
        return ChoiceOptions::new();
    };
    let mut pool: Vec<&str> = catalog
        .iter()
        .enumerate()
        .filter(|(idx, spot)| *idx != answer && spot.name != answer_spot.name)
        .map(|(_, spot)| spot.name.as_str())
        .collect();
    pool.sort_unstable();
    pool.dedup();
    pool.shuffle(rng);

    let mut options: ChoiceOptions = pool
        .into_iter()
        .take(CHOICE_DISTRACTORS)
        .map(str::to_string)
        .collect();
    options.push(answer_spot.name.clone());
    options.shuffle(rng);
    options
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Spot;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn three_spots() -> SpotCatalog {
        SpotCatalog::from_spots(vec![
            Spot::new("payon", "payon.png", "Payon"),
            Spot::new("yuno", "yuno.png", "Yuno"),
            Spot::new("hugel", "hugel.png", "Hugel"),
        ])
        .unwrap()
    }

    #[test]
    fn pick_next_never_returns_excluded_when_alternatives_exist() {
        let catalog = three_spots();
        let mut rng = ChaCha20Rng::seed_from_u64(7);
        for _ in 0..500 {
            assert_ne!(pick_next(&catalog, Some(1), &mut rng), 1);
        }
    }

    #[test]
    fn pick_next_covers_eligible_pool_roughly_uniformly() {
        let catalog = three_spots();
        let mut rng = ChaCha20Rng::seed_from_u64(99);
        let mut counts = [0_u32; 3];
        for _ in 0..3_000 {
            counts[pick_next(&catalog, Some(0), &mut rng)] += 1;
        }
        assert_eq!(counts[0], 0);
        assert!(counts[1] > 1_300 && counts[2] > 1_300, "{counts:?}");
    }

    #[test]
    fn pick_next_repeats_with_single_spot() {
        let catalog = SpotCatalog::from_spots(vec![Spot::new("solo", "s.png", "Solo")]).unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        assert_eq!(pick_next(&catalog, Some(0), &mut rng), 0);
        assert_eq!(pick_next(&catalog, None, &mut rng), 0);
    }

    #[test]
    fn pick_next_is_reproducible_for_a_seed() {
        let catalog = SpotCatalog::builtin().unwrap();
        let draw = |seed| {
            let mut rng = ChaCha20Rng::seed_from_u64(seed);
            (0..10)
                .map(|_| pick_next(&catalog, None, &mut rng))
                .collect::<Vec<_>>()
        };
        assert_eq!(draw(1337), draw(1337));
    }

    #[test]
    fn crop_origin_matches_lcg_for_first_round() {
        // seed = (1 * 9301 + 49297) % 233280 = 58598
        let origin = crop_origin(1, CropFormula::Symmetric);
        let expected = 58_598.0 / 233_280.0 * 60.0 + 20.0;
        assert!((origin.x_pct - expected).abs() < 1e-9);
        assert!((origin.y_pct - expected).abs() < 1e-9);
    }

    #[test]
    fn crop_origin_is_deterministic_and_in_bounds() {
        for round in 1..2_000 {
            for formula in [CropFormula::Symmetric, CropFormula::Legacy] {
                let origin = crop_origin(round, formula);
                assert_eq!(origin, crop_origin(round, formula));
                assert!((20.0..=80.0).contains(&origin.x_pct));
                assert!((20.0..=80.0).contains(&origin.y_pct));
            }
        }
    }

    #[test]
    fn legacy_formula_skews_vertical_axis() {
        let symmetric = crop_origin(1, CropFormula::Symmetric);
        let legacy = crop_origin(1, CropFormula::Legacy);
        assert!((symmetric.x_pct - legacy.x_pct).abs() < 1e-9);
        assert!(legacy.y_pct > symmetric.y_pct);
    }

    #[test]
    fn crop_view_clamps_zoom() {
        let view = CropView::new(3, 9, CropFormula::Symmetric);
        assert_eq!(view.zoom, 5);
        assert_eq!(view.background_size_pct, 500);
        assert!(view.background_position().ends_with('%'));
    }

    #[test]
    fn options_contain_answer_and_distinct_distractors() {
        let catalog = SpotCatalog::builtin().unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(5);
        let answer = catalog.position("prontera").unwrap();
        for _ in 0..50 {
            let options = multiple_choice_options(&catalog, answer, &mut rng);
            assert_eq!(options.len(), 4);
            assert_eq!(options.iter().filter(|o| *o == "Prontera").count(), 1);
            let mut unique = options.to_vec();
            unique.sort();
            unique.dedup();
            assert_eq!(unique.len(), 4);
        }
    }

    #[test]
    fn options_shrink_with_small_catalog() {
        let catalog = SpotCatalog::from_spots(vec![
            Spot::new("payon", "payon.png", "Payon"),
            Spot::new("yuno", "yuno.png", "Yuno"),
        ])
        .unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(3);
        let options = multiple_choice_options(&catalog, 0, &mut rng);
        assert_eq!(options.len(), 2);
        assert!(options.iter().any(|o| o == "Payon"));
    }
}
