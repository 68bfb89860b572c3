use anyhow::{Result, bail};
use regex::Regex;
use rogeo_game::seed_from_text;
use std::collections::HashSet;
use std::sync::LazyLock;

const DEFAULT_SEED: u64 = 1337;
const MAX_RANGE_LEN: u64 = 10_000;

static RANGE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\.\.(=?)(\d+)$").expect("seed range pattern"));

/// Seed plus the text it was derived from, when it came from a phrase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedInfo {
    pub seed: u64,
    pub label: Option<String>,
}

impl SeedInfo {
    #[must_use]
    pub const fn from_numeric(seed: u64) -> Self {
        Self { seed, label: None }
    }

    #[must_use]
    pub fn from_text(text: &str) -> Self {
        Self {
            seed: seed_from_text(text),
            label: Some(text.trim().to_string()),
        }
    }
}

/// Resolve a list of CLI seed arguments into canonical seeds.
///
/// Supports literal integers, `a..b` / `a..=b` ranges, and free text which
/// is hashed the same way the game hashes a typed seed phrase.
pub fn resolve_seed_inputs(tokens: &[String]) -> Result<Vec<SeedInfo>> {
    let mut pending: Vec<SeedInfo> = Vec::new();

    for token in tokens {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }

        if let Ok(value) = token.parse::<u64>() {
            pending.push(SeedInfo::from_numeric(value));
            continue;
        }

        if let Ok(value) = token.parse::<i64>() {
            pending.push(SeedInfo::from_numeric(value.unsigned_abs()));
            continue;
        }

        if let Some(range) = parse_range(token)? {
            pending.extend(range.map(SeedInfo::from_numeric));
            continue;
        }

        pending.push(SeedInfo::from_text(token));
    }

    let mut seen = HashSet::new();
    let mut deduped: Vec<SeedInfo> = pending
        .into_iter()
        .filter(|info| seen.insert(info.seed))
        .collect();

    if deduped.is_empty() {
        deduped.push(SeedInfo::from_numeric(DEFAULT_SEED));
    }

    Ok(deduped)
}

fn parse_range(token: &str) -> Result<Option<std::ops::RangeInclusive<u64>>> {
    let Some(caps) = RANGE_PATTERN.captures(token) else {
        return Ok(None);
    };

    let start: u64 = caps[1].parse()?;
    let end: u64 = caps[3].parse()?;
    let inclusive = !caps[2].is_empty();

    let last = if inclusive {
        end
    } else if end > start {
        end - 1
    } else {
        bail!("Empty seed range: {token}");
    };
    if last < start {
        bail!("Reversed seed range: {token}");
    }
    if last - start >= MAX_RANGE_LEN {
        bail!("Seed range {token} spans more than {MAX_RANGE_LEN} seeds");
    }

    Ok(Some(start..=last))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(raw: &[&str]) -> Vec<String> {
        raw.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn resolves_numbers_ranges_and_text() {
        let seeds = resolve_seed_inputs(&tokens(&["42", "-7", "10..13", "prontera"])).unwrap();
        let values: Vec<u64> = seeds.iter().map(|s| s.seed).collect();
        assert_eq!(&values[..5], &[42, 7, 10, 11, 12]);
        assert_eq!(seeds[5].seed, seed_from_text("prontera"));
        assert_eq!(seeds[5].label.as_deref(), Some("prontera"));
    }

    #[test]
    fn inclusive_ranges_keep_the_end() {
        let seeds = resolve_seed_inputs(&tokens(&["3..=5"])).unwrap();
        assert_eq!(seeds.iter().map(|s| s.seed).collect::<Vec<_>>(), vec![3, 4, 5]);
    }

    #[test]
    fn duplicates_collapse_in_order() {
        let seeds = resolve_seed_inputs(&tokens(&["5", "1..=6", "5"])).unwrap();
        assert_eq!(
            seeds.iter().map(|s| s.seed).collect::<Vec<_>>(),
            vec![5, 1, 2, 3, 4, 6]
        );
    }

    #[test]
    fn bad_ranges_are_rejected() {
        assert!(resolve_seed_inputs(&tokens(&["9..3"])).is_err());
        assert!(resolve_seed_inputs(&tokens(&["4..4"])).is_err());
        assert!(resolve_seed_inputs(&tokens(&["0..=20000"])).is_err());
    }

    #[test]
    fn near_range_tokens_resolve_as_text() {
        let raw = tokens(&["10..12x", "a..5", "3...4"]);
        let first = resolve_seed_inputs(&raw).unwrap();
        assert_eq!(first.len(), 3);
        for (info, token) in first.iter().zip(&raw) {
            assert_eq!(info.seed, seed_from_text(token));
            assert_eq!(info.label.as_deref(), Some(token.as_str()));
        }
        assert_eq!(resolve_seed_inputs(&raw).unwrap(), first);
        let ranged = resolve_seed_inputs(&tokens(&["5..=6", "5..=6x"])).unwrap();
        assert_eq!(ranged[..2], [SeedInfo::from_numeric(5), SeedInfo::from_numeric(6)]);
        assert_eq!(ranged[2].label.as_deref(), Some("5..=6x"));
    }

    #[test]
    fn empty_input_falls_back_to_default() {
        let seeds = resolve_seed_inputs(&tokens(&["", "  "])).unwrap();
        assert_eq!(seeds, vec![SeedInfo::from_numeric(1337)]);
    }
}
