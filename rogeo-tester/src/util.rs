use anyhow::{Context, Result};
use std::{fs, path::Path, path::PathBuf};

pub fn artifacts_dir(base: &Path, scenario: &str, seed: u64) -> PathBuf {
    let slug: String = scenario
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect();
    base.join(slug).join(format!("seed-{seed}"))
}

/// Dump the state of a failed run next to its error chain.
pub fn write_failure_artifacts(
    dir: &Path,
    snapshot: &serde_json::Value,
    transitions: &serde_json::Value,
    error_chain: &str,
) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

    let payload = serde_json::to_vec_pretty(snapshot).unwrap_or_default();
    fs::write(dir.join("snapshot.json"), payload).context("writing snapshot.json")?;

    let payload = serde_json::to_vec_pretty(transitions).unwrap_or_default();
    fs::write(dir.join("transitions.json"), payload).context("writing transitions.json")?;

    fs::write(dir.join("error.txt"), error_chain).context("writing error.txt")?;
    Ok(())
}

pub fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}
