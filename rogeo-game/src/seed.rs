//! Seed derivation for shareable runs.
//!
//! A seed token is either a plain number or free text such as `prontera-42`;
//! text is hashed with FNV-1a so the same token always replays the same run.

fn fnv1a64(bytes: &[u8]) -> u64 {
    const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const FNV_PRIME: u64 = 0x0100_0000_01b3;
    let mut hash = FNV_OFFSET;
    for b in bytes {
        hash = (hash ^ u64::from(*b)).wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Hash arbitrary text into a seed. Case and surrounding whitespace are
/// ignored.
#[must_use]
pub fn seed_from_text(text: &str) -> u64 {
    let token = text.trim().to_ascii_lowercase();
    fnv1a64(token.as_bytes())
}

/// Numeric tokens are used verbatim, anything else is hashed.
#[must_use]
pub fn parse_seed(token: &str) -> u64 {
    token
        .trim()
        .parse::<u64>()
        .unwrap_or_else(|_| seed_from_text(token))
}
