use anyhow::{Context, Result, bail};
use std::collections::HashSet;

/// Resolve CLI seed tokens into a de-duplicated list, in order.
///
/// Accepts decimal integers (negatives use their magnitude), `0x` hex, and
/// half-open `a..b` or inclusive `a..=b` ranges.
pub fn resolve_seed_inputs(tokens: &[String]) -> Result<Vec<u64>> {
    let mut seeds = Vec::new();
    let mut seen = HashSet::new();

    for token in tokens {
        if token.is_empty() {
            continue;
        }
        for seed in parse_token(token)? {
            if seen.insert(seed) {
                seeds.push(seed);
            }
        }
    }

    if seeds.is_empty() {
        seeds.push(1337);
    }
    Ok(seeds)
}

fn parse_token(token: &str) -> Result<Vec<u64>> {
    if let Some((start, end)) = token.split_once("..=") {
        let (start, end) = (parse_seed(start)?, parse_seed(end)?);
        if start > end {
            bail!("empty seed range: {token}");
        }
        return Ok((start..=end).collect());
    }
    if let Some((start, end)) = token.split_once("..") {
        let (start, end) = (parse_seed(start)?, parse_seed(end)?);
        if start >= end {
            bail!("empty seed range: {token}");
        }
        return Ok((start..end).collect());
    }
    Ok(vec![parse_seed(token)?])
}

fn parse_seed(raw: &str) -> Result<u64> {
    let raw = raw.trim();
    if let Some(hex) = raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
    {
        return u64::from_str_radix(&hex.replace('_', ""), 16)
            .with_context(|| format!("invalid hex seed: {raw}"));
    }
    if let Ok(value) = raw.parse::<i64>() {
        return Ok(value.unsigned_abs());
    }
    raw.parse::<u64>()
        .with_context(|| format!("unrecognized seed token: {raw}"))
}
