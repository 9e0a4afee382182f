//! Locates a hunk's context unambiguously within a file's lines.
//!
//! [`find_hunk`] runs scope narrowing (§4.3 step 1) then a tiered context
//! match (step 2), returning the zero-based starting line and the fuzz level
//! that was required to find it.

use super::{Hunk, PatchError};

/// Fuzz contributed by a trailing-whitespace-only difference.
pub const FUZZ_TRAILING_WS: u32 = 1;
/// Fuzz contributed by collapsing all whitespace runs.
pub const FUZZ_COLLAPSED_WS: u32 = 100;
/// Penalty added when an EOF-biased hunk is matched away from the true EOF.
pub const FUZZ_EOF_PENALTY: u32 = 10_000;

fn collapse_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// One normalization tier used for context matching, strictest first.
enum Tier {
    Exact,
    TrimEnd,
    CollapseWs,
}

impl Tier {
    fn fuzz(&self) -> u32 {
        match self {
            Tier::Exact => 0,
            Tier::TrimEnd => FUZZ_TRAILING_WS,
            Tier::CollapseWs => FUZZ_COLLAPSED_WS,
        }
    }

    fn normalize(&self, s: &str) -> String {
        match self {
            Tier::Exact => s.to_string(),
            Tier::TrimEnd => s.trim_end().to_string(),
            Tier::CollapseWs => collapse_ws(s),
        }
    }

    fn eq(&self, a: &str, b: &str) -> bool {
        self.normalize(a) == self.normalize(b)
    }
}

/// Whether a block starting at `p` with length `len` may be considered to
/// "end at EOF", including the trailing-empty-line-from-final-`\n` case.
fn ends_at_eof(lines: &[String], p: usize, len: usize) -> bool {
    let end = p + len;
    if end == lines.len() {
        return true;
    }
    if end + 1 == lines.len() && lines.last().map(|l| l.is_empty()).unwrap_or(false) {
        return true;
    }
    false
}

fn candidates_at_tier(
    lines: &[String],
    old: &[String],
    start: usize,
    tier: &Tier,
) -> Vec<usize> {
    let len = old.len();
    if len == 0 || start + len > lines.len() {
        return vec![];
    }
    let mut out = Vec::new();
    for p in start..=(lines.len() - len) {
        if (0..len).all(|i| tier.eq(&lines[p + i], &old[i])) {
            out.push(p);
        }
    }
    out
}

/// Scope narrowing: finds the unique line for each scope signature in
/// sequence, advancing the cursor past each match. Returns the new cursor and
/// the maximum fuzz incurred.
fn narrow_scope(lines: &[String], scopes: &[String], start: usize) -> Result<(usize, u32), PatchError> {
    let mut cursor = start;
    let mut max_fuzz = 0u32;
    for sig in scopes {
        let starts_with: Vec<usize> = (cursor..lines.len())
            .filter(|&i| lines[i].trim_start().starts_with(sig.as_str()))
            .collect();
        let (found, fuzz) = if starts_with.len() == 1 {
            (starts_with[0], 0u32)
        } else if starts_with.len() > 1 {
            return Err(PatchError::AmbiguousScope {
                signature: sig.clone(),
                candidates: starts_with.len(),
            });
        } else {
            let contains: Vec<usize> = (cursor..lines.len())
                .filter(|&i| lines[i].contains(sig.as_str()))
                .collect();
            if contains.len() == 1 {
                (contains[0], FUZZ_TRAILING_WS)
            } else if contains.len() > 1 {
                return Err(PatchError::AmbiguousScope {
                    signature: sig.clone(),
                    candidates: contains.len(),
                });
            } else {
                return Err(PatchError::NoMatch);
            }
        };
        cursor = found + 1;
        max_fuzz = max_fuzz.max(fuzz);
    }
    Ok((cursor, max_fuzz))
}

/// Finds the zero-based start line for `hunk` in `lines`, searching from
/// `start` onward. Returns `(position, fuzz_level)`.
pub fn find_hunk(lines: &[String], hunk: &Hunk, start: usize) -> Result<(usize, u32), PatchError> {
    let (cursor, scope_fuzz) = narrow_scope(lines, &hunk.scope_lines, start)?;

    if hunk.old_lines.is_empty() {
        if hunk.is_eof && hunk.scope_lines.is_empty() {
            return Ok((lines.len(), scope_fuzz));
        }
        return Ok((cursor, scope_fuzz));
    }

    let tiers = [Tier::Exact, Tier::TrimEnd, Tier::CollapseWs];
    for tier in tiers.iter() {
        let candidates = candidates_at_tier(lines, &hunk.old_lines, cursor, tier);
        if candidates.is_empty() {
            continue;
        }
        if hunk.is_eof {
            let eof_candidates: Vec<usize> = candidates
                .iter()
                .copied()
                .filter(|&p| ends_at_eof(lines, p, hunk.old_lines.len()))
                .collect();
            if let Some(&p) = eof_candidates.iter().max() {
                return Ok((p, scope_fuzz.max(tier.fuzz())));
            }
            let p = *candidates.iter().max().unwrap();
            return Ok((p, scope_fuzz.max(tier.fuzz()) + FUZZ_EOF_PENALTY));
        }
        if candidates.len() == 1 {
            return Ok((candidates[0], scope_fuzz.max(tier.fuzz())));
        }
        let mut reported = candidates.clone();
        reported.truncate(5);
        return Err(PatchError::AmbiguousContext { candidates: reported });
    }
    Err(PatchError::NoMatch)
}
