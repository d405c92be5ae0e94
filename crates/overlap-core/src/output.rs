//! PSI output interpretation.
//!
//! The binary's current output contract is positional: its final two
//! non-empty stdout lines are the audience size and the impression
//! count. That coupling is fragile against upstream format changes,
//! which is why it lives behind this one module - if the contract
//! changes, it changes here.

use crate::error::{CoreError, Result};
use crate::invoker::{truncate_detail, MAX_DETAIL_SIZE};
use serde::Serialize;

/// The intersection-derived statistics returned to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PsiOutcome {
    /// Number of identifiers present in both datasets.
    pub audience_size: u64,
    /// Impression count attributed to the intersection.
    pub impressions: u64,
}

/// Parse a PSI run's stdout into a [`PsiOutcome`].
///
/// The second-to-last non-empty line is the audience size, the last is
/// the impression count. Anything else - fewer than two non-empty
/// lines, or a line that is not an integer - is
/// [`CoreError::MalformedOutput`] carrying the raw text, capped to the
/// same size as other failure details. No partial result is ever
/// returned.
pub fn parse(stdout: &str) -> Result<PsiOutcome> {
    let lines: Vec<&str> = stdout
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    if lines.len() < 2 {
        return Err(malformed(stdout));
    }

    let audience_size = parse_count(lines[lines.len() - 2], stdout)?;
    let impressions = parse_count(lines[lines.len() - 1], stdout)?;

    Ok(PsiOutcome {
        audience_size,
        impressions,
    })
}

fn parse_count(line: &str, raw: &str) -> Result<u64> {
    line.parse().map_err(|_| malformed(raw))
}

fn malformed(raw: &str) -> CoreError {
    CoreError::MalformedOutput {
        raw: truncate_detail(raw.to_string(), MAX_DETAIL_SIZE),
    }
}
