//! # Candidate Parser
//!
//! Extracts endpoint candidates from untrusted source text, one per line.
//!
//! For each line:
//! 1. everything from the first `#` onward is dropped,
//! 2. surrounding whitespace is trimmed,
//! 3. empty results are skipped,
//! 4. the rest must match [`ENDPOINT_PATTERN`](super::candidate::ENDPOINT_PATTERN) exactly.
//!
//! Parsing is lazy and borrows the input; calling [`parse`] again on the same
//! text restarts the sequence. Deduplication across sources is left to
//! [`CandidateSet`](super::candidate::CandidateSet).

use super::candidate::{self, Candidate};

/// Parses `raw` into the endpoint candidates it contains, in line order.
pub fn parse(raw: &str) -> impl Iterator<Item = Candidate> + '_ {
    raw.lines().filter_map(parse_line)
}

/// Parses a single line, returning `None` if it holds no endpoint.
pub fn parse_line(line: &str) -> Option<Candidate> {
    let cleaned: &str = strip_comment(line).trim();
    if cleaned.is_empty() || !candidate::is_endpoint(cleaned) {
        return None;
    }
    cleaned.parse().ok()
}

fn strip_comment(line: &str) -> &str {
    match line.split_once('#') {
        Some((content, _comment)) => content,
        None => line,
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
