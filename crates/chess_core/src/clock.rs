//! `[%clk H:MM:SS]` annotations embedded in move comments.

use std::sync::OnceLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::pgn::ParsedPgn;

/// Remaining clock time of the side that just moved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClockReading {
    /// 1-based ply the reading follows.
    pub move_number: u32,
    pub seconds: f64,
    /// The annotation as written, e.g. `0:02:59.9`.
    pub text: String,
}

const CLOCK_PARTS: &str = r"(\d+):(\d{2}):(\d{2}(?:\.\d+)?)";

fn annotation_re() -> &'static Regex {
    static ANNOTATION: OnceLock<Regex> = OnceLock::new();
    ANNOTATION.get_or_init(|| {
        Regex::new(&format!(r"\[%clk\s+({CLOCK_PARTS})\s*\]")).expect("valid clock regex")
    })
}

fn clock_re() -> &'static Regex {
    static CLOCK: OnceLock<Regex> = OnceLock::new();
    CLOCK.get_or_init(|| Regex::new(&format!("^{CLOCK_PARTS}$")).expect("valid clock regex"))
}

pub fn extract_clocks(parsed: &ParsedPgn) -> Vec<ClockReading> {
    parsed
        .moves
        .iter()
        .filter_map(|mv| {
            let comment = mv.comment.as_deref()?;
            let caps = annotation_re().captures(comment)?;
            let seconds = clock_seconds(&caps, 2)?;
            Some(ClockReading {
                move_number: mv.played.move_number,
                seconds,
                text: caps[1].to_string(),
            })
        })
        .collect()
}

/// Parse `H:MM:SS` or `H:MM:SS.d` into seconds.
pub fn parse_clock(text: &str) -> Option<f64> {
    let caps = clock_re().captures(text)?;
    clock_seconds(&caps, 1)
}

/// Hours, minutes and seconds start at capture group `first`.
fn clock_seconds(caps: &Captures<'_>, first: usize) -> Option<f64> {
    let hours: f64 = caps[first].parse().ok()?;
    let minutes: f64 = caps[first + 1].parse().ok()?;
    let seconds: f64 = caps[first + 2].parse().ok()?;
    if minutes >= 60.0 || seconds >= 60.0 {
        return None;
    }
    let total = hours * 3600.0 + minutes * 60.0 + seconds;
    total.is_finite().then_some(total)
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod clock_tests;
