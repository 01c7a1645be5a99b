//! UCI text protocol: commands we send and the engine lines we understand.

use crate::score::EngineScore;

/// Whether an `info` score is exact or only a search bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBound {
    Exact,
    Lower,
    Upper,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoScore {
    pub depth: Option<u32>,
    pub score: EngineScore,
    pub bound: ScoreBound,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineLine {
    IdName(String),
    UciOk,
    ReadyOk,
    /// An `info` line carrying a score.
    Info(InfoScore),
    /// `bestmove`; `None` when the engine has no move (`(none)` or `0000`).
    BestMove(Option<String>),
    Other,
}

pub fn parse_line(line: &str) -> EngineLine {
    let mut tokens = line.split_whitespace();
    match tokens.next() {
        Some("uciok") => EngineLine::UciOk,
        Some("readyok") => EngineLine::ReadyOk,
        Some("id") => match tokens.next() {
            Some("name") => EngineLine::IdName(tokens.collect::<Vec<_>>().join(" ")),
            _ => EngineLine::Other,
        },
        Some("bestmove") => match tokens.next() {
            Some("(none)") | Some("0000") | None => EngineLine::BestMove(None),
            Some(mv) => EngineLine::BestMove(Some(mv.to_string())),
        },
        Some("info") => parse_info(tokens.collect()),
        _ => EngineLine::Other,
    }
}

fn parse_info(tokens: Vec<&str>) -> EngineLine {
    let mut depth = None;
    let mut score = None;
    let mut bound = ScoreBound::Exact;

    let mut i = 0;
    while i < tokens.len() {
        match tokens[i] {
            // Free text until end of line.
            "string" => break,
            "depth" => {
                depth = tokens.get(i + 1).and_then(|t| t.parse().ok());
                i += 2;
            }
            "score" => {
                let value = tokens.get(i + 2).and_then(|t| t.parse::<i32>().ok());
                score = match (tokens.get(i + 1).copied(), value) {
                    (Some("cp"), Some(v)) => Some(EngineScore::Centipawns(v)),
                    (Some("mate"), Some(v)) => Some(EngineScore::Mate(v)),
                    _ => None,
                };
                i += 3;
            }
            "lowerbound" => {
                bound = ScoreBound::Lower;
                i += 1;
            }
            "upperbound" => {
                bound = ScoreBound::Upper;
                i += 1;
            }
            // The principal variation runs to the end of the line.
            "pv" => break,
            _ => i += 1,
        }
    }

    match score {
        Some(score) => EngineLine::Info(InfoScore {
            depth,
            score,
            bound,
        }),
        None => EngineLine::Other,
    }
}

/// `position startpos [moves ...]` for the given UCI move sequence.
pub fn position_command<S: AsRef<str>>(moves: &[S]) -> String {
    let mut cmd = String::from("position startpos");
    if !moves.is_empty() {
        cmd.push_str(" moves");
        for mv in moves {
            cmd.push(' ');
            cmd.push_str(mv.as_ref());
        }
    }
    cmd
}

pub fn go_movetime_command(millis: u128) -> String {
    format!("go movetime {millis}")
}

pub fn setoption_command(name: &str, value: &str) -> String {
    format!("setoption name {name} value {value}")
}

/// Tracks the score to report for a search while `info` lines stream in.
///
/// The latest exact score wins; a bound is used only if no exact score was
/// ever reported.
#[derive(Debug, Default)]
pub struct ScoreTracker {
    exact: Option<EngineScore>,
    bound: Option<EngineScore>,
}

impl ScoreTracker {
    pub fn observe(&mut self, info: &InfoScore) {
        match info.bound {
            ScoreBound::Exact => self.exact = Some(info.score),
            ScoreBound::Lower | ScoreBound::Upper => self.bound = Some(info.score),
        }
    }

    pub fn best(&self) -> Option<EngineScore> {
        self.exact.or(self.bound)
    }
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod protocol_tests;
