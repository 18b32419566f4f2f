//! Multi-PV engine output, as handed to the classifier.
//!
//! The engine itself is an external collaborator. Its candidate list
//! arrives here already evaluated and sorted best-first; nothing in this
//! crate re-sorts it. The one exception is [`MultiEngineResponse::from_info_lines`],
//! which assembles the list from raw engine output itself.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::Evaluation;

/// One candidate move from a multi-PV search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineResponse {
    /// The move in UCI notation (e.g., "e2e4").
    #[serde(rename = "move")]
    pub uci: String,
    /// Score from the mover's point of view.
    pub eval: Evaluation,
    /// Depth at which the engine reported this line.
    #[serde(default)]
    pub depth: u32,
}

impl EngineResponse {
    pub fn new(uci: impl Into<String>, eval: Evaluation, depth: u32) -> Self {
        Self {
            uci: uci.into(),
            eval,
            depth,
        }
    }
}

/// The engine's ranked candidate list for one position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiEngineResponse {
    #[serde(default)]
    pub responses: Vec<EngineResponse>,
    /// Depth of the search as a whole.
    #[serde(default)]
    pub depth: u32,
    /// Shallowest depth from which the final first choice stayed the
    /// engine's first choice. `None` when the search history is unknown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_found_depth: Option<u32>,
}

impl MultiEngineResponse {
    pub fn new(responses: Vec<EngineResponse>, depth: u32) -> Self {
        Self {
            responses,
            depth,
            best_found_depth: None,
        }
    }

    /// Records the depth at which the engine settled on its first choice.
    pub fn with_best_found_depth(mut self, depth: u32) -> Self {
        self.best_found_depth = Some(depth);
        self
    }

    /// The engine's first choice.
    #[inline]
    pub fn best(&self) -> Option<&EngineResponse> {
        self.responses.first()
    }

    /// Looks up a candidate by its UCI text.
    pub fn find(&self, uci: &str) -> Option<&EngineResponse> {
        self.responses.iter().find(|r| r.uci == uci)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.responses.len()
    }

    /// Number of distinct scores at least as good as `eval`.
    ///
    /// Candidates sharing a score form one group, so two moves tied for
    /// the best score both have rank 1.
    pub fn score_rank(&self, eval: Evaluation) -> usize {
        let target = eval.centipawns_abs();
        let mut better: Vec<i32> = self
            .responses
            .iter()
            .map(|r| r.eval.centipawns_abs())
            .filter(|&cp| cp >= target)
            .collect();
        better.sort_unstable();
        better.dedup();
        better.len()
    }

    /// Number of candidates scoring exactly `eval`.
    pub fn count_with_score(&self, eval: Evaluation) -> usize {
        let target = eval.centipawns_abs();
        self.responses
            .iter()
            .filter(|r| r.eval.centipawns_abs() == target)
            .count()
    }

    /// Collects UCI `info` lines from a `multipv` search.
    ///
    /// The candidates all come from one iteration: the deepest one that
    /// reported every `multipv` slot, or failing that the deepest one that
    /// reported slot 1. A later line for the same depth and slot replaces
    /// an earlier one. The result is sorted best-first, ties keeping
    /// `multipv` order.
    ///
    /// Bound scores and lines without a principal variation are skipped.
    /// Lines without `multipv` count as slot 1.
    pub fn from_info_lines<'a>(lines: impl IntoIterator<Item = &'a str>) -> Self {
        let mut by_depth: BTreeMap<u32, BTreeMap<u32, EngineResponse>> = BTreeMap::new();
        for line in lines {
            let Some(info) = InfoLine::parse(line) else {
                continue;
            };
            by_depth.entry(info.depth).or_default().insert(
                info.multipv,
                EngineResponse::new(info.first_move, info.eval, info.depth),
            );
        }

        let width = by_depth
            .values()
            .filter_map(|slots| slots.keys().next_back().copied())
            .max()
            .unwrap_or(0);
        let chosen = by_depth
            .iter()
            .rev()
            .find(|(_, slots)| slots.keys().copied().eq(1..=width))
            .or_else(|| by_depth.iter().rev().find(|(_, slots)| slots.contains_key(&1)))
            .or_else(|| by_depth.iter().next_back());
        let Some((&depth, slots)) = chosen else {
            return Self::default();
        };

        let mut responses: Vec<EngineResponse> = slots.values().cloned().collect();
        responses.sort_by_key(|r| Reverse(r.eval.centipawns_abs()));

        let best_found_depth = responses.first().map(|best| {
            by_depth
                .range(..=depth)
                .rev()
                .take_while(|(_, slots)| leader(slots).is_some_and(|l| l.uci == best.uci))
                .last()
                .map_or(depth, |(&d, _)| d)
        });

        Self {
            responses,
            depth,
            best_found_depth,
        }
    }
}

/// The best-scoring line of one iteration, lowest slot on ties.
fn leader(slots: &BTreeMap<u32, EngineResponse>) -> Option<&EngineResponse> {
    slots
        .values()
        .reduce(|a, b| if b.eval.centipawns_abs() > a.eval.centipawns_abs() { b } else { a })
}

struct InfoLine {
    depth: u32,
    multipv: u32,
    eval: Evaluation,
    first_move: String,
}

impl InfoLine {
    /// Format: "info depth X multipv K score cp Y nodes Z pv move1 move2 ..."
    fn parse(line: &str) -> Option<Self> {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.first() != Some(&"info") {
            return None;
        }

        let mut depth: Option<u32> = None;
        let mut multipv: u32 = 1;
        let mut cp: Option<i32> = None;
        let mut mate: Option<i32> = None;
        let mut first_move: Option<&str> = None;

        let mut i = 1;
        while i < parts.len() {
            match parts[i] {
                "depth" => {
                    depth = parts.get(i + 1).and_then(|s| s.parse().ok());
                    i += 1;
                }
                "multipv" => {
                    multipv = parts.get(i + 1).and_then(|s| s.parse().ok()).unwrap_or(1);
                    i += 1;
                }
                "score" => {
                    match parts.get(i + 1) {
                        Some(&"cp") => cp = parts.get(i + 2).and_then(|s| s.parse().ok()),
                        Some(&"mate") => mate = parts.get(i + 2).and_then(|s| s.parse().ok()),
                        _ => {}
                    }
                    i += 2;
                }
                "lowerbound" | "upperbound" => return None,
                "pv" => {
                    first_move = parts.get(i + 1).copied();
                    break;
                }
                _ => {}
            }
            i += 1;
        }

        Some(InfoLine {
            depth: depth?,
            multipv,
            eval: Evaluation::from_uci_score(cp, mate)?,
            first_move: first_move?.to_string(),
        })
    }
}
