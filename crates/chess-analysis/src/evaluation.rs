//! Chess position evaluation types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Represents a chess position evaluation.
///
/// Evaluations can be either centipawn scores (for normal positions)
/// or mate scores (when a forced mate is found). Both are relative to the
/// side to move: positive is good for the mover.
///
/// Serialized as `{"cp": 35}` or `{"mate": -2}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Evaluation {
    /// Centipawn evaluation
    #[serde(rename = "cp")]
    Centipawns(i32),
    /// Mate in N moves (positive = mover mates, negative = mover is mated)
    #[serde(rename = "mate")]
    Mate(i32),
}

impl Evaluation {
    /// Centipawn value given to a mate on the board.
    pub const MATE_SCORE: i32 = 10_000;

    /// Mate distances beyond this are scored as this distance.
    pub const MAX_MATE_DISTANCE: i32 = 500;

    /// Builds an evaluation from the two optional UCI score fields.
    ///
    /// A mate score takes precedence over a centipawn score.
    pub fn from_uci_score(cp: Option<i32>, mate: Option<i32>) -> Option<Self> {
        match (cp, mate) {
            (_, Some(m)) => Some(Evaluation::Mate(m)),
            (Some(cp), None) => Some(Evaluation::Centipawns(cp)),
            (None, None) => None,
        }
    }

    /// The evaluation on a single centipawn scale.
    ///
    /// Mates map to `±(MATE_SCORE - 10·n)`, so a shorter mate is worth more
    /// and any mate outranks any centipawn score seen in practice. The
    /// distance is capped at [`Self::MAX_MATE_DISTANCE`].
    pub fn centipawns_abs(self) -> i32 {
        match self {
            Evaluation::Centipawns(cp) => cp,
            Evaluation::Mate(n) => {
                let n = n.clamp(-Self::MAX_MATE_DISTANCE, Self::MAX_MATE_DISTANCE);
                if n > 0 {
                    Self::MATE_SCORE - 10 * n
                } else {
                    -Self::MATE_SCORE - 10 * n
                }
            }
        }
    }
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Evaluation::Centipawns(cp) => write!(f, "{:+.2}", cp as f64 / 100.0),
            Evaluation::Mate(n) if n > 0 => write!(f, "+M{}", n),
            Evaluation::Mate(n) => write!(f, "-M{}", n.unsigned_abs()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centipawns_abs() {
        assert_eq!(Evaluation::Centipawns(-35).centipawns_abs(), -35);
        assert_eq!(Evaluation::Mate(1).centipawns_abs(), 9990);
        assert_eq!(Evaluation::Mate(3).centipawns_abs(), 9970);
        assert_eq!(Evaluation::Mate(-2).centipawns_abs(), -9980);
        assert_eq!(Evaluation::Mate(0).centipawns_abs(), -10_000);
        assert!(Evaluation::Mate(1).centipawns_abs() > Evaluation::Mate(2).centipawns_abs());
        assert!(Evaluation::Mate(-5).centipawns_abs() > Evaluation::Mate(-1).centipawns_abs());
    }

    #[test]
    fn test_from_uci_score() {
        assert_eq!(
            Evaluation::from_uci_score(Some(20), None),
            Some(Evaluation::Centipawns(20))
        );
        assert_eq!(
            Evaluation::from_uci_score(Some(20), Some(-3)),
            Some(Evaluation::Mate(-3))
        );
        assert_eq!(Evaluation::from_uci_score(None, None), None);
    }

    #[test]
    fn test_huge_mate_distances_are_capped() {
        assert_eq!(Evaluation::Mate(300_000_000).centipawns_abs(), 5_000);
        assert_eq!(Evaluation::Mate(i32::MIN).centipawns_abs(), -5_000);
        assert_eq!(Evaluation::Mate(500).centipawns_abs(), Evaluation::Mate(600).centipawns_abs());
        assert_eq!(Evaluation::Mate(i32::MIN).to_string(), "-M2147483648");
    }

    #[test]
    fn test_display() {
        assert_eq!(Evaluation::Centipawns(35).to_string(), "+0.35");
        assert_eq!(Evaluation::Centipawns(-120).to_string(), "-1.20");
        assert_eq!(Evaluation::Mate(2).to_string(), "+M2");
        assert_eq!(Evaluation::Mate(-4).to_string(), "-M4");
    }

    #[test]
    fn test_serde_shape() {
        let json = serde_json::to_string(&Evaluation::Centipawns(35)).unwrap();
        assert_eq!(json, r#"{"cp":35}"#);
        let mate: Evaluation = serde_json::from_str(r#"{"mate":-2}"#).unwrap();
        assert_eq!(mate, Evaluation::Mate(-2));
    }
}
