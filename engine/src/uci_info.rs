//! Formatting for the UCI `info` line emitted once per completed
//! iterative-deepening iteration (spec.md §6).

use std::fmt::{self, Display};

use chess::movegen::moves::Move;

use crate::score::{Score, ScoreExt, MATE};

/// One completed iteration's worth of search statistics.
#[derive(Debug, Clone)]
pub struct SearchInfo {
    pub depth: u8,
    pub seldepth: usize,
    pub time_ms: u64,
    pub nodes: u64,
    pub score: Score,
    pub pv: Vec<Move>,
}

impl Display for SearchInfo {
    /// `info depth D score (cp N | mate M) time MS nodes K nps R pv UCI`
    /// (spec.md §6).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "info depth {} seldepth {} score {}", self.depth, self.seldepth, self.score_token())?;
        write!(f, " time {} nodes {}", self.time_ms, self.nodes)?;

        if self.time_ms > 0 {
            let nps = self.nodes * 1000 / self.time_ms;
            write!(f, " nps {nps}")?;
        }

        if !self.pv.is_empty() {
            write!(f, " pv")?;
            for mv in &self.pv {
                write!(f, " {mv}")?;
            }
        }

        Ok(())
    }
}

impl SearchInfo {
    /// `cp N` or `mate M`, per spec.md §6's conversion:
    /// `mate = sign(score) * ceil((MATE - |score|) / 2)`.
    fn score_token(&self) -> String {
        if self.score.is_mate() {
            let plies_to_mate = MATE - self.score.abs();
            let full_moves = (plies_to_mate + 1) / 2;
            format!("mate {}", self.score.signum() * full_moves)
        } else {
            format!("cp {}", self.score)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn cp_score_formats_as_centipawns() {
        let info = SearchInfo {
            depth: 4,
            seldepth: 6,
            time_ms: 1000,
            nodes: 5000,
            score: 37,
            pv: vec![Move::from_str("e2e4").unwrap()],
        };

        let line = info.to_string();
        assert!(line.contains("score cp 37"));
        assert!(line.contains("nodes 5000"));
        assert!(line.contains("nps 5000"));
        assert!(line.contains("pv e2e4"));
    }

    #[test]
    fn mate_score_formats_as_mate_in_full_moves() {
        let info = SearchInfo {
            depth: 5,
            seldepth: 5,
            time_ms: 500,
            nodes: 100,
            score: MATE - 3,
            pv: vec![],
        };

        assert!(info.to_string().contains("score mate 2"));
    }

    #[test]
    fn zero_elapsed_time_omits_nps_instead_of_dividing_by_zero() {
        let info = SearchInfo {
            depth: 1,
            seldepth: 1,
            time_ms: 0,
            nodes: 0,
            score: 0,
            pv: vec![],
        };

        assert!(!info.to_string().contains("nps"));
    }
}
