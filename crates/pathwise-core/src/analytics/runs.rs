//! Run-length analysis of completion sequences.
//!
//! The completed/not-completed sequence is decomposed into maximal runs;
//! only runs of completions are reported.

use serde::{Deserialize, Serialize};

use crate::challenge::DailyChallenge;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    /// Number of maximal completion runs
    pub run_count: u32,
    pub average_run_length: f64,
    pub max_run_length: u32,
}

/// Lengths of consecutive `true` runs, in order.
pub fn completion_runs(sequence: &[bool]) -> Vec<u32> {
    let mut runs = Vec::new();
    let mut current = 0u32;
    for &completed in sequence {
        if completed {
            current += 1;
        } else if current > 0 {
            runs.push(current);
            current = 0;
        }
    }
    if current > 0 {
        runs.push(current);
    }
    runs
}

pub fn analyze_runs(sequence: &[bool]) -> RunStats {
    let runs = completion_runs(sequence);
    if runs.is_empty() {
        return RunStats::default();
    }
    let total: u32 = runs.iter().sum();
    RunStats {
        run_count: runs.len() as u32,
        average_run_length: total as f64 / runs.len() as f64,
        max_run_length: runs.iter().copied().max().unwrap_or(0),
    }
}

/// Completion flags in date order.
pub fn completion_sequence(challenges: &[DailyChallenge]) -> Vec<bool> {
    let mut ordered: Vec<&DailyChallenge> = challenges.iter().collect();
    ordered.sort_by_key(|c| (c.date, c.created_at));
    ordered.iter().map(|c| c.is_completed()).collect()
}
