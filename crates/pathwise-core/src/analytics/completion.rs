//! Completion, effort and preference statistics.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::challenge::{Category, DailyChallenge, Difficulty};

/// Completion counts for one grouping key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PreferenceStat {
    pub total: u32,
    pub completed: u32,
    /// Ratio of completed challenges (0.0 to 1.0)
    pub completion_rate: f64,
}

impl PreferenceStat {
    fn record(&mut self, completed: bool) {
        self.total += 1;
        if completed {
            self.completed += 1;
        }
        self.completion_rate = ratio(self.completed, self.total);
    }
}

/// `completed / total`, 0 when there is nothing to divide.
pub fn ratio(completed: u32, total: u32) -> f64 {
    if total == 0 {
        0.0
    } else {
        completed as f64 / total as f64
    }
}

pub fn completion_rate(challenges: &[DailyChallenge]) -> f64 {
    let completed = challenges.iter().filter(|c| c.is_completed()).count() as u32;
    ratio(completed, challenges.len() as u32)
}

/// Mean effort over completed challenges that recorded one; 0 if none.
pub fn average_effort(challenges: &[DailyChallenge]) -> f64 {
    let efforts: Vec<u8> = challenges
        .iter()
        .filter_map(|c| c.effort_level())
        .map(|e| e.get())
        .collect();

    if efforts.is_empty() {
        return 0.0;
    }
    efforts.iter().map(|&e| e as f64).sum::<f64>() / efforts.len() as f64
}

/// Per-key completion rate.
pub fn grouped_completion<K, F>(challenges: &[DailyChallenge], key: F) -> BTreeMap<K, PreferenceStat>
where
    K: Ord,
    F: Fn(&DailyChallenge) -> K,
{
    let mut groups: BTreeMap<K, PreferenceStat> = BTreeMap::new();
    for challenge in challenges {
        groups
            .entry(key(challenge))
            .or_default()
            .record(challenge.is_completed());
    }
    groups
}

pub fn category_preference(challenges: &[DailyChallenge]) -> BTreeMap<Category, PreferenceStat> {
    grouped_completion(challenges, DailyChallenge::category)
}

pub fn difficulty_preference(challenges: &[DailyChallenge]) -> BTreeMap<Difficulty, PreferenceStat> {
    grouped_completion(challenges, DailyChallenge::difficulty)
}

/// Key with the highest completion rate; ties go to the larger sample.
pub fn strongest<K: Ord + Copy>(groups: &BTreeMap<K, PreferenceStat>) -> Option<K> {
    groups
        .iter()
        .filter(|(_, s)| s.total > 0)
        .max_by(|a, b| {
            a.1.completion_rate
                .total_cmp(&b.1.completion_rate)
                .then(a.1.total.cmp(&b.1.total))
        })
        .map(|(k, _)| *k)
}
