//! Producer rounds
//!
//! A round is an ordered producer list with a start time. The producer at
//! 1-based slot `k` packs the block stamped `start_time + k * packing_interval`.

use serde::{Deserialize, Serialize};
use shared_types::PublicKey;
use std::collections::{BTreeMap, HashMap};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Round {
    pub index: u64,
    pub start_time: u64,
    /// Seconds between consecutive slots.
    pub packing_interval: u64,
    pub members: Vec<PublicKey>,
    /// Quick lookup by producer key
    #[serde(skip)]
    lookup: HashMap<PublicKey, u32>,
}

impl Round {
    pub fn new(index: u64, start_time: u64, packing_interval: u64, members: Vec<PublicKey>) -> Self {
        let mut round = Self {
            index,
            start_time,
            packing_interval,
            members,
            lookup: HashMap::new(),
        };
        round.rebuild_lookup();
        round
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, producer: &PublicKey) -> bool {
        self.lookup.contains_key(producer)
    }

    /// 1-based slot of `producer`; first occurrence wins for repeated keys.
    pub fn slot_of(&self, producer: &PublicKey) -> Option<u32> {
        self.lookup.get(producer).copied()
    }

    /// Expected timestamp of the block packed in `slot`.
    pub fn slot_time(&self, slot: u32) -> Option<u64> {
        self.packing_interval
            .checked_mul(u64::from(slot))
            .and_then(|offset| self.start_time.checked_add(offset))
    }

    /// Rebuild the lookup table (after deserialization)
    pub fn rebuild_lookup(&mut self) {
        self.lookup.clear();
        for (i, member) in self.members.iter().enumerate() {
            let slot = u32::try_from(i + 1).unwrap_or(u32::MAX);
            self.lookup.entry(*member).or_insert(slot);
        }
    }
}

/// Known rounds of one chain, oldest evicted first.
#[derive(Clone, Debug)]
pub struct RoundSchedule {
    rounds: BTreeMap<u64, Round>,
    max_rounds: usize,
}

impl RoundSchedule {
    pub fn new(max_rounds: usize) -> Self {
        Self {
            rounds: BTreeMap::new(),
            max_rounds: max_rounds.max(1),
        }
    }

    /// Insert or replace a round, evicting the lowest indices past the bound.
    pub fn insert(&mut self, round: Round) {
        self.rounds.insert(round.index, round);
        while self.rounds.len() > self.max_rounds {
            self.rounds.pop_first();
        }
    }

    pub fn get(&self, index: u64) -> Option<&Round> {
        self.rounds.get(&index)
    }

    pub fn latest(&self) -> Option<&Round> {
        self.rounds.values().next_back()
    }

    pub fn len(&self) -> usize {
        self.rounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rounds.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_round(index: u64, members: &[u8]) -> Round {
        Round::new(
            index,
            1_000,
            10,
            members.iter().map(|m| [*m; 32]).collect(),
        )
    }

    #[test]
    fn test_round_slots() {
        let round = create_round(1, &[1, 2, 3]);

        assert_eq!(round.len(), 3);
        assert!(round.contains(&[2; 32]));
        assert_eq!(round.slot_of(&[1; 32]), Some(1));
        assert_eq!(round.slot_of(&[3; 32]), Some(3));
        assert_eq!(round.slot_of(&[9; 32]), None);
        assert_eq!(round.slot_time(2), Some(1_020));
    }

    #[test]
    fn test_slot_time_overflow() {
        let round = Round::new(1, u64::MAX - 5, 10, vec![[1; 32]]);
        assert_eq!(round.slot_time(1), None);
    }

    #[test]
    fn test_lookup_survives_serde() {
        let round = create_round(4, &[5, 6]);
        let json = serde_json::to_string(&round).unwrap();
        let mut back: Round = serde_json::from_str(&json).unwrap();
        assert!(!back.contains(&[6; 32]));
        back.rebuild_lookup();
        assert_eq!(back.slot_of(&[6; 32]), Some(2));
    }

    #[test]
    fn test_schedule_evicts_oldest() {
        let mut schedule = RoundSchedule::new(2);
        schedule.insert(create_round(1, &[1]));
        schedule.insert(create_round(2, &[1]));
        schedule.insert(create_round(3, &[1]));

        assert_eq!(schedule.len(), 2);
        assert!(schedule.get(1).is_none());
        assert_eq!(schedule.latest().map(|r| r.index), Some(3));
    }
}
