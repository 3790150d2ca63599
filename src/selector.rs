use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::scanner::FileCandidate;
use crate::seen::SeenSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DedupMode {
    Enabled,
    Disabled,
}

#[derive(Debug, Clone)]
pub struct Pick {
    pub candidate: FileCandidate,
    /// True when the pick came from pool-exhaustion recycling rather than
    /// the fresh (unseen) pool.
    pub recycled: bool,
}

#[derive(Debug)]
pub struct Selection {
    /// Chosen candidates in selection order, identity keys all distinct.
    pub picks: Vec<Pick>,
    pub total_candidates: usize,
    /// Fewer results than requested, even after recycling.
    pub shortfall: bool,
    /// At least one pick was recycled.
    pub recycled: bool,
}

/// Algorithm R: a uniform sample of fixed capacity over a stream of unknown
/// length, one swap decision per offered item.
struct Reservoir {
    slots: Vec<FileCandidate>,
    capacity: usize,
    offered: usize,
}

impl Reservoir {
    fn new(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            capacity,
            offered: 0,
        }
    }

    fn offer(&mut self, candidate: FileCandidate, rng: &mut StdRng) {
        self.offered += 1;
        if self.slots.len() < self.capacity {
            self.slots.push(candidate);
        } else {
            let j = rng.random_range(0..self.offered);
            if j < self.capacity {
                self.slots[j] = candidate;
            }
        }
    }
}

/// Pick up to `count` distinct candidates uniformly at random from a stream.
///
/// With dedup enabled, candidates whose identity is already in `seen` are
/// diverted into a second reservoir. If one full pass leaves the fresh
/// reservoir underfilled, the remaining slots are filled from that recycle
/// reservoir, itself a uniform sample of the seen pool. The candidate stream
/// is consumed exactly once and never materialized.
pub fn select<I>(
    candidates: I,
    seen: &SeenSet,
    count: usize,
    dedup: DedupMode,
    rng: &mut StdRng,
) -> Selection
where
    I: Iterator<Item = FileCandidate>,
{
    let mut fresh = Reservoir::new(count);
    let mut recycle = Reservoir::new(count);
    let mut total_candidates = 0usize;

    for candidate in candidates {
        total_candidates += 1;
        if dedup == DedupMode::Enabled && seen.contains(&candidate.identity) {
            recycle.offer(candidate, rng);
        } else {
            fresh.offer(candidate, rng);
        }
    }

    // Reservoir order is stream-dependent; shuffle so selection order carries
    // no filesystem bias.
    fresh.slots.shuffle(rng);
    recycle.slots.shuffle(rng);

    let mut picks: Vec<Pick> = Vec::with_capacity(count);
    let mut used_identities: HashSet<String> = HashSet::with_capacity(count);

    for candidate in fresh.slots {
        if used_identities.insert(candidate.identity.clone()) {
            picks.push(Pick {
                candidate,
                recycled: false,
            });
        }
    }

    let mut recycled = false;
    if picks.len() < count {
        for candidate in recycle.slots {
            if picks.len() == count {
                break;
            }
            if used_identities.insert(candidate.identity.clone()) {
                picks.push(Pick {
                    candidate,
                    recycled: true,
                });
                recycled = true;
            }
        }
    }

    let shortfall = picks.len() < count;

    Selection {
        picks,
        total_candidates,
        shortfall,
        recycled,
    }
}
