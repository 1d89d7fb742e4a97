//! Seedable random number generation.
//!
//! RULE: Nothing in the core may call a platform RNG.
//! All randomness flows through BotRng instances derived
//! from a single master seed chosen at process entry.
//!
//! Each slot gets its own stream, seeded from (master_seed XOR slot_index),
//! so adding a new slot never changes the draws of existing ones.

use rand::seq::{index, SliceRandom};
use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

/// A named, deterministic RNG stream.
pub struct BotRng {
    pub name: &'static str,
    inner: Pcg64Mcg,
}

impl BotRng {
    /// Create a stream from the master seed and a stable slot index.
    /// The index must never change once assigned.
    pub fn new(master_seed: u64, slot_index: u64) -> Self {
        let derived_seed = master_seed ^ (slot_index.wrapping_mul(0x9e37_79b9_7f4a_7c15));
        Self {
            name: "unnamed",
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Draw a raw u64 (full range).
    pub fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    /// Pick one element uniformly. `None` on an empty slice.
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        items.choose(&mut self.inner)
    }

    /// Uniform in-place shuffle.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.inner);
    }

    /// Draw `k` elements without replacement, in draw order.
    /// Returns `None` when fewer than `k` elements are available.
    pub fn sample<T: Clone>(&mut self, items: &[T], k: usize) -> Option<Vec<T>> {
        if k > items.len() {
            return None;
        }
        let drawn = index::sample(&mut self.inner, items.len(), k)
            .into_iter()
            .map(|i| items[i].clone())
            .collect();
        Some(drawn)
    }
}

/// Derives every stream the bot needs from one master seed.
pub struct RngBank {
    master_seed: u64,
}

impl RngBank {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    pub fn for_slot(&self, slot: RngSlot) -> BotRng {
        BotRng::new(self.master_seed, slot as u64).with_name(slot.name())
    }
}

/// Stable slot assignments.
/// NEVER reorder or remove entries; only append.
/// Reordering changes every slot's seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum RngSlot {
    Team = 0,
    Chaos = 1,
}

impl RngSlot {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Team => "team",
            Self::Chaos => "chaos",
        }
    }
}
