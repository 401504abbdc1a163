#![deny(warnings)]

//! Market model for the factory simulation.
//!
//! This crate provides:
//! - The injectable random source trait used by the whole economy
//! - Opening price draws for a fresh factory
//! - The monthly price drift (a rejection-sampled random walk)
//!
//! Everything replays deterministically from a seed.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sim_core::{
    Factory, ItemSlot, ITEM_SLOTS, MANUFACTURING_COST_BAND, PRODUCT_VALUE_BAND, RESOURCE_COST_BAND,
};
use std::collections::VecDeque;
use std::ops::RangeInclusive;

/// Uniform integer source injected into the market model.
///
/// There is exactly one logical actor, so implementations need no interior
/// synchronization.
pub trait MarketRng {
    /// Uniform draw over the inclusive range `[min, max]`.
    fn next_in_range(&mut self, min: i64, max: i64) -> i64;
}

/// Production source: ChaCha8, replayable from a 64-bit seed.
pub struct SeededMarket(ChaCha8Rng);

impl SeededMarket {
    /// Source replaying the draw sequence for `seed`.
    pub fn from_seed(seed: u64) -> Self {
        Self(ChaCha8Rng::seed_from_u64(seed))
    }

    /// Source seeded from OS entropy at process start.
    pub fn from_entropy() -> Self {
        Self::from_seed(random_seed())
    }
}

/// Fresh seed from OS entropy, for callers that want to log the seed
/// before constructing the source.
pub fn random_seed() -> u64 {
    rand::random()
}

impl MarketRng for SeededMarket {
    fn next_in_range(&mut self, min: i64, max: i64) -> i64 {
        self.0.gen_range(min..=max)
    }
}

/// Fixed-sequence source for deterministic tests.
///
/// Panics when the script runs dry or a scripted value falls outside the
/// requested range; both indicate a broken test script.
pub struct ScriptedMarket(VecDeque<i64>);

impl ScriptedMarket {
    /// Source returning `values` in order.
    pub fn new(values: impl IntoIterator<Item = i64>) -> Self {
        Self(values.into_iter().collect())
    }
}

impl MarketRng for ScriptedMarket {
    fn next_in_range(&mut self, min: i64, max: i64) -> i64 {
        let value = self.0.pop_front().expect("market script ran dry");
        assert!(
            (min..=max).contains(&value),
            "scripted value {value} outside requested range [{min}, {max}]"
        );
        value
    }
}

/// Drift step for material prices and the manufacturing charge.
const PRICE_STEP: i64 = 2;

/// Drift step for sale prices.
const VALUE_STEP: i64 = 5;

/// Opening factory: month 1, starting cash, empty inventories, prices
/// drawn per slot.
///
/// Opening draws use a half-open upper bound, so a band's ceiling is
/// reachable only through later drift. Draws interleave per slot: cost
/// then value for item 1, then item 2, then item 3.
pub fn init_factory<R: MarketRng + ?Sized>(rng: &mut R) -> Factory {
    let mut resource_cost = [0i64; ITEM_SLOTS];
    let mut product_value = [0i64; ITEM_SLOTS];
    for slot in ItemSlot::ALL {
        let i = slot.index();
        resource_cost[i] =
            rng.next_in_range(*RESOURCE_COST_BAND.start(), *RESOURCE_COST_BAND.end() - 1);
        product_value[i] =
            rng.next_in_range(*PRODUCT_VALUE_BAND.start(), *PRODUCT_VALUE_BAND.end() - 1);
    }
    Factory::new(resource_cost, product_value)
}

/// Advance the factory one month: drift every price, then bump the month
/// counter.
///
/// Each price takes one random-walk step, re-sampled until the candidate
/// lands inside its band; out-of-range candidates are discarded, never
/// clamped. Material prices and the manufacturing charge step by at most
/// 2, sale prices by at most 5.
pub fn advance_month<R: MarketRng + ?Sized>(factory: &mut Factory, rng: &mut R) {
    for slot in ItemSlot::ALL {
        let i = slot.index();
        factory.resource_cost[i] =
            drift(rng, factory.resource_cost[i], PRICE_STEP, RESOURCE_COST_BAND);
        factory.product_value[i] =
            drift(rng, factory.product_value[i], VALUE_STEP, PRODUCT_VALUE_BAND);
    }
    factory.manufacturing_cost = drift(
        rng,
        factory.manufacturing_cost,
        PRICE_STEP,
        MANUFACTURING_COST_BAND,
    );
    factory.month += 1;
}

/// One random-walk step from `current`, re-rolled until it lands in `band`.
fn drift<R: MarketRng + ?Sized>(
    rng: &mut R,
    current: i64,
    step: i64,
    band: RangeInclusive<i64>,
) -> i64 {
    loop {
        let candidate = current + rng.next_in_range(-step, step);
        if band.contains(&candidate) {
            return candidate;
        }
    }
}
