#![deny(warnings)]

//! Simulation engine: one factory, one market source, the player
//! operations, and end-of-season detection.

use sim_core::{Factory, ItemSlot, TransactionError};
use sim_econ::{MarketRng, SeededMarket};
use tracing::debug;

/// The simulation engine: a flat command set over one factory record.
///
/// Commands are issued until the month counter reaches its final value,
/// after which the caller reads the net worth and stops. There are no
/// hidden transitions; every state change goes through one of the methods
/// below.
pub struct Engine<R: MarketRng> {
    factory: Factory,
    rng: R,
}

impl Engine<SeededMarket> {
    /// Engine whose whole season replays from `seed`.
    pub fn from_seed(seed: u64) -> Self {
        Self::new(SeededMarket::from_seed(seed))
    }

    /// Engine seeded from OS entropy.
    pub fn from_entropy() -> Self {
        Self::new(SeededMarket::from_entropy())
    }
}

impl<R: MarketRng> Engine<R> {
    /// Engine with freshly drawn opening prices.
    pub fn new(mut rng: R) -> Self {
        let factory = sim_econ::init_factory(&mut rng);
        debug!(month = factory.month, cash = factory.cash, "opened season");
        Self { factory, rng }
    }

    /// Current factory state, for rendering.
    pub fn factory(&self) -> &Factory {
        &self.factory
    }

    /// Buy raw material. See [`Factory::purchase`].
    pub fn purchase(&mut self, slot: ItemSlot, quantity: u32) -> Result<(), TransactionError> {
        self.factory.purchase(slot, quantity)?;
        debug!(item = %slot, quantity, cash = self.factory.cash, "purchased materials");
        Ok(())
    }

    /// Manufacture finished goods. See [`Factory::manufacture`].
    pub fn manufacture(&mut self, slot: ItemSlot, quantity: u32) -> Result<(), TransactionError> {
        self.factory.manufacture(slot, quantity)?;
        debug!(item = %slot, quantity, cash = self.factory.cash, "manufactured goods");
        Ok(())
    }

    /// Sell finished goods. See [`Factory::sell`].
    pub fn sell(&mut self, slot: ItemSlot, quantity: u32) -> Result<(), TransactionError> {
        self.factory.sell(slot, quantity)?;
        debug!(item = %slot, quantity, cash = self.factory.cash, "sold goods");
        Ok(())
    }

    /// Drift every price and advance the month counter.
    pub fn advance_month(&mut self) {
        sim_econ::advance_month(&mut self.factory, &mut self.rng);
        debug!(month = self.factory.month, "advanced month");
    }

    /// Whether the season has ended; no further commands are issued once
    /// this is true.
    pub fn is_over(&self) -> bool {
        self.factory.season_over()
    }

    /// Final (or interim) score: cash plus inventories at current prices.
    pub fn net_worth(&self) -> i64 {
        self.factory.net_worth()
    }
}
