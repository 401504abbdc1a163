#![deny(warnings)]

//! Core domain model and invariants for the factory simulation.
//!
//! This crate defines the factory state record, the three transaction
//! operations with their cash/inventory conservation checks, and
//! validation helpers to guarantee basic invariants. Randomness and the
//! monthly price drift live in `sim-econ`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use thiserror::Error;

/// Number of parallel material/product slots.
pub const ITEM_SLOTS: usize = 3;

/// Month on which the season ends and the final net worth is reported.
pub const FINAL_MONTH: u32 = 12;

/// Cash on hand at the start of a season.
pub const STARTING_CASH: i64 = 500;

/// Per-unit manufacturing charge at the start of a season.
pub const STARTING_MANUFACTURING_COST: i64 = 2;

/// Band the per-unit material price drifts within after the opening draw.
pub const RESOURCE_COST_BAND: RangeInclusive<i64> = 10..=20;

/// Band the per-unit sale price drifts within after the opening draw.
pub const PRODUCT_VALUE_BAND: RangeInclusive<i64> = 50..=90;

/// Band the per-unit manufacturing charge drifts within.
pub const MANUFACTURING_COST_BAND: RangeInclusive<i64> = 1..=9;

/// Index of one of the three material/product slots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemSlot(usize);

impl ItemSlot {
    /// All three slots, in display order.
    pub const ALL: [ItemSlot; ITEM_SLOTS] = [ItemSlot(0), ItemSlot(1), ItemSlot(2)];

    /// Returns the slot for a zero-based index, or `None` when out of range.
    pub fn new(index: usize) -> Option<Self> {
        (index < ITEM_SLOTS).then_some(ItemSlot(index))
    }

    /// Zero-based index into the state arrays.
    pub fn index(self) -> usize {
        self.0
    }

    /// The two slots other than this one.
    ///
    /// Manufacturing consumes raw material from these, never from the
    /// target's own stock.
    pub fn others(self) -> [ItemSlot; ITEM_SLOTS - 1] {
        match self.0 {
            0 => [ItemSlot(1), ItemSlot(2)],
            1 => [ItemSlot(0), ItemSlot(2)],
            _ => [ItemSlot(0), ItemSlot(1)],
        }
    }
}

impl fmt::Display for ItemSlot {
    /// Renders as the 1-based item number used in menus.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0 + 1)
    }
}

/// Complete state of one factory over one season.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Factory {
    /// Raw material units held, per slot.
    pub resources: [u32; ITEM_SLOTS],
    /// Per-unit material purchase price, per slot.
    pub resource_cost: [i64; ITEM_SLOTS],
    /// Finished goods held, per slot.
    pub finished_products: [u32; ITEM_SLOTS],
    /// Per-unit sale price, per slot.
    pub product_value: [i64; ITEM_SLOTS],
    /// Cash on hand; no transaction may drive this negative.
    pub cash: i64,
    /// Charge per unit manufactured, regardless of slot.
    pub manufacturing_cost: i64,
    /// Current month, 1..=12.
    pub month: u32,
}

impl Factory {
    /// Opening state with the given price draws: month 1, starting cash,
    /// empty inventories.
    pub fn new(resource_cost: [i64; ITEM_SLOTS], product_value: [i64; ITEM_SLOTS]) -> Self {
        Self {
            resources: [0; ITEM_SLOTS],
            resource_cost,
            finished_products: [0; ITEM_SLOTS],
            product_value,
            cash: STARTING_CASH,
            manufacturing_cost: STARTING_MANUFACTURING_COST,
            month: 1,
        }
    }

    /// Buy `quantity` units of raw material for `slot` at the current
    /// per-unit price.
    ///
    /// Refused without touching state when the total cost exceeds cash.
    /// Quantity zero is a legal no-op.
    pub fn purchase(&mut self, slot: ItemSlot, quantity: u32) -> Result<(), TransactionError> {
        let cost = i64::from(quantity) * self.resource_cost[slot.index()];
        if cost > self.cash {
            return Err(TransactionError::InsufficientFunds {
                needed: cost,
                available: self.cash,
            });
        }
        self.cash -= cost;
        self.resources[slot.index()] += quantity;
        Ok(())
    }

    /// Manufacture `quantity` finished goods for `slot`.
    ///
    /// Each unit produced consumes one unit of raw material from *each of
    /// the two other slots*; the target's own material stock is untouched.
    /// The charge is `quantity * manufacturing_cost` whatever the slot.
    /// Funds are checked before materials, and on any refusal nothing
    /// mutates.
    pub fn manufacture(&mut self, slot: ItemSlot, quantity: u32) -> Result<(), TransactionError> {
        let cost = i64::from(quantity) * self.manufacturing_cost;
        if cost > self.cash {
            return Err(TransactionError::InsufficientFunds {
                needed: cost,
                available: self.cash,
            });
        }
        for other in slot.others() {
            let held = self.resources[other.index()];
            if held < quantity {
                return Err(TransactionError::InsufficientMaterials {
                    slot: other,
                    needed: quantity,
                    available: held,
                });
            }
        }
        for other in slot.others() {
            self.resources[other.index()] -= quantity;
        }
        self.cash -= cost;
        self.finished_products[slot.index()] += quantity;
        Ok(())
    }

    /// Sell `quantity` finished goods from `slot` at the current per-unit
    /// sale price.
    pub fn sell(&mut self, slot: ItemSlot, quantity: u32) -> Result<(), TransactionError> {
        let held = self.finished_products[slot.index()];
        if quantity > held {
            return Err(TransactionError::InsufficientStock {
                needed: quantity,
                available: held,
            });
        }
        self.finished_products[slot.index()] -= quantity;
        self.cash += i64::from(quantity) * self.product_value[slot.index()];
        Ok(())
    }

    /// Cash plus both inventories valued at current prices.
    pub fn net_worth(&self) -> i64 {
        let mut worth = self.cash;
        for slot in ItemSlot::ALL {
            let i = slot.index();
            worth += self.product_value[i] * i64::from(self.finished_products[i]);
            worth += self.resource_cost[i] * i64::from(self.resources[i]);
        }
        worth
    }

    /// Whether the season has ended and the final report is due.
    pub fn season_over(&self) -> bool {
        self.month >= FINAL_MONTH
    }
}

/// Reasons a transaction is refused. Refusal never mutates state.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransactionError {
    /// The transaction costs more than the cash on hand.
    #[error("insufficient funds: need ${needed}, have ${available}")]
    InsufficientFunds {
        /// Total cost of the requested transaction.
        needed: i64,
        /// Cash on hand.
        available: i64,
    },
    /// An other-slot material stock is too small for the production run.
    #[error("insufficient materials for item {slot}: need {needed}, have {available}")]
    InsufficientMaterials {
        /// First other slot found short of material.
        slot: ItemSlot,
        /// Units required from that slot.
        needed: u32,
        /// Units actually held.
        available: u32,
    },
    /// Sale quantity exceeds the finished goods held.
    #[error("insufficient stock: need {needed}, have {available}")]
    InsufficientStock {
        /// Units requested for sale.
        needed: u32,
        /// Units actually held.
        available: u32,
    },
}

/// Validation errors for state invariants.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Month counter outside the season.
    #[error("month {0} is out of range [1, 12]")]
    MonthOutOfRange(u32),
    /// Cash went negative.
    #[error("cash must be non-negative, got {0}")]
    NegativeCash(i64),
    /// Material price escaped its band.
    #[error("material price ${price} for item {slot} is outside [10, 20]")]
    ResourceCostOutOfBand {
        /// Slot holding the bad price.
        slot: ItemSlot,
        /// The out-of-band price.
        price: i64,
    },
    /// Sale price escaped its band.
    #[error("sale price ${price} for item {slot} is outside [50, 90]")]
    ProductValueOutOfBand {
        /// Slot holding the bad price.
        slot: ItemSlot,
        /// The out-of-band price.
        price: i64,
    },
    /// Manufacturing charge escaped its band.
    #[error("manufacturing cost ${0} is outside [1, 9]")]
    ManufacturingCostOutOfBand(i64),
}

/// Validate a factory record against the band and sign invariants.
pub fn validate_factory(factory: &Factory) -> Result<(), ValidationError> {
    if !(1..=FINAL_MONTH).contains(&factory.month) {
        return Err(ValidationError::MonthOutOfRange(factory.month));
    }
    if factory.cash < 0 {
        return Err(ValidationError::NegativeCash(factory.cash));
    }
    for slot in ItemSlot::ALL {
        let i = slot.index();
        if !RESOURCE_COST_BAND.contains(&factory.resource_cost[i]) {
            return Err(ValidationError::ResourceCostOutOfBand {
                slot,
                price: factory.resource_cost[i],
            });
        }
        if !PRODUCT_VALUE_BAND.contains(&factory.product_value[i]) {
            return Err(ValidationError::ProductValueOutOfBand {
                slot,
                price: factory.product_value[i],
            });
        }
    }
    if !MANUFACTURING_COST_BAND.contains(&factory.manufacturing_cost) {
        return Err(ValidationError::ManufacturingCostOutOfBand(
            factory.manufacturing_cost,
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn slot(i: usize) -> ItemSlot {
        ItemSlot::new(i).unwrap()
    }

    fn factory() -> Factory {
        Factory::new([10, 12, 14], [60, 70, 80])
    }

    #[test]
    fn opening_state_matches_season_start() {
        let f = factory();
        assert_eq!(f.month, 1);
        assert_eq!(f.cash, STARTING_CASH);
        assert_eq!(f.manufacturing_cost, STARTING_MANUFACTURING_COST);
        assert_eq!(f.resources, [0; ITEM_SLOTS]);
        assert_eq!(f.finished_products, [0; ITEM_SLOTS]);
        assert!(!f.season_over());
        validate_factory(&f).unwrap();
    }

    #[test]
    fn purchase_spends_exactly_the_cost() {
        let mut f = Factory::new([10, 10, 10], [60, 70, 80]);
        f.purchase(slot(0), 50).unwrap();
        assert_eq!(f.cash, 0);
        assert_eq!(f.resources[0], 50);
    }

    #[test]
    fn purchase_refused_beyond_cash_leaves_state_alone() {
        let mut f = Factory::new([10, 10, 10], [60, 70, 80]);
        let before = f.clone();
        let err = f.purchase(slot(0), 51).unwrap_err();
        assert_eq!(
            err,
            TransactionError::InsufficientFunds {
                needed: 510,
                available: 500
            }
        );
        assert_eq!(f, before);
    }

    #[test]
    fn manufacture_consumes_the_other_two_materials() {
        let mut f = factory();
        f.resources = [10, 10, 10];
        f.manufacturing_cost = 1;
        f.cash = 100;
        f.manufacture(slot(1), 10).unwrap();
        assert_eq!(f.resources, [0, 10, 0]);
        assert_eq!(f.finished_products, [0, 10, 0]);
        assert_eq!(f.cash, 90);
    }

    #[test]
    fn manufacture_checks_funds_before_materials() {
        let mut f = factory();
        f.cash = 0;
        let before = f.clone();
        let err = f.manufacture(slot(1), 1).unwrap_err();
        assert!(matches!(err, TransactionError::InsufficientFunds { .. }));
        assert_eq!(f, before);
    }

    #[test]
    fn manufacture_refused_without_materials() {
        let mut f = factory();
        f.resources = [5, 0, 4];
        let err = f.manufacture(slot(1), 5).unwrap_err();
        assert_eq!(
            err,
            TransactionError::InsufficientMaterials {
                slot: slot(2),
                needed: 5,
                available: 4
            }
        );
        assert_eq!(f.resources, [5, 0, 4]);
        assert_eq!(f.finished_products, [0; ITEM_SLOTS]);
    }

    #[test]
    fn sell_pays_current_price() {
        let mut f = factory();
        f.finished_products = [5, 0, 0];
        f.product_value[0] = 60;
        let err = f.sell(slot(0), 6).unwrap_err();
        assert_eq!(
            err,
            TransactionError::InsufficientStock {
                needed: 6,
                available: 5
            }
        );
        assert_eq!(f.finished_products[0], 5);
        let cash = f.cash;
        f.sell(slot(0), 5).unwrap();
        assert_eq!(f.cash, cash + 300);
        assert_eq!(f.finished_products[0], 0);
    }

    #[test]
    fn zero_quantity_transactions_are_no_ops() {
        let mut f = factory();
        let before = f.clone();
        for s in ItemSlot::ALL {
            f.purchase(s, 0).unwrap();
            f.manufacture(s, 0).unwrap();
            f.sell(s, 0).unwrap();
        }
        assert_eq!(f, before);
        assert_eq!(f.net_worth(), before.net_worth());
    }

    #[test]
    fn others_never_contains_the_slot_itself() {
        for s in ItemSlot::ALL {
            let others = s.others();
            assert_eq!(others.len(), 2);
            assert!(!others.contains(&s));
        }
    }

    #[test]
    fn validation_flags_out_of_band_state() {
        let mut f = factory();
        f.cash = -1;
        assert_eq!(validate_factory(&f), Err(ValidationError::NegativeCash(-1)));
        let mut f = factory();
        f.resource_cost[2] = 25;
        assert!(matches!(
            validate_factory(&f),
            Err(ValidationError::ResourceCostOutOfBand { .. })
        ));
    }

    #[test]
    fn serde_roundtrip_factory() {
        let mut f = factory();
        f.resources = [3, 0, 7];
        f.cash = 123;
        let s = serde_json::to_string(&f).unwrap();
        let back: Factory = serde_json::from_str(&s).unwrap();
        assert_eq!(back, f);
    }

    proptest! {
        #[test]
        fn purchase_preserves_net_worth(qty in 0u32..100, cost in 10i64..=20) {
            let mut f = Factory::new([cost; ITEM_SLOTS], [60, 70, 80]);
            f.cash = 10_000;
            let worth = f.net_worth();
            f.purchase(slot(1), qty).unwrap();
            prop_assert_eq!(f.net_worth(), worth);
        }

        #[test]
        fn sell_preserves_net_worth(qty in 0u32..100, value in 50i64..=90) {
            let mut f = Factory::new([10, 10, 10], [value; ITEM_SLOTS]);
            f.finished_products = [100; ITEM_SLOTS];
            let worth = f.net_worth();
            f.sell(slot(2), qty).unwrap();
            prop_assert_eq!(f.net_worth(), worth);
        }

        #[test]
        fn failed_transactions_never_mutate(qty in 1u32..1000) {
            let mut f = Factory::new([20, 20, 20], [50, 50, 50]);
            f.cash = 0;
            let before = f.clone();
            prop_assert!(f.purchase(slot(0), qty).is_err());
            prop_assert!(f.manufacture(slot(0), qty).is_err());
            prop_assert!(f.sell(slot(0), qty).is_err());
            prop_assert_eq!(f, before);
        }
    }
}
