//! Limit order crossing against aggregated depth
//!
//! Matching is level-aggregated: an incoming order consumes whole-level
//! quantity best-first, there is no per-order queue inside a level.

use crate::ladder::{is_negligible, Orientation, PriceLevelSide};
use depth_types::{Level, OrderSide, TopOfBook};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Consume marketable liquidity from `contra` for an order limited at `limit`.
///
/// Returns the fills (best first) and the unfilled remainder.
pub(crate) fn sweep<O: Orientation>(
    contra: &mut PriceLevelSide<O>,
    limit: Decimal,
    quantity: Decimal,
) -> (Vec<Level>, Decimal) {
    let mut remaining = quantity;
    let mut fills = Vec::new();

    while !is_negligible(remaining) {
        let Some(best) = contra.best() else {
            break;
        };
        if !O::at_or_better(best.price, limit) {
            break;
        }

        let take = best.qty.min(remaining);
        contra.reduce(best.price, take);
        remaining -= take;
        fills.push(Level::new(best.price, take));
    }

    (fills, remaining)
}

/// Result of placing (or previewing) a limit order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitOrderOutcome {
    /// Order direction
    pub side: OrderSide,
    /// Limit price
    pub price: Decimal,
    /// Requested quantity
    pub quantity: Decimal,
    /// Executions against resting levels, in the order they happened
    pub fills: Vec<Level>,
    /// Quantity that rested on the book at the limit price
    pub rested: Decimal,
    /// Top of book after the order
    pub top: TopOfBook,
}

impl LimitOrderOutcome {
    /// Total executed quantity
    pub fn filled(&self) -> Decimal {
        self.fills
            .iter()
            .fold(Decimal::ZERO, |acc, fill| acc.saturating_add(fill.qty))
    }

    /// Total executed notional, `None` if it does not fit in a `Decimal`
    pub fn filled_notional(&self) -> Option<Decimal> {
        self.fills
            .iter()
            .try_fold(Decimal::ZERO, |acc, fill| acc.checked_add(fill.notional()?))
    }

    /// Volume-weighted execution price, if anything filled
    pub fn average_price(&self) -> Option<Decimal> {
        let filled = self.filled();
        if filled.is_zero() {
            None
        } else {
            self.filled_notional()?.checked_div(filled)
        }
    }

    /// Returns true if nothing was left to rest
    pub fn is_fully_filled(&self) -> bool {
        !self.fills.is_empty() && self.rested.is_zero()
    }
}
