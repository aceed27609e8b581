//! Pre-trade checks run before an order is allowed on the wire.
//!
//! Checks short-circuit in a fixed order: request sanity, funds, sellable
//! shares, price band. Each failure carries the numbers that triggered it.

use rustc_hash::FxHashMap;

use crate::error::{Result, TraderError};
use crate::types::{Balance, OrderRequest, OrderType, Position, PriceLimit, Side};

/// Switches for the two validation behaviors inherited from the portal
/// front end. The defaults reproduce its observed behavior.
#[derive(Clone, Copy, Debug, Default)]
pub struct RiskPolicy {
    /// Reject sells of instruments missing from the position list instead
    /// of passing them through for the broker to decide.
    pub reject_unknown_sell: bool,
    /// Exempt market orders from the price-band check instead of checking
    /// their advisory price.
    pub skip_band_check_for_market: bool,
}

/// Client-side sanity: positive share count, positive limit price.
pub(crate) fn check_request(order: &OrderRequest) -> Result<()> {
    if order.amount == 0 {
        return Err(TraderError::InvalidOrder(
            "amount must be greater than zero".into(),
        ));
    }
    if order.order_type == OrderType::Limit && order.price <= 0.0 {
        return Err(TraderError::InvalidOrder(
            "limit price must be greater than zero".into(),
        ));
    }
    Ok(())
}

/// Limit buys must be covered by available cash. Market buys are exempt:
/// their execution price is unknown until the fill.
pub(crate) fn check_funds(order: &OrderRequest, balance: &Balance) -> Result<()> {
    if order.side != Side::Buy || order.order_type != OrderType::Limit {
        return Ok(());
    }
    let volume = order.price * order.amount as f64;
    if volume > balance.available_balance {
        return Err(TraderError::InsufficientFunds {
            required: volume,
            available: balance.available_balance,
        });
    }
    Ok(())
}

/// Sells must not exceed the sellable share count of the held position.
pub(crate) fn check_sellable(
    order: &OrderRequest,
    positions: &[Position],
    policy: &RiskPolicy,
) -> Result<()> {
    if order.side != Side::Sell {
        return Ok(());
    }
    let by_code: FxHashMap<&str, &Position> = positions
        .iter()
        .map(|pos| (pos.stock_code.as_str(), pos))
        .collect();
    match by_code.get(order.stock_code.as_str()) {
        Some(position) => {
            if order.amount > position.sellable_shares {
                return Err(TraderError::InsufficientShares {
                    stock_code: order.stock_code.clone(),
                    requested: order.amount,
                    sellable: position.sellable_shares,
                });
            }
            Ok(())
        }
        // Not held: the portal lets the broker rule on these, so by default
        // the check is skipped rather than failed.
        None if policy.reject_unknown_sell => Err(TraderError::InsufficientShares {
            stock_code: order.stock_code.clone(),
            requested: order.amount,
            sellable: 0,
        }),
        None => Ok(()),
    }
}

/// The order price must lie inside the daily band, limits inclusive.
pub(crate) fn check_price_band(
    order: &OrderRequest,
    limits: &PriceLimit,
    policy: &RiskPolicy,
) -> Result<()> {
    if order.order_type == OrderType::Market && policy.skip_band_check_for_market {
        return Ok(());
    }
    if order.price > limits.up_limit || order.price < limits.down_limit {
        return Err(TraderError::PriceOutOfBand {
            stock_code: order.stock_code.clone(),
            price: order.price,
            up_limit: limits.up_limit,
            down_limit: limits.down_limit,
        });
    }
    Ok(())
}
