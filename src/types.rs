//! Account and order types exchanged with the portal.
//!
//! Monetary quantities are `f64` because the portal reports them as decimal
//! strings with two fractional digits; share counts are whole-lot `u64`.

use std::fmt;

use serde::Serialize;

/// Order side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Token the portal expects in the `type` form field.
    pub(crate) fn wire_code(self) -> &'static str {
        match self {
            Side::Buy => "buy",
            Side::Sell => "sale",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// Execution style of an order.
///
/// `Market` orders are submitted as five-best-price immediate-or-cancel:
/// the unfilled remainder is cancelled, never converted to a resting limit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OrderType {
    Limit,
    Market,
}

/// An order to be validated and submitted.
///
/// For market orders `price` is advisory: it never reaches the wire and is
/// used only for the price-band check.
#[derive(Clone, Debug, PartialEq)]
pub struct OrderRequest {
    pub stock_code: String,
    pub side: Side,
    pub order_type: OrderType,
    pub price: f64,
    /// Number of shares.
    pub amount: u64,
}

impl OrderRequest {
    /// A limit order at `price`.
    pub fn limit(stock_code: impl Into<String>, side: Side, price: f64, amount: u64) -> Self {
        OrderRequest {
            stock_code: stock_code.into(),
            side,
            order_type: OrderType::Limit,
            price,
            amount,
        }
    }

    /// A market order; `advisory_price` is only consulted by the band check.
    pub fn market(
        stock_code: impl Into<String>,
        side: Side,
        advisory_price: f64,
        amount: u64,
    ) -> Self {
        OrderRequest {
            stock_code: stock_code.into(),
            side,
            order_type: OrderType::Market,
            price: advisory_price,
            amount,
        }
    }
}

/// Funds snapshot scraped from the balance page.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Balance {
    pub total_assets: f64,
    pub market_value: f64,
    /// Cash that can be withdrawn from the account.
    pub retrievable_balance: f64,
    pub current_balance: f64,
    /// Cash available for new buy orders.
    pub available_balance: f64,
    pub frozen_balance: f64,
}

/// One holding from the position grid.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Position {
    pub stock_code: String,
    pub stock_name: String,
    pub hold_shares: u64,
    /// Shares that may be sold today.
    pub sellable_shares: u64,
    pub frozen_shares: u64,
    pub cost_price: f64,
    pub market_price: f64,
    pub market_value: f64,
    pub float_pnl: f64,
    /// Profit and loss as a percentage of cost.
    pub pnl_pct: f64,
}

/// Daily price band of an instrument, from the pre-trade price probe.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PriceLimit {
    pub stock_code: String,
    pub stock_name: String,
    pub up_limit: f64,
    pub down_limit: f64,
}

/// Acknowledgement of an accepted order submission.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OrderResult {
    pub stock_code: String,
    /// Contract number identifying the entrust; needed to cancel it.
    pub entrust_contract_no: String,
}

/// One row of today's entrust (order) grid.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Entrust {
    pub stock_code: String,
    pub stock_name: String,
    /// Portal status text, e.g. 已报 or 已成.
    pub status: String,
    /// Portal side text, not the [`Side`] wire token.
    pub side: String,
    pub entrust_price: f64,
    pub entrust_shares: u64,
    pub executed_shares: u64,
    pub entrust_time: String,
    pub contract_no: String,
}

/// One row of today's trade (fill) grid.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Trade {
    pub stock_code: String,
    pub stock_name: String,
    pub side: String,
    pub trade_price: f64,
    pub trade_shares: u64,
    pub trade_amount: f64,
    pub trade_time: String,
    pub contract_no: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_display() {
        assert_eq!(format!("{}", Side::Buy), "BUY");
        assert_eq!(format!("{}", Side::Sell), "SELL");
    }

    #[test]
    fn side_wire_codes() {
        assert_eq!(Side::Buy.wire_code(), "buy");
        assert_eq!(Side::Sell.wire_code(), "sale");
    }

    #[test]
    fn limit_constructor() {
        let order = OrderRequest::limit("600519", Side::Buy, 1700.0, 100);
        assert_eq!(order.order_type, OrderType::Limit);
        assert_eq!(order.stock_code, "600519");
        assert_eq!(order.amount, 100);
    }

    #[test]
    fn market_constructor_keeps_advisory_price() {
        let order = OrderRequest::market("000001", Side::Sell, 12.5, 200);
        assert_eq!(order.order_type, OrderType::Market);
        assert_eq!(order.price, 12.5);
    }
}
