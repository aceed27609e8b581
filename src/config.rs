//! Caller-supplied portal configuration.
//!
//! Endpoint URLs and shareholder account numbers are deployment data, not
//! logic: they differ per brokerage front end and are typically loaded from
//! a JSON file alongside the session cookies.

use serde::Deserialize;

use crate::market::Market;

/// The portal endpoints, one URL per request family.
#[derive(Clone, Debug, Deserialize)]
pub struct Endpoints {
    /// Balance page (HTML fragment, fetched with GET).
    pub balance: String,
    /// Position grid query.
    pub position: String,
    /// Today's entrust grid query.
    pub entrusts: String,
    /// Today's trade grid query.
    pub trades: String,
    /// Grid of entrusts still open to cancellation.
    pub cancelable_entrusts: String,
    /// Limit order submission.
    pub limit_trade: String,
    /// Market (five-best-price IOC) order submission.
    pub market_trade: String,
    /// Entrust cancellation.
    pub cancel: String,
    /// Pre-trade price probe returning the daily band.
    pub price_query: String,
}

/// Shareholder account numbers, one per exchange.
///
/// Orders carry the account matching the instrument's market; grid queries
/// are issued against the Shanghai account.
#[derive(Clone, Debug, Deserialize)]
pub struct ShareholderAccounts {
    pub shenzhen: String,
    pub shanghai: String,
}

impl ShareholderAccounts {
    /// The account number to put on an order routed to `market`.
    pub fn for_market(&self, market: Market) -> &str {
        match market {
            Market::Shenzhen => &self.shenzhen,
            Market::Shanghai => &self.shanghai,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_follows_market() {
        let accounts = ShareholderAccounts {
            shenzhen: "0021000000".into(),
            shanghai: "A100000000".into(),
        };
        assert_eq!(accounts.for_market(Market::Shenzhen), "0021000000");
        assert_eq!(accounts.for_market(Market::Shanghai), "A100000000");
    }

    #[test]
    fn endpoints_deserialize_from_json() {
        let raw = r#"{
            "balance": "http://portal/balance",
            "position": "http://portal/position",
            "entrusts": "http://portal/entrusts",
            "trades": "http://portal/trades",
            "cancelable_entrusts": "http://portal/cancelable",
            "limit_trade": "http://portal/limit",
            "market_trade": "http://portal/market",
            "cancel": "http://portal/cancel",
            "price_query": "http://portal/price"
        }"#;
        let endpoints: Endpoints = serde_json::from_str(raw).unwrap();
        assert_eq!(endpoints.limit_trade, "http://portal/limit");
        assert_eq!(endpoints.price_query, "http://portal/price");
    }
}
