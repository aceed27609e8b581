//! Error types for the portal client.

/// Errors that can occur during trader operations.
///
/// The three validation kinds (`InsufficientFunds`, `InsufficientShares`,
/// `PriceOutOfBand`) and `PriceLimitUnavailable` are raised before any
/// money-moving request is sent; once a submission reaches the wire the
/// outcome is reported through the return value, not an error.
#[derive(Debug, thiserror::Error)]
pub enum TraderError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("insufficient funds: order volume {required:.2} exceeds available balance {available:.2}")]
    InsufficientFunds { required: f64, available: f64 },

    #[error("insufficient sellable shares of {stock_code}: requested {requested}, sellable {sellable}")]
    InsufficientShares {
        stock_code: String,
        requested: u64,
        sellable: u64,
    },

    #[error("price {price:.2} outside daily band [{down_limit:.2}, {up_limit:.2}] for {stock_code}")]
    PriceOutOfBand {
        stock_code: String,
        price: f64,
        up_limit: f64,
        down_limit: f64,
    },

    #[error("no price limits available for {0}; cannot validate the order")]
    PriceLimitUnavailable(String),

    #[error("broker rejected the request (errorcode {0})")]
    BrokerRejected(i64),

    #[error("invalid order: {0}")]
    InvalidOrder(String),
}

pub type Result<T> = std::result::Result<T, TraderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_carries_amounts() {
        let err = TraderError::InsufficientFunds {
            required: 10_000.0,
            available: 2_500.5,
        };
        assert_eq!(
            err.to_string(),
            "insufficient funds: order volume 10000.00 exceeds available balance 2500.50"
        );
    }

    #[test]
    fn display_carries_band() {
        let err = TraderError::PriceOutOfBand {
            stock_code: "600519".into(),
            price: 2000.0,
            up_limit: 1980.0,
            down_limit: 1620.0,
        };
        let msg = err.to_string();
        assert!(msg.contains("600519"));
        assert!(msg.contains("[1620.00, 1980.00]"));
    }

    #[test]
    fn is_error() {
        let err: Box<dyn std::error::Error> = Box::new(TraderError::BrokerRejected(-130));
        assert!(err.to_string().contains("-130"));
    }
}
