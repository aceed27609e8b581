//! # thstrader
//!
//! Blocking client for the TongHuaShun (同花顺) simulated-trading web portal.
//!
//! The portal has no published API: this crate drives the same endpoints the
//! browser front end calls, authenticated by a cookie string captured after a
//! manual login. Endpoint URLs and shareholder account numbers are deployment
//! data and are supplied by the caller, see [`Endpoints`] and
//! [`ShareholderAccounts`].
//!
//! ## Validation before submission
//!
//! Orders only reach the wire after a fresh snapshot of the account passes
//! the pre-trade checks, in this order:
//!
//! 1. request sanity (positive amount, positive limit price),
//! 2. limit buys are covered by the available balance,
//! 3. sells do not exceed the position's sellable shares,
//! 4. the price lies inside the instrument's daily band, fetched per order.
//!
//! The first failure aborts with a [`TraderError`] carrying the offending
//! numbers. A submission that does go out and is refused by the broker comes
//! back as `Ok(None)`, not as an error. Two of the checks can be tightened
//! or relaxed through [`RiskPolicy`].
//!
//! ## Quick start
//!
//! ```no_run
//! use thstrader::{Endpoints, ShareholderAccounts, ThsTrader};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let endpoints: Endpoints =
//!         serde_json::from_str(&std::fs::read_to_string("endpoints.json")?)?;
//!     let accounts = ShareholderAccounts {
//!         shenzhen: "0021000000".into(),
//!         shanghai: "A100000000".into(),
//!     };
//!     let trader = ThsTrader::new(endpoints, accounts, "u_name=...; ticket=...")?;
//!
//!     let balance = trader.get_balance()?;
//!     println!("available: {:.2}", balance.available_balance);
//!
//!     match trader.buy("600519", 1700.0, 100)? {
//!         Some(ack) => println!("accepted, contract {}", ack.entrust_contract_no),
//!         None => println!("broker rejected the order"),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Testing
//!
//! [`ThsTrader`] is generic over [`Transport`]; [`mock::MockTransport`]
//! serves canned bodies and records every request, so order routing and the
//! validation gate can be asserted without a portal account.

mod client;
mod config;
mod decode;
mod error;
mod market;
pub mod mock;
mod risk;
mod session;
mod types;

pub use client::ThsTrader;
pub use config::{Endpoints, ShareholderAccounts};
pub use error::{Result, TraderError};
pub use market::Market;
pub use risk::RiskPolicy;
pub use session::{parse_cookie_str, Session};
pub use types::{
    Balance, Entrust, OrderRequest, OrderResult, OrderType, Position, PriceLimit, Side, Trade,
};

/// A blocking portal round-trip: GET a page or POST a form, get body text.
///
/// [`Session`] implements this over HTTP for production;
/// [`mock::MockTransport`] implements it over canned fixtures for tests.
pub trait Transport {
    /// Fetch `url`, returning the raw body.
    fn get(&self, url: &str) -> Result<String>;

    /// POST form-encoded `params` to `url`, returning the raw body.
    fn post(&self, url: &str, params: &[(&str, String)]) -> Result<String>;
}
