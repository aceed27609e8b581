//! The trader facade: account queries, the price probe, validated order
//! submission, and cancellation.

use log::{debug, info, warn};

use crate::config::{Endpoints, ShareholderAccounts};
use crate::decode;
use crate::error::{Result, TraderError};
use crate::market::Market;
use crate::risk::{self, RiskPolicy};
use crate::session::Session;
use crate::types::{
    Balance, Entrust, OrderRequest, OrderResult, OrderType, Position, PriceLimit, Side, Trade,
};
use crate::Transport;

/// Client for a simulated-trading portal account.
///
/// Generic over [`Transport`] so tests can run against canned responses;
/// production code uses the default [`Session`].
pub struct ThsTrader<T = Session> {
    transport: T,
    endpoints: Endpoints,
    accounts: ShareholderAccounts,
    policy: RiskPolicy,
}

impl ThsTrader<Session> {
    /// Connect to the live portal with a captured browser cookie string.
    ///
    /// No login round-trip happens here; the cookies are trusted until a
    /// request comes back unreadable.
    pub fn new(endpoints: Endpoints, accounts: ShareholderAccounts, cookies: &str) -> Result<Self> {
        let session = Session::new(cookies, None)?;
        Ok(Self::with_transport(session, endpoints, accounts))
    }
}

impl<T: Transport> ThsTrader<T> {
    /// Build a trader over an arbitrary transport.
    pub fn with_transport(transport: T, endpoints: Endpoints, accounts: ShareholderAccounts) -> Self {
        ThsTrader {
            transport,
            endpoints,
            accounts,
            policy: RiskPolicy::default(),
        }
    }

    /// Replace the default validation policy.
    pub fn with_policy(mut self, policy: RiskPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The underlying transport; lets tests inspect recorded requests.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    // ------------------------------------------------------------------
    // Account state
    // ------------------------------------------------------------------

    /// Fetch the funds snapshot from the balance page.
    pub fn get_balance(&self) -> Result<Balance> {
        let body = self.transport.get(&self.endpoints.balance)?;
        decode::scrape_balance(&body)
    }

    /// Fetch current holdings.
    pub fn get_position(&self) -> Result<Vec<Position>> {
        let body = self
            .transport
            .post(&self.endpoints.position, &self.grid_query())?;
        let positions = decode::decode_positions(&body)?;
        debug!("fetched {} positions", positions.len());
        Ok(positions)
    }

    /// Fetch today's entrusts (submitted orders).
    pub fn get_entrusts(&self) -> Result<Vec<Entrust>> {
        let body = self
            .transport
            .post(&self.endpoints.entrusts, &self.grid_query())?;
        decode::decode_entrusts(&body)
    }

    /// Fetch today's trades (fills).
    pub fn get_trades(&self) -> Result<Vec<Trade>> {
        let body = self
            .transport
            .post(&self.endpoints.trades, &self.grid_query())?;
        decode::decode_trades(&body)
    }

    /// Fetch the entrusts still open to cancellation.
    pub fn get_cancelable_entrusts(&self) -> Result<Vec<Entrust>> {
        let body = self
            .transport
            .post(&self.endpoints.cancelable_entrusts, &self.grid_query())?;
        decode::decode_entrusts(&body)
    }

    /// Grid queries always go against the Shanghai shareholder account;
    /// the portal returns both markets' rows regardless.
    fn grid_query(&self) -> [(&'static str, String); 2] {
        [
            ("gdzh", self.accounts.shanghai.clone()),
            ("mkcode", Market::Shanghai.code().to_string()),
        ]
    }

    // ------------------------------------------------------------------
    // Price probe
    // ------------------------------------------------------------------

    /// Ask the portal for the instrument's daily price band.
    ///
    /// `Ok(None)` means the portal answered but has no limits for the code
    /// (unknown instrument, suspended, or session expired).
    pub fn query_price_limits(&self, stock_code: &str) -> Result<Option<PriceLimit>> {
        let params = [
            ("stockcode", stock_code.to_string()),
            ("type", Side::Buy.wire_code().to_string()),
        ];
        let body = self.transport.post(&self.endpoints.price_query, &params)?;
        decode::decode_price_limits(&body)
    }

    // ------------------------------------------------------------------
    // Orders
    // ------------------------------------------------------------------

    /// Submit a limit buy.
    pub fn buy(&self, stock_code: &str, price: f64, amount: u64) -> Result<Option<OrderResult>> {
        self.submit_order(&OrderRequest::limit(stock_code, Side::Buy, price, amount))
    }

    /// Submit a limit sell.
    pub fn sell(&self, stock_code: &str, price: f64, amount: u64) -> Result<Option<OrderResult>> {
        self.submit_order(&OrderRequest::limit(stock_code, Side::Sell, price, amount))
    }

    /// Submit a five-best-price IOC market buy. `advisory_price` is used
    /// only by the price-band check.
    pub fn market_buy(
        &self,
        stock_code: &str,
        advisory_price: f64,
        amount: u64,
    ) -> Result<Option<OrderResult>> {
        self.submit_order(&OrderRequest::market(
            stock_code,
            Side::Buy,
            advisory_price,
            amount,
        ))
    }

    /// Submit a five-best-price IOC market sell.
    pub fn market_sell(
        &self,
        stock_code: &str,
        advisory_price: f64,
        amount: u64,
    ) -> Result<Option<OrderResult>> {
        self.submit_order(&OrderRequest::market(
            stock_code,
            Side::Sell,
            advisory_price,
            amount,
        ))
    }

    /// Validate and submit an order.
    ///
    /// Checks run in a fixed order and the first failure aborts before
    /// anything reaches the trade endpoint: request sanity, then a funds
    /// snapshot and position fetch, the price probe, and the funds,
    /// sellable-shares, and price-band checks.
    ///
    /// `Ok(Some(_))` is an accepted submission, `Ok(None)` a rejection by
    /// the broker itself. Errors are reserved for failed validation and
    /// transport or decode trouble.
    pub fn submit_order(&self, order: &OrderRequest) -> Result<Option<OrderResult>> {
        risk::check_request(order)?;

        let balance = self.get_balance()?;
        let positions = self.get_position()?;
        let limits = self
            .query_price_limits(&order.stock_code)?
            .ok_or_else(|| TraderError::PriceLimitUnavailable(order.stock_code.clone()))?;

        risk::check_funds(order, &balance)?;
        risk::check_sellable(order, &positions, &self.policy)?;
        risk::check_price_band(order, &limits, &self.policy)?;

        let market = Market::classify(&order.stock_code);
        let account = self.accounts.for_market(market).to_string();
        let (url, params) = match order.order_type {
            OrderType::Limit => (
                &self.endpoints.limit_trade,
                vec![
                    ("stockcode", order.stock_code.clone()),
                    ("price", format!("{:.2}", order.price)),
                    ("amount", order.amount.to_string()),
                    ("type", order.side.wire_code().to_string()),
                    ("gdzh", account),
                    ("mkcode", market.code().to_string()),
                ],
            ),
            OrderType::Market => (
                &self.endpoints.market_trade,
                vec![
                    ("stockcode", order.stock_code.clone()),
                    ("amount", order.amount.to_string()),
                    ("type", order.side.wire_code().to_string()),
                    ("entrust_prop", market.five_level_ioc().to_string()),
                    ("gdzh", account),
                    ("mkcode", market.code().to_string()),
                ],
            ),
        };

        debug!(
            "submitting {} {} x{} to {market}",
            order.side, order.stock_code, order.amount
        );
        let body = self.transport.post(url, &params)?;
        let result = decode::decode_order_result(&body)?;
        match &result {
            Some(ack) => info!(
                "order accepted: {} {} x{} contract {}",
                order.side, ack.stock_code, order.amount, ack.entrust_contract_no
            ),
            None => warn!(
                "order rejected by broker: {} {} x{}",
                order.side, order.stock_code, order.amount
            ),
        }
        Ok(result)
    }

    /// Cancel an entrust by contract number and entrust date (`YYYYMMDD`).
    pub fn cancel_order(&self, contract_no: &str, entrust_date: &str) -> Result<()> {
        let params = [
            ("htbh", contract_no.to_string()),
            ("wtrq", entrust_date.to_string()),
        ];
        let body = self.transport.post(&self.endpoints.cancel, &params)?;
        decode::decode_cancel(&body)?;
        info!("cancelled entrust {contract_no}");
        Ok(())
    }
}
