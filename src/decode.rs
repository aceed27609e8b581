//! Portal response decoding.
//!
//! JSON endpoints wrap every payload in an `{"errorcode": ..., "result": ...}`
//! envelope; grid endpoints key each row by opaque field codes (`d_2102` and
//! friends). The code-to-attribute mapping is brokerage schema, not logic, so
//! it lives in the constant tables below and the decoders stay generic. The
//! balance endpoint is the odd one out: an HTML fragment scraped by `td` id.

use once_cell::sync::Lazy;
use regex::Regex;
use rustc_hash::FxHashMap;
use serde_json::{Map, Value};

use crate::error::{Result, TraderError};
use crate::types::{Balance, Entrust, OrderResult, Position, PriceLimit, Trade};

/// Position grid field codes.
mod position_grid {
    pub const STOCK_CODE: &str = "d_2102";
    pub const STOCK_NAME: &str = "d_2103";
    pub const HOLD_SHARES: &str = "d_2117";
    pub const FROZEN_SHARES: &str = "d_2118";
    pub const SELLABLE_SHARES: &str = "d_2121";
    pub const COST_PRICE: &str = "d_2122";
    pub const MARKET_PRICE: &str = "d_2124";
    pub const MARKET_VALUE: &str = "d_2125";
    pub const FLOAT_PNL: &str = "d_2147";
    pub const PNL_PCT: &str = "d_3616";
}

/// Entrust grid field codes.
mod entrust_grid {
    pub const STOCK_CODE: &str = "d_2102";
    pub const STOCK_NAME: &str = "d_2103";
    pub const STATUS: &str = "d_2105";
    pub const SIDE: &str = "d_2106";
    pub const ENTRUST_PRICE: &str = "d_2109";
    pub const ENTRUST_SHARES: &str = "d_2126";
    pub const EXECUTED_SHARES: &str = "d_2128";
    pub const CONTRACT_NO: &str = "d_2135";
    pub const ENTRUST_TIME: &str = "d_2140";
}

/// Trade grid field codes.
mod trade_grid {
    pub const STOCK_CODE: &str = "d_2102";
    pub const STOCK_NAME: &str = "d_2103";
    pub const SIDE: &str = "d_2106";
    pub const TRADE_SHARES: &str = "d_2128";
    pub const TRADE_PRICE: &str = "d_2129";
    pub const TRADE_AMOUNT: &str = "d_2131";
    pub const CONTRACT_NO: &str = "d_2135";
    pub const TRADE_TIME: &str = "d_2141";
}

/// Keys of the price-probe `result.data` object.
mod price_fields {
    pub const STOCK_CODE: &str = "stockcode";
    pub const STOCK_NAME: &str = "stockname";
    pub const UP_LIMIT: &str = "ztj";
    pub const DOWN_LIMIT: &str = "dtj";
}

/// Keys of the order-acknowledgement `result.data` object.
mod order_fields {
    pub const STOCK_CODE: &str = "stockcode";
    pub const CONTRACT_NO: &str = "htbh";
}

/// `td` element ids on the balance page.
mod balance_ids {
    pub const TOTAL_ASSETS: &str = "zzc";
    pub const MARKET_VALUE: &str = "gpsz";
    pub const RETRIEVABLE_BALANCE: &str = "kqje";
    pub const CURRENT_BALANCE: &str = "zjye";
    pub const AVAILABLE_BALANCE: &str = "kyye";
    pub const FROZEN_BALANCE: &str = "djje";
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// The `{"errorcode": ..., "result": ...}` wrapper common to all JSON
/// endpoints. Some deployments quote the errorcode, so both forms decode.
#[derive(Debug)]
pub(crate) struct Envelope {
    pub errorcode: i64,
    result: Option<Value>,
}

pub(crate) fn parse_envelope(raw: &str) -> Result<Envelope> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|e| TraderError::Decode(format!("malformed portal response: {e}")))?;
    let errorcode = match value.get("errorcode") {
        Some(Value::Number(n)) => n
            .as_i64()
            .ok_or_else(|| TraderError::Decode(format!("non-integer errorcode: {n}")))?,
        Some(Value::String(s)) => s
            .trim()
            .parse()
            .map_err(|_| TraderError::Decode(format!("non-integer errorcode: {s:?}")))?,
        _ => return Err(TraderError::Decode("response missing errorcode".into())),
    };
    Ok(Envelope {
        errorcode,
        result: value.get("result").cloned(),
    })
}

impl Envelope {
    /// Fail with the broker's own verdict if the errorcode is non-zero.
    fn ensure_ok(&self) -> Result<()> {
        if self.errorcode != 0 {
            return Err(TraderError::BrokerRejected(self.errorcode));
        }
        Ok(())
    }

    /// The `result.list` row array of a grid response.
    fn grid_rows(&self) -> Result<&[Value]> {
        self.result
            .as_ref()
            .and_then(|result| result.get("list"))
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .ok_or_else(|| TraderError::Decode("response missing result.list".into()))
    }

    /// The `result.data` object of a single-record response.
    fn data(&self) -> Result<Row<'_>> {
        self.result
            .as_ref()
            .and_then(|result| result.get("data"))
            .and_then(Value::as_object)
            .map(Row)
            .ok_or_else(|| TraderError::Decode("response missing result.data".into()))
    }
}

// ---------------------------------------------------------------------------
// Row access
// ---------------------------------------------------------------------------

/// One keyed record; values arrive as strings or bare numbers depending on
/// the grid, so every accessor takes both.
struct Row<'a>(&'a Map<String, Value>);

impl Row<'_> {
    fn object(value: &Value) -> Result<Row<'_>> {
        value
            .as_object()
            .map(Row)
            .ok_or_else(|| TraderError::Decode("grid row is not an object".into()))
    }

    fn field(&self, code: &str) -> Result<&Value> {
        self.0
            .get(code)
            .ok_or_else(|| TraderError::Decode(format!("row missing field {code}")))
    }

    fn text(&self, code: &str) -> Result<String> {
        match self.field(code)? {
            Value::String(s) => Ok(s.trim().to_string()),
            Value::Number(n) => Ok(n.to_string()),
            other => Err(TraderError::Decode(format!(
                "field {code} is not text: {other}"
            ))),
        }
    }

    fn decimal(&self, code: &str) -> Result<f64> {
        match self.field(code)? {
            Value::Number(n) => n
                .as_f64()
                .ok_or_else(|| TraderError::Decode(format!("field {code} overflows: {n}"))),
            Value::String(s) => s
                .trim()
                .parse()
                .map_err(|_| TraderError::Decode(format!("field {code} is not a number: {s:?}"))),
            other => Err(TraderError::Decode(format!(
                "field {code} is not a number: {other}"
            ))),
        }
    }

    fn shares(&self, code: &str) -> Result<u64> {
        match self.field(code)? {
            Value::Number(n) => n
                .as_u64()
                .ok_or_else(|| TraderError::Decode(format!("field {code} is not a share count: {n}"))),
            Value::String(s) => s.trim().parse().map_err(|_| {
                TraderError::Decode(format!("field {code} is not a share count: {s:?}"))
            }),
            other => Err(TraderError::Decode(format!(
                "field {code} is not a share count: {other}"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Grid decoders
// ---------------------------------------------------------------------------

/// Decode a grid response into one record per `result.list` row.
fn decode_grid<T>(raw: &str, record: impl Fn(&Row<'_>) -> Result<T>) -> Result<Vec<T>> {
    let envelope = parse_envelope(raw)?;
    envelope.ensure_ok()?;
    envelope
        .grid_rows()?
        .iter()
        .map(|value| record(&Row::object(value)?))
        .collect()
}

pub(crate) fn decode_positions(raw: &str) -> Result<Vec<Position>> {
    use position_grid::*;
    decode_grid(raw, |row| {
        Ok(Position {
            stock_code: row.text(STOCK_CODE)?,
            stock_name: row.text(STOCK_NAME)?,
            hold_shares: row.shares(HOLD_SHARES)?,
            sellable_shares: row.shares(SELLABLE_SHARES)?,
            frozen_shares: row.shares(FROZEN_SHARES)?,
            cost_price: row.decimal(COST_PRICE)?,
            market_price: row.decimal(MARKET_PRICE)?,
            market_value: row.decimal(MARKET_VALUE)?,
            float_pnl: row.decimal(FLOAT_PNL)?,
            pnl_pct: row.decimal(PNL_PCT)?,
        })
    })
}

pub(crate) fn decode_entrusts(raw: &str) -> Result<Vec<Entrust>> {
    use entrust_grid::*;
    decode_grid(raw, |row| {
        Ok(Entrust {
            stock_code: row.text(STOCK_CODE)?,
            stock_name: row.text(STOCK_NAME)?,
            status: row.text(STATUS)?,
            side: row.text(SIDE)?,
            entrust_price: row.decimal(ENTRUST_PRICE)?,
            entrust_shares: row.shares(ENTRUST_SHARES)?,
            executed_shares: row.shares(EXECUTED_SHARES)?,
            entrust_time: row.text(ENTRUST_TIME)?,
            contract_no: row.text(CONTRACT_NO)?,
        })
    })
}

pub(crate) fn decode_trades(raw: &str) -> Result<Vec<Trade>> {
    use trade_grid::*;
    decode_grid(raw, |row| {
        Ok(Trade {
            stock_code: row.text(STOCK_CODE)?,
            stock_name: row.text(STOCK_NAME)?,
            side: row.text(SIDE)?,
            trade_price: row.decimal(TRADE_PRICE)?,
            trade_shares: row.shares(TRADE_SHARES)?,
            trade_amount: row.decimal(TRADE_AMOUNT)?,
            trade_time: row.text(TRADE_TIME)?,
            contract_no: row.text(CONTRACT_NO)?,
        })
    })
}

// ---------------------------------------------------------------------------
// Single-record decoders
// ---------------------------------------------------------------------------

/// Decode the price probe. A non-zero errorcode means the portal has no
/// limits for the instrument, which is an answer, not a failure.
pub(crate) fn decode_price_limits(raw: &str) -> Result<Option<PriceLimit>> {
    let envelope = parse_envelope(raw)?;
    if envelope.errorcode != 0 {
        return Ok(None);
    }
    let data = envelope.data()?;
    Ok(Some(PriceLimit {
        stock_code: data.text(price_fields::STOCK_CODE)?,
        stock_name: data.text(price_fields::STOCK_NAME)?,
        up_limit: data.decimal(price_fields::UP_LIMIT)?,
        down_limit: data.decimal(price_fields::DOWN_LIMIT)?,
    }))
}

/// Decode an order submission acknowledgement. A non-zero errorcode is a
/// broker rejection, reported as `None` rather than an error.
pub(crate) fn decode_order_result(raw: &str) -> Result<Option<OrderResult>> {
    let envelope = parse_envelope(raw)?;
    if envelope.errorcode != 0 {
        return Ok(None);
    }
    let data = envelope.data()?;
    Ok(Some(OrderResult {
        stock_code: data.text(order_fields::STOCK_CODE)?,
        entrust_contract_no: data.text(order_fields::CONTRACT_NO)?,
    }))
}

/// Decode a cancellation acknowledgement: only the errorcode matters.
pub(crate) fn decode_cancel(raw: &str) -> Result<()> {
    parse_envelope(raw)?.ensure_ok()
}

// ---------------------------------------------------------------------------
// Balance page
// ---------------------------------------------------------------------------

static BALANCE_CELL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<td id="([a-z]+)">(.*?)</td>"#).expect("balance cell pattern is valid")
});

/// Scrape the balance HTML fragment by `td` id.
pub(crate) fn scrape_balance(html: &str) -> Result<Balance> {
    let mut cells: FxHashMap<&str, &str> = FxHashMap::default();
    for captures in BALANCE_CELL.captures_iter(html) {
        if let (Some(id), Some(text)) = (captures.get(1), captures.get(2)) {
            cells.insert(id.as_str(), text.as_str());
        }
    }
    let cell = |id: &str| -> Result<f64> {
        let text = cells
            .get(id)
            .ok_or_else(|| TraderError::Decode(format!("balance page missing td #{id}")))?;
        text.trim()
            .parse()
            .map_err(|_| TraderError::Decode(format!("balance td #{id} is not a number: {text:?}")))
    };
    Ok(Balance {
        total_assets: cell(balance_ids::TOTAL_ASSETS)?,
        market_value: cell(balance_ids::MARKET_VALUE)?,
        retrievable_balance: cell(balance_ids::RETRIEVABLE_BALANCE)?,
        current_balance: cell(balance_ids::CURRENT_BALANCE)?,
        available_balance: cell(balance_ids::AVAILABLE_BALANCE)?,
        frozen_balance: cell(balance_ids::FROZEN_BALANCE)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_numeric_errorcode() {
        let env = parse_envelope(r#"{"errorcode": 0, "result": {}}"#).unwrap();
        assert_eq!(env.errorcode, 0);
    }

    #[test]
    fn envelope_quoted_errorcode() {
        let env = parse_envelope(r#"{"errorcode": "-104", "result": null}"#).unwrap();
        assert_eq!(env.errorcode, -104);
    }

    #[test]
    fn envelope_missing_errorcode() {
        let err = parse_envelope(r#"{"result": {}}"#).unwrap_err();
        assert!(matches!(err, TraderError::Decode(_)));
    }

    #[test]
    fn envelope_rejects_garbage() {
        let err = parse_envelope("<html>session expired</html>").unwrap_err();
        assert!(matches!(err, TraderError::Decode(_)));
    }

    #[test]
    fn positions_take_string_and_numeric_values() {
        let raw = r#"{
            "errorcode": 0,
            "result": {
                "list": [{
                    "d_2102": "000001",
                    "d_2103": "平安银行",
                    "d_2117": "200",
                    "d_2118": 0,
                    "d_2121": 100,
                    "d_2122": "11.50",
                    "d_2124": 12.10,
                    "d_2125": "2420.00",
                    "d_2147": "120.00",
                    "d_3616": "5.22"
                }]
            }
        }"#;
        let positions = decode_positions(raw).unwrap();
        assert_eq!(positions.len(), 1);
        let pos = &positions[0];
        assert_eq!(pos.stock_code, "000001");
        assert_eq!(pos.hold_shares, 200);
        assert_eq!(pos.sellable_shares, 100);
        assert_eq!(pos.frozen_shares, 0);
        assert_eq!(pos.market_price, 12.10);
    }

    #[test]
    fn positions_empty_list() {
        let raw = r#"{"errorcode": 0, "result": {"list": []}}"#;
        assert!(decode_positions(raw).unwrap().is_empty());
    }

    #[test]
    fn positions_missing_field_is_decode_error() {
        let raw = r#"{"errorcode": 0, "result": {"list": [{"d_2102": "000001"}]}}"#;
        let err = decode_positions(raw).unwrap_err();
        match err {
            TraderError::Decode(msg) => assert!(msg.contains("d_2103"), "{msg}"),
            other => panic!("expected decode error, got {other:?}"),
        }
    }

    #[test]
    fn positions_broker_error_surfaces_code() {
        let raw = r#"{"errorcode": 2, "result": null}"#;
        let err = decode_positions(raw).unwrap_err();
        assert!(matches!(err, TraderError::BrokerRejected(2)));
    }

    #[test]
    fn price_limits_round_trip() {
        let raw = r#"{
            "errorcode": 0,
            "result": {"data": {
                "stockcode": "600519",
                "stockname": "贵州茅台",
                "ztj": "1870.00",
                "dtj": 1530.00
            }}
        }"#;
        let limits = decode_price_limits(raw).unwrap().unwrap();
        assert_eq!(limits.stock_code, "600519");
        assert_eq!(limits.up_limit, 1870.0);
        assert_eq!(limits.down_limit, 1530.0);
    }

    #[test]
    fn price_limits_absent_on_error() {
        let raw = r#"{"errorcode": 1, "result": null}"#;
        assert!(decode_price_limits(raw).unwrap().is_none());
    }

    #[test]
    fn order_result_round_trip() {
        let raw = r#"{"errorcode":0,"result":{"data":{"stockcode":"600519","htbh":"12345"}}}"#;
        let result = decode_order_result(raw).unwrap().unwrap();
        assert_eq!(result.stock_code, "600519");
        assert_eq!(result.entrust_contract_no, "12345");
    }

    #[test]
    fn order_result_rejection_is_none() {
        let raw = r#"{"errorcode": 1, "result": {"message": "可用资金不足"}}"#;
        assert!(decode_order_result(raw).unwrap().is_none());
    }

    #[test]
    fn order_result_numeric_contract_no() {
        let raw = r#"{"errorcode":0,"result":{"data":{"stockcode":"000001","htbh":98765}}}"#;
        let result = decode_order_result(raw).unwrap().unwrap();
        assert_eq!(result.entrust_contract_no, "98765");
    }

    #[test]
    fn cancel_ok_and_rejected() {
        assert!(decode_cancel(r#"{"errorcode": 0, "result": null}"#).is_ok());
        let err = decode_cancel(r#"{"errorcode": -61, "result": null}"#).unwrap_err();
        assert!(matches!(err, TraderError::BrokerRejected(-61)));
    }

    #[test]
    fn balance_scrape() {
        let html = r#"
            <table class="zichan">
              <tr><td id="zzc">107506.35</td><td id="gpsz">2420.00</td></tr>
              <tr><td id="kqje">105086.35</td><td id="zjye">105086.35</td></tr>
              <tr><td id="kyye">105086.35</td><td id="djje">0.00</td></tr>
            </table>
        "#;
        let balance = scrape_balance(html).unwrap();
        assert_eq!(balance.total_assets, 107506.35);
        assert_eq!(balance.market_value, 2420.0);
        assert_eq!(balance.retrievable_balance, 105086.35);
        assert_eq!(balance.current_balance, 105086.35);
        assert_eq!(balance.available_balance, 105086.35);
        assert_eq!(balance.frozen_balance, 0.0);
    }

    #[test]
    fn balance_missing_cell_is_decode_error() {
        let html = r#"<td id="zzc">107506.35</td>"#;
        let err = scrape_balance(html).unwrap_err();
        match err {
            TraderError::Decode(msg) => assert!(msg.contains("gpsz"), "{msg}"),
            other => panic!("expected decode error, got {other:?}"),
        }
    }

    #[test]
    fn balance_non_numeric_cell_is_decode_error() {
        let html = r#"
            <td id="zzc">--</td><td id="gpsz">0</td><td id="kqje">0</td>
            <td id="zjye">0</td><td id="kyye">0</td><td id="djje">0</td>
        "#;
        assert!(matches!(
            scrape_balance(html).unwrap_err(),
            TraderError::Decode(_)
        ));
    }
}
