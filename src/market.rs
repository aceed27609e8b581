//! Exchange routing derived from the stock code.

use std::fmt;

/// First characters of stock codes that trade on Shenzhen.
const SHENZHEN_PREFIXES: [char; 2] = ['0', '3'];

/// The two mainland A-share exchanges the portal routes to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Market {
    Shenzhen,
    Shanghai,
}

impl Market {
    /// Classify a stock code by its first character: `0` and `3` trade on
    /// Shenzhen, everything else (including the empty string) on Shanghai.
    ///
    /// ```
    /// use thstrader::Market;
    ///
    /// assert_eq!(Market::classify("000001"), Market::Shenzhen);
    /// assert_eq!(Market::classify("600519"), Market::Shanghai);
    /// ```
    pub fn classify(stock_code: &str) -> Market {
        match stock_code.chars().next() {
            Some(c) if SHENZHEN_PREFIXES.contains(&c) => Market::Shenzhen,
            _ => Market::Shanghai,
        }
    }

    /// Market code carried in the `mkcode` form field.
    pub fn code(self) -> &'static str {
        match self {
            Market::Shenzhen => "1",
            Market::Shanghai => "2",
        }
    }

    /// `entrust_prop` code selecting five-best-price immediate-or-cancel
    /// execution; the exchanges number this mode differently.
    pub fn five_level_ioc(self) -> &'static str {
        match self {
            Market::Shenzhen => "3",
            Market::Shanghai => "1",
        }
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Market::Shenzhen => write!(f, "SZ"),
            Market::Shanghai => write!(f, "SH"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_by_first_character() {
        assert_eq!(Market::classify("000001"), Market::Shenzhen);
        assert_eq!(Market::classify("300750"), Market::Shenzhen);
        assert_eq!(Market::classify("600519"), Market::Shanghai);
        assert_eq!(Market::classify("601398"), Market::Shanghai);
    }

    #[test]
    fn unrecognized_prefixes_default_to_shanghai() {
        assert_eq!(Market::classify(""), Market::Shanghai);
        assert_eq!(Market::classify("688981"), Market::Shanghai);
        assert_eq!(Market::classify("T00001"), Market::Shanghai);
    }

    #[test]
    fn wire_codes_differ_per_market() {
        assert_eq!(Market::Shenzhen.code(), "1");
        assert_eq!(Market::Shanghai.code(), "2");
        assert_eq!(Market::Shenzhen.five_level_ioc(), "3");
        assert_eq!(Market::Shanghai.five_level_ioc(), "1");
    }

    #[test]
    fn display() {
        assert_eq!(format!("{}", Market::Shenzhen), "SZ");
        assert_eq!(format!("{}", Market::Shanghai), "SH");
    }
}
