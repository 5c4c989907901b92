use crate::constants::{MAX_ASSET_PRECISION, MAX_SYMBOL_CODE_LEN};
use crate::errors::AssetError;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Currency symbol of the ledger: an uppercase code and a fixed number of fraction digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Symbol {
    code: String,
    precision: u32,
}

impl Symbol {
    pub fn new(code: &str, precision: u32) -> Result<Self, AssetError> {
        let valid_code = !code.is_empty()
            && code.len() <= MAX_SYMBOL_CODE_LEN
            && code.chars().all(|c| c.is_ascii_uppercase());

        if !valid_code || precision > MAX_ASSET_PRECISION {
            return Err(AssetError::InvalidSymbol(format!("{precision},{code}")));
        }

        Ok(Self {
            code: code.to_string(),
            precision,
        })
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn precision(&self) -> u32 {
        self.precision
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.precision, self.code)
    }
}

/// A positive quantity of a currency, e.g. `1.0000 SYS`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Asset {
    amount: Decimal,
    symbol: Symbol,
}

impl Asset {
    pub fn new(amount: Decimal, symbol: Symbol) -> Result<Self, AssetError> {
        if amount <= Decimal::ZERO {
            return Err(AssetError::NonPositiveAmount(amount.to_string()));
        }

        if amount.scale() > symbol.precision {
            return Err(AssetError::InvalidAmount(format!(
                "{} has more than {} decimals",
                amount, symbol.precision
            )));
        }

        let mut amount = amount;
        amount.rescale(symbol.precision);

        Ok(Self { amount, symbol })
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }
}

impl FromStr for Asset {
    type Err = AssetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (amount, code) = s
            .trim()
            .split_once(' ')
            .ok_or_else(|| AssetError::InvalidFormat(s.to_string()))?;

        let amount = amount.trim();
        if amount.is_empty() || !amount.chars().all(|c| c.is_ascii_digit() || c == '.') {
            return Err(AssetError::InvalidAmount(amount.to_string()));
        }

        let amount =
            Decimal::from_str(amount).map_err(|_| AssetError::InvalidAmount(amount.to_string()))?;

        // The number of fraction digits written defines the symbol precision.
        let symbol = Symbol::new(code.trim(), amount.scale())?;

        Asset::new(amount, symbol)
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.prec$} {}",
            self.amount,
            self.symbol.code,
            prec = self.symbol.precision as usize
        )
    }
}

impl Serialize for Asset {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Asset {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Asset::from_str(&value).map_err(serde::de::Error::custom)
    }
}
