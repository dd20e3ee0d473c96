//! Supported display currencies and amount formatting.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{DomainError, ErrorCode};

/// Currencies a user can pick for display and payments are logged in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    Eur,
    Gbp,
    Cad,
    Aud,
    Jpy,
}

impl Currency {
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
            Currency::Cad => "CAD",
            Currency::Aud => "AUD",
            Currency::Jpy => "JPY",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Usd => "$",
            Currency::Eur => "€",
            Currency::Gbp => "£",
            Currency::Cad => "C$",
            Currency::Aud => "A$",
            Currency::Jpy => "¥",
        }
    }

    /// Digits shown after the decimal point.
    pub fn minor_digits(&self) -> u32 {
        match self {
            Currency::Jpy => 0,
            _ => 2,
        }
    }

    /// Formats `amount` with this currency's symbol, e.g. `$1,234.50`.
    pub fn format(&self, amount: Decimal) -> String {
        let sign = if amount < Decimal::ZERO { "-" } else { "" };
        format!("{}{}{}", sign, self.symbol(), group_thousands(amount.abs(), self.minor_digits()))
    }
}

impl Default for Currency {
    fn default() -> Self {
        Currency::Usd
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "USD" => Ok(Currency::Usd),
            "EUR" => Ok(Currency::Eur),
            "GBP" => Ok(Currency::Gbp),
            "CAD" => Ok(Currency::Cad),
            "AUD" => Ok(Currency::Aud),
            "JPY" => Ok(Currency::Jpy),
            other => Err(DomainError::new(
                ErrorCode::InvalidFormat,
                format!("Unsupported currency: {}", other),
            )
            .with_detail("field", "currency")),
        }
    }
}

/// Formats an amount for display in the given currency code.
///
/// Unknown codes fall back to `"12.50 XYZ"`.
pub fn format_currency(amount: Decimal, code: &str) -> String {
    match code.parse::<Currency>() {
        Ok(currency) => currency.format(amount),
        Err(_) => format!("{} {}", amount.round_dp(2), code.trim().to_uppercase()),
    }
}

fn group_thousands(amount: Decimal, digits: u32) -> String {
    let rendered = format!("{:.*}", digits as usize, amount.round_dp(digits));
    let (whole, frac) = match rendered.split_once('.') {
        Some((w, f)) => (w.to_string(), Some(f.to_string())),
        None => (rendered, None),
    };

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac {
        Some(f) => format!("{}.{}", grouped, f),
        None => grouped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_known_currencies() {
        assert_eq!(format_currency(Decimal::new(1999, 2), "USD"), "$19.99");
        assert_eq!(format_currency(Decimal::new(5, 0), "eur"), "€5.00");
        assert_eq!(format_currency(Decimal::new(12345050, 2), "GBP"), "£123,450.50");
        assert_eq!(format_currency(Decimal::new(1500, 0), "JPY"), "¥1,500");
    }

    #[test]
    fn unknown_code_falls_back_to_suffix() {
        assert_eq!(format_currency(Decimal::new(1250, 2), "xyz"), "12.50 XYZ");
    }

    #[test]
    fn negative_amount_keeps_sign_before_symbol() {
        assert_eq!(format_currency(Decimal::new(-250, 2), "USD"), "-$2.50");
    }

    #[test]
    fn parses_codes_case_insensitively() {
        assert_eq!(" cad ".parse::<Currency>().unwrap(), Currency::Cad);
        assert!("BTC".parse::<Currency>().is_err());
    }

    #[test]
    fn default_is_usd() {
        assert_eq!(Currency::default(), Currency::Usd);
    }
}
