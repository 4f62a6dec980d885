//! Display-currency tables and formatting.
//!
//! Balances are stored in [`REFERENCE_CURRENCY`]. Conversion happens only when
//! rendering; nothing converted here is ever written back.

use rust_decimal::{Decimal, RoundingStrategy};
use tracing::warn;

pub const REFERENCE_CURRENCY: &str = "USD";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CurrencyInfo {
    pub symbol: &'static str,
    pub code: &'static str,
    pub name: &'static str,
}

pub const USD: CurrencyInfo = CurrencyInfo {
    symbol: "$",
    code: "USD",
    name: "US Dollar",
};

const EUR: CurrencyInfo = CurrencyInfo {
    symbol: "€",
    code: "EUR",
    name: "Euro",
};

const COUNTRY_CURRENCIES: &[(&str, CurrencyInfo)] = &[
    ("US", USD),
    ("GB", CurrencyInfo { symbol: "£", code: "GBP", name: "British Pound" }),
    ("DE", EUR),
    ("FR", EUR),
    ("IT", EUR),
    ("ES", EUR),
    ("NL", EUR),
    ("BR", CurrencyInfo { symbol: "R$", code: "BRL", name: "Brazilian Real" }),
    ("JP", CurrencyInfo { symbol: "¥", code: "JPY", name: "Japanese Yen" }),
    ("CA", CurrencyInfo { symbol: "C$", code: "CAD", name: "Canadian Dollar" }),
    ("AU", CurrencyInfo { symbol: "A$", code: "AUD", name: "Australian Dollar" }),
    ("IN", CurrencyInfo { symbol: "₹", code: "INR", name: "Indian Rupee" }),
    ("CN", CurrencyInfo { symbol: "¥", code: "CNY", name: "Chinese Yuan" }),
    ("KR", CurrencyInfo { symbol: "₩", code: "KRW", name: "Korean Won" }),
    ("MX", CurrencyInfo { symbol: "Mex$", code: "MXN", name: "Mexican Peso" }),
    ("RU", CurrencyInfo { symbol: "₽", code: "RUB", name: "Russian Ruble" }),
    ("ZA", CurrencyInfo { symbol: "R", code: "ZAR", name: "South African Rand" }),
    ("NG", CurrencyInfo { symbol: "₦", code: "NGN", name: "Nigerian Naira" }),
    ("EG", CurrencyInfo { symbol: "£", code: "EGP", name: "Egyptian Pound" }),
    ("AE", CurrencyInfo { symbol: "د.إ", code: "AED", name: "UAE Dirham" }),
    ("SA", CurrencyInfo { symbol: "﷼", code: "SAR", name: "Saudi Riyal" }),
    ("CH", CurrencyInfo { symbol: "CHF", code: "CHF", name: "Swiss Franc" }),
    ("SG", CurrencyInfo { symbol: "S$", code: "SGD", name: "Singapore Dollar" }),
    ("TR", CurrencyInfo { symbol: "₺", code: "TRY", name: "Turkish Lira" }),
];

/// Units of each currency per one USD, as (code, mantissa, scale).
const EXCHANGE_RATES: &[(&str, i64, u32)] = &[
    ("USD", 1, 0),
    ("EUR", 93, 2),
    ("GBP", 79, 2),
    ("JPY", 15472, 2),
    ("CAD", 136, 2),
    ("AUD", 152, 2),
    ("CHF", 91, 2),
    ("CNY", 723, 2),
    ("INR", 8347, 2),
    ("BRL", 508, 2),
    ("MXN", 1673, 2),
    ("SGD", 135, 2),
    ("ZAR", 1862, 2),
    ("RUB", 925, 1),
    ("TRY", 3215, 2),
    ("KRW", 13425, 1),
    ("NGN", 158025, 2),
    ("EGP", 4875, 2),
    ("AED", 367, 2),
    ("SAR", 375, 2),
];

const NO_DECIMAL_CURRENCIES: &[&str] = &["JPY", "KRW", "VND", "CLP", "PYG"];

/// Unknown countries display in USD.
pub fn currency_for_country(country_code: &str) -> CurrencyInfo {
    COUNTRY_CURRENCIES
        .iter()
        .find(|(country, _)| *country == country_code)
        .map(|(_, info)| *info)
        .unwrap_or(USD)
}

/// Unknown codes convert at 1.
pub fn rate_for(code: &str) -> Decimal {
    EXCHANGE_RATES
        .iter()
        .find(|(c, _, _)| *c == code)
        .map(|(_, mantissa, scale)| Decimal::new(*mantissa, *scale))
        .unwrap_or(Decimal::ONE)
}

/// Amounts too large to convert are returned unconverted.
pub fn convert(reference_amount: Decimal, code: &str) -> Decimal {
    match reference_amount.checked_mul(rate_for(code)) {
        Some(converted) => converted,
        None => {
            warn!(amount = %reference_amount, code, "conversion overflowed, showing reference amount");
            reference_amount
        }
    }
}

fn fraction_digits(code: &str) -> u32 {
    if NO_DECIMAL_CURRENCIES.contains(&code) {
        0
    } else {
        2
    }
}

fn format_with_commas(digits: &str) -> String {
    let chars = digits.chars().rev().collect::<Vec<char>>();
    let mut out = Vec::with_capacity(chars.len() + chars.len() / 3);
    for (i, ch) in chars.iter().enumerate() {
        if i > 0 && i % 3 == 0 {
            out.push(',');
        }
        out.push(*ch);
    }
    out.into_iter().rev().collect()
}

fn format_grouped(amount: Decimal, decimals: u32) -> String {
    let rounded = amount.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero);
    let text = format!("{:.*}", decimals as usize, rounded.abs());
    let (whole, fraction) = match text.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (text.as_str(), None),
    };
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    match fraction {
        Some(fraction) => format!("{}{}.{}", sign, format_with_commas(whole), fraction),
        None => format!("{}{}", sign, format_with_commas(whole)),
    }
}

/// Converts a reference-currency amount and formats it, e.g. `€134,850.00`.
pub fn format_currency(reference_amount: Decimal, currency: &CurrencyInfo) -> String {
    let converted = convert(reference_amount, currency.code);
    let grouped = format_grouped(converted, fraction_digits(currency.code));
    match grouped.strip_prefix('-') {
        Some(magnitude) => format!("-{}{}", currency.symbol, magnitude),
        None => format!("{}{}", currency.symbol, grouped),
    }
}

/// Plain grouped reference amount with trailing zero cents dropped, e.g. `145,000`.
pub fn format_reference(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let decimals = rounded.normalize().scale();
    format_grouped(rounded, decimals)
}
