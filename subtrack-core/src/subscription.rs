//! Subscription record types as stored in the encrypted inventory

use chrono::{DateTime, NaiveDate};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A recurring (or one-off) charge, as decrypted from the store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Subscription {
    /// Display name
    pub name: String,
    /// Non-negative amount
    #[serde(deserialize_with = "deserialize_price")]
    pub price: f64,
    /// Short currency code, display only
    #[serde(default, deserialize_with = "deserialize_nullable_string")]
    pub currency: String,
    /// Anchor date: the most recent known billing date
    #[serde(alias = "nextDate", deserialize_with = "deserialize_anchor_date")]
    pub date: NaiveDate,
    /// `null` or absent means non-recurring
    #[serde(default, deserialize_with = "deserialize_period")]
    pub period: Period,
    /// Optional icon URL shown with the push notification
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// Recurrence unit. Anything other than `month`/`year` is kept verbatim and
/// treated as non-recurring.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Period {
    Month,
    Year,
    Other(String),
}

impl Period {
    pub fn is_recurring(&self) -> bool {
        !matches!(self, Period::Other(_))
    }
}

impl Default for Period {
    fn default() -> Self {
        Period::Other(String::new())
    }
}

impl From<String> for Period {
    fn from(raw: String) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "month" => Period::Month,
            "year" => Period::Year,
            _ => Period::Other(raw),
        }
    }
}

impl From<&str> for Period {
    fn from(raw: &str) -> Self {
        Period::from(raw.to_string())
    }
}

impl From<Period> for String {
    fn from(p: Period) -> Self {
        match p {
            Period::Month => "month".to_string(),
            Period::Year => "year".to_string(),
            Period::Other(raw) => raw,
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::Month => f.write_str("month"),
            Period::Year => f.write_str("year"),
            Period::Other(raw) if raw.is_empty() => f.write_str("once"),
            Period::Other(raw) => f.write_str(raw),
        }
    }
}

impl Subscription {
    /// Create a new Subscription
    pub fn new(
        name: impl Into<String>,
        price: f64,
        currency: impl Into<String>,
        date: NaiveDate,
        period: impl Into<Period>,
    ) -> Self {
        Self {
            name: name.into(),
            price,
            currency: currency.into(),
            date,
            period: period.into(),
            icon: None,
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// "USD 9.99" style amount for display
    pub fn amount_label(&self) -> String {
        if self.currency.is_empty() {
            format!("{}", self.price)
        } else {
            format!("{} {}", self.currency, self.price)
        }
    }
}

/// Parse an anchor date: plain `YYYY-MM-DD` or an RFC 3339 timestamp.
pub fn parse_anchor_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

fn deserialize_anchor_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_anchor_date(&raw)
        .ok_or_else(|| de::Error::custom(format!("invalid billing date '{raw}'")))
}

fn deserialize_nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn deserialize_period<'de, D>(deserializer: D) -> Result<Period, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?
        .map(Period::from)
        .unwrap_or_default())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPrice {
    Number(f64),
    Text(String),
}

fn deserialize_price<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let price = match RawPrice::deserialize(deserializer)? {
        RawPrice::Number(n) => n,
        RawPrice::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| de::Error::custom(format!("invalid price '{s}'")))?,
    };
    if !price.is_finite() || price < 0.0 {
        return Err(de::Error::custom(format!("price must be non-negative, got {price}")));
    }
    Ok(price)
}
