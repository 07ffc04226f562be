//! Deserializers for loosely-typed backend fields.
//!
//! Decimal columns arrive as strings ("12.50") from some endpoints and as
//! numbers from others.

use chrono::{DateTime, NaiveDate};
use serde::de::Error;
use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
  Number(f64),
  Text(String),
}

fn parse<E: Error>(value: NumberOrString) -> Result<f64, E> {
  match value {
    NumberOrString::Number(n) => Ok(n),
    NumberOrString::Text(s) => s
      .trim()
      .parse()
      .map_err(|_| E::custom(format!("invalid decimal: {:?}", s))),
  }
}

pub fn decimal<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
  D: Deserializer<'de>,
{
  parse(NumberOrString::deserialize(deserializer)?)
}

pub fn opt_decimal<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
  D: Deserializer<'de>,
{
  Option::<NumberOrString>::deserialize(deserializer)?
    .map(parse)
    .transpose()
}

fn parse_date<E: Error>(raw: &str) -> Result<NaiveDate, E> {
  let raw = raw.trim();
  NaiveDate::parse_from_str(raw, "%Y-%m-%d")
    .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.date_naive()))
    .or_else(|_| NaiveDate::parse_from_str(&format!("{}-01", raw), "%Y-%m-%d"))
    .map_err(|_| E::custom(format!("invalid date: {:?}", raw)))
}

/// Calendar date, also accepting a full timestamp (its date part is kept)
/// or a bare month (the first day is used).
pub fn date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
  D: Deserializer<'de>,
{
  parse_date(&String::deserialize(deserializer)?)
}

pub fn opt_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
  D: Deserializer<'de>,
{
  Option::<String>::deserialize(deserializer)?
    .filter(|raw| !raw.trim().is_empty())
    .map(|raw| parse_date(&raw))
    .transpose()
}

/// Free-text field the backend sometimes sends as a number (table labels).
pub fn opt_label<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
  D: Deserializer<'de>,
{
  Ok(
    Option::<NumberOrString>::deserialize(deserializer)?.map(|value| match value {
      NumberOrString::Text(s) => s,
      NumberOrString::Number(n) if n.fract() == 0.0 => format!("{}", n as i64),
      NumberOrString::Number(n) => n.to_string(),
    }),
  )
}
