pub mod budget;
pub mod category;
pub mod expense;
pub mod period;
pub mod stats;
pub mod user;

pub use budget::*;
pub use category::*;
pub use expense::*;
pub use period::*;
pub use stats::*;
pub use user::*;

use chrono::NaiveDate;
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer};

// ---------------------------------------------------------------------------
// Record: a row type read from the data API
// ---------------------------------------------------------------------------

/// A typed row of one of the remote tables.
///
/// Rows are decoded with serde and then passed through [`Record::check`], so
/// every record handed out by the SDK satisfies the table's invariants.
pub trait Record: DeserializeOwned {
    const TABLE: &'static str;

    /// Validate invariants serde cannot express. Returns a description of
    /// the first violation.
    fn check(&self) -> std::result::Result<(), String> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Field decoders shared by the row types
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(untagged)]
enum RawNumber {
    Number(f64),
    Text(String),
}

impl RawNumber {
    fn into_f64<E: serde::de::Error>(self) -> std::result::Result<f64, E> {
        match self {
            RawNumber::Number(n) => Ok(n),
            RawNumber::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| E::custom(format!("not a number: {:?}", s))),
        }
    }
}

/// Decode a money amount sent either as a JSON number or a numeric string
/// (Postgres `numeric` columns may arrive as strings). Negative and
/// non-finite values are rejected.
pub(crate) fn de_amount<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<f64, D::Error> {
    let value = RawNumber::deserialize(d)?.into_f64::<D::Error>()?;
    if !value.is_finite() || value < 0.0 {
        return Err(D::Error::custom(format!(
            "amount must be a non-negative number, got {}",
            value
        )));
    }
    Ok(value)
}

pub(crate) fn de_opt_number<'de, D: Deserializer<'de>>(
    d: D,
) -> std::result::Result<Option<f64>, D::Error> {
    match Option::<RawNumber>::deserialize(d)? {
        Some(raw) => raw.into_f64::<D::Error>().map(Some),
        None => Ok(None),
    }
}

/// Decode a calendar date from `YYYY-MM-DD` or a full timestamp.
pub(crate) fn de_date<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<NaiveDate, D::Error> {
    let raw = String::deserialize(d)?;
    let day = raw.split(['T', ' ']).next().unwrap_or("");
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .map_err(|e| D::Error::custom(format!("invalid date {:?}: {}", raw, e)))
}

/// Decode a nullable text column as an empty string.
pub(crate) fn de_text<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<String, D::Error> {
    Ok(Option::<String>::deserialize(d)?.unwrap_or_default())
}
