//! Access to the remote data API.
//!
//! [`RemoteStore`] is the seam between the query accessors and the backend.
//! [`RestStore`] talks to a PostgREST endpoint over HTTP; [`MemoryStore`]
//! evaluates the same [`Query`](crate::query::Query) values in process.

pub mod memory;
pub mod rest;

pub use memory::MemoryStore;
pub use rest::RestStore;

use serde_json::Value;

use crate::error::{FinTrackError, Result};
use crate::models::Record;
use crate::query::Query;

/// Row-level operations offered by the data API.
///
/// Every method is a single independent request; nothing spans multiple
/// calls.
pub trait RemoteStore: Send + Sync {
    /// Return the rows matching `query`, projected and embedded as requested.
    fn fetch(&self, query: &Query) -> Result<Vec<Value>>;

    /// Insert one or more rows into `query.table` and return the created rows,
    /// projected through the query's select clause. Filters are ignored.
    fn insert(&self, query: &Query, rows: Vec<Value>) -> Result<Vec<Value>>;

    /// Apply `patch` to every row matching the query's filters and return the
    /// updated rows.
    fn update(&self, query: &Query, patch: Value) -> Result<Vec<Value>>;

    /// Delete the rows matching the query's filters; returns how many went.
    fn delete(&self, query: &Query) -> Result<usize>;

    /// Call a stored procedure with JSON arguments.
    fn rpc(&self, function: &str, args: Value) -> Result<Value>;
}

/// Decode raw rows into typed records, checking each record's invariants.
pub fn decode_rows<T: Record>(rows: Vec<Value>) -> Result<Vec<T>> {
    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let record: T = serde_json::from_value(row).map_err(|e| FinTrackError::InvalidRecord {
            table: T::TABLE.to_string(),
            message: e.to_string(),
        })?;
        record.check().map_err(|message| FinTrackError::InvalidRecord {
            table: T::TABLE.to_string(),
            message,
        })?;
        out.push(record);
    }
    Ok(out)
}

/// Decode the first row, failing with `NotFound` on an empty result.
pub fn decode_one<T: Record>(rows: Vec<Value>, what: &str) -> Result<T> {
    decode_rows::<T>(rows)?
        .into_iter()
        .next()
        .ok_or_else(|| FinTrackError::NotFound(what.to_string()))
}
