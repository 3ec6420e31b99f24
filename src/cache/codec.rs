//! Byte encoding of cached record lists.

use crate::feed::Record;
use crate::{FlockError, Result};

/// Encode a record list for the cache.
pub fn encode_records(records: &[Record]) -> Result<Vec<u8>> {
    serde_json::to_vec(records).map_err(|e| FlockError::Cache(format!("encode failed: {e}")))
}

/// Decode a record list written by [`encode_records`].
pub fn decode_records(bytes: &[u8]) -> Result<Vec<Record>> {
    serde_json::from_slice(bytes).map_err(|e| FlockError::Cache(format!("decode failed: {e}")))
}
