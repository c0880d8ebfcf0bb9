use sha2::{Digest, Sha256};
use std::fmt::Write;

use super::record::Schema;

const FIELD_SEPARATOR: char = '_';

/// Hex SHA-256 over the kind followed by, for each non-reserved field,
/// name + type tag + index tag + length-prefixed rendered value + `_`.
///
/// Intended as a cache key only: it changes whenever the declared fields do.
pub fn generate_hash<S: Schema>(record: &S) -> String {
    let mut fingerprint = String::from(record.kind());
    for descriptor in record.fields().iter().filter(|d| !d.is_reserved()) {
        fingerprint.push_str(descriptor.name());
        fingerprint.push_str(descriptor.field_type.tag());
        fingerprint.push_str(descriptor.index_tag());
        let value = record.get(descriptor.name()).to_string();
        let _ = write!(fingerprint, "{}:{value}", value.len());
        fingerprint.push(FIELD_SEPARATOR);
    }

    let mut hasher = Sha256::new();
    hasher.update(fingerprint.as_bytes());
    hex::encode(hasher.finalize())
}
