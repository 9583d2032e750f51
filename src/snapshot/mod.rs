//! Index snapshot records and their JSON encoding.

use serde::{Deserialize, Serialize};

/// One indexed content record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub title: String,
    /// Sanitized plain-text body.
    pub content: String,
    pub link: String,
}

/// Result of leniently decoding a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Decoded {
    pub documents: Vec<Document>,
    /// Entries that were not valid documents.
    pub skipped: usize,
}

/// Encode documents as a compact JSON array.
///
/// The output has no timestamps or other run-dependent data, so equal
/// inputs always encode to equal bytes.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn encode(documents: &[Document]) -> Result<String, serde_json::Error> {
    serde_json::to_string(documents)
}

/// Decode a snapshot, skipping entries that lack a required field.
///
/// # Errors
///
/// Returns an error only if the text is not a JSON array.
pub fn decode(text: &str) -> Result<Decoded, serde_json::Error> {
    let entries: Vec<serde_json::Value> = serde_json::from_str(text)?;
    let mut decoded = Decoded::default();

    for (position, entry) in entries.into_iter().enumerate() {
        match serde_json::from_value::<Document>(entry) {
            Ok(doc) => decoded.documents.push(doc),
            Err(e) => {
                tracing::warn!(position, error = %e, "skipping malformed snapshot entry");
                decoded.skipped += 1;
            }
        }
    }

    Ok(decoded)
}
