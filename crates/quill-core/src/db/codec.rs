//! Conversion between domain records and stored documents.
//!
//! Store metadata is scalar-only. Records describe their own flattening
//! here so list encoding and timestamp formatting never leak into the
//! memory layers.

use super::types::{Document, Metadata, NewDocument};
use chrono::{DateTime, Utc};

/// A domain record persisted as a document plus scalar metadata.
///
/// Decoding is lenient: missing or mistyped fields take their empty or
/// default value, mirroring how older collections were written.
pub trait MetadataRecord: Sized {
    /// Record id within its collection.
    fn id(&self) -> &str;

    /// Document text stored alongside the metadata.
    fn document(&self) -> &str;

    /// Flatten into scalar metadata.
    fn to_metadata(&self) -> Metadata;

    /// Rebuild from a stored document.
    fn from_stored(id: String, document: String, metadata: &Metadata) -> Self;

    fn from_document(doc: Document) -> Self {
        Self::from_stored(doc.id, doc.document, &doc.metadata)
    }

    /// Build a store write for this record.
    fn to_new_document(&self, embedding: Option<Vec<f32>>) -> NewDocument {
        NewDocument {
            id: self.id().to_string(),
            document: self.document().to_string(),
            embedding,
            metadata: self.to_metadata(),
        }
    }
}

impl Metadata {
    /// Insert a timestamp as RFC 3339 text.
    pub fn put_timestamp(&mut self, key: &str, at: &DateTime<Utc>) -> &mut Self {
        self.put(key, at.to_rfc3339())
    }

    /// Read an RFC 3339 timestamp. Missing or unparsable values yield the
    /// Unix epoch.
    pub fn timestamp(&self, key: &str) -> DateTime<Utc> {
        self.str(key)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_default()
    }
}
