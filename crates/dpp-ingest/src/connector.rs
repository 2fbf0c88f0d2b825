//! The single-capability contract every source format implements.

use dpp_model::{ConnectorError, DataRecord, Source};

/// Parses one external source format into flat records.
///
/// `parse` materializes the whole batch: the mapping engine requires every
/// record up front so a mapping failure never leaves a half-consumed source
/// behind. Implementations must not retry on failure — a connector error is
/// surfaced verbatim to the caller.
pub trait Connector: Send + Sync {
    /// Registry name, as used in `mapping.source.connector`.
    fn name(&self) -> &'static str;

    /// One-line description for listings.
    fn description(&self) -> &'static str;

    fn parse(&self, source: &Source) -> Result<Vec<DataRecord>, ConnectorError>;
}

/// Resolves a source to UTF-8 text for text-based connectors.
pub(crate) fn source_text(source: &Source) -> Result<String, ConnectorError> {
    match source {
        Source::Path(path) => {
            std::fs::read_to_string(path).map_err(|source| ConnectorError::read(path, source))
        }
        Source::Text(text) => Ok(text.clone()),
        Source::Bytes(bytes) => String::from_utf8(bytes.clone()).map_err(|error| {
            ConnectorError::Encoding {
                detail: error.to_string(),
            }
        }),
    }
}
