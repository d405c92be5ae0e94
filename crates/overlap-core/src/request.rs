//! Inbound request payloads.

use crate::error::{CoreError, Result};
use base64::{engine::general_purpose, Engine as _};
use serde::Deserialize;

/// One PSI computation request.
///
/// Datasets arrive base64-encoded; the config object is opaque to this
/// layer and handed to the PSI binary unmodified.
#[derive(Debug, Clone, Deserialize)]
pub struct PsiRequest {
    /// Base64-encoded sender dataset (CSV).
    pub sender_csv: String,

    /// Base64-encoded receiver dataset (CSV). When absent, the engine
    /// falls back to the fixed receiver file configured at deployment.
    #[serde(default)]
    pub receiver_csv: Option<String>,

    /// PSI configuration, passed through to the binary as a JSON file.
    /// Its schema is owned by the binary.
    #[serde(default)]
    pub config_json: serde_json::Value,
}

impl PsiRequest {
    /// Decode the sender dataset.
    pub fn decode_sender(&self) -> Result<Vec<u8>> {
        decode_field("sender_csv", &self.sender_csv)
    }

    /// Decode the receiver dataset, if the request carries one.
    pub fn decode_receiver(&self) -> Result<Option<Vec<u8>>> {
        self.receiver_csv
            .as_deref()
            .map(|payload| decode_field("receiver_csv", payload))
            .transpose()
    }
}

fn decode_field(field: &'static str, payload: &str) -> Result<Vec<u8>> {
    general_purpose::STANDARD
        .decode(payload)
        .map_err(|source| CoreError::InvalidInput { field, source })
}
