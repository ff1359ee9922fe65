//! Portable backup tokens.
//!
//! A token is `base64(json(map))`: the backup's declared fields merged over
//! caller-supplied extras. Tokens let an operator export a backup's metadata
//! from one deployment and import it into another.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tracing::debug;

use vaultkeeper_core::error::{AppError, ErrorKind};
use vaultkeeper_core::result::AppResult;
use vaultkeeper_core::types::Primitive;

use super::model::Backup;

/// Serialize a backup, with optional extra info, into a token.
///
/// Extras are applied first and the backup's fields over them, so a field
/// the backup declares always wins a key collision.
pub fn encode_record(backup: &Backup, extra: &Primitive) -> AppResult<String> {
    let mut merged = extra.clone();
    merged.extend(backup.snapshot());
    let json = serde_json::to_vec(&merged)?;
    Ok(STANDARD.encode(json))
}

/// Deserialize a token back into a field map.
///
/// ASCII whitespace is ignored so line-wrapped tokens decode. Every failure
/// is reported as `InvalidInput`; the message tells a bad encoding apart
/// from a bad payload.
pub fn decode_record(token: &str) -> AppResult<Primitive> {
    let compact: String = token
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();

    let bytes = STANDARD.decode(compact.as_bytes()).map_err(|e| {
        debug!(error = %e, "Backup token is not valid base64");
        AppError::with_source(ErrorKind::InvalidInput, "Can't decode backup record.", e)
    })?;

    serde_json::from_slice::<Primitive>(&bytes).map_err(|e| {
        debug!(error = %e, "Backup token payload is not a JSON field map");
        AppError::with_source(ErrorKind::InvalidInput, "Can't parse backup record.", e)
    })
}
