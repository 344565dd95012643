use aip_store::StoreError;
use aip_types::AipError;

/// Maps a storage failure onto the ledger's own error surface.
pub fn from_store(err: StoreError) -> AipError {
    match err {
        StoreError::RecordNotFound(token) => AipError::UnknownServeToken(token),
        other => AipError::StorageUnavailable(other.to_string()),
    }
}
