//! Offset cursors. The string form is opaque to callers.
use mesh_core::StoreError;

pub(crate) fn offset(cursor: Option<&str>) -> Result<i64, StoreError> {
    match cursor {
        None | Some("") => Ok(0),
        Some(raw) => raw
            .parse::<i64>()
            .ok()
            .filter(|n| *n >= 0)
            .ok_or_else(|| StoreError::Decode(format!("invalid page cursor '{raw}'"))),
    }
}

/// Cursor of the page after the one starting at `offset`, if rows remain.
pub(crate) fn next(offset: i64, returned: usize, total: i64) -> Option<String> {
    let end = offset + returned as i64;
    (returned > 0 && end < total).then(|| end.to_string())
}
