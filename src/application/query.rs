//! Filter state to query string translation.

use url::form_urlencoded;

use crate::{
    application::error::FilterError,
    domain::filters::{FilterField, FilterState},
};

pub const BYTES_PER_KB: u64 = 1024;

/// Serializes the committed filters into a canonical query string.
///
/// Empty fields are omitted entirely, size bounds are converted from KB to
/// bytes, and keys always come out in [`FilterField::ALL`] order. Returns
/// `None` when no filter is set so callers can leave the `?` off.
pub fn serialize(filters: &FilterState) -> Result<Option<String>, FilterError> {
    let mut query = form_urlencoded::Serializer::new(String::new());
    let mut any = false;

    for field in FilterField::ALL {
        let raw = filters.get(field);
        if raw.is_empty() {
            continue;
        }

        if field.is_size() {
            let bytes = kb_to_bytes(field, raw)?;
            query.append_pair(field.key(), &bytes.to_string());
        } else {
            query.append_pair(field.key(), raw);
        }
        any = true;
    }

    Ok(any.then(|| query.finish()))
}

/// Full listing URL for `filters` under `api_url`.
pub fn list_url(api_url: &str, filters: &FilterState) -> Result<String, FilterError> {
    let base = format!("{}/files/", api_url.trim_end_matches('/'));
    Ok(match serialize(filters)? {
        Some(query) => format!("{}?{}", base, query),
        None => base,
    })
}

fn kb_to_bytes(field: FilterField, raw: &str) -> Result<u64, FilterError> {
    let invalid = || FilterError::InvalidSize {
        field,
        value: raw.to_string(),
    };

    let trimmed = raw.trim();
    if let Ok(kb) = trimmed.parse::<u64>() {
        return kb.checked_mul(BYTES_PER_KB).ok_or_else(invalid);
    }

    let kb = trimmed.parse::<f64>().map_err(|_| invalid())?;
    if !kb.is_finite() || kb < 0.0 {
        return Err(invalid());
    }
    let bytes = (kb * BYTES_PER_KB as f64).round();
    if bytes > u64::MAX as f64 {
        return Err(invalid());
    }
    Ok(bytes as u64)
}
