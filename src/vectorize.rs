//! Domain name -> fixed width index vector.
//!
//! Each character is replaced by its vocabulary index, filling slots from 0.
//! Unused trailing slots stay at zero, which the model reads as padding.

use ndarray::Array2;

use crate::error::DgaError;
use crate::vocab;

pub const MAX_DOMAIN_LEN: usize = 82;

pub fn encode_domain(domain: &str) -> Result<[f32; MAX_DOMAIN_LEN], DgaError> {
    let len = domain.chars().count();
    if len > MAX_DOMAIN_LEN {
        return Err(DgaError::DomainTooLong {
            domain: domain.to_string(),
            len,
            max: MAX_DOMAIN_LEN,
        });
    }

    let mut out = [0f32; MAX_DOMAIN_LEN];
    for (position, character) in domain.chars().enumerate() {
        let idx = vocab::char_index(character).ok_or_else(|| DgaError::UnknownCharacter {
            domain: domain.to_string(),
            character,
            position,
        })?;
        out[position] = idx as f32;
    }
    Ok(out)
}

/// Encodes a whole batch. The first bad domain fails the batch.
pub fn vectorize<S: AsRef<str>>(domains: &[S]) -> Result<Array2<f32>, DgaError> {
    let mut batch = Array2::<f32>::zeros((domains.len(), MAX_DOMAIN_LEN));
    for (i, domain) in domains.iter().enumerate() {
        let row = encode_domain(domain.as_ref())?;
        batch.row_mut(i).assign(&ndarray::ArrayView1::from(&row[..]));
    }
    Ok(batch)
}

/// Inverse of [`encode_domain`]. Trailing zero slots are padding; a zero in the
/// middle of a row is a real `-`. A trailing `-` is therefore not recoverable.
pub fn decode_row(row: &[f32]) -> String {
    let used = row
        .iter()
        .rposition(|v| *v != 0.0)
        .map(|p| p + 1)
        .unwrap_or(0);

    row[..used]
        .iter()
        .filter_map(|v| vocab::index_char(*v as u8))
        .collect()
}
