//! Storage format for embedding blobs.
//!
//! Layout (all integers little-endian):
//! ```text
//! offset  size  field
//! 0       4     magic "FEMB"
//! 4       1     format version (1)
//! 5       1     element type (1 = f32 LE)
//! 6       2     model tag length T (0 = no tag)
//! 8       4     element count N
//! 12      4*N   values
//! 12+4*N  T     model tag, UTF-8
//! ```

use crate::types::Embedding;
use thiserror::Error;

const MAGIC: [u8; 4] = *b"FEMB";
const FORMAT_VERSION: u8 = 1;
const ELEMENT_F32_LE: u8 = 1;
const HEADER_LEN: usize = 12;

#[derive(Error, Debug, PartialEq)]
pub enum CodecError {
    #[error("blob too short: {0} bytes")]
    TooShort(usize),
    #[error("bad magic: {0:02x?}")]
    BadMagic([u8; 4]),
    #[error("unsupported format version {0}")]
    UnsupportedVersion(u8),
    #[error("unsupported element type {0}")]
    UnsupportedElementType(u8),
    #[error("declared {declared} elements but payload holds {actual} bytes")]
    LengthMismatch { declared: usize, actual: usize },
    #[error("embedding contains non-finite values")]
    NonFinite,
    #[error("embedding too long: {0} elements")]
    TooLong(usize),
    #[error("model tag too long: {0} bytes")]
    TagTooLong(usize),
    #[error("model tag is not valid UTF-8")]
    BadModelTag,
}

/// Encode an embedding's values and model tag into a self-describing blob.
pub fn encode_embedding(embedding: &Embedding) -> Result<Vec<u8>, CodecError> {
    let values = &embedding.values;
    if values.iter().any(|v| !v.is_finite()) {
        return Err(CodecError::NonFinite);
    }
    let count = u32::try_from(values.len()).map_err(|_| CodecError::TooLong(values.len()))?;
    let tag = embedding.model_version.as_deref().unwrap_or("").as_bytes();
    let tag_len = u16::try_from(tag.len()).map_err(|_| CodecError::TagTooLong(tag.len()))?;

    let mut blob = Vec::with_capacity(HEADER_LEN + std::mem::size_of_val(values.as_slice()) + tag.len());
    blob.extend_from_slice(&MAGIC);
    blob.push(FORMAT_VERSION);
    blob.push(ELEMENT_F32_LE);
    blob.extend_from_slice(&tag_len.to_le_bytes());
    blob.extend_from_slice(&count.to_le_bytes());
    for &value in values {
        blob.extend_from_slice(&value.to_le_bytes());
    }
    blob.extend_from_slice(tag);
    Ok(blob)
}

/// Decode a blob produced by [`encode_embedding`].
pub fn decode_embedding(blob: &[u8]) -> Result<Embedding, CodecError> {
    if blob.len() < HEADER_LEN {
        return Err(CodecError::TooShort(blob.len()));
    }
    let magic = [blob[0], blob[1], blob[2], blob[3]];
    if magic != MAGIC {
        return Err(CodecError::BadMagic(magic));
    }
    if blob[4] != FORMAT_VERSION {
        return Err(CodecError::UnsupportedVersion(blob[4]));
    }
    if blob[5] != ELEMENT_F32_LE {
        return Err(CodecError::UnsupportedElementType(blob[5]));
    }

    let tag_len = u16::from_le_bytes([blob[6], blob[7]]) as usize;
    let declared = u32::from_le_bytes([blob[8], blob[9], blob[10], blob[11]]) as usize;
    let payload = &blob[HEADER_LEN..];
    if declared.checked_mul(4).and_then(|n| n.checked_add(tag_len)) != Some(payload.len()) {
        return Err(CodecError::LengthMismatch {
            declared,
            actual: payload.len(),
        });
    }
    let (data, tag) = payload.split_at(declared * 4);

    let mut values = Vec::with_capacity(declared);
    for chunk in data.chunks_exact(4) {
        let value = f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        if !value.is_finite() {
            return Err(CodecError::NonFinite);
        }
        values.push(value);
    }

    let model_version = if tag.is_empty() {
        None
    } else {
        Some(std::str::from_utf8(tag).map_err(|_| CodecError::BadModelTag)?.to_string())
    };
    Ok(Embedding { values, model_version })
}
