//! Helpers for moving protocol values in and out of flat field-element sequences.
//!
//! Every value crossing the boundary between an executing function and the host is a sequence
//! of field elements. Integers and booleans travel as field elements in a narrow range, so
//! decoding them must reject values which do not fit the target type.

use alloc::vec::Vec;

use crate::{Digest, FELT_BYTES, Felt, FieldDecodingError, ONE, StarkField, ZERO};

// NARROW DECODERS
// ================================================================================================

/// Decodes a field element into a `u32`.
pub fn felt_to_u32(value: Felt) -> Result<u32, FieldDecodingError> {
    let value = value.as_int();
    u32::try_from(value).map_err(|_| FieldDecodingError::ValueOutOfRange {
        value,
        max: u32::MAX as u64,
    })
}

/// Decodes a field element into a byte.
pub fn felt_to_u8(value: Felt) -> Result<u8, FieldDecodingError> {
    let value = value.as_int();
    u8::try_from(value).map_err(|_| FieldDecodingError::ValueOutOfRange { value, max: u8::MAX as u64 })
}

/// Decodes a field element into a boolean. Only `0` and `1` are accepted.
pub fn felt_to_bool(value: Felt) -> Result<bool, FieldDecodingError> {
    match value.as_int() {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(FieldDecodingError::NotABoolean(other)),
    }
}

/// Encodes a boolean as a field element.
pub fn bool_to_felt(value: bool) -> Felt {
    if value { ONE } else { ZERO }
}

/// Returns the canonical big-endian byte encoding of a field element.
pub fn felt_to_be_bytes(value: Felt) -> [u8; FELT_BYTES] {
    value.as_int().to_be_bytes()
}

// FIELD READER
// ================================================================================================

/// A cursor over a slice of field elements.
#[derive(Debug, Clone)]
pub struct FieldReader<'a> {
    fields: &'a [Felt],
    cursor: usize,
}

impl<'a> FieldReader<'a> {
    pub fn new(fields: &'a [Felt]) -> Self {
        Self { fields, cursor: 0 }
    }

    /// Returns the number of fields which have not been read yet.
    pub fn remaining(&self) -> usize {
        self.fields.len() - self.cursor
    }

    pub fn read_field(&mut self) -> Result<Felt, FieldDecodingError> {
        let field = self.fields.get(self.cursor).copied().ok_or(FieldDecodingError::UnexpectedEnd {
            expected: self.cursor + 1,
            available: self.fields.len(),
        })?;
        self.cursor += 1;
        Ok(field)
    }

    pub fn read_u32(&mut self) -> Result<u32, FieldDecodingError> {
        self.read_field().and_then(felt_to_u32)
    }

    pub fn read_u64(&mut self) -> Result<u64, FieldDecodingError> {
        self.read_field().map(|field| field.as_int())
    }

    pub fn read_bool(&mut self) -> Result<bool, FieldDecodingError> {
        self.read_field().and_then(felt_to_bool)
    }

    pub fn read_digest(&mut self) -> Result<Digest, FieldDecodingError> {
        let elements = self.read_fields(4)?;
        Ok(Digest::new([elements[0], elements[1], elements[2], elements[3]]))
    }

    /// Reads the next `count` fields.
    pub fn read_fields(&mut self, count: usize) -> Result<Vec<Felt>, FieldDecodingError> {
        let end = self.cursor + count;
        if end > self.fields.len() {
            return Err(FieldDecodingError::UnexpectedEnd {
                expected: end,
                available: self.fields.len(),
            });
        }
        let fields = self.fields[self.cursor..end].to_vec();
        self.cursor = end;
        Ok(fields)
    }

    /// Reads everything that is left.
    pub fn read_to_end(&mut self) -> Vec<Felt> {
        let fields = self.fields[self.cursor..].to_vec();
        self.cursor = self.fields.len();
        fields
    }
}

// TESTS
// ================================================================================================
