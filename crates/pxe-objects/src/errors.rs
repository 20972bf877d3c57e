use alloc::string::String;

use thiserror::Error;

// FIELD DECODING ERROR
// ================================================================================================

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FieldDecodingError {
    #[error("value {value} exceeds the maximum of {max}")]
    ValueOutOfRange { value: u64, max: u64 },
    #[error("value {0} is not a boolean")]
    NotABoolean(u64),
    #[error("expected at least {expected} field elements but only {available} are available")]
    UnexpectedEnd { expected: usize, available: usize },
    #[error("expected exactly {expected} values but got {actual}")]
    UnexpectedLength { expected: usize, actual: usize },
    #[error("{value} is not a valid {kind}")]
    InvalidDiscriminant { kind: &'static str, value: u64 },
}

// NOTE ERROR
// ================================================================================================

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NoteError {
    #[error("property selector references item {index} but the note has {num_items} items")]
    SelectorIndexOutOfBounds { index: usize, num_items: usize },
    #[error(
        "property selector with offset {offset} and length {length} exceeds the {max} bytes of a field element"
    )]
    SelectorRangeOutOfBounds { offset: usize, length: usize, max: usize },
}

// ABI ERROR
// ================================================================================================

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AbiError {
    #[error("parameter `{name}` of function `{function}` is not an array")]
    ParameterNotAnArray { function: String, name: String },
    #[error("function `{0}` has no parameters")]
    NoParameters(String),
}
