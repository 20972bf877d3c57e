//! Function artifacts and the parts of the ABI the simulator needs to reason about.

use alloc::{
    boxed::Box,
    string::{String, ToString},
    vec::Vec,
};
use core::fmt::{self, Display, Formatter};

use crate::{AbiError, address::FunctionSelector};

// FUNCTION TYPE
// ================================================================================================

/// The kind of a contract function, which determines how it may be executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionType {
    /// Constrained function executed client-side; produces a witness for the private kernel.
    Private,
    /// Constrained function executed by the sequencer.
    Public,
    /// Unconstrained view function; produces return values only.
    Unconstrained,
}

impl Display for FunctionType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Private => f.write_str("private"),
            Self::Public => f.write_str("public"),
            Self::Unconstrained => f.write_str("unconstrained"),
        }
    }
}

// ABI TYPES
// ================================================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiType {
    Field,
    Boolean,
    Integer { signed: bool, width: u32 },
    Array { length: usize, typ: Box<AbiType> },
    String { length: usize },
    Struct { path: String, fields: Vec<AbiParameter> },
}

impl AbiType {
    /// Returns the number of field elements a value of this type occupies.
    pub fn size_in_fields(&self) -> usize {
        match self {
            Self::Field | Self::Boolean | Self::Integer { .. } => 1,
            Self::Array { length, typ } => length * typ.size_in_fields(),
            Self::String { length } => *length,
            Self::Struct { fields, .. } => fields.iter().map(|f| f.typ.size_in_fields()).sum(),
        }
    }

    /// Returns the canonical name of this type as it appears in a function signature.
    pub fn signature(&self) -> String {
        match self {
            Self::Field => "Field".to_string(),
            Self::Boolean => "bool".to_string(),
            Self::Integer { signed, width } => {
                format!("{}{width}", if *signed { "i" } else { "u" })
            },
            Self::Array { length, typ } => format!("[{};{length}]", typ.signature()),
            Self::String { length } => format!("str<{length}>"),
            Self::Struct { fields, .. } => {
                let inner: Vec<String> = fields.iter().map(|f| f.typ.signature()).collect();
                format!("({})", inner.join(","))
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbiParameter {
    name: String,
    typ: AbiType,
}

impl AbiParameter {
    pub fn new(name: impl Into<String>, typ: AbiType) -> Self {
        Self { name: name.into(), typ }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn typ(&self) -> &AbiType {
        &self.typ
    }
}

// FUNCTION ARTIFACT
// ================================================================================================

/// Compiled form of a contract function together with its interface.
///
/// The bytecode and verification key are opaque to the simulator: they are handed to the
/// function runtime and copied into execution results for the prover.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionArtifact {
    name: String,
    function_type: FunctionType,
    parameters: Vec<AbiParameter>,
    bytecode: Vec<u8>,
    verification_key: Vec<u8>,
}

impl FunctionArtifact {
    pub fn new(
        name: impl Into<String>,
        function_type: FunctionType,
        parameters: Vec<AbiParameter>,
        bytecode: Vec<u8>,
        verification_key: Vec<u8>,
    ) -> Self {
        Self {
            name: name.into(),
            function_type,
            parameters,
            bytecode,
            verification_key,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn function_type(&self) -> FunctionType {
        self.function_type
    }

    pub fn parameters(&self) -> &[AbiParameter] {
        &self.parameters
    }

    pub fn bytecode(&self) -> &[u8] {
        &self.bytecode
    }

    pub fn verification_key(&self) -> &[u8] {
        &self.verification_key
    }

    pub fn selector(&self) -> FunctionSelector {
        FunctionSelector::from_name_and_parameters(&self.name, &self.parameters)
    }

    /// Returns the total number of field elements the function's arguments occupy.
    pub fn arguments_size(&self) -> usize {
        self.parameters.iter().map(|param| param.typ.size_in_fields()).sum()
    }

    /// Returns the declared length of the last parameter, which must be an array.
    ///
    /// Used to learn the note capacity of callbacks that receive a padded note as their last
    /// argument.
    pub fn last_parameter_array_length(&self) -> Result<usize, AbiError> {
        let last = self
            .parameters
            .last()
            .ok_or_else(|| AbiError::NoParameters(self.name.clone()))?;

        match last.typ {
            AbiType::Array { length, .. } => Ok(length),
            _ => Err(AbiError::ParameterNotAnArray {
                function: self.name.clone(),
                name: last.name.clone(),
            }),
        }
    }
}

// TESTS
// ================================================================================================
