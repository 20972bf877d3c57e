use alloc::vec::Vec;

use crate::{
    Felt, FieldDecodingError, TX_CONTEXT_LENGTH,
    address::{Address, FunctionSelector},
    fields::{FieldReader, bool_to_felt},
};

// CALL CONTEXT
// ================================================================================================

/// Per-call information visible to the executing function.
///
/// A call context is fixed once a call starts. `storage_contract_address` is the contract whose
/// state the call operates on, which differs from the code being executed for delegate calls.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CallContext {
    pub msg_sender: Address,
    pub storage_contract_address: Address,
    pub function_selector: FunctionSelector,
    pub is_delegate_call: bool,
    pub is_static_call: bool,
    /// Side-effect counter value at which the call starts.
    pub side_effect_counter: u32,
}

impl CallContext {
    pub fn to_fields(&self) -> Vec<Felt> {
        vec![
            self.msg_sender.as_felt(),
            self.storage_contract_address.as_felt(),
            self.function_selector.to_field(),
            bool_to_felt(self.is_delegate_call),
            bool_to_felt(self.is_static_call),
            Felt::new(self.side_effect_counter as u64),
        ]
    }

    pub fn from_fields(fields: &[Felt]) -> Result<Self, FieldDecodingError> {
        Self::read_from(&mut FieldReader::new(fields))
    }

    pub fn read_from(reader: &mut FieldReader<'_>) -> Result<Self, FieldDecodingError> {
        Ok(Self {
            msg_sender: reader.read_field()?.into(),
            storage_contract_address: reader.read_field()?.into(),
            function_selector: FunctionSelector::from_field(reader.read_field()?)?,
            is_delegate_call: reader.read_bool()?,
            is_static_call: reader.read_bool()?,
            side_effect_counter: reader.read_u32()?,
        })
    }
}

// FUNCTION DATA
// ================================================================================================

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FunctionData {
    pub selector: FunctionSelector,
    pub is_private: bool,
}

impl FunctionData {
    pub const fn new(selector: FunctionSelector, is_private: bool) -> Self {
        Self { selector, is_private }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

// TX CONTEXT
// ================================================================================================

/// Chain parameters a transaction is bound to.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TxContext {
    pub chain_id: Felt,
    pub version: Felt,
}

impl TxContext {
    pub const fn new(chain_id: Felt, version: Felt) -> Self {
        Self { chain_id, version }
    }

    pub fn to_fields(&self) -> [Felt; TX_CONTEXT_LENGTH] {
        [self.chain_id, self.version]
    }

    pub fn read_from(reader: &mut FieldReader<'_>) -> Result<Self, FieldDecodingError> {
        Ok(Self {
            chain_id: reader.read_field()?,
            version: reader.read_field()?,
        })
    }
}

// TESTS
// ================================================================================================
