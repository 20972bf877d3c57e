use alloc::vec::Vec;

use super::{CallContext, FunctionData, PrivateCircuitPublicInputs};
use crate::{
    ENQUEUE_PUBLIC_FUNCTION_RESULT_LENGTH, Felt, FieldDecodingError,
    PRIVATE_CALL_STACK_ITEM_LENGTH,
    address::{Address, FunctionSelector},
    fields::{FieldReader, bool_to_felt},
    hash::{compute_var_args_hash, hash_with_separator, separator},
};

// CALL INVOCATION
// ================================================================================================

/// The arguments of a nested call as they arrive from the calling function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallInvocation {
    pub target: Address,
    pub selector: FunctionSelector,
    pub args_hash: Felt,
    pub side_effect_counter: u32,
    pub is_static_call: bool,
    pub is_delegate_call: bool,
}

impl CallInvocation {
    /// Decodes an invocation from `[target, selector, args_hash, counter, is_static,
    /// is_delegate]`.
    pub fn read_from(reader: &mut FieldReader<'_>) -> Result<Self, FieldDecodingError> {
        Ok(Self {
            target: reader.read_field()?.into(),
            selector: FunctionSelector::from_field(reader.read_field()?)?,
            args_hash: reader.read_field()?,
            side_effect_counter: reader.read_u32()?,
            is_static_call: reader.read_bool()?,
            is_delegate_call: reader.read_bool()?,
        })
    }
}

// PRIVATE CALL STACK ITEM
// ================================================================================================

/// Commitment to a completed private call, consumed by the calling function and the kernel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivateCallStackItem {
    pub contract_address: Address,
    pub function_data: FunctionData,
    pub public_inputs: PrivateCircuitPublicInputs,
}

impl PrivateCallStackItem {
    /// Encodes the item as the calling function sees it.
    ///
    /// Layout: `[contract, selector, is_private, call_context(6), args_hash, returns_hash,
    /// start_counter, end_counter, public_inputs_hash]`.
    pub fn to_fields(&self) -> Vec<Felt> {
        let inputs = &self.public_inputs;
        let mut fields = Vec::with_capacity(PRIVATE_CALL_STACK_ITEM_LENGTH);
        fields.push(self.contract_address.as_felt());
        fields.push(self.function_data.selector.to_field());
        fields.push(bool_to_felt(self.function_data.is_private));
        fields.extend(inputs.call_context.to_fields());
        fields.push(inputs.args_hash);
        fields.push(inputs.returns_hash);
        fields.push(Felt::new(inputs.start_side_effect_counter as u64));
        fields.push(Felt::new(inputs.end_side_effect_counter as u64));
        fields.push(inputs.hash());
        fields
    }

    pub fn hash(&self) -> Felt {
        hash_with_separator(separator::CALL_STACK_ITEM, &self.to_fields())
    }
}

// PUBLIC CALL REQUEST
// ================================================================================================

/// A public function call enqueued by a private function, to be executed by the sequencer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicCallRequest {
    pub contract_address: Address,
    pub function_data: FunctionData,
    pub call_context: CallContext,
    pub parent_call_context: CallContext,
    pub args: Vec<Felt>,
}

impl PublicCallRequest {
    pub fn args_hash(&self) -> Felt {
        compute_var_args_hash(&self.args)
    }

    /// The counter at which the request was enqueued.
    pub fn side_effect_counter(&self) -> u32 {
        self.call_context.side_effect_counter
    }

    /// Encodes the request as returned to the enqueuing function.
    ///
    /// Layout: `[contract, selector, call_context(6), args_hash]`.
    pub fn to_enqueue_result(&self) -> Vec<Felt> {
        let mut fields = Vec::with_capacity(ENQUEUE_PUBLIC_FUNCTION_RESULT_LENGTH);
        fields.push(self.contract_address.as_felt());
        fields.push(self.function_data.selector.to_field());
        fields.extend(self.call_context.to_fields());
        fields.push(self.args_hash());
        fields
    }

    pub fn hash(&self) -> Felt {
        let mut fields = self.to_enqueue_result();
        fields.extend(self.parent_call_context.to_fields());
        hash_with_separator(separator::CALL_STACK_ITEM, &fields)
    }
}

// TESTS
// ================================================================================================
