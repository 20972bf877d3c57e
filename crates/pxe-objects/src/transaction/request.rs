use alloc::vec::Vec;

use super::{FunctionData, PackedValues, TxContext};
use crate::{Felt, address::Address};

// AUTH WITNESS
// ================================================================================================

/// Authorization data for an action, keyed by the hash of the request it authorizes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthWitness {
    pub request_hash: Felt,
    pub witness: Vec<Felt>,
}

// TX EXECUTION REQUEST
// ================================================================================================

/// A request to simulate a transaction starting at a private entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxExecutionRequest {
    /// The account the transaction originates from.
    pub origin: Address,
    pub function_data: FunctionData,
    /// Hash of the entry point's arguments; the values are among `args_of_calls`.
    pub first_call_args_hash: Felt,
    pub tx_context: TxContext,
    /// Packed arguments of the entry point and any nested calls known in advance.
    pub args_of_calls: Vec<PackedValues>,
    pub auth_witnesses: Vec<AuthWitness>,
}

impl TxExecutionRequest {
    /// Builds a request whose only packed arguments are those of the entry point.
    pub fn new(
        origin: Address,
        function_data: FunctionData,
        args: Vec<Felt>,
        tx_context: TxContext,
    ) -> Self {
        let packed = PackedValues::from_values(args);
        Self {
            origin,
            function_data,
            first_call_args_hash: packed.hash(),
            tx_context,
            args_of_calls: vec![packed],
            auth_witnesses: Vec::new(),
        }
    }

    pub fn with_packed_values(mut self, values: PackedValues) -> Self {
        self.args_of_calls.push(values);
        self
    }

    pub fn with_auth_witness(mut self, witness: AuthWitness) -> Self {
        self.auth_witnesses.push(witness);
        self
    }
}

// FUNCTION CALL
// ================================================================================================

/// A direct call to an unconstrained function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionCall {
    pub to: Address,
    pub function_data: FunctionData,
    pub args: Vec<Felt>,
}
