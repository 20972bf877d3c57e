use alloc::vec::Vec;

use crate::{Felt, hash::compute_var_args_hash};

/// A list of values together with its hash.
///
/// Arguments and return values travel between functions by hash; the values themselves are kept
/// by the host and looked up when a function needs them.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PackedValues {
    hash: Felt,
    values: Vec<Felt>,
}

impl PackedValues {
    pub fn from_values(values: Vec<Felt>) -> Self {
        Self { hash: compute_var_args_hash(&values), values }
    }

    pub fn hash(&self) -> Felt {
        self.hash
    }

    pub fn values(&self) -> &[Felt] {
        &self.values
    }

    pub fn into_values(self) -> Vec<Felt> {
        self.values
    }
}
