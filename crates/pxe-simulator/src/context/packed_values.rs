use alloc::{collections::BTreeMap, vec::Vec};

use pxe_objects::{Felt, StarkField, ZERO, transaction::PackedValues};

use crate::OracleError;

/// Values passed between functions by hash during one transaction.
#[derive(Debug, Default, Clone)]
pub struct PackedValuesCache {
    values: BTreeMap<u64, Vec<Felt>>,
}

impl PackedValuesCache {
    pub fn new(initial: impl IntoIterator<Item = PackedValues>) -> Self {
        let mut cache = Self::default();
        for packed in initial {
            cache.values.insert(packed.hash().as_int(), packed.into_values());
        }
        cache
    }

    /// Stores `values` and returns their hash.
    pub fn pack(&mut self, values: &[Felt]) -> Felt {
        let packed = PackedValues::from_values(values.to_vec());
        let hash = packed.hash();
        self.values.insert(hash.as_int(), packed.into_values());
        hash
    }

    /// Returns the values stored under `hash`. The zero hash stands for the empty list.
    pub fn unpack(&self, hash: Felt) -> Result<Vec<Felt>, OracleError> {
        if hash == ZERO {
            return Ok(Vec::new());
        }
        self.values.get(&hash.as_int()).cloned().ok_or(OracleError::PackedValuesNotFound(hash))
    }
}
