use crate::OracleError;

// SIDE EFFECT COUNTER
// ================================================================================================

/// The transaction-wide sequence of side-effect counters.
///
/// Counters are issued by the executing functions and reported to the host with each side
/// effect. The host only checks that they keep increasing across the whole call tree: a counter
/// must be greater than every counter observed before it, and a finished call may not end
/// before its last side effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SideEffectCounter {
    last: u32,
}

impl SideEffectCounter {
    /// Creates a counter whose values up to and including `reserved` are already taken.
    pub fn new(reserved: u32) -> Self {
        Self { last: reserved }
    }

    /// Returns the last observed counter.
    pub fn last(&self) -> u32 {
        self.last
    }

    /// Records a side effect at `counter`.
    pub fn observe(&mut self, counter: u32) -> Result<(), OracleError> {
        if counter <= self.last {
            return Err(OracleError::SideEffectCounterOutOfOrder { last: self.last, got: counter });
        }
        self.last = counter;
        Ok(())
    }

    /// Records the end counter of a finished call.
    pub fn close_call(&mut self, end_counter: u32) -> Result<(), OracleError> {
        if end_counter < self.last {
            return Err(OracleError::SideEffectCounterOutOfOrder {
                last: self.last,
                got: end_counter,
            });
        }
        self.last = end_counter;
        Ok(())
    }
}
