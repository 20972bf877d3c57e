use pxe_objects::{EMPTY_WORD, Word};

/// Default maximum depth of nested private calls.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 64;

// SIMULATOR OPTIONS
// ================================================================================================

/// Options which control how the [Simulator](super::Simulator) executes functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulatorOptions {
    max_call_depth: usize,
    rng_seed: Word,
    debug_mode: bool,
}

impl SimulatorOptions {
    pub fn new(max_call_depth: usize, rng_seed: Word, debug_mode: bool) -> Self {
        Self { max_call_depth, rng_seed, debug_mode }
    }

    /// Sets the maximum depth of nested private calls. The entry point is at depth 0.
    pub fn with_max_call_depth(mut self, max_call_depth: usize) -> Self {
        self.max_call_depth = max_call_depth;
        self
    }

    /// Sets the seed from which the randomness of every run is derived.
    pub fn with_rng_seed(mut self, rng_seed: Word) -> Self {
        self.rng_seed = rng_seed;
        self
    }

    /// Enables the output of the `debugLog` oracles.
    pub fn with_debug_mode(mut self) -> Self {
        self.debug_mode = true;
        self
    }

    pub fn max_call_depth(&self) -> usize {
        self.max_call_depth
    }

    pub fn rng_seed(&self) -> Word {
        self.rng_seed
    }

    pub fn debug_mode(&self) -> bool {
        self.debug_mode
    }
}

impl Default for SimulatorOptions {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CALL_DEPTH, EMPTY_WORD, false)
    }
}
