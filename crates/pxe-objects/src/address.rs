use alloc::{string::String, vec::Vec};
use core::{
    cmp::Ordering,
    fmt::{self, Display, Formatter},
};

use crate::{
    Felt, FieldDecodingError, Hasher, NUM_PUBLIC_KEYS, StarkField, ZERO,
    abi::AbiParameter,
    fields::{felt_to_u32, FieldReader},
};

// ADDRESS
// ================================================================================================

/// Address of a contract or an account.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Address(Felt);

impl Address {
    pub const ZERO: Self = Self(ZERO);

    pub const fn new(value: Felt) -> Self {
        Self(value)
    }

    pub fn as_felt(&self) -> Felt {
        self.0
    }
}

impl From<Felt> for Address {
    fn from(value: Felt) -> Self {
        Self(value)
    }
}

impl From<Address> for Felt {
    fn from(address: Address) -> Self {
        address.0
    }
}

impl PartialOrd for Address {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Address {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.as_int().cmp(&other.0.as_int())
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:016x}", self.0.as_int())
    }
}

// FUNCTION SELECTOR
// ================================================================================================

/// Identifies a function within a contract.
///
/// The selector is derived from the function signature `name(type,...)` by hashing it and
/// keeping the low 32 bits of the first element of the digest.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FunctionSelector(u32);

impl FunctionSelector {
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Computes the selector of a function from its name and parameters.
    pub fn from_name_and_parameters(name: &str, parameters: &[AbiParameter]) -> Self {
        let signature = signature(name, parameters);
        Self::from_signature(&signature)
    }

    pub fn from_signature(signature: &str) -> Self {
        let digest = Hasher::hash(signature.as_bytes());
        Self(digest.as_elements()[0].as_int() as u32)
    }

    /// Decodes a selector from a field element, rejecting values wider than 32 bits.
    pub fn from_field(value: Felt) -> Result<Self, FieldDecodingError> {
        felt_to_u32(value).map(Self)
    }

    pub fn to_field(&self) -> Felt {
        Felt::new(self.0 as u64)
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl Display for FunctionSelector {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}

/// Identifies the kind of event an unencrypted log carries.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EventSelector(u32);

impl EventSelector {
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    pub fn from_field(value: Felt) -> Result<Self, FieldDecodingError> {
        felt_to_u32(value).map(Self)
    }

    pub fn to_field(&self) -> Felt {
        Felt::new(self.0 as u64)
    }
}

fn signature(name: &str, parameters: &[AbiParameter]) -> String {
    let types: Vec<String> = parameters.iter().map(|param| param.typ().signature()).collect();
    format!("{name}({})", types.join(","))
}

// KEYS
// ================================================================================================

/// A point on the curve used for encryption and nullifier keys.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    pub x: Felt,
    pub y: Felt,
}

impl Point {
    pub const ZERO: Self = Self { x: ZERO, y: ZERO };

    pub const fn new(x: Felt, y: Felt) -> Self {
        Self { x, y }
    }

    pub fn to_fields(&self) -> [Felt; 2] {
        [self.x, self.y]
    }
}

/// The public keys registered for an address.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PublicKeys([Point; NUM_PUBLIC_KEYS]);

impl PublicKeys {
    pub const fn new(keys: [Point; NUM_PUBLIC_KEYS]) -> Self {
        Self(keys)
    }

    pub fn keys(&self) -> &[Point; NUM_PUBLIC_KEYS] {
        &self.0
    }

    pub fn to_fields(&self) -> Vec<Felt> {
        self.0.iter().flat_map(Point::to_fields).collect()
    }
}

/// An address together with the data it was derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompleteAddress {
    pub address: Address,
    pub public_keys: PublicKeys,
    pub partial_address: Felt,
}

/// Nullifier keys of an account, scoped to a single application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NullifierKeys {
    pub master_nullifier_public_key: Point,
    pub app_nullifier_secret_key: Felt,
}

impl NullifierKeys {
    pub fn to_fields(&self) -> [Felt; 3] {
        [
            self.master_nullifier_public_key.x,
            self.master_nullifier_public_key.y,
            self.app_nullifier_secret_key,
        ]
    }
}

// CONTRACT INSTANCE
// ================================================================================================

/// A deployed instance of a contract class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractInstance {
    pub salt: Felt,
    pub deployer: Address,
    pub contract_class_id: Felt,
    pub initialization_hash: Felt,
    pub public_keys_hash: Felt,
}

impl ContractInstance {
    pub fn to_fields(&self) -> [Felt; 5] {
        [
            self.salt,
            self.deployer.as_felt(),
            self.contract_class_id,
            self.initialization_hash,
            self.public_keys_hash,
        ]
    }

    pub fn from_fields(fields: &[Felt]) -> Result<Self, FieldDecodingError> {
        let mut reader = FieldReader::new(fields);
        Ok(Self {
            salt: reader.read_field()?,
            deployer: reader.read_field()?.into(),
            contract_class_id: reader.read_field()?,
            initialization_hash: reader.read_field()?,
            public_keys_hash: reader.read_field()?,
        })
    }
}

// TESTS
// ================================================================================================
