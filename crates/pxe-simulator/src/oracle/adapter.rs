use alloc::{
    string::{String, ToString},
    vec::Vec,
};

use pxe_objects::{
    AES128_KEY_SIZE, Felt, FieldDecodingError, ONE, StarkField, ZERO,
    address::{Address, EventSelector, Point, PublicKeys},
    block::MerkleTreeId,
    fields::{FieldReader, bool_to_felt, felt_to_u8, felt_to_u32},
    logs::{EncryptedL2Log, UnencryptedL2Log},
    note::{Comparator, NoteData, NoteFilter, NoteStatus, PropertySelector, Select, Sort, SortOrder},
    transaction::CallInvocation,
    witness::path_to_fields,
};
use tracing::{debug, trace};

use super::DataOracle;
use crate::{ForeignCallHandler, OracleError};

// ORACLE NAMES
// ================================================================================================

/// The oracles a function may call, keyed by their wire name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Oracle {
    GetRandomField,
    PackArgumentsArray,
    PackArguments,
    PackReturns,
    UnpackReturns,
    GetNullifierKeys,
    GetPublicKeysAndPartialAddress,
    GetContractInstance,
    GetMembershipWitness,
    GetSiblingPath,
    GetNullifierMembershipWitness,
    GetLowNullifierMembershipWitness,
    GetPublicDataTreeWitness,
    GetHeader,
    GetAuthWitness,
    PopCapsule,
    GetNotes,
    NotifyCreatedNote,
    NotifyNullifiedNote,
    CheckNullifierExists,
    GetL1ToL2MembershipWitness,
    StorageRead,
    StorageWrite,
    EmitEncryptedLog,
    EmitUnencryptedLog,
    DebugLog,
    DebugLogWithPrefix,
    CallPrivateFunction,
    CallPublicFunction,
    EnqueuePublicFunctionCall,
    Aes128Encrypt,
}

impl Oracle {
    fn from_name(name: &str) -> Option<Self> {
        let oracle = match name {
            "getRandomField" => Self::GetRandomField,
            "packArgumentsArray" => Self::PackArgumentsArray,
            "packArguments" => Self::PackArguments,
            "packReturns" => Self::PackReturns,
            "unpackReturns" => Self::UnpackReturns,
            "getNullifierKeys" => Self::GetNullifierKeys,
            "getPublicKeysAndPartialAddress" => Self::GetPublicKeysAndPartialAddress,
            "getContractInstance" => Self::GetContractInstance,
            "getMembershipWitness" => Self::GetMembershipWitness,
            "getSiblingPath" => Self::GetSiblingPath,
            "getNullifierMembershipWitness" => Self::GetNullifierMembershipWitness,
            "getLowNullifierMembershipWitness" => Self::GetLowNullifierMembershipWitness,
            "getPublicDataTreeWitness" => Self::GetPublicDataTreeWitness,
            "getHeader" => Self::GetHeader,
            "getAuthWitness" => Self::GetAuthWitness,
            "popCapsule" => Self::PopCapsule,
            "getNotes" => Self::GetNotes,
            "notifyCreatedNote" => Self::NotifyCreatedNote,
            "notifyNullifiedNote" => Self::NotifyNullifiedNote,
            "checkNullifierExists" => Self::CheckNullifierExists,
            "getL1ToL2MembershipWitness" => Self::GetL1ToL2MembershipWitness,
            "storageRead" => Self::StorageRead,
            "storageWrite" => Self::StorageWrite,
            "emitEncryptedLog" => Self::EmitEncryptedLog,
            "emitUnencryptedLog" => Self::EmitUnencryptedLog,
            "debugLog" => Self::DebugLog,
            "debugLogWithPrefix" => Self::DebugLogWithPrefix,
            "callPrivateFunction" => Self::CallPrivateFunction,
            "callPublicFunction" => Self::CallPublicFunction,
            "enqueuePublicFunctionCall" => Self::EnqueuePublicFunctionCall,
            "aes128Encrypt" => Self::Aes128Encrypt,
            _ => return None,
        };
        Some(oracle)
    }
}

// ORACLE ADAPTER
// ================================================================================================

/// Translates oracle calls between their positional wire encoding and a [DataOracle].
///
/// This is the only place which knows the layout of oracle inputs and outputs. Absence of a
/// witness, header, auth witness or capsule is reported as a not-found error since the wire
/// format cannot express an optional value.
pub struct OracleAdapter<'o> {
    oracle: &'o mut dyn DataOracle,
}

impl<'o> OracleAdapter<'o> {
    pub fn new(oracle: &'o mut dyn DataOracle) -> Self {
        Self { oracle }
    }
}

impl ForeignCallHandler for OracleAdapter<'_> {
    fn handle(&mut self, name: &str, inputs: &[Vec<Felt>]) -> Result<Vec<Felt>, OracleError> {
        let oracle =
            Oracle::from_name(name).ok_or_else(|| OracleError::UnknownOracle(name.to_string()))?;
        trace!(target: "pxe::oracle", name, num_inputs = inputs.len(), "oracle call");

        let inputs = Inputs { name, inputs };
        match oracle {
            Oracle::GetRandomField => Ok(vec![self.oracle.get_random_field()?]),
            Oracle::PackArgumentsArray => Ok(vec![self.oracle.pack_arguments(inputs.array(0)?)?]),
            Oracle::PackArguments => {
                let values = inputs.prefix(0, 1)?;
                Ok(vec![self.oracle.pack_arguments(values)?])
            },
            Oracle::PackReturns => {
                let values = inputs.prefix(0, 1)?;
                Ok(vec![self.oracle.pack_returns(values)?])
            },
            Oracle::UnpackReturns => self.oracle.unpack_returns(inputs.field(0)?),
            Oracle::GetNullifierKeys => self.on_get_nullifier_keys(&inputs),
            Oracle::GetPublicKeysAndPartialAddress => {
                self.on_get_public_keys_and_partial_address(&inputs)
            },
            Oracle::GetContractInstance => {
                let address = inputs.address(0)?;
                let instance = self
                    .oracle
                    .get_contract_instance(address)?
                    .ok_or(OracleError::ContractInstanceNotFound(address))?;
                Ok(instance.to_fields().to_vec())
            },
            Oracle::GetMembershipWitness => self.on_get_membership_witness(&inputs),
            Oracle::GetSiblingPath => {
                let block_number = inputs.u32(0)?;
                let tree_id = inputs.tree_id(1)?;
                let index = inputs.field(2)?.as_int();
                let path = self
                    .oracle
                    .get_sibling_path(block_number, tree_id, index)?
                    .ok_or(OracleError::SiblingPathNotFound { tree_id, index, block_number })?;
                Ok(path_to_fields(&path))
            },
            Oracle::GetNullifierMembershipWitness => {
                let block_number = inputs.u32(0)?;
                let nullifier = inputs.field(1)?;
                let witness = self
                    .oracle
                    .get_nullifier_membership_witness(block_number, nullifier)?
                    .ok_or(OracleError::NullifierWitnessNotFound { nullifier, block_number })?;
                Ok(witness.to_fields())
            },
            Oracle::GetLowNullifierMembershipWitness => {
                let block_number = inputs.u32(0)?;
                let nullifier = inputs.field(1)?;
                let witness = self
                    .oracle
                    .get_low_nullifier_membership_witness(block_number, nullifier)?
                    .ok_or(OracleError::LowNullifierWitnessNotFound { nullifier, block_number })?;
                Ok(witness.to_fields())
            },
            Oracle::GetPublicDataTreeWitness => {
                let block_number = inputs.u32(0)?;
                let leaf_slot = inputs.field(1)?;
                let witness = self
                    .oracle
                    .get_public_data_tree_witness(block_number, leaf_slot)?
                    .ok_or(OracleError::PublicDataWitnessNotFound { leaf_slot, block_number })?;
                Ok(witness.to_fields())
            },
            Oracle::GetHeader => {
                let block_number = inputs.u32(0)?;
                let header = self
                    .oracle
                    .get_header(block_number)?
                    .ok_or(OracleError::BlockHeaderNotFound(block_number))?;
                Ok(header.to_fields())
            },
            Oracle::GetAuthWitness => {
                let message_hash = inputs.field(0)?;
                self.oracle
                    .get_auth_witness(message_hash)?
                    .ok_or(OracleError::AuthWitnessNotFound(message_hash))
            },
            Oracle::PopCapsule => self.oracle.pop_capsule()?.ok_or(OracleError::NoCapsulesAvailable),
            Oracle::GetNotes => self.on_get_notes(&inputs),
            Oracle::NotifyCreatedNote => {
                self.oracle.notify_created_note(
                    inputs.field(0)?,
                    inputs.field(1)?,
                    inputs.array(2)?.to_vec(),
                    inputs.field(3)?,
                    inputs.u32(4)?,
                )?;
                Ok(vec![ZERO])
            },
            Oracle::NotifyNullifiedNote => {
                self.oracle.notify_nullified_note(
                    inputs.field(0)?,
                    inputs.field(1)?,
                    inputs.u32(2)?,
                )?;
                Ok(vec![ZERO])
            },
            Oracle::CheckNullifierExists => {
                let exists = self.oracle.check_nullifier_exists(inputs.field(0)?)?;
                Ok(vec![bool_to_felt(exists)])
            },
            Oracle::GetL1ToL2MembershipWitness => {
                let message_hash = inputs.field(1)?;
                let witness = self
                    .oracle
                    .get_l1_to_l2_membership_witness(
                        inputs.address(0)?,
                        message_hash,
                        inputs.field(2)?,
                    )?
                    .ok_or(OracleError::L1ToL2MessageNotFound(message_hash))?;
                Ok(witness.to_fields())
            },
            Oracle::StorageRead => {
                let start_slot = inputs.field(0)?;
                let num_values = inputs.u32(1)? as usize;
                self.oracle.storage_read(start_slot, num_values)
            },
            Oracle::StorageWrite => self.oracle.storage_write(inputs.field(0)?, inputs.array(1)?),
            Oracle::EmitEncryptedLog => {
                let log = EncryptedL2Log {
                    contract_address: inputs.address(0)?,
                    storage_slot: inputs.field(1)?,
                    note_type_id: inputs.field(2)?,
                    recipient: Point::new(inputs.field(3)?, inputs.field(4)?),
                    payload: inputs.array(5)?.to_vec(),
                };
                Ok(vec![self.oracle.emit_encrypted_log(log)?])
            },
            Oracle::EmitUnencryptedLog => {
                let selector = EventSelector::from_field(inputs.field(1)?)
                    .map_err(|err| OracleError::invalid_input(name, err))?;
                let log = UnencryptedL2Log {
                    contract_address: inputs.address(0)?,
                    selector,
                    data: inputs.array(2)?.to_vec(),
                };
                Ok(vec![self.oracle.emit_unencrypted_log(log)?])
            },
            Oracle::DebugLog => {
                if self.oracle.debug_enabled() {
                    let message = format_debug_message(&inputs, 0)?;
                    debug!(target: "pxe::oracle", "{message}");
                }
                Ok(vec![ZERO])
            },
            Oracle::DebugLogWithPrefix => {
                if self.oracle.debug_enabled() {
                    let prefix = inputs.string(0)?;
                    let message = format_debug_message(&inputs, 1)?;
                    debug!(target: "pxe::oracle", "{prefix}: {message}");
                }
                Ok(vec![ZERO])
            },
            Oracle::CallPrivateFunction => {
                let item = self.oracle.call_private_function(inputs.invocation()?)?;
                Ok(item.to_fields())
            },
            Oracle::CallPublicFunction => self.oracle.call_public_function(inputs.invocation()?),
            Oracle::EnqueuePublicFunctionCall => {
                let request = self.oracle.enqueue_public_function_call(inputs.invocation()?)?;
                Ok(request.to_enqueue_result())
            },
            Oracle::Aes128Encrypt => {
                let plaintext = inputs.bytes(0)?;
                let iv = inputs.key(1)?;
                let key = inputs.key(2)?;
                let ciphertext = self.oracle.aes128_encrypt(&plaintext, &iv, &key)?;
                Ok(ciphertext.into_iter().map(|byte| Felt::new(byte as u64)).collect())
            },
        }
    }
}

impl OracleAdapter<'_> {
    fn on_get_nullifier_keys(&mut self, inputs: &Inputs<'_>) -> Result<Vec<Felt>, OracleError> {
        let account = inputs.address(0)?;
        let keys = self
            .oracle
            .get_nullifier_keys(account)?
            .ok_or(OracleError::NullifierKeysNotFound(account))?;
        Ok(keys.to_fields().to_vec())
    }

    /// Unknown addresses resolve to zero keys and a zero partial address, so that functions can
    /// handle recipients which have not registered yet.
    fn on_get_public_keys_and_partial_address(
        &mut self,
        inputs: &Inputs<'_>,
    ) -> Result<Vec<Felt>, OracleError> {
        let address = inputs.address(0)?;
        let (public_keys, partial_address) = match self.oracle.get_complete_address(address)? {
            Some(complete) => (complete.public_keys, complete.partial_address),
            None => {
                trace!(target: "pxe::oracle", %address, "no public keys registered, using zero keys");
                (PublicKeys::default(), ZERO)
            },
        };

        let mut fields = public_keys.to_fields();
        fields.push(partial_address);
        Ok(fields)
    }

    fn on_get_membership_witness(&mut self, inputs: &Inputs<'_>) -> Result<Vec<Felt>, OracleError> {
        let block_number = inputs.u32(0)?;
        let tree_id = inputs.tree_id(1)?;
        let leaf = inputs.field(2)?;
        let (index, path) = self
            .oracle
            .get_membership_witness(block_number, tree_id, leaf)?
            .ok_or(OracleError::MembershipWitnessNotFound { tree_id, leaf, block_number })?;

        let mut fields = vec![Felt::new(index)];
        fields.extend(path_to_fields(&path));
        Ok(fields)
    }

    /// Decodes a note query, runs it and encodes the notes as
    /// `[count, contract, (nonce, is_pending, items...)*]` padded with zeros to the size the
    /// caller declared.
    fn on_get_notes(&mut self, inputs: &Inputs<'_>) -> Result<Vec<Felt>, OracleError> {
        let storage_slot = inputs.field(0)?;
        let filter = inputs.note_filter()?;
        let status = NoteStatus::try_from(inputs.field(13)?)
            .map_err(|err| OracleError::invalid_input(inputs.name, err))?;
        let return_size = inputs.u32(14)? as usize;

        let notes = self.oracle.get_notes(storage_slot, &filter, status)?;
        encode_notes(&notes, return_size)
    }
}

// ENCODING HELPERS
// ================================================================================================

fn encode_notes(notes: &[NoteData], return_size: usize) -> Result<Vec<Felt>, OracleError> {
    let note_len = notes.first().map(|note| note.note.len()).unwrap_or(0);
    if let Some(note) = notes.iter().find(|note| note.note.len() != note_len) {
        return Err(OracleError::NoteLengthMismatch {
            expected: note_len,
            actual: note.note.len(),
        });
    }

    let contract_address = notes.first().map(|note| note.contract_address).unwrap_or(Address::ZERO);

    let mut fields = Vec::with_capacity(return_size);
    fields.push(Felt::new(notes.len() as u64));
    fields.push(contract_address.as_felt());
    for note in notes {
        fields.push(note.nonce);
        fields.push(if note.is_pending() { ONE } else { ZERO });
        fields.extend_from_slice(note.note.items());
    }

    if fields.len() > return_size {
        return Err(OracleError::ReturnDataTooLarge { max: return_size, actual: fields.len() });
    }
    fields.resize(return_size, ZERO);
    Ok(fields)
}

/// Renders a debug message, replacing `{i}` with the `i`-th trailing argument.
fn format_debug_message(inputs: &Inputs<'_>, message_index: usize) -> Result<String, OracleError> {
    let mut message = inputs.string(message_index)?;
    let args: Vec<Felt> = inputs
        .inputs
        .iter()
        .skip(message_index + 1)
        .flat_map(|arg| arg.iter().copied())
        .collect();

    for (i, arg) in args.iter().enumerate() {
        message = message.replace(&format!("{{{i}}}"), &format!("0x{:x}", arg.as_int()));
    }
    Ok(message)
}

// INPUT DECODING
// ================================================================================================

/// Positional view over the inputs of one oracle call.
struct Inputs<'a> {
    name: &'a str,
    inputs: &'a [Vec<Felt>],
}

impl<'a> Inputs<'a> {
    fn invalid(&self, err: FieldDecodingError) -> OracleError {
        OracleError::invalid_input(self.name, err)
    }

    fn array(&self, index: usize) -> Result<&'a [Felt], OracleError> {
        self.inputs.get(index).map(Vec::as_slice).ok_or_else(|| OracleError::MissingInput {
            oracle: self.name.to_string(),
            index,
        })
    }

    fn field(&self, index: usize) -> Result<Felt, OracleError> {
        let array = self.array(index)?;
        array.first().copied().ok_or_else(|| {
            self.invalid(FieldDecodingError::UnexpectedEnd { expected: 1, available: 0 })
        })
    }

    fn u32(&self, index: usize) -> Result<u32, OracleError> {
        felt_to_u32(self.field(index)?).map_err(|err| self.invalid(err))
    }

    fn address(&self, index: usize) -> Result<Address, OracleError> {
        self.field(index).map(Address::from)
    }

    fn tree_id(&self, index: usize) -> Result<MerkleTreeId, OracleError> {
        MerkleTreeId::try_from(self.field(index)?).map_err(|err| self.invalid(err))
    }

    /// Returns the first `len` values of the array at `values_index`, where `len` is the scalar
    /// at `len_index`.
    fn prefix(&self, len_index: usize, values_index: usize) -> Result<&'a [Felt], OracleError> {
        let len = self.u32(len_index)? as usize;
        let values = self.array(values_index)?;
        values.get(..len).ok_or_else(|| {
            self.invalid(FieldDecodingError::UnexpectedEnd { expected: len, available: values.len() })
        })
    }

    /// Decodes a byte-per-field buffer.
    fn bytes(&self, index: usize) -> Result<Vec<u8>, OracleError> {
        self.array(index)?
            .iter()
            .map(|field| felt_to_u8(*field))
            .collect::<Result<_, _>>()
            .map_err(|err| self.invalid(err))
    }

    fn key(&self, index: usize) -> Result<[u8; AES128_KEY_SIZE], OracleError> {
        let bytes = self.bytes(index)?;
        <[u8; AES128_KEY_SIZE]>::try_from(bytes.as_slice()).map_err(|_| {
            self.invalid(FieldDecodingError::UnexpectedLength {
                expected: AES128_KEY_SIZE,
                actual: bytes.len(),
            })
        })
    }

    /// Decodes a byte-per-field string; invalid UTF-8 is replaced rather than rejected.
    fn string(&self, index: usize) -> Result<String, OracleError> {
        let bytes = self.bytes(index)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Decodes `[target, selector, args_hash, counter, is_static, is_delegate]` spread over the
    /// first six inputs.
    fn invocation(&self) -> Result<CallInvocation, OracleError> {
        let fields = (0..6).map(|i| self.field(i)).collect::<Result<Vec<_>, _>>()?;
        CallInvocation::read_from(&mut FieldReader::new(&fields)).map_err(|err| self.invalid(err))
    }

    /// Decodes the select and sort descriptors of a `getNotes` call.
    ///
    /// Inputs 2..=6 hold the select indexes, offsets, lengths, values and comparators, of which
    /// only the first `num_selects` are used. Inputs 7..=10 hold the sort indexes, offsets,
    /// lengths and orders; a `Nada` order ends the sort list.
    fn note_filter(&self) -> Result<NoteFilter, OracleError> {
        let num_selects = self.u32(1)? as usize;
        let element = |input: usize, i: usize| -> Result<Felt, OracleError> {
            let array = self.array(input)?;
            array.get(i).copied().ok_or_else(|| {
                self.invalid(FieldDecodingError::UnexpectedEnd {
                    expected: i + 1,
                    available: array.len(),
                })
            })
        };
        let small = |input: usize, i: usize| -> Result<usize, OracleError> {
            felt_to_u32(element(input, i)?).map(|v| v as usize).map_err(|err| self.invalid(err))
        };

        let mut filter = NoteFilter::default();
        for i in 0..num_selects {
            let selector = PropertySelector::new(small(2, i)?, small(3, i)?, small(4, i)?);
            let comparator =
                Comparator::try_from(element(6, i)?).map_err(|err| self.invalid(err))?;
            filter.selects.push(Select { selector, value: element(5, i)?, comparator });
        }

        for i in 0..self.array(10)?.len() {
            let order = SortOrder::try_from(element(10, i)?).map_err(|err| self.invalid(err))?;
            if order == SortOrder::Nada {
                break;
            }
            let selector = PropertySelector::new(small(7, i)?, small(8, i)?, small(9, i)?);
            filter.sorts.push(Sort { selector, order });
        }

        filter.limit = self.u32(11)? as usize;
        filter.offset = self.u32(12)? as usize;
        Ok(filter)
    }
}

// TESTS
// ================================================================================================

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use pxe_objects::note::Note;

    use super::*;
    use crate::ErrorKind;

    fn note(items: &[u64], index: Option<u64>) -> NoteData {
        NoteData {
            note: Note::new(items.iter().copied().map(Felt::new).collect()),
            contract_address: Address::new(Felt::new(77)),
            storage_slot: Felt::new(1),
            nonce: Felt::new(9),
            inner_note_hash: Felt::new(items[0]),
            siloed_nullifier: None,
            index,
        }
    }

    #[test]
    fn notes_are_encoded_and_padded() {
        let notes = [note(&[1, 2], Some(0)), note(&[3, 4], None)];

        let fields = encode_notes(&notes, 12).unwrap();
        let expected: Vec<Felt> = [2, 77, 9, 0, 1, 2, 9, 1, 3, 4, 0, 0]
            .into_iter()
            .map(Felt::new)
            .collect();
        assert_eq!(fields, expected);
    }

    #[test]
    fn notes_of_different_lengths_are_rejected() {
        let notes = [note(&[1, 2], Some(0)), note(&[3], Some(1))];

        assert_matches!(
            encode_notes(&notes, 100),
            Err(OracleError::NoteLengthMismatch { expected: 2, actual: 1 })
        );
    }

    #[test]
    fn response_larger_than_capacity_is_rejected() {
        let notes = [note(&[1, 2], Some(0))];

        // count + contract + nonce + flag + 2 items
        assert!(encode_notes(&notes, 6).is_ok());
        let err = encode_notes(&notes, 5).unwrap_err();
        assert_matches!(err, OracleError::ReturnDataTooLarge { max: 5, actual: 6 });
        assert_eq!(err.kind(), ErrorKind::EncodingViolation);
    }

    #[test]
    fn empty_note_response_is_all_zeros() {
        assert_eq!(encode_notes(&[], 4).unwrap(), vec![ZERO; 4]);
    }

    struct NoCapabilities;
    impl DataOracle for NoCapabilities {}

    #[test]
    fn unsupported_capabilities_fail_explicitly() {
        let mut oracle = NoCapabilities;
        let mut adapter = OracleAdapter::new(&mut oracle);

        let err = adapter.handle("getRandomField", &[]).unwrap_err();
        assert_matches!(err, OracleError::CapabilityUnavailable("getRandomField"));
        assert_eq!(err.kind(), ErrorKind::CapabilityUnavailable);

        assert_matches!(
            adapter.handle("noSuchOracle", &[]),
            Err(OracleError::UnknownOracle(name)) if name == "noSuchOracle"
        );
    }

    #[test]
    fn narrow_inputs_are_range_checked() {
        let mut oracle = NoCapabilities;
        let mut adapter = OracleAdapter::new(&mut oracle);

        let inputs = [vec![Felt::new(1 << 40)]];
        assert_matches!(
            adapter.handle("getHeader", &inputs),
            Err(OracleError::InvalidInput { source: FieldDecodingError::ValueOutOfRange { .. }, .. })
        );

        let call = [
            vec![Felt::new(1)],
            vec![Felt::new(2)],
            vec![Felt::new(3)],
            vec![Felt::new(4)],
            vec![Felt::new(2)],
            vec![ZERO],
        ];
        assert_matches!(
            adapter.handle("callPrivateFunction", &call),
            Err(OracleError::InvalidInput { source: FieldDecodingError::NotABoolean(2), .. })
        );
    }

    #[test]
    fn aes_inputs_must_be_bytes_of_the_right_length() {
        let mut oracle = NoCapabilities;
        let mut adapter = OracleAdapter::new(&mut oracle);

        let short_key = [vec![ONE], vec![ZERO; 16], vec![ZERO; 15]];
        assert_matches!(
            adapter.handle("aes128Encrypt", &short_key),
            Err(OracleError::InvalidInput {
                source: FieldDecodingError::UnexpectedLength { expected: 16, actual: 15 },
                ..
            })
        );

        let wide_byte = [vec![Felt::new(256)], vec![ZERO; 16], vec![ZERO; 16]];
        assert_matches!(
            adapter.handle("aes128Encrypt", &wide_byte),
            Err(OracleError::InvalidInput { source: FieldDecodingError::ValueOutOfRange { .. }, .. })
        );
    }
}
