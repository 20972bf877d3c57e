use anyhow::Result;
use assert_matches::assert_matches;
use pxe_objects::{
    COMPUTE_NOTE_HASH_AND_NULLIFIER_NAME, Felt, ONE, ZERO,
    abi::{AbiParameter, AbiType, FunctionArtifact, FunctionType},
    note::Note,
    transaction::{FunctionCall, FunctionData},
};
use pxe_simulator::{
    ErrorKind, ExecutionError, ForeignCallHandler, OracleError, RuntimeError,
    testing::{mock_artifact, string_to_fields},
};

use crate::{CONTRACT, OTHER_CONTRACT, TestChain, felts};

const NOTE_CAPACITY: usize = 3;

fn compute_note_hash_artifact(capacity: usize) -> FunctionArtifact {
    let parameters = vec![
        AbiParameter::new("contract_address", AbiType::Field),
        AbiParameter::new("nonce", AbiType::Field),
        AbiParameter::new("storage_slot", AbiType::Field),
        AbiParameter::new("note_type_id", AbiType::Field),
        AbiParameter::new(
            "serialized_note",
            AbiType::Array { length: capacity, typ: Box::new(AbiType::Field) },
        ),
    ];
    FunctionArtifact::new(
        COMPUTE_NOTE_HASH_AND_NULLIFIER_NAME,
        FunctionType::Unconstrained,
        parameters,
        COMPUTE_NOTE_HASH_AND_NULLIFIER_NAME.as_bytes().to_vec(),
        Vec::new(),
    )
}

/// Echoes the first note item, the number of arguments received and the last argument.
fn echo_note(args: &[Felt], _: &mut dyn ForeignCallHandler) -> Result<Vec<Felt>, RuntimeError> {
    Ok(vec![args[4], Felt::new(args.len() as u64), args[args.len() - 1], args[1]])
}

#[test]
fn notes_are_padded_to_the_declared_capacity() -> Result<()> {
    let mut chain = TestChain::new();
    chain.add_unconstrained(CONTRACT, compute_note_hash_artifact(NOTE_CAPACITY), echo_note);
    let simulator = chain.build().simulator;

    let full = Note::new(felts(&[7, 8, 9]));
    let result = simulator.compute_note_hash_and_nullifier(CONTRACT, Felt::new(4), ONE, ONE, &full)?;
    assert_eq!(result.inner_note_hash, Felt::new(7));
    assert_eq!(result.siloed_note_hash, Felt::new(7));
    assert_eq!(result.unique_siloed_note_hash, Felt::new(9));
    assert_eq!(result.inner_nullifier, Felt::new(4));

    let short = Note::new(felts(&[7]));
    let result = simulator.compute_note_hash_and_nullifier(CONTRACT, Felt::new(4), ONE, ONE, &short)?;
    assert_eq!(result.siloed_note_hash, Felt::new(7));
    assert_eq!(result.unique_siloed_note_hash, ZERO);

    // each helper returns one of the four values
    assert_eq!(simulator.compute_inner_nullifier(CONTRACT, Felt::new(4), ONE, ONE, &full)?, Felt::new(4));
    assert_eq!(simulator.compute_inner_note_hash(CONTRACT, ONE, ONE, &full)?, Felt::new(7));
    assert_eq!(simulator.compute_unique_siloed_note_hash(CONTRACT, ONE, ONE, ONE, &full)?, Felt::new(9));
    Ok(())
}

#[test]
fn notes_longer_than_the_capacity_are_rejected() {
    let mut chain = TestChain::new();
    chain.add_unconstrained(CONTRACT, compute_note_hash_artifact(NOTE_CAPACITY), echo_note);
    let simulator = chain.build().simulator;

    let note = Note::new(felts(&[1, 2, 3, 4]));
    let err = simulator.compute_siloed_note_hash(CONTRACT, ONE, ONE, &note).unwrap_err();
    assert_matches!(err.error(), ExecutionError::NoteExceedsCapacity { note_len: 4, capacity: 3 });
    assert_eq!(err.kind(), ErrorKind::ContractInterfaceViolation);

    let call_context = err.call_context().expect("failure has a call context");
    assert_eq!(call_context.storage_contract_address, CONTRACT);
    assert_eq!(
        call_context.function_selector,
        compute_note_hash_artifact(NOTE_CAPACITY).selector()
    );
}

#[test]
fn the_note_hash_function_must_exist_and_return_four_values() {
    let mut chain = TestChain::new();
    chain.add_unconstrained(OTHER_CONTRACT, compute_note_hash_artifact(NOTE_CAPACITY), |_, _| {
        Ok(vec![ONE])
    });
    let simulator = chain.build().simulator;
    let note = Note::new(felts(&[1]));

    let err = simulator.compute_inner_note_hash(CONTRACT, ONE, ONE, &note).unwrap_err();
    assert_matches!(err.error(), ExecutionError::MissingMandatoryFunction { .. });
    assert_eq!(
        err.call_context().map(|context| context.storage_contract_address),
        Some(CONTRACT)
    );

    let err = simulator.compute_inner_note_hash(OTHER_CONTRACT, ONE, ONE, &note).unwrap_err();
    assert_matches!(
        err.error(),
        ExecutionError::UnexpectedReturnLength { expected: 4, actual: 1, .. }
    );
}

// UNCONSTRAINED EXECUTION
// ================================================================================================

#[test]
fn unconstrained_functions_see_committed_state_only() -> Result<()> {
    let mut chain = TestChain::new();
    chain.data_store.set_public_storage(CONTRACT, Felt::new(2), Felt::new(20));
    let artifact = mock_artifact("balance_of", FunctionType::Unconstrained, 1);
    chain.add_unconstrained(CONTRACT, artifact.clone(), |args, handler| {
        handler
            .handle("debugLog", &[string_to_fields("reading slot {0}"), vec![args[0]]])
            .map_err(|err| RuntimeError::foreign_call("debugLog", err))?;
        handler
            .handle("storageRead", &[vec![args[0]], vec![ONE]])
            .map_err(|err| RuntimeError::foreign_call("storageRead", err))
    });
    let writer = mock_artifact("write_in_view", FunctionType::Unconstrained, 0);
    chain.add_unconstrained(CONTRACT, writer.clone(), |_, handler| {
        let inputs = [vec![ONE], vec![ONE], vec![ONE], vec![ONE], vec![Felt::new(2)]];
        handler
            .handle("notifyCreatedNote", &inputs)
            .map_err(|err| RuntimeError::foreign_call("notifyCreatedNote", err))
    });
    let simulator = chain.build().simulator;

    let call = FunctionCall {
        to: CONTRACT,
        function_data: FunctionData::new(artifact.selector(), false),
        args: felts(&[2]),
    };
    assert_eq!(simulator.run_unconstrained(call, &artifact, CONTRACT)?, felts(&[20]));

    let call = FunctionCall {
        to: CONTRACT,
        function_data: FunctionData::new(writer.selector(), false),
        args: vec![],
    };
    let err = simulator.run_unconstrained(call, &writer, CONTRACT).unwrap_err();
    assert_matches!(
        err.error(),
        ExecutionError::Runtime(RuntimeError::ForeignCall {
            source: OracleError::CapabilityUnavailable("notifyCreatedNote"),
            ..
        })
    );
    assert_eq!(err.call_context().map(|context| context.function_selector), Some(writer.selector()));
    Ok(())
}

#[test]
fn private_functions_cannot_run_as_unconstrained() {
    let chain = TestChain::new();
    let simulator = chain.build().simulator;
    let artifact = mock_artifact("private_only", FunctionType::Private, 0);
    let call = FunctionCall {
        to: CONTRACT,
        function_data: FunctionData::new(artifact.selector(), true),
        args: vec![],
    };

    let err = simulator.run_unconstrained(call, &artifact, CONTRACT).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::WrongFunctionKind);
}
