use anyhow::Result;
use assert_matches::assert_matches;
use pxe_objects::{
    Felt, INITIAL_SIDE_EFFECT_COUNTER, ONE, ZERO, abi::FunctionType, transaction::AuthWitness,
};
use pxe_simulator::{
    ErrorKind, ExecutionError, ExecutionResult, OracleError, RuntimeError, SimulatorOptions,
    testing::mock_artifact,
};

use crate::{CONTRACT, OTHER_CONTRACT, SENDER, TestChain, felts, private_selector};

// COUNTERS
// ================================================================================================

#[test]
fn created_note_counters_increase_across_the_call_tree() -> Result<()> {
    let mut chain = TestChain::new();
    let child = chain.add_private(CONTRACT, "create_two", 0, |ctx| {
        ctx.create_note(ONE, ONE, felts(&[1]))?;
        ctx.create_note(ONE, ONE, felts(&[2]))?;
        Ok(vec![])
    });
    chain.add_private(CONTRACT, "entry", 0, move |ctx| {
        ctx.create_note(ONE, ONE, felts(&[10]))?;
        ctx.call_private(CONTRACT, child, &[])?;
        ctx.create_note(ONE, ONE, felts(&[11]))?;
        ctx.call_private(CONTRACT, child, &[])?;
        ctx.create_note(ONE, ONE, felts(&[12]))?;
        Ok(vec![])
    });

    let result = chain.build().run("entry", vec![])?;

    let counters = |result: &ExecutionResult| -> Vec<u32> {
        result.new_notes.iter().map(|note| note.counter).collect()
    };
    assert_eq!(counters(&result), [2, 6, 10]);
    assert_eq!(counters(&result.nested_executions[0]), [4, 5]);
    assert_eq!(counters(&result.nested_executions[1]), [8, 9]);

    let first = &result.nested_executions[0].call_stack_item.public_inputs;
    assert_eq!((first.start_side_effect_counter, first.end_side_effect_counter), (3, 5));
    let root = &result.call_stack_item.public_inputs;
    assert_eq!((root.start_side_effect_counter, root.end_side_effect_counter), (1, 10));
    Ok(())
}

#[test]
fn first_side_effect_follows_the_reserved_counter() -> Result<()> {
    let mut chain = TestChain::new();
    chain.add_private(CONTRACT, "entry", 0, |ctx| {
        assert_eq!(ctx.counter(), INITIAL_SIDE_EFFECT_COUNTER);
        ctx.set_counter(1);
        ctx.create_note(ONE, ONE, felts(&[1]))?;
        Ok(vec![])
    });

    let result = chain.build().run("entry", vec![])?;

    assert_eq!(result.new_notes[0].counter, 2);
    assert_eq!(result.call_stack_item.public_inputs.call_context.side_effect_counter, 1);
    Ok(())
}

#[test]
fn reserved_counter_cannot_be_used() {
    let mut chain = TestChain::new();
    chain.add_private(CONTRACT, "entry", 0, |ctx| {
        ctx.set_counter(0);
        ctx.create_note(ONE, ONE, felts(&[1]))?;
        Ok(vec![])
    });

    let err = chain.build().run("entry", vec![]).unwrap_err();
    assert_matches!(
        err.error(),
        ExecutionError::Runtime(RuntimeError::ForeignCall {
            source: OracleError::SideEffectCounterOutOfOrder { last: 1, got: 1 },
            ..
        })
    );
}

#[test]
fn stale_counters_are_rejected() {
    let mut chain = TestChain::new();
    chain.add_private(CONTRACT, "rewind", 0, |ctx| {
        ctx.create_note(ONE, ONE, felts(&[1]))?;
        ctx.set_counter(0);
        ctx.create_note(ONE, ONE, felts(&[2]))?;
        Ok(vec![])
    });

    let err = chain.build().run("rewind", vec![]).unwrap_err();
    assert_matches!(
        err.error(),
        ExecutionError::Runtime(RuntimeError::ForeignCall {
            source: OracleError::SideEffectCounterOutOfOrder { last: 2, got: 1 },
            ..
        })
    );
    assert_eq!(err.kind(), ErrorKind::ContractInterfaceViolation);
}

// ARGUMENTS & RETURN VALUES
// ================================================================================================

#[test]
fn arguments_and_return_values_flow_between_calls() -> Result<()> {
    let mut chain = TestChain::new();
    let add = chain.add_private(OTHER_CONTRACT, "add", 2, |ctx| {
        let args = ctx.args().to_vec();
        Ok(vec![args[0] + args[1]])
    });
    chain.add_private(CONTRACT, "entry", 1, move |ctx| {
        let x = ctx.args()[0];
        let sum = ctx.call_private(OTHER_CONTRACT, add, &[x, Felt::new(5)])?;
        Ok(vec![sum[0], ctx.contract_address().as_felt()])
    });

    let result = chain.build().run("entry", felts(&[3]))?;

    assert_eq!(result.return_values, [Felt::new(8), CONTRACT.as_felt()]);
    let nested = &result.nested_executions[0];
    assert_eq!(nested.return_values, [Felt::new(8)]);
    assert_eq!(nested.call_stack_item.contract_address, OTHER_CONTRACT);
    let call_context = nested.call_stack_item.public_inputs.call_context;
    assert_eq!(call_context.msg_sender, CONTRACT);
    assert_eq!(call_context.storage_contract_address, OTHER_CONTRACT);
    assert_eq!(result.call_stack_item.public_inputs.call_context.msg_sender, SENDER);
    Ok(())
}

#[test]
fn argument_count_must_match_the_abi() {
    let mut chain = TestChain::new();
    chain.add_private(CONTRACT, "two_args", 2, |_| Ok(vec![]));
    let simulator = chain.build();

    let err = simulator.run("two_args", felts(&[1])).unwrap_err();
    assert_matches!(err.error(), ExecutionError::InvalidArgumentsSize { expected: 2, actual: 1 });
    assert_eq!(err.kind(), ErrorKind::EncodingViolation);
}

#[test]
fn delegate_calls_keep_sender_and_storage() -> Result<()> {
    let mut chain = TestChain::new();
    let library = chain.add_private(OTHER_CONTRACT, "library", 0, |ctx| {
        ctx.create_note(ONE, ONE, felts(&[4]))?;
        Ok(vec![])
    });
    chain.add_private(CONTRACT, "entry", 0, move |ctx| {
        ctx.call_private_with(OTHER_CONTRACT, library, &[], false, true)?;
        let notes = ctx.get_notes(ONE, &Default::default(), 1, 2)?;
        Ok(vec![Felt::new(notes.len() as u64)])
    });

    let result = chain.build().run("entry", vec![])?;

    let nested = &result.nested_executions[0];
    let call_context = nested.call_stack_item.public_inputs.call_context;
    assert!(call_context.is_delegate_call);
    assert_eq!(call_context.msg_sender, SENDER);
    assert_eq!(call_context.storage_contract_address, CONTRACT);
    assert_eq!(nested.call_stack_item.contract_address, OTHER_CONTRACT);
    // the note was created in the caller's storage
    assert_eq!(result.return_values, [ONE]);
    Ok(())
}

// STATIC CALLS
// ================================================================================================

#[test]
fn static_calls_may_not_have_side_effects() {
    let mut chain = TestChain::new();
    let writer = chain.add_private(CONTRACT, "writer", 0, |ctx| {
        ctx.create_note(ONE, ONE, felts(&[1]))?;
        Ok(vec![])
    });
    let reader = chain.add_private(CONTRACT, "reader", 0, |_| Ok(vec![Felt::new(42)]));
    chain.add_private(CONTRACT, "read_statically", 0, move |ctx| {
        ctx.call_private_with(CONTRACT, reader, &[], true, false)
    });
    chain.add_private(CONTRACT, "write_statically", 0, move |ctx| {
        ctx.call_private_with(CONTRACT, writer, &[], true, false)
    });
    let simulator = chain.build();

    let result = simulator.run("read_statically", vec![]).unwrap();
    assert_eq!(result.return_values, [Felt::new(42)]);
    assert!(result.nested_executions[0].call_stack_item.public_inputs.call_context.is_static_call);

    let err = simulator.run("write_statically", vec![]).unwrap_err();
    assert_matches!(
        err.error(),
        ExecutionError::Runtime(RuntimeError::ForeignCall {
            source: OracleError::StaticCallSideEffects { .. },
            ..
        })
    );
    assert_eq!(err.kind(), ErrorKind::ContractInterfaceViolation);
}

// FAILURES
// ================================================================================================

#[test]
fn nested_failures_report_the_innermost_call() {
    let mut chain = TestChain::new();
    let failing = chain.add_private(OTHER_CONTRACT, "failing", 0, |ctx| {
        ctx.nullify_note(Felt::new(77), ZERO)?;
        Ok(vec![])
    });
    chain.add_private(CONTRACT, "entry", 0, move |ctx| {
        ctx.call_private(OTHER_CONTRACT, failing, &[])
    });

    let err = chain.build().run("entry", vec![]).unwrap_err();

    let call_context = err.call_context().expect("failure has a call context");
    assert_eq!(call_context.function_selector, failing);
    assert_eq!(call_context.storage_contract_address, OTHER_CONTRACT);
    assert_eq!(call_context.side_effect_counter, 2);
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn call_depth_is_limited() {
    let selector = private_selector("recurse", 0);
    let mut chain =
        TestChain::new().with_options(SimulatorOptions::default().with_max_call_depth(2));
    chain.add_private(CONTRACT, "recurse", 0, move |ctx| ctx.call_private(CONTRACT, selector, &[]));

    let err = chain.build().run("recurse", vec![]).unwrap_err();
    assert_matches!(
        err.error(),
        ExecutionError::Runtime(RuntimeError::ForeignCall {
            source: OracleError::MaxCallDepthExceeded(2),
            ..
        })
    );
}

#[test]
fn functions_must_be_invoked_as_their_kind() {
    let mut chain = TestChain::new();
    let public = chain.add_public(OTHER_CONTRACT, "public_fn", 0);
    let private = chain.add_private(OTHER_CONTRACT, "private_fn", 0, |_| Ok(vec![]));
    chain.add_private(CONTRACT, "call_public", 0, move |ctx| {
        ctx.call_private(OTHER_CONTRACT, public, &[])
    });
    chain.add_private(CONTRACT, "enqueue_private", 0, move |ctx| {
        ctx.enqueue_public(OTHER_CONTRACT, private, &[])?;
        Ok(vec![])
    });
    let simulator = chain.build();

    let err = simulator.run("call_public", vec![]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::WrongFunctionKind);
    let err = simulator.run("enqueue_private", vec![]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::WrongFunctionKind);

    // entry points are checked before anything runs
    let unconstrained = mock_artifact("view_fn", FunctionType::Unconstrained, 0);
    let request = simulator.request("private_fn", vec![]);
    let err = simulator.simulator.run(request, &unconstrained, CONTRACT, SENDER).unwrap_err();
    assert_matches!(err.error(), ExecutionError::WrongFunctionKind { .. });
    assert!(err.call_context().is_none());
}

#[test]
fn unknown_call_targets_are_not_found() {
    let mut chain = TestChain::new();
    chain.add_private(CONTRACT, "entry", 0, |ctx| {
        ctx.call_private(OTHER_CONTRACT, private_selector("missing", 0), &[])
    });

    let err = chain.build().run("entry", vec![]).unwrap_err();
    assert_matches!(
        err.error(),
        ExecutionError::Runtime(RuntimeError::ForeignCall {
            source: OracleError::FunctionArtifactNotFound { .. },
            ..
        })
    );
}

// ENQUEUED PUBLIC CALLS
// ================================================================================================

#[test]
fn public_calls_are_enqueued_with_their_arguments() -> Result<()> {
    let mut chain = TestChain::new();
    let public = chain.add_public(OTHER_CONTRACT, "settle", 1);
    chain.add_private(CONTRACT, "entry", 0, move |ctx| {
        ctx.create_note(ONE, ONE, felts(&[1]))?;
        ctx.enqueue_public(OTHER_CONTRACT, public, &felts(&[9]))?;
        Ok(vec![])
    });

    let result = chain.build().run("entry", vec![])?;

    let [request] = &result.enqueued_public_function_calls[..] else {
        panic!("expected exactly one enqueued call");
    };
    assert_eq!(request.contract_address, OTHER_CONTRACT);
    assert_eq!(request.args, felts(&[9]));
    assert_eq!(request.call_context.msg_sender, CONTRACT);
    assert_eq!(request.side_effect_counter(), 3);
    assert_eq!(request.parent_call_context, result.call_stack_item.public_inputs.call_context);
    assert_eq!(
        result.call_stack_item.public_inputs.public_call_stack_hashes,
        [request.hash()]
    );
    Ok(())
}

// ORACLE DATA
// ================================================================================================

#[test]
fn request_auth_witnesses_take_precedence_over_the_data_store() -> Result<()> {
    let mut chain = TestChain::new();
    chain.data_store.add_auth_witness(Felt::new(1), felts(&[10]));
    chain.data_store.add_auth_witness(Felt::new(2), felts(&[20]));
    chain.add_private(CONTRACT, "entry", 0, |ctx| {
        let mut values = ctx.get_auth_witness(Felt::new(1))?;
        values.extend(ctx.get_auth_witness(Felt::new(2))?);
        Ok(values)
    });
    let simulator = chain.build();

    let request = simulator
        .request("entry", vec![])
        .with_auth_witness(AuthWitness { request_hash: Felt::new(1), witness: felts(&[11]) });
    let result = simulator.run_request("entry", request)?;

    assert_eq!(result.return_values, felts(&[11, 20]));
    Ok(())
}

#[test]
fn missing_auth_witnesses_are_not_found() {
    let mut chain = TestChain::new();
    chain.add_private(CONTRACT, "entry", 0, |ctx| ctx.get_auth_witness(Felt::new(3)));

    let err = chain.build().run("entry", vec![]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn public_storage_and_capsules_are_read_from_the_data_store() -> Result<()> {
    let mut chain = TestChain::new();
    chain.data_store.set_public_storage(CONTRACT, Felt::new(3), Felt::new(30));
    chain.data_store.add_capsule(felts(&[1, 2]));
    chain.add_private(CONTRACT, "entry", 0, |ctx| {
        let mut values = ctx.storage_read(Felt::new(3), 2)?;
        values.extend(ctx.pop_capsule()?);
        ctx.debug_log("read {0}", &values)?;
        Ok(values)
    });

    let simulator = chain.build();
    let result = simulator.run("entry", vec![])?;
    assert_eq!(result.return_values, felts(&[30, 0, 1, 2]));

    // the only capsule has been consumed
    let err = simulator.run("entry", vec![]).unwrap_err();
    assert_matches!(
        err.error(),
        ExecutionError::Runtime(RuntimeError::ForeignCall {
            source: OracleError::NoCapsulesAvailable,
            ..
        })
    );
    Ok(())
}

#[test]
fn runs_draw_different_randomness() -> Result<()> {
    let mut chain = TestChain::new();
    chain.add_private(CONTRACT, "entry", 0, |ctx| Ok(vec![ctx.random_field()?]));
    let simulator = chain.build();

    let first = simulator.run("entry", vec![])?.return_values;
    let second = simulator.run("entry", vec![])?.return_values;
    assert_ne!(first, second);
    Ok(())
}
