use anyhow::Result;
use assert_matches::assert_matches;
use pxe_objects::{
    Felt, ONE, ZERO,
    hash::silo_nullifier,
    note::{Comparator, NoteFilter, NullifiedNoteHashCounter, PropertySelector, Select},
    witness::NoteHashReadRequestMembershipWitness,
};
use pxe_simulator::{
    ErrorKind, ExecutionError, OracleError, RuntimeError, collect_nullified_note_hash_counters,
    testing::mock_inner_note_hash,
};

use crate::{CONTRACT, TestChain, felts};

const SLOT: Felt = Felt::new(3);

// READS
// ================================================================================================

#[test]
fn nested_reads_see_pending_notes_of_ancestors_and_earlier_siblings() -> Result<()> {
    let mut chain = TestChain::new();
    let writer = chain.add_private(CONTRACT, "writer", 0, |ctx| {
        ctx.create_note(SLOT, ONE, felts(&[3, 4]))?;
        Ok(vec![])
    });
    let reader = chain.add_private(CONTRACT, "reader", 0, |ctx| {
        let notes = ctx.get_notes(SLOT, &NoteFilter::default(), 2, 4)?;
        Ok(notes.iter().map(|note| note.items[0]).collect())
    });
    chain.add_private(CONTRACT, "entry", 0, move |ctx| {
        ctx.create_note(SLOT, ONE, felts(&[1, 2]))?;
        ctx.call_private(CONTRACT, writer, &[])?;
        ctx.call_private(CONTRACT, reader, &[])
    });

    let result = chain.build().run("entry", vec![])?;

    assert_eq!(result.return_values, felts(&[1, 3]));
    let reader_result = &result.nested_executions[1];
    assert_eq!(
        reader_result.note_hash_read_request_partial_witnesses,
        vec![NoteHashReadRequestMembershipWitness::transient(); 2]
    );
    Ok(())
}

#[test]
fn settled_reads_carry_their_leaf_index() -> Result<()> {
    let mut chain = TestChain::new();
    chain.data_store.add_note(CONTRACT, SLOT, felts(&[5, 6]), Felt::new(9), Felt::new(50), 17);
    chain.add_private(CONTRACT, "entry", 0, |ctx| {
        let notes = ctx.get_notes(SLOT, &NoteFilter::default(), 2, 1)?;
        assert!(!notes[0].is_pending);
        assert_eq!(notes[0].nonce, Felt::new(9));
        Ok(notes[0].items.clone())
    });

    let result = chain.build().run("entry", vec![])?;

    assert_eq!(result.return_values, felts(&[5, 6]));
    assert_eq!(
        result.note_hash_read_request_partial_witnesses,
        [NoteHashReadRequestMembershipWitness::settled(17)]
    );
    Ok(())
}

#[test]
fn note_filters_are_applied_to_settled_and_pending_notes() -> Result<()> {
    let mut chain = TestChain::new();
    chain.data_store.add_note(CONTRACT, SLOT, felts(&[1, 10]), ONE, Felt::new(51), 0);
    chain.data_store.add_note(CONTRACT, SLOT, felts(&[2, 20]), ONE, Felt::new(52), 1);
    chain.add_private(CONTRACT, "entry", 0, |ctx| {
        ctx.create_note(SLOT, ONE, felts(&[3, 10]))?;
        let filter = NoteFilter::default().with_select(Select {
            selector: PropertySelector::new(1, 0, 8),
            value: Felt::new(10),
            comparator: Comparator::Eq,
        });
        let notes = ctx.get_notes(SLOT, &filter, 2, 4)?;
        Ok(notes.iter().map(|note| note.items[0]).collect())
    });

    let result = chain.build().run("entry", vec![])?;
    assert_eq!(result.return_values, felts(&[1, 3]));
    Ok(())
}

#[test]
fn notes_of_different_lengths_cannot_be_returned_together() {
    let mut chain = TestChain::new();
    chain.data_store.add_note(CONTRACT, SLOT, felts(&[1, 2]), ONE, Felt::new(51), 0);
    chain.data_store.add_note(CONTRACT, SLOT, felts(&[3]), ONE, Felt::new(52), 1);
    chain.add_private(CONTRACT, "entry", 0, |ctx| {
        ctx.get_notes(SLOT, &NoteFilter::default(), 2, 4)?;
        Ok(vec![])
    });

    let err = chain.build().run("entry", vec![]).unwrap_err();
    assert_matches!(
        err.error(),
        ExecutionError::Runtime(RuntimeError::ForeignCall {
            source: OracleError::NoteLengthMismatch { expected: 2, actual: 1 },
            ..
        })
    );
    assert_eq!(err.kind(), ErrorKind::EncodingViolation);
}

#[test]
fn note_responses_must_fit_the_declared_size() {
    let mut chain = TestChain::new();
    chain.data_store.add_note(CONTRACT, SLOT, felts(&[1, 2]), ONE, Felt::new(51), 0);
    chain.data_store.add_note(CONTRACT, SLOT, felts(&[3, 4]), ONE, Felt::new(52), 1);
    chain.add_private(CONTRACT, "read_one", 0, |ctx| {
        ctx.get_notes(SLOT, &NoteFilter::default(), 2, 1)?;
        Ok(vec![])
    });
    chain.add_private(CONTRACT, "read_one_limited", 0, |ctx| {
        let notes = ctx.get_notes(SLOT, &NoteFilter::default().with_limit(1), 2, 1)?;
        Ok(vec![Felt::new(notes.len() as u64)])
    });
    let simulator = chain.build();

    let err = simulator.run("read_one", vec![]).unwrap_err();
    assert_matches!(
        err.error(),
        ExecutionError::Runtime(RuntimeError::ForeignCall {
            source: OracleError::ReturnDataTooLarge { max: 6, actual: 10 },
            ..
        })
    );

    let result = simulator.run("read_one_limited", vec![]).unwrap();
    assert_eq!(result.return_values, [ONE]);
}

// NULLIFICATION
// ================================================================================================

#[test]
fn nullifying_a_pending_note_links_both_counters() -> Result<()> {
    let mut chain = TestChain::new();
    let consumer = chain.add_private(CONTRACT, "consumer", 0, |ctx| {
        let notes = ctx.get_notes(SLOT, &NoteFilter::default(), 1, 1)?;
        let inner_note_hash = mock_inner_note_hash(&notes[0].items);
        ctx.nullify_note(Felt::new(60), inner_note_hash)?;
        Ok(vec![])
    });
    chain.add_private(CONTRACT, "entry", 0, move |ctx| {
        ctx.create_note(SLOT, ONE, felts(&[8]))?;
        ctx.call_private(CONTRACT, consumer, &[])?;
        let remaining = ctx.get_notes(SLOT, &NoteFilter::default(), 1, 1)?;
        let exists = ctx.check_nullifier_exists(Felt::new(60))?;
        Ok(vec![Felt::new(remaining.len() as u64), Felt::new(exists as u64)])
    });

    let result = chain.build().run("entry", vec![])?;

    // note at 2, call at 3, read at 4, nullifier at 5
    let expected = NullifiedNoteHashCounter { note_hash_counter: 2, nullifier_counter: 5 };
    assert_eq!(result.nested_executions[0].nullified_note_hash_counters, [expected]);
    assert_eq!(collect_nullified_note_hash_counters(&result), [expected]);
    assert_eq!(result.return_values, [ZERO, ONE]);
    Ok(())
}

#[test]
fn settled_notes_are_hidden_once_nullified() -> Result<()> {
    let mut chain = TestChain::new();
    chain.data_store.add_note(CONTRACT, SLOT, felts(&[1]), ONE, Felt::new(50), 0);
    let count = chain.add_private(CONTRACT, "count", 0, |ctx| {
        let notes = ctx.get_notes(SLOT, &NoteFilter::default(), 1, 2)?;
        Ok(vec![Felt::new(notes.len() as u64)])
    });
    chain.add_private(CONTRACT, "entry", 0, move |ctx| {
        let before = ctx.call_private(CONTRACT, count, &[])?;
        ctx.get_notes(SLOT, &NoteFilter::default(), 1, 2)?;
        ctx.nullify_note(Felt::new(50), ZERO)?;
        let after = ctx.call_private(CONTRACT, count, &[])?;
        Ok(vec![before[0], after[0]])
    });

    let result = chain.build().run("entry", vec![])?;
    assert_eq!(result.return_values, [ONE, ZERO]);
    // settled notes are not linked to a note hash counter
    assert!(collect_nullified_note_hash_counters(&result).is_empty());
    Ok(())
}

#[test]
fn nullifying_twice_fails_on_the_second_attempt() {
    let mut chain = TestChain::new();
    chain.data_store.add_note(CONTRACT, SLOT, felts(&[1]), ONE, Felt::new(50), 0);
    chain.add_private(CONTRACT, "entry", 0, |ctx| {
        ctx.get_notes(SLOT, &NoteFilter::default(), 1, 1)?;
        ctx.nullify_note(Felt::new(50), ZERO)?;
        ctx.nullify_note(Felt::new(50), ZERO)?;
        Ok(vec![])
    });

    let err = chain.build().run("entry", vec![]).unwrap_err();
    assert_matches!(
        err.error(),
        ExecutionError::Runtime(RuntimeError::ForeignCall {
            source: OracleError::NoteAlreadyNullified { .. },
            ..
        })
    );
    assert_eq!(err.kind(), ErrorKind::ContractInterfaceViolation);
}

#[test]
fn unknown_notes_cannot_be_nullified() {
    let mut chain = TestChain::new();
    chain.add_private(CONTRACT, "unknown_pending", 0, |ctx| {
        ctx.nullify_note(Felt::new(50), Felt::new(1234))?;
        Ok(vec![])
    });
    chain.add_private(CONTRACT, "unknown_settled", 0, |ctx| {
        ctx.nullify_note(Felt::new(50), ZERO)?;
        Ok(vec![])
    });
    let simulator = chain.build();

    let err = simulator.run("unknown_pending", vec![]).unwrap_err();
    assert_matches!(
        err.error(),
        ExecutionError::Runtime(RuntimeError::ForeignCall {
            source: OracleError::PendingNoteNotFound { .. },
            ..
        })
    );
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let err = simulator.run("unknown_settled", vec![]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn committed_nullifiers_are_visible() -> Result<()> {
    let mut chain = TestChain::new();
    chain.data_store.add_nullifier(silo_nullifier(CONTRACT, Felt::new(70)), 4);
    chain.add_private(CONTRACT, "entry", 0, |ctx| {
        let committed = ctx.check_nullifier_exists(Felt::new(70))?;
        let unknown = ctx.check_nullifier_exists(Felt::new(71))?;
        Ok(vec![Felt::new(committed as u64), Felt::new(unknown as u64)])
    });

    let result = chain.build().run("entry", vec![])?;
    assert_eq!(result.return_values, [ONE, ZERO]);
    Ok(())
}
