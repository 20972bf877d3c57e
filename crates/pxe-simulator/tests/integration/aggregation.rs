use anyhow::Result;
use pxe_objects::{
    Felt, ONE,
    address::{EventSelector, Point},
    transaction::PublicCallRequest,
};
use pxe_simulator::{
    collect_encrypted_logs, collect_enqueued_public_function_calls, collect_unencrypted_logs,
};

use crate::{CONTRACT, OTHER_CONTRACT, TestChain, felts};

const EVENT: EventSelector = EventSelector::new(1);

#[test]
fn logs_are_collected_in_reverse_call_order() -> Result<()> {
    let mut chain = TestChain::new();
    let first = chain.add_private(CONTRACT, "log_b", 0, |ctx| {
        ctx.emit_unencrypted_log(EVENT, felts(&[2]))?;
        Ok(vec![])
    });
    let second = chain.add_private(CONTRACT, "log_c", 0, |ctx| {
        ctx.emit_unencrypted_log(EVENT, felts(&[3]))?;
        Ok(vec![])
    });
    chain.add_private(CONTRACT, "log_a", 0, move |ctx| {
        ctx.emit_unencrypted_log(EVENT, felts(&[1]))?;
        ctx.call_private(CONTRACT, first, &[])?;
        ctx.call_private(CONTRACT, second, &[])
    });

    let result = chain.build().run("log_a", vec![])?;

    let data: Vec<Felt> = collect_unencrypted_logs(&result)
        .iter()
        .flat_map(|logs| logs.logs().iter().map(|log| log.data[0]))
        .collect();
    assert_eq!(data, felts(&[1, 3, 2]));

    // the function commits to the hash of each log it emits
    let root = &result.call_stack_item.public_inputs;
    assert_eq!(root.unencrypted_logs_hashes[0].value, result.unencrypted_logs.logs()[0].hash());
    assert_eq!(root.unencrypted_log_preimages_length, 3);
    Ok(())
}

#[test]
fn encrypted_logs_record_their_recipient() -> Result<()> {
    let recipient = Point::new(Felt::new(5), Felt::new(6));
    let mut chain = TestChain::new();
    chain.add_private(CONTRACT, "send", 0, move |ctx| {
        ctx.create_note(ONE, ONE, felts(&[9]))?;
        ctx.emit_encrypted_log(ONE, ONE, recipient, felts(&[9]))?;
        Ok(vec![])
    });

    let result = chain.build().run("send", vec![])?;

    let logs = collect_encrypted_logs(&result);
    let log = &logs[0].logs()[0];
    assert_eq!(log.recipient, recipient);
    assert_eq!(log.contract_address, CONTRACT);
    assert_eq!(log.payload, felts(&[9]));
    assert_eq!(result.call_stack_item.public_inputs.encrypted_logs_hashes[0].counter, 3);
    Ok(())
}

#[test]
fn enqueued_calls_are_collected_by_descending_counter() -> Result<()> {
    let mut chain = TestChain::new();
    let public = chain.add_public(OTHER_CONTRACT, "public_sink", 1);
    let child = chain.add_private(CONTRACT, "enqueue_once", 1, move |ctx| {
        let arg = ctx.args()[0];
        ctx.enqueue_public(OTHER_CONTRACT, public, &[arg])?;
        Ok(vec![])
    });
    chain.add_private(CONTRACT, "enqueue_around", 0, move |ctx| {
        ctx.enqueue_public(OTHER_CONTRACT, public, &felts(&[1]))?;
        ctx.call_private(CONTRACT, child, &felts(&[2]))?;
        ctx.enqueue_public(OTHER_CONTRACT, public, &felts(&[3]))?;
        Ok(vec![])
    });

    let result = chain.build().run("enqueue_around", vec![])?;

    let calls = collect_enqueued_public_function_calls(&result);
    let counters: Vec<u32> = calls.iter().map(PublicCallRequest::side_effect_counter).collect();
    assert_eq!(counters, [5, 4, 2]);
    let args: Vec<Felt> = calls.iter().map(|call| call.args[0]).collect();
    assert_eq!(args, felts(&[3, 2, 1]));
    Ok(())
}
