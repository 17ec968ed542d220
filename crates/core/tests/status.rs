//! Status registers and the error queue as seen through commands.

mod common;

use common::{context, context_with, drain_errors, run};
use scpi_engine_core::{ControlKind, Register, codes, esr, stb};

#[test]
fn overflow_keeps_capacity_and_marks_the_tail() {
    let mut config = common::config();
    config.error_queue_size = 3;
    let mut ctx = context_with(config);
    for name in ["A1", "A2", "A3", "A4", "A5"] {
        run(&mut ctx, &format!("{name}\r\n"));
    }
    assert_eq!(ctx.session().error_count(), 3);

    let first = ctx.session_mut().error_pop().unwrap();
    assert_eq!(first.info.as_deref(), Some("A1"));
    let second = ctx.session_mut().error_pop().unwrap();
    assert_eq!(second.info.as_deref(), Some("A2"));
    let tail = ctx.session_mut().error_pop().unwrap();
    assert_eq!(tail.code, codes::QUEUE_OVERFLOW);
    assert_eq!(tail.info, None);
}

#[test]
fn transport_hears_every_push_and_the_empty_queue() {
    let mut config = common::config();
    config.error_queue_size = 1;
    let mut ctx = context_with(config);
    run(&mut ctx, "A1;A2\r\n");
    drain_errors(&mut ctx);
    assert_eq!(
        ctx.transport().errors,
        [codes::UNDEFINED_HEADER, codes::UNDEFINED_HEADER, codes::QUEUE_OVERFLOW, 0]
    );
}

#[test]
fn event_register_reads_clear() {
    let mut ctx = context();
    run(&mut ctx, "ABCD\r\n");
    assert_eq!(run(&mut ctx, "*ESR?\r\n"), format!("{}\r\n", esr::CER));
    assert_eq!(run(&mut ctx, "*ESR?\r\n"), "0\r\n");
}

#[test]
fn questionable_condition_latches_into_event() {
    let mut ctx = context();
    run(&mut ctx, "STAT:QUES:ENAB 4\r\n");
    ctx.session_mut().reg_set(Register::QuestionableCondition, 4);
    assert_eq!(ctx.session().reg_get(Register::Stb) & stb::QES, stb::QES);

    assert_eq!(run(&mut ctx, "STAT:QUES?\r\n"), "4\r\n");
    assert_eq!(run(&mut ctx, "STAT:QUES?\r\n"), "0\r\n");
    assert_eq!(run(&mut ctx, "STAT:QUES:COND?\r\n"), "4\r\n");
    assert_eq!(ctx.session().reg_get(Register::Stb) & stb::QES, 0);
}

#[test]
fn operation_enable_round_trips() {
    let mut ctx = context();
    assert_eq!(run(&mut ctx, "STAT:OPER:ENAB 17;ENAB?\r\n"), "17\r\n");
    ctx.session_mut().reg_set(Register::OperationCondition, 1);
    assert_eq!(run(&mut ctx, "STAT:OPER:EVEN?\r\n"), "1\r\n");
    run(&mut ctx, "STAT:PRES\r\n");
    assert_eq!(run(&mut ctx, "STAT:OPER:ENAB?;:STAT:QUES:ENAB?\r\n"), "0;0\r\n");
}

#[test]
fn service_request_is_signalled_once() {
    let mut ctx = context();
    run(&mut ctx, "*SRE 32;*ESE 32\r\n");
    run(&mut ctx, "ABCD\r\n");
    assert_eq!(
        ctx.transport().controls,
        [(ControlKind::ServiceRequest, stb::ESR | stb::SRQ)]
    );
    run(&mut ctx, "EFGH\r\n");
    assert_eq!(ctx.transport().controls.len(), 1);

    let status = ctx.session().reg_get(Register::Stb);
    assert_eq!(status, stb::ESR | stb::SRQ | stb::QMA);
    assert_eq!(run(&mut ctx, "*STB?\r\n"), format!("{status}\r\n"));
}

#[test]
fn clear_status_resets_events_and_queue() {
    let mut ctx = context();
    run(&mut ctx, "ABCD;*OPC\r\n");
    ctx.session_mut().reg_set(Register::OperationCondition, 2);
    run(&mut ctx, "*CLS\r\n");
    assert_eq!(ctx.session().reg_get(Register::Esr), 0);
    assert_eq!(ctx.session().reg_get(Register::Oper), 0);
    assert_eq!(ctx.session().reg_get(Register::Stb), 0);
    assert_eq!(ctx.session().error_count(), 0);
    assert_eq!(ctx.session().reg_get(Register::OperationCondition), 2);
}

#[test]
fn error_classes_set_their_event_bits() {
    let mut ctx = context();
    run(&mut ctx, "TEST:BOOL maybe\r\n");
    assert_eq!(ctx.session().reg_get(Register::Esr), esr::EER);
    run(&mut ctx, "*CLS;TEST:FAIL:PUSH\r\n");
    assert_eq!(ctx.session().reg_get(Register::Esr), esr::EER);
    ctx.session_mut().error_push(codes::DEVICE_ERROR);
    assert_eq!(ctx.session().reg_get(Register::Esr), esr::EER | esr::DER);
}

#[test]
fn long_error_text_is_truncated() {
    let mut ctx = context();
    let header = format!("X{}", "Y".repeat(300));
    ctx.session_mut().error_push_info(codes::UNDEFINED_HEADER, header.as_bytes());
    let entry = ctx.session_mut().error_pop().unwrap();
    assert_eq!(entry.info.map(|t| t.len()), Some(255));
}
