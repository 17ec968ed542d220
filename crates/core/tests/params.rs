//! Typed parameter readers driven through command lines.

mod common;

use common::{context, drain_errors, run};
use scpi_engine_core::codes;

fn seen(lines: &[&str]) -> (Vec<String>, Vec<i16>) {
    let mut ctx = context();
    for line in lines {
        run(&mut ctx, line);
    }
    let errors = drain_errors(&mut ctx);
    (ctx.into_transport().seen, errors)
}

#[test]
fn booleans() {
    let (values, errors) = seen(&[
        "TEST:BOOL ON\r\n",
        "TEST:BOOL off\r\n",
        "TEST:BOOL 1\r\n",
        "TEST:BOOL 0\r\n",
        "TEST:BOOL 7\r\n",
        "TEST:BOOL maybe\r\n",
    ]);
    assert_eq!(values, ["true", "false", "true", "false", "true"]);
    assert_eq!(errors, [codes::ILLEGAL_PARAMETER_VALUE]);
}

#[test]
fn integers_in_every_base() {
    let (values, errors) = seen(&[
        "TEST:INT 42\r\n",
        "TEST:INT -7\r\n",
        "TEST:INT #H1F\r\n",
        "TEST:INT #Q17\r\n",
        "TEST:INT #B101\r\n",
        "TEST:INT 1.5e1\r\n",
    ]);
    assert_eq!(values, ["42", "-7", "31", "15", "5", "15"]);
    assert!(errors.is_empty());
}

#[test]
fn integer_conversion_wraps_to_width() {
    let (values, _) = seen(&["TEST:INT #HFFFFFFFF\r\n", "TEST:INT 4294967297\r\n"]);
    assert_eq!(values, ["-1", "1"]);
}

#[test]
fn integer_rejections() {
    let (values, errors) = seen(&["TEST:INT 1.5\r\n", "TEST:INT 5 V\r\n", "TEST:INT ON\r\n"]);
    assert!(values.is_empty());
    assert_eq!(
        errors,
        [codes::DATA_TYPE_ERROR, codes::SUFFIX_NOT_ALLOWED, codes::DATA_TYPE_ERROR]
    );
}

#[test]
fn optional_float_parameter() {
    let mut ctx = context();
    assert_eq!(run(&mut ctx, "MEAS:VOLT:DC? 2.5e-3\r\n"), "0.0025\r\n");
    assert_eq!(run(&mut ctx, "MEAS:VOLT:DC?\r\n"), "0.25\r\n");
}

#[test]
fn choices_use_the_abbreviation_rule() {
    let mut ctx = context();
    assert_eq!(
        run(&mut ctx, "TEST:CHO? BUS;CHO? imm;CHO? EXTERNAL\r\n"),
        "5;6;7\r\n"
    );
    assert_eq!(run(&mut ctx, "TEST:CHO? EXTE;CHO? b;CHO? Immed\r\n"), "7;5;6\r\n");
    run(&mut ctx, "TEST:CHO? EXTERNALS\r\n");
    run(&mut ctx, "TEST:CHO? XT\r\n");
    assert_eq!(
        drain_errors(&mut ctx),
        [codes::ILLEGAL_PARAMETER_VALUE, codes::ILLEGAL_PARAMETER_VALUE]
    );
}

#[test]
fn numbers_with_units_and_named_values() {
    let (values, errors) = seen(&[
        "SOUR:VOLT 10 mV\r\n",
        "SOUR:VOLT 2KV\r\n",
        "SOUR:VOLT MAX\r\n",
        "SOUR:VOLT def\r\n",
        "SOUR:VOLT 5 XYZ\r\n",
    ]);
    assert_eq!(values, ["0.01 V", "2000 V", "MAXimum", "DEFault"]);
    assert_eq!(errors, [codes::INVALID_SUFFIX]);
}

#[test]
fn text_forms_unify() {
    let (values, errors) = seen(&[
        "TEST:TEXT 'it''s'\r\n",
        "TEST:TEXT \"two words\"\r\n",
        "TEST:TEXT BARE\r\n",
        "TEST:TEXT #15hello\r\n",
        "TEST:TEXT 12\r\n",
    ]);
    assert_eq!(values, ["it's", "two words", "BARE", "hello"]);
    assert_eq!(errors, [codes::DATA_TYPE_ERROR]);
}

#[test]
fn quoted_responses_double_embedded_quotes() {
    let mut ctx = context();
    assert_eq!(
        run(&mut ctx, "TEST:TEXT? 'say \"hi\"'\r\n"),
        "\"say \"\"hi\"\"\"\r\n"
    );
}

#[test]
fn blocks_pass_raw_bytes() {
    let mut ctx = context();
    assert_eq!(run(&mut ctx, "TEST:ARB? #14a;\nb\r\n"), "#14a;\nb\r\n");
    assert!(drain_errors(&mut ctx).is_empty());
}

#[test]
fn channel_lists() {
    let (values, errors) = seen(&["TEST:CHAN (@1!2, 3:5, 4!1:4!3)\r\n"]);
    assert_eq!(values, ["[1, 2]", "[3]:[5]", "[4, 1]:[4, 3]"]);
    assert!(errors.is_empty());
}

#[test]
fn channel_list_with_too_many_dimensions() {
    let (values, errors) = seen(&["TEST:CHAN (@1!2!3)\r\n"]);
    assert!(values.is_empty());
    assert_eq!(errors, [codes::EXPRESSION_PARSING_ERROR]);
}

#[test]
fn unexpected_parameter_kind_for_channel_list() {
    let (_, errors) = seen(&["TEST:CHAN 5\r\n"]);
    assert_eq!(errors, [codes::DATA_TYPE_ERROR]);
}

#[test]
fn integers_round_trip_through_every_base() {
    let mut ctx = context();
    let values = [0, 1, -1, 42, -42, 255, 1 << 20, i32::MIN, i32::MAX];
    for base in [2, 8, 10, 16] {
        for value in values {
            let reply = run(&mut ctx, &format!("TEST:BASE? {value},{base}\r\n"));
            let text = reply.trim_end();
            run(&mut ctx, &format!("TEST:INT {text}\r\n"));
            let parsed = ctx.session_mut().transport_mut().seen.pop();
            assert_eq!(parsed, Some(value.to_string()), "{value} in base {base} as {text}");
        }
    }
    assert!(drain_errors(&mut ctx).is_empty());
}

#[test]
fn base_results_use_prefixes() {
    let mut ctx = context();
    assert_eq!(
        run(&mut ctx, "TEST:BASE? 32,16;BASE? 5,2;BASE? 8,8;BASE? -3\r\n"),
        "#H20;#B101;#Q10;-3\r\n"
    );
}

#[test]
fn arrays_fill_up_to_capacity() {
    let (values, errors) = seen(&[
        "TEST:ARR 4\r\n",
        "TEST:ARR 1, 2,#H3\r\n",
        "TEST:ARR 1,2,3,4\r\n",
        "TEST:ARR\r\n",
        "TEST:ARR:OPT\r\n",
        "TEST:ARR:OPT 9\r\n",
    ]);
    assert_eq!(values, ["1:4", "3:1,2,3", "3:1,2,3", "0:", "1:9"]);
    assert_eq!(
        errors,
        [codes::PARAMETER_NOT_ALLOWED, codes::MISSING_PARAMETER]
    );
}

#[test]
fn array_stops_at_first_bad_value() {
    let (values, errors) = seen(&["TEST:ARR 1,'two',3\r\n"]);
    assert!(values.is_empty());
    assert_eq!(errors, [codes::DATA_TYPE_ERROR]);
}

#[test]
fn numeric_lists_through_a_command() {
    let mut ctx = context();
    assert_eq!(run(&mut ctx, "TEST:LIST? (1,3:5)\r\n"), "1,1,3,5\r\n");
    assert_eq!(run(&mut ctx, "TEST:LIST:INT? (2:4, -1)\r\n"), "2,4,-1,-1\r\n");
    assert_eq!(run(&mut ctx, "TEST:LIST? ()\r\n"), "");
    assert!(drain_errors(&mut ctx).is_empty());
}

#[test]
fn list_errors_are_queued_once() {
    let mut ctx = context();
    assert_eq!(run(&mut ctx, "TEST:LIST? (1,,3)\r\n"), "1,1\r\n");
    assert_eq!(drain_errors(&mut ctx), [codes::EXPRESSION_PARSING_ERROR]);

    run(&mut ctx, "TEST:LIST:INT? (1,)\r\n");
    assert_eq!(drain_errors(&mut ctx), [codes::EXPRESSION_PARSING_ERROR]);

    assert_eq!(run(&mut ctx, "TEST:LIST? 5\r\n"), "");
    assert_eq!(drain_errors(&mut ctx), [codes::DATA_TYPE_ERROR]);
}
