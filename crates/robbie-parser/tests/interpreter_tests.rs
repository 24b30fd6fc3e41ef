//! Interpreter tests.
//!
//! Covers: command sequences, if/else, while, do, procedure calls and
//! recursion limits, init and print directives, structural skipping, and
//! every syntax error the interpreter raises. The agent is a recorder that
//! logs each request and answers tests from a queue.

use proptest::prelude::*;
use robbie_lexer::SourceCursor;
use robbie_parser::Interpreter;
use robbie_types::{
    AgentCommands, Direction, ErrorCode, RelativeDirection, Result, RobbieError,
};
use std::collections::VecDeque;

// ─────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────

/// Logs every request; tests are answered from `answers`, then `false`.
#[derive(Default)]
struct Recorder {
    log: Vec<String>,
    answers: VecDeque<bool>,
    fail_on: Option<&'static str>,
}

impl Recorder {
    fn answering(answers: &[bool]) -> Self {
        Self {
            answers: answers.iter().copied().collect(),
            ..Self::default()
        }
    }

    fn failing_on(request: &'static str) -> Self {
        Self {
            fail_on: Some(request),
            ..Self::default()
        }
    }

    fn act(&mut self, request: String) -> Result<()> {
        if self.fail_on == Some(request.as_str()) {
            return Err(RobbieError::new(
                ErrorCode::COMMAND_FAILED,
                format!("'{request}' was rejected"),
            ));
        }
        self.log.push(request);
        Ok(())
    }

    fn ask(&mut self, request: String) -> Result<bool> {
        self.act(request)?;
        Ok(self.answers.pop_front().unwrap_or(false))
    }

    /// The log without the trailing `stop`.
    fn commands(&self) -> Vec<&str> {
        let mut log: Vec<&str> = self.log.iter().map(String::as_str).collect();
        if log.last() == Some(&"stop") {
            log.pop();
        }
        log
    }
}

impl AgentCommands for Recorder {
    fn move_forward(&mut self) -> Result<()> {
        self.act("step".into())
    }
    fn turn_left(&mut self) -> Result<()> {
        self.act("turnL".into())
    }
    fn turn_right(&mut self) -> Result<()> {
        self.act("turnR".into())
    }
    fn take_adjacent(&mut self) -> Result<()> {
        self.act("take".into())
    }
    fn drop_adjacent(&mut self) -> Result<()> {
        self.act("drop".into())
    }
    fn is_facing(&mut self, direction: Direction) -> Result<bool> {
        self.ask(format!("facing {direction}"))
    }
    fn has_gem(&mut self) -> Result<bool> {
        self.ask("hasjem".into())
    }
    fn sees_gem(&mut self) -> Result<bool> {
        self.ask("seejem".into())
    }
    fn is_clear(&mut self, direction: RelativeDirection) -> Result<bool> {
        self.ask(format!("clear {direction}"))
    }
    fn init_grid(&mut self, filename: &str) -> Result<()> {
        self.act(format!("grid {filename}"))
    }
    fn init_gem_count(&mut self, count: u32) -> Result<()> {
        self.act(format!("gems {count}"))
    }
    fn stop(&mut self) -> Result<()> {
        self.act("stop".into())
    }
}

/// Run `source` against `agent`; returns the result and printed output.
fn run_with(source: &str, agent: &mut Recorder) -> (Result<()>, String) {
    run_limited(source, agent, robbie_parser::DEFAULT_MAX_CALL_DEPTH)
}

fn run_limited(source: &str, agent: &mut Recorder, depth: u32) -> (Result<()>, String) {
    let mut out = Vec::new();
    let result = Interpreter::new(SourceCursor::new("test.rob", source), agent, &mut out)
        .with_max_call_depth(depth)
        .run();
    (result, String::from_utf8(out).unwrap())
}

/// Run and return the commands sent, panicking on error.
fn run_ok(source: &str, agent: &mut Recorder) -> Vec<String> {
    let (result, _) = run_with(source, agent);
    if let Err(e) = result {
        panic!("unexpected error: {e}");
    }
    agent.commands().into_iter().map(str::to_string).collect()
}

/// Run with a fresh recorder and return the error.
fn run_err(source: &str) -> RobbieError {
    let mut agent = Recorder::default();
    run_with(source, &mut agent).0.unwrap_err()
}

// ─────────────────────────────────────────────────────────────────────
// Programs & commands
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_empty_main_only_stops() {
    let mut agent = Recorder::default();
    run_ok("main { }", &mut agent);
    assert_eq!(agent.log, vec!["stop"]);
}

#[test]
fn test_commands_share_one_semicolon() {
    let mut agent = Recorder::default();
    let log = run_ok("main { step turnL turnR take drop; }", &mut agent);
    assert_eq!(log, vec!["step", "turnL", "turnR", "take", "drop"]);
}

#[test]
fn test_commands_across_lines() {
    let mut agent = Recorder::default();
    let log = run_ok("main {\n  step\n  step;\n  turnR;\n}", &mut agent);
    assert_eq!(log, vec!["step", "step", "turnR"]);
}

#[test]
fn test_text_after_main_is_not_read() {
    let mut agent = Recorder::default();
    let log = run_ok("main { step; } this is \"never scanned", &mut agent);
    assert_eq!(log, vec!["step"]);
}

#[test]
fn test_comments_anywhere() {
    let mut agent = Recorder::default();
    let src = "// header\nmain /* a */ { step /* mid */ turnL; // tail\n }";
    assert_eq!(run_ok(src, &mut agent), vec!["step", "turnL"]);
}

#[test]
fn test_commands_run_before_error_is_found() {
    let mut agent = Recorder::default();
    let (result, _) = run_with("main { step step oops; }", &mut agent);
    assert_eq!(result.unwrap_err().code, ErrorCode::UNKNOWN_COMMAND);
    assert_eq!(agent.log, vec!["step", "step"]);
}

// ─────────────────────────────────────────────────────────────────────
// if / else
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_if_true_runs_body() {
    let mut agent = Recorder::answering(&[true]);
    let log = run_ok("main { if frontclear step; turnL; }", &mut agent);
    assert_eq!(log, vec!["clear FRONT", "step", "turnL"]);
}

#[test]
fn test_if_false_skips_body() {
    let mut agent = Recorder::answering(&[false]);
    let log = run_ok("main { if frontclear { step; step; } turnL; }", &mut agent);
    assert_eq!(log, vec!["clear FRONT", "turnL"]);
}

#[test]
fn test_if_else_runs_exactly_one_side() {
    let src = "main { if seejem { take; } else { step; } }";

    let mut agent = Recorder::answering(&[true]);
    assert_eq!(run_ok(src, &mut agent), vec!["seejem", "take"]);

    let mut agent = Recorder::answering(&[false]);
    assert_eq!(run_ok(src, &mut agent), vec!["seejem", "step"]);
}

#[test]
fn test_negation_with_bang_and_not() {
    let mut agent = Recorder::answering(&[false, true]);
    let log = run_ok("main { if !hasjem step; if not hasjem turnL; }", &mut agent);
    assert_eq!(log, vec!["hasjem", "step", "hasjem"]);
}

#[test]
fn test_all_test_keywords_reach_agent() {
    let mut agent = Recorder::default();
    let src = "main {
        if leftclear step; if rightclear step; if frontclear step;
        if backclear step; if seejem step; if hasjem step;
        if facingN step; if facingE step; if facingS step; if facingW step;
    }";
    let log = run_ok(src, &mut agent);
    assert_eq!(
        log,
        vec![
            "clear LEFT",
            "clear RIGHT",
            "clear FRONT",
            "clear BACK",
            "seejem",
            "hasjem",
            "facing UP",
            "facing RIGHT",
            "facing DOWN",
            "facing LEFT",
        ]
    );
}

#[test]
fn test_skipped_nested_if_else_stays_in_sync() {
    // Outer false: the whole inner if/else (with braced bodies) is skipped.
    let mut agent = Recorder::answering(&[false]);
    let src = "main { if hasjem if seejem { take; } else { drop; } turnR; }";
    assert_eq!(run_ok(src, &mut agent), vec!["hasjem", "turnR"]);
}

#[test]
fn test_dangling_else_binds_to_inner_if() {
    let mut agent = Recorder::answering(&[true, false]);
    let src = "main { if hasjem if seejem take; else drop; }";
    assert_eq!(run_ok(src, &mut agent), vec!["hasjem", "seejem", "drop"]);
}

#[test]
fn test_skipped_code_sends_nothing() {
    let mut agent = Recorder::answering(&[false]);
    let src = "main { if hasjem { if seejem take; while frontclear step; call nowhere; } }";
    assert_eq!(run_ok(src, &mut agent), vec!["hasjem"]);
}

// ─────────────────────────────────────────────────────────────────────
// while
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_while_reevaluates_every_pass() {
    let mut agent = Recorder::answering(&[true, true, false]);
    let log = run_ok("main { while frontclear step; turnL; }", &mut agent);
    assert_eq!(
        log,
        vec!["clear FRONT", "step", "clear FRONT", "step", "clear FRONT", "turnL"]
    );
}

#[test]
fn test_while_false_skips_block() {
    let mut agent = Recorder::answering(&[false]);
    let log = run_ok("main { while seejem { take; step; } drop; }", &mut agent);
    assert_eq!(log, vec!["seejem", "drop"]);
}

#[test]
fn test_nested_while() {
    let mut agent = Recorder::answering(&[true, true, false, false]);
    let src = "main { while hasjem { while seejem take; step; } }";
    assert_eq!(
        run_ok(src, &mut agent),
        vec!["hasjem", "seejem", "take", "seejem", "step", "hasjem"]
    );
}

// ─────────────────────────────────────────────────────────────────────
// do
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_do_repeats_single_instruction() {
    let mut agent = Recorder::default();
    let log = run_ok("main { do 3 step; turnL; }", &mut agent);
    assert_eq!(log, vec!["step", "step", "step", "turnL"]);
}

#[test]
fn test_do_repeats_block() {
    let mut agent = Recorder::default();
    let log = run_ok("main { do 2 { step; turnR; } }", &mut agent);
    assert_eq!(log, vec!["step", "turnR", "step", "turnR"]);
}

#[test]
fn test_do_zero_skips_body() {
    let mut agent = Recorder::default();
    let log = run_ok("main { do 0 { step; step; } turnL; do 0 take; drop; }", &mut agent);
    assert_eq!(log, vec!["turnL", "drop"]);
}

#[test]
fn test_nested_do() {
    let mut agent = Recorder::default();
    let log = run_ok("main { do 2 do 3 step; }", &mut agent);
    assert_eq!(log.len(), 6);
}

// ─────────────────────────────────────────────────────────────────────
// Procedures
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_call_runs_body_and_returns() {
    let mut agent = Recorder::default();
    let src = "proc walk { step; step; } main { call walk; turnL; call walk; }";
    assert_eq!(
        run_ok(src, &mut agent),
        vec!["step", "step", "turnL", "step", "step"]
    );
}

#[test]
fn test_procedure_calls_procedure() {
    let mut agent = Recorder::default();
    let src = "proc a { step; } proc b { call a; turnR; } main { call b; }";
    assert_eq!(run_ok(src, &mut agent), vec!["step", "turnR"]);
}

#[test]
fn test_procedure_may_call_later_declaration() {
    let mut agent = Recorder::default();
    let src = "proc first { call second; } proc second { take; } main { call first; }";
    assert_eq!(run_ok(src, &mut agent), vec!["take"]);
}

#[test]
fn test_terminating_recursion() {
    let mut agent = Recorder::answering(&[true, true, false]);
    let src = "proc go { if frontclear { step; call go; } } main { call go; }";
    assert_eq!(
        run_ok(src, &mut agent),
        vec!["clear FRONT", "step", "clear FRONT", "step", "clear FRONT"]
    );
}

#[test]
fn test_unbounded_recursion_hits_depth_limit() {
    let mut agent = Recorder::default();
    let (result, _) = run_limited("proc loop { step; call loop; } main { call loop; }", &mut agent, 10);
    let err = result.unwrap_err();
    assert_eq!(err.code, ErrorCode::CALL_DEPTH_EXCEEDED);
    assert_eq!(agent.log.len(), 10);
}

#[test]
fn test_default_depth_limit_is_enforced() {
    let err = run_err("proc r { call r; } main { call r; }");
    assert_eq!(err.code, ErrorCode::CALL_DEPTH_EXCEEDED);
    assert!(err.message.contains("200"), "message: {}", err.message);
}

#[test]
fn test_undefined_procedure() {
    let err = run_err("main { call ghost; }");
    assert_eq!(err.code, ErrorCode::UNDEFINED_PROCEDURE);
    assert!(err.message.contains("ghost"));
}

#[test]
fn test_redeclared_procedure_uses_last_body() {
    let mut agent = Recorder::default();
    let src = "proc p { step; } proc p { turnL; } main { call p; }";
    assert_eq!(run_ok(src, &mut agent), vec!["turnL"]);
}

#[test]
fn test_procedure_table_after_run() {
    let mut agent = Recorder::default();
    let mut out = Vec::new();
    let mut interp = Interpreter::new(
        SourceCursor::new("t", "proc b { } proc a { } main { }"),
        &mut agent,
        &mut out,
    );
    interp.run().unwrap();
    assert_eq!(interp.procedures().names(), vec!["a", "b"]);
}

#[test]
fn test_call_requires_semicolon() {
    let err = run_err("proc p { } main { call p }");
    assert_eq!(err.code, ErrorCode::UNEXPECTED_TOKEN);
    assert_eq!(err.message, "expected ';' but found '}'");
}

// ─────────────────────────────────────────────────────────────────────
// Directives
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_init_grid_and_gems() {
    let mut agent = Recorder::default();
    let src = r#"main { init grid "maze one"; init grid maze2; init gems 7; }"#;
    assert_eq!(
        run_ok(src, &mut agent),
        vec!["grid maze one", "grid maze2", "gems 7"]
    );
}

#[test]
fn test_print_goes_to_output_not_agent() {
    let mut agent = Recorder::default();
    let (result, out) = run_with(r#"main { print "hello"; print "a\tb"; step; }"#, &mut agent);
    result.unwrap();
    assert_eq!(out, "hello\na\tb\n");
    assert_eq!(agent.commands(), vec!["step"]);
}

#[test]
fn test_print_inside_loop() {
    let mut agent = Recorder::default();
    let (result, out) = run_with(r#"main { do 3 print "x"; }"#, &mut agent);
    result.unwrap();
    assert_eq!(out, "x\nx\nx\n");
}

// ─────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_missing_closing_brace_is_end_of_input() {
    let err = run_err("main { step;");
    assert_eq!(err.code, ErrorCode::UNEXPECTED_EOF);
}

#[test]
fn test_missing_closing_brace_in_proc_is_end_of_input() {
    let err = run_err("proc p { step; main { }");
    assert_eq!(err.code, ErrorCode::UNEXPECTED_EOF);
}

#[test]
fn test_missing_main() {
    assert_eq!(run_err("").code, ErrorCode::UNEXPECTED_EOF);
    assert_eq!(run_err("proc p { }").code, ErrorCode::UNEXPECTED_EOF);
    let err = run_err("start { }");
    assert_eq!(err.code, ErrorCode::UNEXPECTED_TOKEN);
    assert_eq!(err.message, "expected 'main' but found 'start'");
}

#[test]
fn test_unknown_instruction() {
    let err = run_err("main { jump; }");
    assert_eq!(err.code, ErrorCode::UNKNOWN_INSTRUCTION);
    assert!(err.message.contains("jump"));
}

#[test]
fn test_unknown_test() {
    let err = run_err("main { if sky step; }");
    assert_eq!(err.code, ErrorCode::UNKNOWN_TEST);
}

#[test]
fn test_unknown_init_target() {
    let err = run_err("main { init robot 3; }");
    assert_eq!(err.code, ErrorCode::UNKNOWN_INIT_TARGET);
}

#[test]
fn test_bad_integer() {
    assert_eq!(run_err("main { do x step; }").code, ErrorCode::BAD_INTEGER);
    assert_eq!(run_err("main { do -1 step; }").code, ErrorCode::BAD_INTEGER);
    assert_eq!(
        run_err("main { do 99999999999 step; }").code,
        ErrorCode::BAD_INTEGER
    );
}

#[test]
fn test_bad_name() {
    assert_eq!(run_err("proc p2 { } main { }").code, ErrorCode::BAD_NAME);
    assert_eq!(run_err("main { call \"p\"; }").code, ErrorCode::BAD_NAME);
}

#[test]
fn test_print_needs_a_string() {
    let err = run_err("main { print hello; }");
    assert_eq!(err.code, ErrorCode::BAD_STRING);
}

#[test]
fn test_error_location_points_at_token() {
    let err = run_err("main {\n  step;\n  jump;\n}");
    let loc = err.location.expect("error should be located");
    assert_eq!((loc.line, loc.column), (3, 3));
    assert_eq!(err.source_line.as_deref(), Some("  jump;"));
}

#[test]
fn test_agent_error_is_annotated_with_location() {
    let mut agent = Recorder::failing_on("step");
    let (result, _) = run_with("main {\n  turnL;\n    step;\n}", &mut agent);
    let err = result.unwrap_err();
    assert_eq!(err.code, ErrorCode::COMMAND_FAILED);
    let loc = err.location.expect("agent error should be located");
    assert_eq!((loc.line, loc.column), (3, 5));
}

#[test]
fn test_agent_error_stops_run_without_stop() {
    let mut agent = Recorder::failing_on("take");
    let (result, _) = run_with("main { step; take; step; }", &mut agent);
    assert!(result.is_err());
    assert_eq!(agent.log, vec!["step"]);
}

// ─────────────────────────────────────────────────────────────────────
// Properties
// ─────────────────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn do_runs_body_exactly_n_times(n in 0u32..40) {
        let mut agent = Recorder::default();
        let src = format!("main {{ do {n} {{ step; }} turnL; }}");
        let log = run_ok(&src, &mut agent);
        prop_assert_eq!(log.len(), n as usize + 1);
        prop_assert_eq!(log.iter().filter(|c| *c == "step").count(), n as usize);
    }
}
