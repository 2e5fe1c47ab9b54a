mod common;

use common::{Sandbox, parse_jsonl, refusal, stdout_text};
use serde_json::Value;

#[test]
fn describe_prints_operator_json() {
    let sandbox = Sandbox::new();
    let output = sandbox.run(&["--describe"]);

    assert_eq!(output.status.code(), Some(0));
    let describe: Value = serde_json::from_slice(&output.stdout).expect("describe JSON");
    assert_eq!(describe["name"], "voicereader");
    assert_eq!(describe["input_formats"], serde_json::json!(["txt", "pdf", "xlsx"]));
}

#[test]
fn missing_command_is_a_refusal_exit() {
    let sandbox = Sandbox::new();
    let output = sandbox.run(&[]);

    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn extract_prints_text_document() {
    let sandbox = Sandbox::new();
    let doc = sandbox.write_doc("notes.txt", "first line\nsecond line\n");

    let output = sandbox.run(&["extract", doc.to_str().expect("doc path")]);

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout_text(&output), "first line\nsecond line\n");
}

#[test]
fn extract_preview_truncates_with_ellipsis() {
    let sandbox = Sandbox::new();
    sandbox.write_config("preview_chars: 10\n");
    let doc = sandbox.write_doc("long.txt", "abcdefghijklmnopqrstuvwxyz");

    let output = sandbox.run(&["extract", doc.to_str().expect("doc path"), "--preview"]);

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout_text(&output), "abcdefghij...\n");
}

#[test]
fn extract_json_reports_format_and_hash() {
    let sandbox = Sandbox::new();
    let doc = sandbox.write_doc("hash.txt", "hash me");

    let output = sandbox.run(&["extract", doc.to_str().expect("doc path"), "--json"]);

    assert_eq!(output.status.code(), Some(0));
    let records = parse_jsonl(&output.stdout);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["format"], "text");
    assert_eq!(records[0]["chars"], 7);
    assert_eq!(records[0]["text"], "hash me");
    assert!(
        records[0]["bytes_hash"]
            .as_str()
            .expect("hash string")
            .starts_with("blake3:")
    );
}

#[test]
fn unsupported_format_is_refused() {
    let sandbox = Sandbox::new();
    let doc = sandbox.write_doc("letter.docx", "binary-ish");

    let output = sandbox.run(&["extract", doc.to_str().expect("doc path")]);

    let envelope = refusal(&output);
    assert_eq!(envelope["version"], "voicereader.v0");
    assert_eq!(envelope["refusal"]["code"], "E_UNSUPPORTED_FORMAT");
}

#[test]
fn missing_file_is_a_read_failure() {
    let sandbox = Sandbox::new();
    let missing = sandbox.docs.path().join("gone.pdf");

    let output = sandbox.run(&["extract", missing.to_str().expect("doc path")]);

    let envelope = refusal(&output);
    assert_eq!(envelope["refusal"]["code"], "E_READ_FAILED");
    assert!(
        envelope["refusal"]["detail"]["error"]
            .as_str()
            .expect("error string")
            .contains("gone.pdf")
    );
}

#[test]
fn invalid_config_is_refused() {
    let sandbox = Sandbox::new();
    sandbox.write_config("rate: 12\n");
    let doc = sandbox.write_doc("a.txt", "text");

    let output = sandbox.run(&["extract", doc.to_str().expect("doc path")]);

    let envelope = refusal(&output);
    assert_eq!(envelope["refusal"]["code"], "E_BAD_CONFIG");
}

#[test]
fn log_command_shows_recorded_activity() {
    let sandbox = Sandbox::new();
    let doc = sandbox.write_doc("logged.txt", "logged text");

    let extract = sandbox.run(&["extract", doc.to_str().expect("doc path")]);
    assert_eq!(extract.status.code(), Some(0));

    let output = sandbox.run(&["log", "--lines", "20"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout_text(&output).contains("document loaded"));
}

#[test]
fn voices_for_command_engine_reports_none() {
    let sandbox = Sandbox::with_command_engine(&["cat"]);

    let output = sandbox.run(&["voices"]);

    assert_eq!(output.status.code(), Some(1));
}
