use predicates::prelude::*;
use std::fs;
use assert_cmd::Command;
use tempfile::tempdir;

const DOC: &str = r#"[
  {"id":"a","type":"h1","content":[{"text":"Plan"}]},
  {"id":"b","type":"bullet","content":[{"text":"one "},{"text":"two","bold":true}]},
  {"id":"c","type":"bullet","content":"three"}
]"#;

#[test]
#[allow(deprecated)]
fn test_render_html() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("doc.json");
    fs::write(&path, DOC).unwrap();

    let mut cmd = Command::cargo_bin("blockdoc").unwrap();
    cmd.arg("render").arg(&path);
    cmd.assert().success().stdout(predicate::str::contains(
        "<h1>Plan</h1><ul><li>one <b>two</b></li><li>three</li></ul>",
    ));
}

#[test]
#[allow(deprecated)]
fn test_render_text_from_stdin() {
    let mut cmd = Command::cargo_bin("blockdoc").unwrap();
    cmd.arg("render").arg("--format").arg("text").write_stdin(DOC);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Plan\none two\nthree"));
}

#[test]
#[allow(deprecated)]
fn test_normalize_legacy_value() {
    let mut cmd = Command::cargo_bin("blockdoc").unwrap();
    cmd.arg("normalize").write_stdin("just some notes");

    let output = cmd.output().unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json[0]["id"], "legacy");
    assert_eq!(json[0]["type"], "text");
    assert_eq!(json[0]["content"][0]["text"], "just some notes");
}

#[test]
#[allow(deprecated)]
fn test_stats_json() {
    let mut cmd = Command::cargo_bin("blockdoc").unwrap();
    cmd.arg("stats").arg("--json").write_stdin(DOC);

    let output = cmd.output().unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["blocks"], 3);
    assert_eq!(json["words"], 4);
    assert_eq!(json["types"]["bullet"], 2);
}

#[test]
#[allow(deprecated)]
fn test_replay_script() {
    let dir = tempdir().unwrap();
    let script = dir.path().join("script.json");
    fs::write(
        &script,
        r#"[
          {"op": "focus"},
          {"op": "type", "text": "/h1"},
          {"op": "press", "key": "enter"},
          {"op": "type", "text": "Title\nBody text"},
          {"op": "wait", "ms": 1000}
        ]"#,
    )
    .unwrap();

    let mut cmd = Command::cargo_bin("blockdoc").unwrap();
    cmd.arg("replay").arg(&script);

    let output = cmd.output().unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json[0]["type"], "h1");
    assert_eq!(json[0]["content"][0]["text"], "Title");
    assert_eq!(json[1]["type"], "text");
    assert_eq!(json[1]["content"][0]["text"], "Body text");
}

#[test]
#[allow(deprecated)]
fn test_replay_rejects_unknown_key() {
    let dir = tempdir().unwrap();
    let script = dir.path().join("script.json");
    fs::write(&script, r#"[{"op": "focus"}, {"op": "press", "key": "hyper"}]"#).unwrap();

    let mut cmd = Command::cargo_bin("blockdoc").unwrap();
    cmd.arg("replay").arg(&script);
    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("unknown key: hyper"));
}
