use std::fs;
use std::path::Path;
use std::process::Command;

use serde_json::Value;
use tempfile::tempdir;

const CAPTIONS: &str = r#"[
  {
    "text": " hi there",
    "startMs": 1000,
    "durationMs": 900,
    "tokens": [
      { "text": " hi", "fromMs": 1000, "toMs": 1500 },
      { "text": " there", "fromMs": 1500, "toMs": 1900 }
    ]
  },
  {
    "text": " second page",
    "startMs": 1900,
    "tokens": [
      { "text": " second", "fromMs": 1900, "toMs": 2300 },
      { "text": " page", "fromMs": 2400, "toMs": 2800 }
    ]
  }
]"#;

fn write_overlay(dir: &Path, template: &str) {
    fs::write(dir.join("captions.json"), CAPTIONS).expect("captions should write");
    fs::write(
        dir.join("overlay.cfx"),
        format!(
            r#"
environment:
  resolution: {{ width: 1080, height: 1920 }}
  fps: 30
template: {template}
captions: captions.json
"#
        ),
    )
    .expect("manifest should write");
}

fn run_captionfx(cwd: &Path, args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_captionfx"))
        .current_dir(cwd)
        .args(args)
        .output()
        .expect("captionfx command should run")
}

fn word_spans(node: &Value, out: &mut Vec<Value>) {
    if node["key"].is_string() {
        out.push(node.clone());
    }
    if let Some(children) = node["children"].as_array() {
        for child in children {
            word_spans(child, out);
        }
    }
}

#[test]
fn check_reports_pages_and_template() {
    let dir = tempdir().expect("tempdir should create");
    write_overlay(dir.path(), "bottom_karaoke");

    let output = run_captionfx(dir.path(), &["check", "overlay.cfx"]);
    assert!(output.status.success(), "check should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("1080x1920, 30 fps"), "{stdout}");
    assert!(stdout.contains("Template: bottom_karaoke"), "{stdout}");
    assert!(stdout.contains("Pages: 2 (4 tokens)"), "{stdout}");
}

#[test]
fn check_reports_template_fallback() {
    let dir = tempdir().expect("tempdir should create");
    write_overlay(dir.path(), "neon_wave");

    let output = run_captionfx(dir.path(), &["check", "overlay.cfx"]);
    assert!(output.status.success(), "unknown template is not an error");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("Template: tiktok (fallback from 'neon_wave')"),
        "{stdout}"
    );
}

#[test]
fn check_fails_for_missing_captions() {
    let dir = tempdir().expect("tempdir should create");
    fs::write(
        dir.path().join("overlay.cfx"),
        "environment:\n  resolution: { width: 64, height: 64 }\n  fps: 24\ncaptions: nope.json\n",
    )
    .expect("manifest should write");

    let output = run_captionfx(dir.path(), &["check", "overlay.cfx"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("captions does not exist"), "{stderr}");
}

#[test]
fn version_reports_build_hash() {
    let dir = tempdir().expect("tempdir should create");
    let output = run_captionfx(dir.path(), &["--version"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let expected = format!("captionfx {} (", env!("CARGO_PKG_VERSION"));
    assert!(stdout.starts_with(&expected), "{stdout}");
    assert!(stdout.trim_end().ends_with(')'), "{stdout}");
}

#[test]
fn templates_lists_every_identifier() {
    let dir = tempdir().expect("tempdir should create");
    let output = run_captionfx(dir.path(), &["templates"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for id in ["tiktok", "bottom_karaoke", "bottom_bar", "tiktok_story"] {
        assert!(stdout.contains(id), "missing {id} in {stdout}");
    }
    assert!(stdout.contains("(default)"));
}

#[test]
fn frame_json_highlights_the_spoken_word() {
    let dir = tempdir().expect("tempdir should create");
    write_overlay(dir.path(), "tiktok");

    // Frame 18 at 30 fps is 600ms into the first page: " there" is spoken.
    let output = run_captionfx(
        dir.path(),
        &["frame", "overlay.cfx", "--page", "0", "--frame", "18"],
    );
    assert!(output.status.success(), "frame should succeed");

    let parsed: Value = serde_json::from_slice(&output.stdout).expect("json should parse");
    assert_eq!(parsed["active_token"], 1);
    assert_eq!(parsed["template"], "tiktok");
    assert_eq!(parsed["enter_progress"], 1.0);

    let mut spans = Vec::new();
    word_spans(&parsed["tree"], &mut spans);
    let colors = spans
        .iter()
        .map(|span| span["style"]["color"].as_str().unwrap_or_default().to_owned())
        .collect::<Vec<_>>();
    assert_eq!(colors, vec!["#FFFFFF", "#39E508"]);
}

#[test]
fn frame_template_flag_overrides_manifest() {
    let dir = tempdir().expect("tempdir should create");
    write_overlay(dir.path(), "tiktok");

    let output = run_captionfx(
        dir.path(),
        &[
            "frame",
            "overlay.cfx",
            "--frame",
            "3",
            "--template",
            "bottom_karaoke",
        ],
    );
    assert!(output.status.success());
    let parsed: Value = serde_json::from_slice(&output.stdout).expect("json should parse");
    assert_eq!(parsed["template"], "bottom_karaoke");

    assert_eq!(parsed["tree"]["style"]["width"], 1080.0);
    assert_eq!(parsed["tree"]["style"]["height"], 1920.0);

    let fragment = &parsed["tree"]["children"][0];
    assert_eq!(fragment["kind"], "fragment");
    assert_eq!(fragment["children"].as_array().map(Vec::len), Some(2));
}

#[test]
fn frame_rejects_out_of_range_page() {
    let dir = tempdir().expect("tempdir should create");
    write_overlay(dir.path(), "tiktok");

    let output = run_captionfx(dir.path(), &["frame", "overlay.cfx", "--page", "7"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("page 7 out of range"), "{stderr}");
}

#[test]
fn sample_writes_one_line_per_frame() {
    let dir = tempdir().expect("tempdir should create");
    write_overlay(dir.path(), "tiktok_story");

    let output = run_captionfx(
        dir.path(),
        &[
            "--quiet",
            "sample",
            "overlay.cfx",
            "--page",
            "1",
            "-o",
            "page1.jsonl",
        ],
    );
    assert!(output.status.success(), "sample should succeed");
    assert!(String::from_utf8_lossy(&output.stdout).contains("Wrote page1.jsonl"));
    assert!(!String::from_utf8_lossy(&output.stderr).contains("sampled frame"));

    let written = fs::read_to_string(dir.path().join("page1.jsonl")).expect("output should exist");
    let lines = written.lines().collect::<Vec<_>>();
    // Page 1 spans 1900..2800ms: 900ms at 30 fps.
    assert_eq!(lines.len(), 27);

    let samples = lines
        .iter()
        .map(|line| serde_json::from_str::<Value>(line).expect("line should parse"))
        .collect::<Vec<_>>();
    for (index, sample) in samples.iter().enumerate() {
        assert_eq!(sample["frame"], index as u64);
        let progress = sample["enter_progress"].as_f64().expect("progress");
        assert!((0.0..=1.0).contains(&progress));
    }
    // 450ms falls in the gap between " second" and " page".
    assert_eq!(samples[0]["active_token"], 0);
    assert!(samples[13]["active_token"].is_null());
    assert_eq!(samples[16]["active_token"], 1);
}

#[test]
fn fit_lists_both_sizes_for_composite() {
    let dir = tempdir().expect("tempdir should create");
    write_overlay(dir.path(), "bottom_karaoke");

    let output = run_captionfx(dir.path(), &["fit", "overlay.cfx"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("page 0: tiktok=120.0px bottom_bar=82.0px"), "{stdout}");
    assert!(stdout.contains("page 1:"), "{stdout}");
}
