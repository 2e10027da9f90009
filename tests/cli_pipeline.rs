use std::fs;
use std::path::Path;
use std::process::Command;

use serde_json::Value;
use tempfile::tempdir;

fn cli() -> Command {
    Command::new(env!("CARGO_BIN_EXE_fruit_cli"))
}

fn write_tone(path: &Path, frequency: f32, seconds: f32) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 22_050,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    let total = (22_050.0 * seconds) as usize;
    for i in 0..total {
        let t = i as f32 / 22_050.0;
        let sample = 0.5 * (2.0 * std::f32::consts::PI * frequency * t).sin();
        writer.write_sample((sample * i16::MAX as f32) as i16).unwrap();
    }
    writer.finalize().unwrap();
}

/// 5 clips per class, each class a distinct pitch
fn write_corpus(dir: &Path) {
    for (class, base) in [("apple", 200.0), ("banana", 700.0), ("orange", 1_800.0), ("pear", 4_000.0)] {
        for take in 0..5 {
            let frequency = base * (1.0 + take as f32 * 0.01);
            let seconds = 0.5 + take as f32 * 0.1;
            write_tone(&dir.join(format!("{}_{}.wav", class, take)), frequency, seconds);
        }
    }
}

#[test]
fn list_classes_prints_defaults() {
    let output = cli()
        .arg("list-classes")
        .output()
        .expect("failed to run fruit_cli list-classes");
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("stdout UTF-8");
    assert_eq!(
        stdout.lines().collect::<Vec<_>>(),
        vec!["0\tapple", "1\tbanana", "2\torange", "3\tpear"]
    );
}

#[test]
fn extract_evaluate_predict_roundtrip() {
    let dir = tempdir().unwrap();
    let audio = dir.path().join("audio");
    fs::create_dir(&audio).unwrap();
    write_corpus(&audio);
    let cache = dir.path().join("features.json");

    let output = cli()
        .args(["extract", "--audio-dir"])
        .arg(&audio)
        .arg("--output")
        .arg(&cache)
        .args(["--workers", "2"])
        .output()
        .expect("failed to run fruit_cli extract");
    assert!(
        output.status.success(),
        "extract exited with {:?}: {}",
        output.status.code(),
        String::from_utf8_lossy(&output.stderr)
    );
    let summary: Value = serde_json::from_slice(&output.stdout).expect("extract summary JSON");
    assert_eq!(summary["samples"], 20);
    assert_eq!(summary["feature_count"], 36);
    assert!(cache.exists());

    let output = cli()
        .arg("evaluate")
        .arg("--features")
        .arg(&cache)
        .args(["--k", "1,3", "--folds", "4"])
        .output()
        .expect("failed to run fruit_cli evaluate");
    assert!(
        output.status.success(),
        "evaluate exited with {:?}: {}",
        output.status.code(),
        String::from_utf8_lossy(&output.stderr)
    );
    let report: Value = serde_json::from_slice(&output.stdout).expect("evaluation JSON");
    assert_eq!(report["split"]["test_counts"], serde_json::json!([1, 1, 1, 1]));
    assert_eq!(report["sweep"]["accuracies"].as_array().map(Vec::len), Some(2));
    assert_eq!(
        report["cross_validation"]["fold_accuracies"]
            .as_array()
            .map(Vec::len),
        Some(4)
    );
    let accuracy = report["report"]["accuracy"].as_f64().unwrap_or(-1.0);
    assert!((0.0..=1.0).contains(&accuracy));

    let query = dir.path().join("orange_query.wav");
    write_tone(&query, 1_810.0, 0.6);
    let output = cli()
        .arg("predict")
        .arg("--features")
        .arg(&cache)
        .arg("--audio")
        .arg(&query)
        .args(["--k", "1"])
        .output()
        .expect("failed to run fruit_cli predict");
    assert!(output.status.success());
    let prediction: Value = serde_json::from_slice(&output.stdout).expect("prediction JSON");
    assert_eq!(prediction["class_name"], "orange");
    assert_eq!(prediction["filename_guess"], "orange");
}

#[test]
fn extract_without_input_fails() {
    let dir = tempdir().unwrap();
    let output = cli()
        .arg("extract")
        .arg("--output")
        .arg(dir.path().join("features.json"))
        .output()
        .expect("failed to run fruit_cli extract");
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn evaluate_missing_cache_fails() {
    let output = cli()
        .args(["evaluate", "--features", "/nonexistent/features.json"])
        .output()
        .expect("failed to run fruit_cli evaluate");
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).expect("stderr UTF-8");
    assert!(stderr.contains("loading"), "unexpected stderr: {stderr}");
}
