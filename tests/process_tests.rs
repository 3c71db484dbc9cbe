//! Process orchestration against real child processes.

#![cfg(unix)]

use repomix_bridge::process::{InvocationSpec, OutputChunk, OutputStream, ProcessRunner, Runner};
use tempfile::TempDir;

fn shell(tmp: &TempDir, script: &str) -> InvocationSpec {
    InvocationSpec::new(
        "fake-tool",
        "sh",
        vec!["-c".to_string(), script.to_string()],
        tmp.path(),
    )
}

#[tokio::test]
async fn exit_zero_resolves_with_chunks_in_order() {
    let tmp = TempDir::new().unwrap();
    let spec = shell(&tmp, "printf 'hello\\n'; sleep 0.1; printf 'world\\n'");

    let mut seen: Vec<OutputChunk> = Vec::new();
    let mut sink = |chunk: &OutputChunk| seen.push(chunk.clone());
    let result = ProcessRunner.run(&spec, &mut sink).await.unwrap();

    assert_eq!(result.exit_code, 0);
    let emitted: String = seen
        .iter()
        .filter(|c| c.stream == OutputStream::Stdout)
        .map(|c| c.text.as_str())
        .collect();
    assert_eq!(emitted, "hello\nworld\n");
    assert_eq!(result.stdout_text(), emitted);
    assert!(result.stderr.is_empty());
}

#[tokio::test]
async fn stderr_chunks_are_tagged() {
    let tmp = TempDir::new().unwrap();
    let spec = shell(&tmp, "echo out; echo err 1>&2");

    let mut seen: Vec<OutputChunk> = Vec::new();
    let mut sink = |chunk: &OutputChunk| seen.push(chunk.clone());
    let result = ProcessRunner.run(&spec, &mut sink).await.unwrap();

    assert_eq!(result.stdout_text(), "out\n");
    assert_eq!(result.stderr_text(), "err\n");
    assert!(seen
        .iter()
        .any(|c| c.stream == OutputStream::Stderr && c.text == "err\n"));
}

#[tokio::test]
async fn output_arrives_before_exit() {
    let tmp = TempDir::new().unwrap();
    let spec = shell(&tmp, "echo first; sleep 0.3; echo second");

    let started = std::time::Instant::now();
    let mut first_at = None;
    let mut sink = |chunk: &OutputChunk| {
        if chunk.text.contains("first") && first_at.is_none() {
            first_at = Some(started.elapsed());
        }
    };
    ProcessRunner.run(&spec, &mut sink).await.unwrap();
    let total = started.elapsed();

    let first_at = first_at.expect("first chunk delivered");
    assert!(
        first_at + std::time::Duration::from_millis(150) < total,
        "first chunk at {first_at:?}, run took {total:?}"
    );
}

#[tokio::test]
async fn runs_in_working_directory() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("marker.txt"), "here").unwrap();
    let spec = shell(&tmp, "cat marker.txt");

    let mut sink = |_: &OutputChunk| {};
    let result = ProcessRunner.run(&spec, &mut sink).await.unwrap();
    assert_eq!(result.stdout_text(), "here");
}

#[tokio::test]
async fn exit_two_is_a_non_zero_exit_failure() {
    let tmp = TempDir::new().unwrap();
    let spec = shell(&tmp, "echo boom 1>&2; exit 2");

    let mut stderr = String::new();
    let mut sink = |chunk: &OutputChunk| {
        if chunk.stream == OutputStream::Stderr {
            stderr.push_str(&chunk.text);
        }
    };
    let err = ProcessRunner.run(&spec, &mut sink).await.unwrap_err();

    assert!(err.is_exit_failure());
    assert!(!err.is_launch_failure());
    assert_eq!(err.to_string(), "fake-tool failed with exit code 2");
    assert_eq!(stderr, "boom\n");
}

#[tokio::test]
async fn missing_executable_is_a_launch_failure() {
    let tmp = TempDir::new().unwrap();
    let spec = InvocationSpec::new(
        "repomix",
        "/definitely/not/a/real/repomix",
        vec!["--include".into(), "a.rs".into()],
        tmp.path(),
    );

    let mut called = false;
    let mut sink = |_: &OutputChunk| called = true;
    let err = ProcessRunner.run(&spec, &mut sink).await.unwrap_err();

    assert!(err.is_launch_failure());
    assert!(!err.is_exit_failure());
    assert!(err.to_string().starts_with("could not execute repomix"));
    assert!(!called);
}

#[tokio::test]
async fn missing_working_directory_is_a_launch_failure() {
    let tmp = TempDir::new().unwrap();
    let spec = InvocationSpec::new(
        "sh",
        "sh",
        vec!["-c".into(), "true".into()],
        &tmp.path().join("gone"),
    );

    let mut sink = |_: &OutputChunk| {};
    let err = ProcessRunner.run(&spec, &mut sink).await.unwrap_err();
    assert!(err.is_launch_failure());
}

#[tokio::test]
async fn killed_process_is_terminated_not_launch_failure() {
    let tmp = TempDir::new().unwrap();
    let spec = shell(&tmp, "kill -9 $$");

    let mut sink = |_: &OutputChunk| {};
    let err = ProcessRunner.run(&spec, &mut sink).await.unwrap_err();
    assert!(err.is_exit_failure());
    assert!(!err.is_launch_failure());
}
