//! `Emulator::run` against a shell-script emulator.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use stepzk_core::BridgeConfig;
use stepzk_trace::Emulator;

// See the prover tests: serialize script creation and exec to dodge ETXTBSY.
static EXEC_LOCK: Mutex<()> = Mutex::new(());

fn script(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("fake-cm");
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

#[test]
fn merges_stdout_then_stderr_and_keeps_exit_code() {
    let _g = EXEC_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    let dir = tempfile::tempdir().unwrap();
    let exe = script(
        dir.path(),
        "echo \"args: $*\"\necho 'to stderr' >&2\necho 'more stdout'\nexit 2",
    );
    let cfg = BridgeConfig {
        emulator_path: exe,
        emulator_args: vec!["--hash-tree-target=risc0".into()],
        ..BridgeConfig::default()
    };

    let run = Emulator::from_config(&cfg)
        .run(&["--max-mcycle=5".into()])
        .unwrap();

    assert_eq!(run.exit_code, 2);
    assert!(!run.success());
    assert_eq!(
        String::from_utf8(run.log).unwrap(),
        "args: --hash-tree-target=risc0 --max-mcycle=5\nmore stdout\nto stderr\n"
    );
}

#[test]
fn library_paths_reach_the_emulator() {
    let _g = EXEC_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    let dir = tempfile::tempdir().unwrap();
    let exe = script(dir.path(), "printf '%s' \"$LUA_CPATH\"");
    let cfg = BridgeConfig {
        emulator_path: exe,
        library_paths: vec![PathBuf::from("/opt/cm/src")],
        ..BridgeConfig::default()
    };

    let run = Emulator::from_config(&cfg).run(&[]).unwrap();
    assert!(run.success());
    let cpath = String::from_utf8(run.log).unwrap();
    assert!(cpath.starts_with("/opt/cm/src/?.so;;"), "{cpath}");
}

#[test]
fn bare_name_is_launched_from_path() {
    let _g = EXEC_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    let run = Emulator::new("echo")
        .run(&["--max-mcycle=7".into()])
        .unwrap();
    assert!(run.success());
    assert_eq!(String::from_utf8(run.log).unwrap(), "--max-mcycle=7\n");
}
