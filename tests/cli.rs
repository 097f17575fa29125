use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

const GOOD_SPEC: &str = "#include \"x.h\"\n\x0c\n[a-z]+ return ID;\n\x0c\ntrailer\n";
const BAD_SPEC: &str = "#include \"x.h\"\n\x0c\n(ab return X;\n\x0c\ntrailer\n";

fn work_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("zircon-cli-{}-{}", std::process::id(), name));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn zircon(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_zircon"))
        .args(args)
        .current_dir(dir)
        .output()
        .unwrap()
}

#[test]
fn writes_scanner_file() {
    let dir = work_dir("good");
    fs::write(dir.join("lex.spec"), GOOD_SPEC).unwrap();

    let output = zircon(&dir, &["lex.spec"]);
    assert!(output.status.success(), "{:?}", output);
    let text = fs::read_to_string(dir.join("zirconyy.c")).unwrap();
    fs::remove_dir_all(&dir).ok();

    assert!(text.starts_with("#line 1 \"lex.spec\"\n#include \"x.h\"\n"));
    assert!(text.ends_with("trailer\n"));
}

#[test]
fn failed_run_leaves_no_output_file() {
    let dir = work_dir("bad");
    fs::write(dir.join("bad.spec"), BAD_SPEC).unwrap();

    let output = zircon(&dir, &["bad.spec"]);
    let exists = dir.join("zirconyy.c").exists();
    fs::remove_dir_all(&dir).ok();

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).starts_with("zircon: "));
    assert!(!exists);
}

#[test]
fn failed_run_to_stdout_prints_nothing() {
    let dir = work_dir("bad-stdout");
    fs::write(dir.join("bad.spec"), BAD_SPEC).unwrap();

    let output = zircon(&dir, &["-t", "bad.spec"]);
    fs::remove_dir_all(&dir).ok();

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
}

#[test]
fn output_errors_name_the_output_file() {
    let dir = work_dir("blocked");
    fs::write(dir.join("lex.spec"), GOOD_SPEC).unwrap();
    fs::create_dir_all(dir.join("zirconyy.c")).unwrap();

    let output = zircon(&dir, &["lex.spec"]);
    fs::remove_dir_all(&dir).ok();

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).starts_with("zircon: zirconyy.c: "));
}

#[test]
fn unknown_flag_is_a_usage_error() {
    let dir = work_dir("usage");
    let output = zircon(&dir, &["-x", "lex.spec"]);
    fs::remove_dir_all(&dir).ok();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Usage:"));
}
