use std::{
    fs,
    io::Write,
    path::Path,
    process::{Command, Output, Stdio},
};

use tempfile::TempDir;

const SCENARIO: &str = "# accepts exactly \"1\"
states: A,B
alphabet: 0,1
start: A
accept: B
transitions:
A,1->B
";

fn dfa_sim(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_dfa-sim"))
        .args(args)
        .current_dir(dir)
        .env_remove("DFA_DOT")
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn workspace(conf: &str, inputs: &str) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("conf.txt"), conf).unwrap();
    fs::write(dir.path().join("words.txt"), inputs).unwrap();
    dir
}

#[test]
fn accepts_and_rejects_in_order() {
    let dir = workspace(SCENARIO, "1\n0\n# comment\n\n  11  \n1 \n");
    let out = dfa_sim(dir.path(), &["conf.txt", "words.txt"]);
    assert!(out.status.success());
    assert_eq!(
        String::from_utf8(out.stdout).unwrap(),
        "1: ACCEPTED\n0: REJECTED\n11: REJECTED\n1: ACCEPTED\n"
    );
}

#[test]
fn default_file_names() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("Conf.txt"), SCENARIO).unwrap();
    fs::write(dir.path().join("Cadenas.txt"), "1\n").unwrap();

    let out = dfa_sim(dir.path(), &[]);
    assert!(out.status.success());
    assert_eq!(String::from_utf8(out.stdout).unwrap(), "1: ACCEPTED\n");

    // a single argument falls back to the defaults
    let out = dfa_sim(dir.path(), &["ignored.txt"]);
    assert!(out.status.success());
    assert_eq!(String::from_utf8(out.stdout).unwrap(), "1: ACCEPTED\n");
}

#[test]
fn missing_start_fails_without_output() {
    let dir = workspace("states: A,B\nalphabet: 0,1\naccept: B\n", "1\n");
    let out = dfa_sim(dir.path(), &["conf.txt", "words.txt"]);
    assert!(!out.status.success());
    assert!(out.stdout.is_empty());
    let stderr = String::from_utf8(out.stderr).unwrap();
    assert!(stderr.contains("incomplete configuration"), "{}", stderr);
    assert!(stderr.contains("conf.txt"), "{}", stderr);
}

#[test]
fn missing_arrow_fails_without_output() {
    let conf = "states: A,B\nalphabet: 0,1\nstart: A\ntransitions:\nA,1,B\n";
    let dir = workspace(conf, "1\n");
    let out = dfa_sim(dir.path(), &["conf.txt", "words.txt"]);
    assert!(!out.status.success());
    assert!(out.stdout.is_empty());
    let stderr = String::from_utf8(out.stderr).unwrap();
    assert!(stderr.contains("missing arrow"), "{}", stderr);
    assert!(stderr.contains("line 5"), "{}", stderr);
}

#[test]
fn missing_files_name_the_path() {
    let dir = workspace(SCENARIO, "1\n");
    let out = dfa_sim(dir.path(), &["nope.txt", "words.txt"]);
    assert!(!out.status.success());
    assert!(String::from_utf8(out.stderr).unwrap().contains("nope.txt"));

    let out = dfa_sim(dir.path(), &["conf.txt", "absent.txt"]);
    assert!(!out.status.success());
    assert!(out.stdout.is_empty());
    assert!(String::from_utf8(out.stderr).unwrap().contains("absent.txt"));
}

#[test]
fn writes_dot_when_requested() {
    let dir = workspace(SCENARIO, "1\n");
    let out = Command::new(env!("CARGO_BIN_EXE_dfa-sim"))
        .args(["conf.txt", "words.txt"])
        .current_dir(dir.path())
        .env("DFA_DOT", "dfa.dot")
        .output()
        .unwrap();
    assert!(out.status.success());
    let dot = fs::read_to_string(dir.path().join("dfa.dot")).unwrap();
    assert!(dot.contains("digraph"));
    assert!(dot.contains("doublecircle"));
}

#[test]
fn interactive_prints_traces() {
    let dir = workspace(SCENARIO, "");
    let mut child = Command::new(env!("CARGO_BIN_EXE_interactive"))
        .arg("conf.txt")
        .current_dir(dir.path())
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"1\n# skipped\n10\n")
        .unwrap();
    let out = child.wait_with_output().unwrap();
    assert!(out.status.success());
    let stdout = String::from_utf8(out.stdout).unwrap();
    assert!(stdout.contains("1: ACCEPTED\n  A -1-> B\n"), "{}", stdout);
    assert!(stdout.contains("10: REJECTED"), "{}", stdout);
    assert!(stdout.contains("no transition from B on '0'"), "{}", stdout);
}

#[test]
fn demo_files() {
    let demos = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos");
    let out = dfa_sim(&demos, &["Conf.txt", "Cadenas.txt"]);
    assert!(out.status.success());
    assert_eq!(
        String::from_utf8(out.stdout).unwrap(),
        "0: ACCEPTED\n1: REJECTED\n11: ACCEPTED\n1 0 1: ACCEPTED\n102: REJECTED\n"
    );
}
