use std::{fmt, path::Path};

use crate::{
    automaton::Dfa,
    conf::{is_comment_or_blank, parse_conf},
    error::{ConfError, DfaError},
    simulator::Verdict,
};

/// One report row: the trimmed input line and its verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluation<'a> {
    pub text: &'a str,
    pub verdict: Verdict,
}

impl fmt::Display for Evaluation<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.text, self.verdict)
    }
}

/// Trimmed input lines, skipping blank lines and `#` comments.
pub fn candidate_lines(inputs: &str) -> impl Iterator<Item = &str> {
    inputs
        .lines()
        .map(str::trim)
        .filter(|line| !is_comment_or_blank(line))
}

/// Evaluates every candidate line in input order.
pub fn evaluate_batch<'a>(dfa: &Dfa, inputs: &'a str) -> Vec<Evaluation<'a>> {
    candidate_lines(inputs)
        .map(|text| {
            let verdict = Verdict::from(dfa.accepts(text));
            log::debug!("{:?} -> {}", text, verdict);
            Evaluation { text, verdict }
        })
        .collect()
}

pub fn read_inputs(path: &Path) -> Result<String, DfaError> {
    std::fs::read_to_string(path).map_err(|source| DfaError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Builds the automaton and renders the full report, one row per line.
pub fn render_report(definition: &str, inputs: &str) -> Result<String, ConfError> {
    let dfa = parse_conf(definition)?;
    Ok(evaluate_batch(&dfa, inputs)
        .iter()
        .map(|e| format!("{}\n", e))
        .collect())
}

#[cfg(test)]
const SCENARIO: &str = "states: A,B\nalphabet: 0,1\nstart: A\naccept: B\ntransitions:\nA,1->B\n";

#[test]
fn test_candidate_lines() {
    let lines: Vec<&str> = candidate_lines("1\n\n# comment\n   \n  0 1 \r\n  # indented\n").collect();
    assert_eq!(lines, vec!["1", "0 1"]);
}

#[test]
fn test_evaluate_batch_keeps_order() {
    let dfa = parse_conf(SCENARIO).unwrap();
    let rows = evaluate_batch(&dfa, "1\n0\n11\n 1 \n");
    let verdicts: Vec<Verdict> = rows.iter().map(|e| e.verdict).collect();
    assert_eq!(
        verdicts,
        vec![
            Verdict::Accepted,
            Verdict::Rejected,
            Verdict::Rejected,
            Verdict::Accepted
        ]
    );
    assert_eq!(rows[3].text, "1");
}

#[test]
fn test_render_report() {
    let report = render_report(SCENARIO, "# header\n1\n\n0\n11\n2\n").unwrap();
    assert_eq!(
        report,
        "1: ACCEPTED\n0: REJECTED\n11: REJECTED\n2: REJECTED\n"
    );
}

#[test]
fn test_render_report_skips_comments_and_blanks() {
    assert_eq!(render_report(SCENARIO, "# comment\n\n").unwrap(), "");
}

#[test]
fn test_render_report_build_error() {
    let err = render_report("states: A\nalphabet: 0\n", "0\n").unwrap_err();
    assert!(err.to_string().contains("incomplete configuration"));
}
