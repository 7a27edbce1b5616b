//! Reads the automaton definition format.
//!
//! ```text
//! # comment
//! states: A, B
//! alphabet: 0, 1
//! start: A
//! accept: B
//! transitions:
//! A,1->B
//! ```
//!
//! Header lines may come in any order, but every name must be declared
//! before it is referenced. `transitions:` switches to transition mode for
//! the rest of the text.

use std::{path::Path, sync::LazyLock};

use itertools::Itertools;
use nom::{
    bytes::complete::{tag, take_until},
    sequence::terminated,
    IResult,
};
use regex::Regex;

use crate::{
    automaton::{single_char, Dfa, DfaBuilder},
    error::{BuildError, ConfError, DfaError},
};

static HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(states|alphabet|start|accept|transitions):[:\s]*(.*)$")
        .expect("header pattern is valid")
});

pub fn is_comment_or_blank(line: &str) -> bool {
    let line = line.trim_start();
    line.is_empty() || line.starts_with('#')
}

fn csv(values: &str) -> impl Iterator<Item = &str> {
    values.split(',').map(str::trim).filter(|t| !t.is_empty())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Header {
    States,
    Alphabet,
    Start,
    Accept,
    Transitions,
}

fn parse_header(line: &str) -> Option<(Header, &str)> {
    let caps = HEADER_RE.captures(line)?;
    let header = match caps.get(1)?.as_str().to_ascii_lowercase().as_str() {
        "states" => Header::States,
        "alphabet" => Header::Alphabet,
        "start" => Header::Start,
        "accept" => Header::Accept,
        "transitions" => Header::Transitions,
        _ => return None,
    };
    Some((header, caps.get(2).map_or("", |m| m.as_str()).trim()))
}

#[derive(Debug, PartialEq, Eq)]
struct TransitionLine<'a> {
    from: &'a str,
    symbol: char,
    to: &'a str,
}

fn before_arrow(line: &str) -> IResult<&str, &str> {
    terminated(take_until("->"), tag("->"))(line)
}

fn before_comma(left: &str) -> IResult<&str, &str> {
    terminated(take_until(","), tag(","))(left)
}

fn parse_transition(line: &str) -> Result<TransitionLine<'_>, BuildError> {
    let (to, left) = before_arrow(line).map_err(|_| BuildError::MissingArrow)?;
    let (symbol, from) = before_comma(left).map_err(|_| BuildError::MissingComma)?;
    Ok(TransitionLine {
        from: from.trim(),
        symbol: single_char(symbol.trim())?,
        to: to.trim(),
    })
}

fn apply_header(
    builder: &mut DfaBuilder,
    header: Header,
    value: &str,
) -> Result<(), BuildError> {
    match header {
        Header::States => {
            for name in csv(value) {
                builder.add_state(name);
            }
        }
        Header::Alphabet => {
            for token in csv(value) {
                builder.add_symbol(token)?;
            }
        }
        Header::Start => {
            if let Some(previous) = builder.set_start(value)? {
                log::warn!(
                    "start state redefined: '{}' replaces '{}'",
                    value,
                    builder.state_name(previous)
                );
            }
        }
        Header::Accept => {
            for name in csv(value) {
                builder.add_accept(name)?;
            }
        }
        Header::Transitions => {}
    }
    Ok(())
}

/// Builds an automaton from definition text.
pub fn parse_conf(text: &str) -> Result<Dfa, ConfError> {
    let mut builder = DfaBuilder::new();
    let mut in_transitions = false;

    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if is_comment_or_blank(line) {
            continue;
        }
        let at_line = |kind: BuildError| ConfError::AtLine {
            line: idx + 1,
            text: line.to_string(),
            kind,
        };

        if in_transitions {
            let t = parse_transition(line).map_err(at_line)?;
            if let Some(previous) = builder
                .add_transition(t.from, t.symbol, t.to)
                .map_err(at_line)?
            {
                log::debug!(
                    "line {}: {},{} now goes to {} instead of {}",
                    idx + 1,
                    t.from,
                    t.symbol,
                    t.to,
                    builder.state_name(previous)
                );
            }
            continue;
        }

        let (header, value) =
            parse_header(line).ok_or_else(|| at_line(BuildError::UnrecognizedLine))?;
        if header == Header::Transitions {
            in_transitions = true;
            continue;
        }
        apply_header(&mut builder, header, value).map_err(at_line)?;
    }

    let dfa = builder.build()?;
    log::debug!(
        "built automaton: {} states, alphabet {{{}}}, {} transitions",
        dfa.state_count(),
        dfa.alphabet().iter().join(","),
        dfa.transitions().len()
    );
    let unreachable = dfa.unreachable_states();
    if !unreachable.is_empty() {
        log::info!(
            "states unreachable from '{}': {}",
            dfa.state_name(dfa.start()),
            unreachable.iter().map(|&s| dfa.state_name(s)).join(", ")
        );
    }
    if dfa.accepting_states().next().is_none() {
        log::info!("no accepting states: every input will be rejected");
    }
    Ok(dfa)
}

/// Reads and builds the automaton stored at `path`.
pub fn load_conf(path: &Path) -> Result<Dfa, DfaError> {
    let text = std::fs::read_to_string(path).map_err(|source| DfaError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    log::debug!("loading automaton from {}", path.display());
    parse_conf(&text).map_err(|source| DfaError::Conf {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
const SCENARIO: &str = "states: A,B
alphabet: 0,1
start: A
accept: B
transitions:
A,1->B
";

#[test]
fn test_parse_scenario() {
    let dfa = parse_conf(SCENARIO).unwrap();
    let a = dfa.state_id("A").unwrap();
    let b = dfa.state_id("B").unwrap();
    assert_eq!(dfa.start(), a);
    assert_eq!(dfa.alphabet(), &['0', '1']);
    assert!(dfa.is_accepting(b));
    assert!(!dfa.is_accepting(a));
    assert_eq!(dfa.next_state(a, '1'), Some(b));
    assert_eq!(dfa.next_state(b, '1'), None);
}

#[test]
fn test_headers_case_insensitive_with_comments() {
    let text = "
# a comment
STATES: q0 , q1
   # indented comment
Alphabet:a,b

Start:   q0
aCCept: q1
Transitions:
# inside transitions
q0 , a -> q1

q1,b->q0
";
    let dfa = parse_conf(text).unwrap();
    let q0 = dfa.state_id("q0").unwrap();
    let q1 = dfa.state_id("q1").unwrap();
    assert_eq!(dfa.next_state(q0, 'a'), Some(q1));
    assert_eq!(dfa.next_state(q1, 'b'), Some(q0));
}

#[test]
fn test_duplicates_are_ignored() {
    let dfa = parse_conf("states: A,A,B,,A\nalphabet: 0,0,1\nstart: A\n").unwrap();
    assert_eq!(dfa.state_count(), 2);
    assert_eq!(dfa.alphabet(), &['0', '1']);
}

#[test]
fn test_accept_is_cumulative() {
    let dfa = parse_conf("states: A,B,C\nalphabet: x\nstart: A\naccept: B\naccept: C\n").unwrap();
    let names: Vec<&str> = dfa.accepting_states().map(|s| dfa.state_name(s)).collect();
    assert_eq!(names, vec!["B", "C"]);
}

#[test]
fn test_last_start_wins() {
    let dfa = parse_conf("states: A,B\nalphabet: x\nstart: A\nstart: B\n").unwrap();
    assert_eq!(dfa.state_name(dfa.start()), "B");
}

#[test]
fn test_no_accepting_states_is_legal() {
    let dfa = parse_conf("states: A\nalphabet: x\nstart: A\n").unwrap();
    assert_eq!(dfa.accepting_states().count(), 0);
}

#[test]
fn test_missing_start() {
    let err = parse_conf("states: A,B\nalphabet: 0,1\naccept: B\ntransitions:\nA,1->B\n").unwrap_err();
    assert_eq!(err, ConfError::Build(BuildError::Incomplete("start".to_string())));
    assert!(err.to_string().contains("incomplete configuration"));
}

#[test]
fn test_missing_arrow() {
    let err = parse_conf("states: A,B\nalphabet: 0,1\nstart: A\ntransitions:\nA,1,B\n").unwrap_err();
    assert_eq!(err.kind(), &BuildError::MissingArrow);
    assert_eq!(err.line(), Some(5));
    assert!(err.to_string().contains("missing arrow"));
}

#[test]
fn test_missing_comma() {
    let err = parse_conf("states: A,B\nalphabet: 0,1\nstart: A\ntransitions:\nA 1->B\n").unwrap_err();
    assert_eq!(err.kind(), &BuildError::MissingComma);
}

#[test]
fn test_comma_after_arrow_does_not_count() {
    let err = parse_conf("states: A,B\nalphabet: 0,1\nstart: A\ntransitions:\nA->B,1\n").unwrap_err();
    assert_eq!(err.kind(), &BuildError::MissingComma);
}

#[test]
fn test_transition_symbol_length() {
    let err = parse_conf("states: A,B\nalphabet: 0,1\nstart: A\ntransitions:\nA,10->B\n").unwrap_err();
    assert_eq!(err.kind(), &BuildError::SymbolLength("10".to_string()));
    let err = parse_conf("states: A,B\nalphabet: 0,1\nstart: A\ntransitions:\nA, ->B\n").unwrap_err();
    assert_eq!(err.kind(), &BuildError::SymbolLength(String::new()));
}

#[test]
fn test_alphabet_symbol_length() {
    let err = parse_conf("states: A\nalphabet: 0,ab\n").unwrap_err();
    assert_eq!(err.kind(), &BuildError::SymbolLength("ab".to_string()));
    assert_eq!(err.line(), Some(2));
}

#[test]
fn test_unknown_references() {
    let err = parse_conf("states: A\nalphabet: 0\nstart: B\n").unwrap_err();
    assert_eq!(err.kind(), &BuildError::UnknownStartState("B".to_string()));

    let err = parse_conf("states: A\nalphabet: 0\naccept: A, Z\n").unwrap_err();
    assert_eq!(err.kind(), &BuildError::UnknownAcceptState("Z".to_string()));

    // accept before states is a forward reference
    let err = parse_conf("accept: A\nstates: A\n").unwrap_err();
    assert_eq!(err.kind(), &BuildError::UnknownAcceptState("A".to_string()));

    let err = parse_conf("states: A,B\nalphabet: 0\nstart: A\ntransitions:\nA,1->C\n").unwrap_err();
    assert_eq!(
        err.kind(),
        &BuildError::UnknownReference {
            from: "A".to_string(),
            symbol: '1',
            to: "C".to_string()
        }
    );
    assert!(err.to_string().contains("A,1->C"));
}

#[test]
fn test_unrecognized_line() {
    let err = parse_conf("states: A\n\nfinal: A\n").unwrap_err();
    assert_eq!(err.kind(), &BuildError::UnrecognizedLine);
    assert_eq!(err.line(), Some(3));
    assert!(err.to_string().contains("final: A"));
}

#[test]
fn test_headers_are_not_recognized_after_transitions() {
    let err = parse_conf("states: A\nalphabet: 0\ntransitions:\nstart: A\n").unwrap_err();
    assert_eq!(err.kind(), &BuildError::MissingArrow);
}

#[test]
fn test_transition_overwrite_in_text() {
    let dfa = parse_conf("states: A,B,C\nalphabet: 1\nstart: A\ntransitions:\nA,1->B\nA,1->C\n").unwrap();
    let a = dfa.state_id("A").unwrap();
    assert_eq!(dfa.next_state(a, '1'), dfa.state_id("C"));
}

#[test]
fn test_parse_header() {
    assert_eq!(parse_header("states: A, B"), Some((Header::States, "A, B")));
    assert_eq!(parse_header("START::  A  "), Some((Header::Start, "A")));
    assert_eq!(parse_header("transitions:"), Some((Header::Transitions, "")));
    assert_eq!(parse_header("states A"), None);
    assert_eq!(parse_header("xstates: A"), None);
}

#[test]
fn test_parse_transition_line() {
    assert_eq!(
        parse_transition(" q0 , a -> q1 "),
        Ok(TransitionLine {
            from: "q0",
            symbol: 'a',
            to: "q1"
        })
    );
    assert_eq!(parse_transition("A,1,B"), Err(BuildError::MissingArrow));
    assert_eq!(parse_transition("A1->B"), Err(BuildError::MissingComma));
}

#[test]
fn test_load_conf_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Conf.txt");
    let err = load_conf(&path).unwrap_err();
    assert!(matches!(err, DfaError::Io { .. }));
    assert!(err.to_string().contains("Conf.txt"));

    std::fs::write(&path, SCENARIO).unwrap();
    assert_eq!(load_conf(&path).unwrap().state_count(), 2);
}
