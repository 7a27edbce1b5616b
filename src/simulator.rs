use std::fmt;

use itertools::Itertools;

use crate::automaton::{Dfa, StateId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    Accepted,
    Rejected,
}

impl Verdict {
    pub fn is_accepted(self) -> bool {
        self == Verdict::Accepted
    }
}

impl From<bool> for Verdict {
    fn from(accepted: bool) -> Verdict {
        if accepted {
            Verdict::Accepted
        } else {
            Verdict::Rejected
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Accepted => f.write_str("ACCEPTED"),
            Verdict::Rejected => f.write_str("REJECTED"),
        }
    }
}

/// Why a run stopped. `position` is a char index into the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Halt {
    Completed,
    UnknownSymbol {
        position: usize,
        symbol: char,
    },
    NoTransition {
        position: usize,
        state: StateId,
        symbol: char,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    /// Visited states paired with the symbol that led there. The start
    /// state comes first, with no symbol.
    pub path: Vec<(StateId, Option<char>)>,
    pub halt: Halt,
    pub verdict: Verdict,
}

impl Run {
    pub fn last_state(&self) -> StateId {
        self.path[self.path.len() - 1].0
    }

    /// Renders the path as `A -1-> B -0-> C`.
    pub fn describe(&self, dfa: &Dfa) -> String {
        self.path
            .iter()
            .map(|(state, symbol)| match symbol {
                Some(c) => format!("-{}-> {}", c, dfa.state_name(*state)),
                None => dfa.state_name(*state).to_string(),
            })
            .join(" ")
    }

    pub fn describe_halt(&self, dfa: &Dfa) -> String {
        match self.halt {
            Halt::Completed if self.verdict.is_accepted() => {
                format!("ended in accepting state {}", dfa.state_name(self.last_state()))
            }
            Halt::Completed => format!(
                "ended in non-accepting state {}",
                dfa.state_name(self.last_state())
            ),
            Halt::UnknownSymbol { position, symbol } => {
                format!("symbol '{}' at {} is not in the alphabet", symbol, position)
            }
            Halt::NoTransition {
                position,
                state,
                symbol,
            } => format!(
                "no transition from {} on '{}' at {}",
                dfa.state_name(state),
                symbol,
                position
            ),
        }
    }
}

impl Dfa {
    /// Computes the unique run of `input`.
    ///
    /// Whitespace is skipped, and a line terminator ends the input. A symbol
    /// outside the alphabet or a missing transition rejects immediately.
    pub fn run(&self, input: &str) -> Run {
        let mut path = vec![(self.start(), None)];
        let mut cur = self.start();
        for (position, c) in input.chars().enumerate() {
            if c == '\n' || c == '\r' {
                break;
            }
            if c.is_whitespace() {
                continue;
            }
            if !self.contains_symbol(c) {
                return Run {
                    path,
                    halt: Halt::UnknownSymbol {
                        position,
                        symbol: c,
                    },
                    verdict: Verdict::Rejected,
                };
            }
            match self.next_state(cur, c) {
                Some(next) => {
                    cur = next;
                    path.push((next, Some(c)));
                }
                None => {
                    return Run {
                        path,
                        halt: Halt::NoTransition {
                            position,
                            state: cur,
                            symbol: c,
                        },
                        verdict: Verdict::Rejected,
                    };
                }
            }
        }
        Run {
            path,
            halt: Halt::Completed,
            verdict: self.is_accepting(cur).into(),
        }
    }

    pub fn accepts(&self, input: &str) -> bool {
        self.run(input).verdict.is_accepted()
    }
}

#[cfg(test)]
use rand::Rng;

#[cfg(test)]
use crate::conf::parse_conf;

#[cfg(test)]
fn scenario() -> Dfa {
    parse_conf("states: A,B\nalphabet: 0,1\nstart: A\naccept: B\ntransitions:\nA,1->B\n").unwrap()
}

// even number of 'a', any number of 'b'
#[cfg(test)]
fn even_a() -> Dfa {
    parse_conf(
        "states: E,O\nalphabet: a,b\nstart: E\naccept: E\ntransitions:\nE,a->O\nO,a->E\nE,b->E\nO,b->O\n",
    )
    .unwrap()
}

#[cfg(test)]
fn random_word(rng: &mut impl Rng, symbols: &[char], len: usize) -> String {
    (0..len)
        .map(|_| symbols[rng.gen_range(0..symbols.len())])
        .collect()
}

#[test]
fn test_scenario_runs() {
    let dfa = scenario();
    assert!(dfa.accepts("1"));
    assert!(!dfa.accepts("0"));
    assert!(!dfa.accepts("11"));
    assert_eq!(dfa.run("1").verdict, Verdict::Accepted);
    assert_eq!(dfa.run("0").verdict, Verdict::Rejected);

    let run = dfa.run("11");
    assert_eq!(run.verdict, Verdict::Rejected);
    assert_eq!(
        run.halt,
        Halt::NoTransition {
            position: 1,
            state: dfa.state_id("B").unwrap(),
            symbol: '1'
        }
    );
    assert_eq!(run.describe(&dfa), "A -1-> B");
}

#[test]
fn test_whitespace_is_skipped() {
    let dfa = even_a();
    assert!(dfa.accepts("a a"));
    assert!(dfa.accepts(" a\tb a "));
    assert!(!dfa.accepts("a b"));
}

#[test]
fn test_line_terminator_ends_scan() {
    let dfa = even_a();
    assert!(dfa.accepts("aa\na"));
    assert!(dfa.accepts("aa\r\nzzz"));
    assert_eq!(dfa.run("aa\na").verdict, Verdict::Accepted);
}

#[test]
fn test_unknown_symbol() {
    let dfa = even_a();
    let run = dfa.run("abx");
    assert_eq!(
        run.halt,
        Halt::UnknownSymbol {
            position: 2,
            symbol: 'x'
        }
    );
    assert_eq!(run.verdict, Verdict::Rejected);
    assert_eq!(run.describe(&dfa), "E -a-> O -b-> O");
    assert!(run.describe_halt(&dfa).contains("'x'"));
}

#[test]
fn test_random_words_even_a() {
    let dfa = even_a();
    let mut rng = rand::thread_rng();
    for _ in 0..500 {
        let len = rng.gen_range(0..12);
        let word = random_word(&mut rng, &['a', 'b', ' ', 'c'], len);
        let expected = word.chars().all(|c| c != 'c')
            && word.chars().filter(|&c| c == 'a').count() % 2 == 0;
        assert_eq!(dfa.accepts(&word), expected, "{:?}", word);
    }
}

#[test]
fn test_whitespace_only_inputs_follow_start_state() {
    let accepting_start = even_a();
    let rejecting_start = scenario();
    let mut rng = rand::thread_rng();
    for _ in 0..100 {
        let len = rng.gen_range(0..8);
        let word = random_word(&mut rng, &[' ', '\t', '\u{a0}'], len);
        assert!(accepting_start.accepts(&word));
        assert!(!rejecting_start.accepts(&word));
    }
    assert!(accepting_start.accepts(""));
    assert!(!rejecting_start.accepts(""));
}

#[test]
fn test_out_of_alphabet_always_rejects() {
    let dfa = even_a();
    let mut rng = rand::thread_rng();
    for _ in 0..200 {
        let prefix_len = rng.gen_range(0..6);
        let suffix_len = rng.gen_range(0..6);
        let prefix = random_word(&mut rng, &['a', 'b'], prefix_len);
        let suffix = random_word(&mut rng, &['a', 'b'], suffix_len);
        let word = format!("{}z{}", prefix, suffix);
        assert!(!dfa.accepts(&word), "{:?}", word);
    }
}

#[test]
fn test_build_is_deterministic() {
    let text = "states: S,T,U\nalphabet: x,y\nstart: S\naccept: U\ntransitions:\nS,x->T\nT,y->U\nU,x->S\nT,x->T\n";
    let first = parse_conf(text).unwrap();
    let second = parse_conf(text).unwrap();
    let mut rng = rand::thread_rng();
    for _ in 0..300 {
        let len = rng.gen_range(0..10);
        let word = random_word(&mut rng, &['x', 'y'], len);
        assert_eq!(first.run(&word), second.run(&word), "{:?}", word);
    }
}

#[test]
fn test_duplicate_declarations_do_not_change_behavior() {
    let plain = even_a();
    let noisy = parse_conf(
        "states: E,O,E\nstates: O\nalphabet: a,b,a\nalphabet: b\nstart: E\naccept: E,E\ntransitions:\nE,a->O\nO,a->E\nE,b->E\nO,b->O\n",
    )
    .unwrap();
    let mut rng = rand::thread_rng();
    for _ in 0..300 {
        let len = rng.gen_range(0..10);
        let word = random_word(&mut rng, &['a', 'b'], len);
        assert_eq!(plain.accepts(&word), noisy.accepts(&word), "{:?}", word);
    }
}

#[test]
fn test_later_transition_is_authoritative() {
    let dfa = parse_conf("states: A,B,C\nalphabet: 1\nstart: A\naccept: C\ntransitions:\nA,1->B\nA,1->C\n").unwrap();
    assert!(dfa.accepts("1"));
}

#[test]
fn test_verdict_display() {
    assert_eq!(Verdict::Accepted.to_string(), "ACCEPTED");
    assert_eq!(Verdict::from(false).to_string(), "REJECTED");
}
