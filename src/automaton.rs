use std::collections::{HashMap, HashSet, VecDeque};

use itertools::Itertools;

use crate::error::{BuildError, DfaError};

/// Index of a state inside the automaton that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateId(usize);

impl StateId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: StateId,
    pub symbol: char,
    pub to: StateId,
}

/// A validated, immutable deterministic automaton.
///
/// Only [`DfaBuilder::build`] creates one, so a `Dfa` always has at least one
/// state, at least one symbol and a start state.
#[derive(Debug, Clone)]
pub struct Dfa {
    states: Vec<String>,
    state_index: HashMap<String, StateId>,
    alphabet: Vec<char>,
    symbols: HashSet<char>,
    start: StateId,
    accept: HashSet<StateId>,
    transition: HashMap<(StateId, char), StateId>,
}

impl Dfa {
    pub fn start(&self) -> StateId {
        self.start
    }

    pub fn states(&self) -> impl Iterator<Item = StateId> + '_ {
        (0..self.states.len()).map(StateId)
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    pub fn state_name(&self, state: StateId) -> &str {
        &self.states[state.0]
    }

    pub fn state_id(&self, name: &str) -> Option<StateId> {
        self.state_index.get(name).copied()
    }

    /// Symbols in declaration order.
    pub fn alphabet(&self) -> &[char] {
        &self.alphabet
    }

    pub fn contains_symbol(&self, symbol: char) -> bool {
        self.symbols.contains(&symbol)
    }

    pub fn is_accepting(&self, state: StateId) -> bool {
        self.accept.contains(&state)
    }

    pub fn accepting_states(&self) -> impl Iterator<Item = StateId> + '_ {
        self.states().filter(|s| self.accept.contains(s))
    }

    pub fn next_state(&self, from: StateId, symbol: char) -> Option<StateId> {
        self.transition.get(&(from, symbol)).copied()
    }

    /// All defined transitions, ordered by source state then alphabet order.
    pub fn transitions(&self) -> Vec<Transition> {
        self.states()
            .cartesian_product(self.alphabet.iter().copied())
            .filter_map(|(from, symbol)| {
                self.next_state(from, symbol)
                    .map(|to| Transition { from, symbol, to })
            })
            .collect()
    }

    pub fn reachable_states(&self) -> HashSet<StateId> {
        let mut reachable: HashSet<StateId> = HashSet::new();
        let mut queue: VecDeque<StateId> = VecDeque::new();
        queue.push_back(self.start);
        reachable.insert(self.start);
        while let Some(cur) = queue.pop_front() {
            for &symbol in &self.alphabet {
                if let Some(to) = self.next_state(cur, symbol) {
                    if reachable.insert(to) {
                        queue.push_back(to);
                    }
                }
            }
        }
        reachable
    }

    pub fn unreachable_states(&self) -> Vec<StateId> {
        let reachable = self.reachable_states();
        self.states().filter(|s| !reachable.contains(s)).collect()
    }

    pub fn to_dot(&self) -> String {
        let mut dot = String::new();
        dot.push_str("digraph {\n");
        for state in self.states() {
            let shape = if self.is_accepting(state) {
                "doublecircle"
            } else {
                "circle"
            };
            dot.push_str(&format!(
                "  {} [shape={}]\n",
                escape_for_dot(self.state_name(state)),
                shape
            ));
        }

        // parallel edges collapse into one edge labelled with every symbol
        let edges = self
            .transitions()
            .into_iter()
            .map(|t| ((t.from, t.to), t.symbol))
            .into_group_map();
        for ((from, to), symbols) in edges.into_iter().sorted_by_key(|(k, _)| *k) {
            dot.push_str(&format!(
                "  {} -> {} [label={}]\n",
                escape_for_dot(self.state_name(from)),
                escape_for_dot(self.state_name(to)),
                escape_for_dot(&symbols.iter().join(","))
            ));
        }

        dot.push_str("  __start [shape=point]\n");
        dot.push_str(&format!(
            "  __start -> {}\n",
            escape_for_dot(self.state_name(self.start))
        ));
        dot.push_str("}\n");
        dot
    }

    /// Checks the generated DOT with graphviz-rust's parser and pretty-prints it.
    pub fn render_dot(&self) -> Result<String, DfaError> {
        let graph = graphviz_rust::parse(&self.to_dot()).map_err(DfaError::Dot)?;
        Ok(graphviz_rust::print(
            graph,
            &mut graphviz_rust::printer::PrinterContext::default(),
        ))
    }
}

fn escape_for_dot(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Mutable staging area for a [`Dfa`].
///
/// Every reference is resolved against what has already been declared, so
/// states and symbols must be added before they are used.
#[derive(Debug, Default)]
pub struct DfaBuilder {
    states: Vec<String>,
    state_index: HashMap<String, StateId>,
    alphabet: Vec<char>,
    symbols: HashSet<char>,
    start: Option<StateId>,
    accept: HashSet<StateId>,
    transition: HashMap<(StateId, char), StateId>,
}

impl DfaBuilder {
    pub fn new() -> DfaBuilder {
        DfaBuilder::default()
    }

    /// Registers `name`, or returns the existing id if it is already declared.
    pub fn add_state(&mut self, name: &str) -> StateId {
        if let Some(&id) = self.state_index.get(name) {
            return id;
        }
        let id = StateId(self.states.len());
        self.states.push(name.to_string());
        self.state_index.insert(name.to_string(), id);
        id
    }

    /// Registers a symbol given as text. Duplicates are ignored.
    pub fn add_symbol(&mut self, token: &str) -> Result<char, BuildError> {
        let symbol = single_char(token)?;
        if self.symbols.insert(symbol) {
            self.alphabet.push(symbol);
        }
        Ok(symbol)
    }

    /// Sets the start state, returning the one it replaced.
    pub fn set_start(&mut self, name: &str) -> Result<Option<StateId>, BuildError> {
        let id = self
            .state_id(name)
            .ok_or_else(|| BuildError::UnknownStartState(name.to_string()))?;
        Ok(self.start.replace(id))
    }

    pub fn add_accept(&mut self, name: &str) -> Result<StateId, BuildError> {
        let id = self
            .state_id(name)
            .ok_or_else(|| BuildError::UnknownAcceptState(name.to_string()))?;
        self.accept.insert(id);
        Ok(id)
    }

    /// Binds `(from, symbol)` to `to`, returning the destination it overwrote.
    pub fn add_transition(
        &mut self,
        from: &str,
        symbol: char,
        to: &str,
    ) -> Result<Option<StateId>, BuildError> {
        match (
            self.state_id(from),
            self.symbols.contains(&symbol),
            self.state_id(to),
        ) {
            (Some(from), true, Some(to)) => Ok(self.transition.insert((from, symbol), to)),
            _ => Err(BuildError::UnknownReference {
                from: from.to_string(),
                symbol,
                to: to.to_string(),
            }),
        }
    }

    pub fn state_id(&self, name: &str) -> Option<StateId> {
        self.state_index.get(name).copied()
    }

    pub fn state_name(&self, state: StateId) -> &str {
        &self.states[state.0]
    }

    pub fn build(self) -> Result<Dfa, BuildError> {
        let mut missing = vec![];
        if self.states.is_empty() {
            missing.push("states");
        }
        if self.alphabet.is_empty() {
            missing.push("alphabet");
        }
        let start = match self.start {
            Some(start) if missing.is_empty() => start,
            start => {
                if start.is_none() {
                    missing.push("start");
                }
                return Err(BuildError::Incomplete(missing.join(", ")));
            }
        };
        Ok(Dfa {
            states: self.states,
            state_index: self.state_index,
            alphabet: self.alphabet,
            symbols: self.symbols,
            start,
            accept: self.accept,
            transition: self.transition,
        })
    }
}

pub(crate) fn single_char(token: &str) -> Result<char, BuildError> {
    let mut chars = token.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(BuildError::SymbolLength(token.to_string())),
    }
}

#[cfg(test)]
fn abc_builder() -> DfaBuilder {
    let mut b = DfaBuilder::new();
    for s in ["A", "B", "C"] {
        b.add_state(s);
    }
    b.add_symbol("0").unwrap();
    b.add_symbol("1").unwrap();
    b
}

#[test]
fn test_add_state_is_idempotent() {
    let mut b = DfaBuilder::new();
    let a = b.add_state("A");
    let again = b.add_state("A");
    let c = b.add_state("C");
    assert_eq!(a, again);
    assert_ne!(a, c);
    assert_eq!(b.state_name(c), "C");
}

#[test]
fn test_add_symbol() {
    let mut b = DfaBuilder::new();
    assert_eq!(b.add_symbol("a"), Ok('a'));
    assert_eq!(b.add_symbol("a"), Ok('a'));
    assert_eq!(b.add_symbol("ñ"), Ok('ñ'));
    assert_eq!(
        b.add_symbol("ab"),
        Err(BuildError::SymbolLength("ab".to_string()))
    );
    assert_eq!(b.add_symbol(""), Err(BuildError::SymbolLength(String::new())));
    b.add_state("q");
    b.set_start("q").unwrap();
    let dfa = b.build().unwrap();
    assert_eq!(dfa.alphabet(), &['a', 'ñ']);
}

#[test]
fn test_start_and_accept_must_be_declared() {
    let mut b = abc_builder();
    assert_eq!(
        b.set_start("Z"),
        Err(BuildError::UnknownStartState("Z".to_string()))
    );
    assert_eq!(
        b.add_accept("Z"),
        Err(BuildError::UnknownAcceptState("Z".to_string()))
    );
    assert_eq!(b.set_start("A"), Ok(None));
    assert_eq!(b.set_start("B"), Ok(b.state_id("A")));
    let dfa = b.build().unwrap();
    assert_eq!(dfa.state_name(dfa.start()), "B");
}

#[test]
fn test_transition_overwrite() {
    let mut b = abc_builder();
    b.set_start("A").unwrap();
    assert_eq!(b.add_transition("A", '1', "B"), Ok(None));
    assert_eq!(b.add_transition("A", '1', "C"), Ok(b.state_id("B")));
    let dfa = b.build().unwrap();
    let a = dfa.state_id("A").unwrap();
    assert_eq!(dfa.next_state(a, '1'), dfa.state_id("C"));
    assert_eq!(dfa.next_state(a, '0'), None);
}

#[test]
fn test_transition_unknown_reference() {
    let mut b = abc_builder();
    let err = BuildError::UnknownReference {
        from: "A".to_string(),
        symbol: '2',
        to: "B".to_string(),
    };
    assert_eq!(b.add_transition("A", '2', "B"), Err(err));
    assert!(b.add_transition("X", '1', "B").is_err());
    assert!(b.add_transition("A", '1', "Y").is_err());
}

#[test]
fn test_build_incomplete() {
    assert_eq!(
        DfaBuilder::new().build().unwrap_err(),
        BuildError::Incomplete("states, alphabet, start".to_string())
    );
    let b = abc_builder();
    assert_eq!(
        b.build().unwrap_err(),
        BuildError::Incomplete("start".to_string())
    );
    let mut b = DfaBuilder::new();
    b.add_state("A");
    b.set_start("A").unwrap();
    assert_eq!(
        b.build().unwrap_err(),
        BuildError::Incomplete("alphabet".to_string())
    );
}

#[test]
fn test_reachable() {
    let mut b = abc_builder();
    b.add_state("D");
    b.set_start("A").unwrap();
    b.add_transition("A", '0', "B").unwrap();
    b.add_transition("B", '1', "A").unwrap();
    b.add_transition("D", '1', "C").unwrap();
    let dfa = b.build().unwrap();
    let names = |states: Vec<StateId>| {
        states
            .into_iter()
            .map(|s| dfa.state_name(s).to_string())
            .collect::<Vec<_>>()
    };
    assert_eq!(dfa.reachable_states().len(), 2);
    assert_eq!(names(dfa.unreachable_states()), vec!["C", "D"]);
    assert_eq!(dfa.transitions().len(), 3);
}

#[test]
fn test_to_dot() {
    let mut b = abc_builder();
    b.set_start("A").unwrap();
    b.add_accept("C").unwrap();
    b.add_transition("A", '0', "B").unwrap();
    b.add_transition("A", '1', "B").unwrap();
    b.add_transition("B", '1', "C").unwrap();
    let dfa = b.build().unwrap();
    let dot = dfa.to_dot();
    assert!(dot.contains("\"A\" -> \"B\" [label=\"0,1\"]"));
    assert!(dot.contains("\"B\" -> \"C\" [label=\"1\"]"));
    assert!(dot.contains("\"C\" [shape=doublecircle]"));
    assert!(dot.contains("__start -> \"A\""));

    let rendered = dfa.render_dot().unwrap();
    assert!(rendered.contains("digraph"));
}

#[test]
fn test_to_dot_escapes_quotes() {
    let mut b = DfaBuilder::new();
    b.add_state("say \"hi\"");
    b.add_symbol("\"").unwrap();
    b.set_start("say \"hi\"").unwrap();
    b.add_transition("say \"hi\"", '"', "say \"hi\"").unwrap();
    let dfa = b.build().unwrap();
    assert!(dfa.to_dot().contains("\"say \\\"hi\\\"\" [shape=circle]"));
}
