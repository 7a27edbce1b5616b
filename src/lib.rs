pub mod automaton;
pub mod batch;
pub mod conf;
pub mod error;
pub mod settings;
pub mod simulator;

pub use automaton::{Dfa, DfaBuilder, StateId};
pub use error::{BuildError, ConfError, DfaError};
pub use simulator::{Halt, Run, Verdict};

use wasm_bindgen::prelude::*;

/// Builds the automaton from `definition` and returns one report row per
/// input line. A malformed definition becomes a JS error.
#[wasm_bindgen]
pub fn evaluate(definition: &str, inputs: &str) -> Result<String, JsValue> {
    batch::render_report(definition, inputs).map_err(|e| JsValue::from_str(&e.to_string()))
}
