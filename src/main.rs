use std::{
    io::{BufWriter, Write},
    process::ExitCode,
};

use anyhow::Context;
use dfa_sim::{batch, conf, settings::Settings};
use tracing_subscriber::EnvFilter;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(settings: &Settings) -> anyhow::Result<()> {
    let dfa = conf::load_conf(&settings.definition)?;
    let inputs = batch::read_inputs(&settings.input)?;

    if let Some(path) = &settings.dot {
        std::fs::write(path, dfa.render_dot()?)
            .with_context(|| format!("cannot write {}", path.display()))?;
        log::info!("wrote automaton to {}", path.display());
    }

    let mut out = BufWriter::new(std::io::stdout().lock());
    for evaluation in batch::evaluate_batch(&dfa, &inputs) {
        writeln!(out, "{}", evaluation)?;
    }
    out.flush()?;
    Ok(())
}

fn main() -> ExitCode {
    init_logging();
    let settings = Settings::from_args(std::env::args().skip(1)).with_env();
    match run(&settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
