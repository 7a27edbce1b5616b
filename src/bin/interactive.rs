use std::{io::BufRead, path::PathBuf, process::ExitCode};

use dfa_sim::{conf, settings::DEFAULT_DEFINITION, Dfa};
use tracing_subscriber::EnvFilter;

fn evaluate_stdin(dfa: &Dfa) -> anyhow::Result<()> {
    for line in std::io::stdin().lock().lines() {
        let line = line?;
        let text = line.trim();
        if conf::is_comment_or_blank(text) {
            continue;
        }
        let run = dfa.run(text);
        println!("{}: {}", text, run.verdict);
        println!("  {}", run.describe(dfa));
        println!("  {}", run.describe_halt(dfa));
    }
    Ok(())
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DEFINITION));
    let result = conf::load_conf(&path)
        .map_err(anyhow::Error::from)
        .and_then(|dfa| evaluate_stdin(&dfa));
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
