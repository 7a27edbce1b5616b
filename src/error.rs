use std::path::PathBuf;

use thiserror::Error;

/// Reasons a definition cannot become an automaton.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("symbol '{0}' must be one character")]
    SymbolLength(String),
    #[error("unknown start state '{0}'")]
    UnknownStartState(String),
    #[error("unknown accept state '{0}'")]
    UnknownAcceptState(String),
    #[error("unrecognized line")]
    UnrecognizedLine,
    #[error("invalid transition: missing arrow")]
    MissingArrow,
    #[error("invalid transition: missing comma")]
    MissingComma,
    #[error("transition references unknown state or symbol: {from},{symbol}->{to}")]
    UnknownReference {
        from: String,
        symbol: char,
        to: String,
    },
    #[error("incomplete configuration: missing {0}")]
    Incomplete(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfError {
    #[error("line {line} `{text}`: {kind}")]
    AtLine {
        line: usize,
        text: String,
        kind: BuildError,
    },
    #[error(transparent)]
    Build(#[from] BuildError),
}

impl ConfError {
    pub fn kind(&self) -> &BuildError {
        match self {
            ConfError::AtLine { kind, .. } => kind,
            ConfError::Build(kind) => kind,
        }
    }

    /// Line number of the offending definition line, if one caused the error.
    pub fn line(&self) -> Option<usize> {
        match self {
            ConfError::AtLine { line, .. } => Some(*line),
            ConfError::Build(_) => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum DfaError {
    #[error("cannot read {}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid automaton definition in {}", path.display())]
    Conf { path: PathBuf, source: ConfError },
    #[error("cannot render automaton as dot: {0}")]
    Dot(String),
}

#[test]
fn test_conf_error_display() {
    let err = ConfError::AtLine {
        line: 7,
        text: "A,1,B".to_string(),
        kind: BuildError::MissingArrow,
    };
    assert_eq!(
        err.to_string(),
        "line 7 `A,1,B`: invalid transition: missing arrow"
    );
    assert_eq!(err.line(), Some(7));
    assert_eq!(err.kind(), &BuildError::MissingArrow);

    let err = ConfError::from(BuildError::Incomplete("start".to_string()));
    assert_eq!(err.to_string(), "incomplete configuration: missing start");
    assert_eq!(err.line(), None);
}
