use std::path::PathBuf;

pub const DEFAULT_DEFINITION: &str = "Conf.txt";
pub const DEFAULT_INPUT: &str = "Cadenas.txt";
/// Environment variable naming a file to receive the automaton as DOT.
pub const DOT_ENV: &str = "DFA_DOT";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub definition: PathBuf,
    pub input: PathBuf,
    pub dot: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Settings {
        Settings {
            definition: PathBuf::from(DEFAULT_DEFINITION),
            input: PathBuf::from(DEFAULT_INPUT),
            dot: None,
        }
    }
}

impl Settings {
    /// Takes positional arguments without the program name. Exactly two
    /// select the definition and input files; any other count keeps both
    /// defaults.
    pub fn from_args<I>(args: I) -> Settings
    where
        I: IntoIterator<Item = String>,
    {
        let args: Vec<String> = args.into_iter().collect();
        match args.as_slice() {
            [definition, input] => Settings {
                definition: PathBuf::from(definition),
                input: PathBuf::from(input),
                dot: None,
            },
            [] => Settings::default(),
            _ => {
                log::warn!(
                    "expected 0 or 2 arguments, got {}; using {} and {}",
                    args.len(),
                    DEFAULT_DEFINITION,
                    DEFAULT_INPUT
                );
                Settings::default()
            }
        }
    }

    pub fn with_dot(self, dot: Option<PathBuf>) -> Settings {
        Settings { dot, ..self }
    }

    /// Reads the DOT output path from [`DOT_ENV`]. An empty value is ignored.
    pub fn with_env(self) -> Settings {
        let dot = std::env::var_os(DOT_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        self.with_dot(dot)
    }
}

#[test]
fn test_from_args() {
    let s = Settings::from_args(vec!["a.txt".to_string(), "b.txt".to_string()]);
    assert_eq!(s.definition, PathBuf::from("a.txt"));
    assert_eq!(s.input, PathBuf::from("b.txt"));

    assert_eq!(Settings::from_args(Vec::<String>::new()), Settings::default());
    assert_eq!(
        Settings::from_args(vec!["only.txt".to_string()]),
        Settings::default()
    );
    assert_eq!(
        Settings::from_args(vec!["1".to_string(), "2".to_string(), "3".to_string()]),
        Settings::default()
    );
}

#[test]
fn test_with_dot() {
    let s = Settings::default().with_dot(Some(PathBuf::from("out.dot")));
    assert_eq!(s.dot, Some(PathBuf::from("out.dot")));
    assert_eq!(s.definition, PathBuf::from(DEFAULT_DEFINITION));
}
