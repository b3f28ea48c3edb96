use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Empty Rule: {0} (epsilon productions are not supported)")]
    EmptyRule(String),

    #[error("Duplicate Rule: {0}")]
    DuplicateRule(String),

    /// A terminal after a nonterminal can't be matched when it is introduced.
    #[error("Misplaced Terminal: {0} (terminals may only lead a rule)")]
    MisplacedTerminal(String),

    #[error("line {line}: {msg}")]
    Syntax { line: usize, msg: String },

    #[error("{}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed Derivation: {0}")]
    MalformedDerivation(String),
}

pub type Result<T> = std::result::Result<T, Error>;
