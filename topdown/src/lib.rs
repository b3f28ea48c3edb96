#![deny(warnings)]

// Build with the 'debug' feature to trace expansions and prunes on stderr.
macro_rules! debug {
    ($($args:tt)*) => (if cfg!(feature="debug") { eprintln!($($args)*); })
}

mod error;
pub use crate::error::{Error, Result};

mod symbol;
pub use crate::symbol::{Identity, IdentityGen, NonTerminal, Symbol, Terminal};

mod grammar;
pub use crate::grammar::{Grammar, GrammarBuilder, Lexicon, LexiconBuilder, Rule};

mod validate;
pub use crate::validate::Issue;

mod state;
pub use crate::state::ParserState;

mod parser;
pub use crate::parser::{dedup_structural, search, Derivations, TopDownParser};

mod trees;
pub use crate::trees::ParseTree;

mod loader;
pub use crate::loader::{load_grammar, load_lexicon, parse_grammar, parse_lexicon};
