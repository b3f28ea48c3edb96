use std::fmt;
use std::rc::Rc;

/// Tells apart instances of the same category within one derivation.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct Identity(usize);

impl Identity {
    /// Carried by grammar templates; never minted for a live instance.
    pub const TEMPLATE: Identity = Identity(0);

    pub fn index(&self) -> usize {
        self.0
    }
}

/// Hands out identities for a single search run. Injective: every call to
/// `mint` returns a value never returned before by the same generator.
#[derive(Debug)]
pub struct IdentityGen {
    next: usize,
}

impl Default for IdentityGen {
    fn default() -> Self {
        IdentityGen { next: 1 }
    }
}

impl IdentityGen {
    pub fn mint(&mut self) -> Identity {
        let id = Identity(self.next);
        self.next += 1;
        id
    }

    /// How many instances were created so far in this run.
    pub fn minted(&self) -> usize {
        self.next - 1
    }
}

/// A grammatical category. Two instances are the same category if their names
/// match (`same_category`), but only equal (`==`) if their identities match too.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct NonTerminal {
    name: Rc<str>,
    id: Identity,
}

impl NonTerminal {
    pub fn new(name: impl Into<Rc<str>>) -> Self {
        NonTerminal { name: name.into(), id: Identity::TEMPLATE }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn identity(&self) -> Identity {
        self.id
    }

    pub fn same_category(&self, other: &NonTerminal) -> bool {
        self.name == other.name
    }

    /// A copy of this category carrying a freshly minted identity.
    pub fn instantiate(&self, ids: &mut IdentityGen) -> NonTerminal {
        NonTerminal { name: self.name.clone(), id: ids.mint() }
    }
}

impl fmt::Debug for NonTerminal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "NonTerm({}#{})", self.name, self.id.0)
    }
}

impl fmt::Display for NonTerminal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// An input word. Compared by surface form only, so callers normalize case
/// before searching.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Terminal(Rc<str>);

impl Terminal {
    pub fn new(surface: impl Into<Rc<str>>) -> Self {
        Terminal(surface.into())
    }

    pub fn surface(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Terminal {
    fn from(surface: &str) -> Self {
        Terminal::new(surface)
    }
}

impl fmt::Debug for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Term({})", self.0)
    }
}

impl fmt::Display for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum Symbol {
    NonTerminal(NonTerminal),
    Terminal(Terminal),
}

impl Symbol {
    pub fn nonterminal(name: impl Into<Rc<str>>) -> Self {
        Symbol::NonTerminal(NonTerminal::new(name))
    }

    pub fn terminal(surface: impl Into<Rc<str>>) -> Self {
        Symbol::Terminal(Terminal::new(surface))
    }

    pub fn name(&self) -> &str {
        match self {
            Symbol::NonTerminal(nt) => nt.name(),
            Symbol::Terminal(t) => t.surface(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Symbol::Terminal(_))
    }

    /// Nonterminals get a fresh identity, terminals are copied as-is.
    pub fn instantiate(&self, ids: &mut IdentityGen) -> Symbol {
        match self {
            Symbol::NonTerminal(nt) => Symbol::NonTerminal(nt.instantiate(ids)),
            Symbol::Terminal(t) => Symbol::Terminal(t.clone()),
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Symbol::NonTerminal(nt) => write!(f, "{}", nt),
            Symbol::Terminal(t) => write!(f, "{}", t),
        }
    }
}

///////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::{IdentityGen, NonTerminal, Symbol, Terminal};
    use std::collections::HashSet;

    #[test]
    fn instances_share_category_not_identity() {
        let mut ids = IdentityGen::default();
        let np = NonTerminal::new("NP");
        let a = np.instantiate(&mut ids);
        let b = np.instantiate(&mut ids);
        assert!(a.same_category(&b));
        assert_ne!(a, b);
        assert_ne!(a.identity(), b.identity());
        assert_eq!(ids.minted(), 2);
    }

    #[test]
    fn terminal_and_nonterminal_differ() {
        // same spelling, different alphabets
        let mut m = HashSet::new();
        m.insert(Symbol::nonterminal("x"));
        m.insert(Symbol::terminal("x"));
        assert_eq!(m.len(), 2);
        assert_eq!(Terminal::from("dog"), Terminal::new(String::from("dog")));
    }

    #[test]
    fn instantiate_keeps_terminals() {
        let mut ids = IdentityGen::default();
        let word = Symbol::terminal("the");
        assert_eq!(word.instantiate(&mut ids), word);
        assert_eq!(ids.minted(), 0);
        assert!(word.is_terminal());
        assert_eq!(format!("{:?}", word), "Terminal(Term(the))");
    }
}
