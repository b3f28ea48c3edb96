use crate::error::{Error, Result};
use crate::symbol::{NonTerminal, Symbol};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// One rule application as recorded in a derivation log.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Rule {
    pub lhs: NonTerminal,
    pub rhs: Vec<Symbol>,
}

impl Rule {
    pub fn new(lhs: NonTerminal, rhs: Vec<Symbol>) -> Self {
        Rule { lhs, rhs }
    }

    /// Lexical insertions rewrite straight into words.
    pub fn is_lexical(&self) -> bool {
        self.rhs.iter().all(Symbol::is_terminal)
    }
}

fn rule_string(lhs: &str, rhs: &[Symbol]) -> String {
    format!("{} -> {}", lhs, rhs.iter().map(
            |s| s.name()).collect::<Vec<_>>().join(" "))
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&rule_string(self.lhs.name(), &self.rhs))
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self)
    }
}

///////////////////////////////////////////////////////////////////////////////

/// Ordered right-hand sides keyed by the category they rewrite.
#[derive(Clone, Debug, Default)]
struct RuleTable {
    rules: HashMap<Rc<str>, Vec<Vec<Symbol>>>,
    // categories in order of first definition
    order: Vec<Rc<str>>,
}

impl RuleTable {
    fn get(&self, name: &str) -> &[Vec<Symbol>] {
        self.rules.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    fn contains(&self, name: &str, rhs: &[Symbol]) -> bool {
        self.get(name).iter().any(|r| r.as_slice() == rhs)
    }

    fn push(&mut self, name: &str, rhs: Vec<Symbol>) {
        if let Some(alternatives) = self.rules.get_mut(name) {
            alternatives.push(rhs);
        } else {
            let name: Rc<str> = name.into();
            self.order.push(name.clone());
            self.rules.insert(name, vec![rhs]);
        }
    }

    fn categories(&self) -> impl Iterator<Item=&str> {
        self.order.iter().map(|n| &**n)
    }

    fn productions(&self) -> impl Iterator<Item=(&str, &[Symbol])> {
        self.categories().flat_map(move |name| {
            self.get(name).iter().map(move |rhs| (name, rhs.as_slice()))
        })
    }

    fn len(&self) -> usize {
        self.rules.values().map(Vec::len).sum()
    }
}

/// Grammatical rules: categories rewriting into categories, optionally led
/// by terminals (`PP -> "of" NP`).
#[derive(Clone, Debug, Default)]
pub struct Grammar {
    table: RuleTable,
}

impl Grammar {
    /// Right-hand sides of every rule whose left-hand side is `name`.
    pub fn rules_for(&self, name: &str) -> &[Vec<Symbol>] {
        self.table.get(name)
    }

    pub fn categories(&self) -> impl Iterator<Item=&str> {
        self.table.categories()
    }

    pub fn productions(&self) -> impl Iterator<Item=(&str, &[Symbol])> {
        self.table.productions()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Lexical insertions: preterminals rewriting into word sequences. Every
/// symbol of an entry is a `Symbol::Terminal`.
#[derive(Clone, Debug, Default)]
pub struct Lexicon {
    table: RuleTable,
}

impl Lexicon {
    pub fn rules_for(&self, name: &str) -> &[Vec<Symbol>] {
        self.table.get(name)
    }

    pub fn categories(&self) -> impl Iterator<Item=&str> {
        self.table.categories()
    }

    pub fn productions(&self) -> impl Iterator<Item=(&str, &[Symbol])> {
        self.table.productions()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

///////////////////////////////////////////////////////////////////////////////

/// Builds a Grammar while checking rules. The first error is kept and
/// reported by `into_grammar`.
#[derive(Default)]
pub struct GrammarBuilder {
    table: RuleTable,
    error: Option<Error>,
}

impl GrammarBuilder {
    fn check(&self, lhs: &str, rhs: &[Symbol], quiet: bool) -> Result<bool> {
        if rhs.is_empty() {
            return Err(Error::EmptyRule(lhs.to_string()));
        }
        // Terminals are matched as soon as they're introduced, which only
        // works while nothing precedes them but other terminals.
        let leading = rhs.iter().take_while(|s| s.is_terminal()).count();
        if rhs[leading..].iter().any(Symbol::is_terminal) {
            return Err(Error::MisplacedTerminal(rule_string(lhs, rhs)));
        }
        if self.table.contains(lhs, rhs) {
            return match quiet {
                true => Ok(false),
                false => Err(Error::DuplicateRule(rule_string(lhs, rhs))),
            };
        }
        Ok(true)
    }

    /// Register a rule reporting problems right away (used by the loader to
    /// attach line numbers).
    pub fn push_rule(&mut self, lhs: &str, rhs: Vec<Symbol>) -> Result<()> {
        if self.check(lhs, &rhs, false)? {
            self.table.push(lhs, rhs);
        }
        Ok(())
    }

    fn add_rule(&mut self, lhs: &str, rhs: Vec<Symbol>, quiet: bool) {
        match self.check(lhs, &rhs, quiet) {
            Ok(true) => self.table.push(lhs, rhs),
            Ok(false) => (),
            Err(e) => { self.error.get_or_insert(e); }
        }
    }

    /// Add a rule whose right-hand side is made of categories only.
    pub fn rule<S: AsRef<str>>(mut self, lhs: &str, rhs: &[S]) -> Self {
        let rhs = rhs.iter().map(|s| Symbol::nonterminal(s.as_ref())).collect();
        self.add_rule(lhs, rhs, false);
        self
    }

    /// Add a rule mixing leading terminals and categories.
    pub fn production(mut self, lhs: &str, rhs: impl IntoIterator<Item=Symbol>) -> Self {
        self.add_rule(lhs, rhs.into_iter().collect(), false);
        self
    }

    // Quiet silently ignores re-adding existing rules.
    // Also quiet versions don't use chaining to be invoked in loops.

    pub fn rule_try<S: AsRef<str>>(&mut self, lhs: &str, rhs: &[S]) {
        let rhs = rhs.iter().map(|s| Symbol::nonterminal(s.as_ref())).collect();
        self.add_rule(lhs, rhs, true);
    }

    pub fn into_grammar(self) -> Result<Grammar> {
        self.error.map_or(Ok(Grammar { table: self.table }), Err)
    }
}

/// Builds a Lexicon. Entries are taken verbatim: case folding is up to the
/// caller (the file loader lower-cases).
#[derive(Default)]
pub struct LexiconBuilder {
    table: RuleTable,
    error: Option<Error>,
}

impl LexiconBuilder {
    fn check(&self, category: &str, words: &[Symbol], quiet: bool) -> Result<bool> {
        if words.is_empty() {
            return Err(Error::EmptyRule(category.to_string()));
        }
        if self.table.contains(category, words) {
            return match quiet {
                true => Ok(false),
                false => Err(Error::DuplicateRule(rule_string(category, words))),
            };
        }
        Ok(true)
    }

    pub fn push_entry<S: AsRef<str>>(&mut self, category: &str, words: &[S]) -> Result<()> {
        let words: Vec<_> = words.iter().map(|w| Symbol::terminal(w.as_ref())).collect();
        if self.check(category, &words, false)? {
            self.table.push(category, words);
        }
        Ok(())
    }

    fn add_entry<S: AsRef<str>>(&mut self, category: &str, words: &[S], quiet: bool) {
        let words: Vec<_> = words.iter().map(|w| Symbol::terminal(w.as_ref())).collect();
        match self.check(category, &words, quiet) {
            Ok(true) => self.table.push(category, words),
            Ok(false) => (),
            Err(e) => { self.error.get_or_insert(e); }
        }
    }

    pub fn entry<S: AsRef<str>>(mut self, category: &str, words: &[S]) -> Self {
        self.add_entry(category, words, false);
        self
    }

    /// Convenience for one-word entries: `.words("N", &["dog", "cat"])`.
    pub fn words<S: AsRef<str>>(mut self, category: &str, words: &[S]) -> Self {
        for word in words {
            self.add_entry(category, &[word.as_ref()], false);
        }
        self
    }

    pub fn entry_try<S: AsRef<str>>(&mut self, category: &str, words: &[S]) {
        self.add_entry(category, words, true);
    }

    pub fn into_lexicon(self) -> Result<Lexicon> {
        self.error.map_or(Ok(Lexicon { table: self.table }), Err)
    }
}

///////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::{GrammarBuilder, LexiconBuilder, Rule};
    use crate::error::Error;
    use crate::symbol::{NonTerminal, Symbol};

    #[test]
    fn build_grammar() {
        let g = GrammarBuilder::default()
            .rule("S", &["NP", "VP"])
            .rule("VP", &["V", "NP"])
            .rule("VP", &["V"])
            .production("PP", vec![Symbol::terminal("with"), Symbol::nonterminal("NP")])
            .into_grammar()
            .unwrap();
        assert_eq!(g.len(), 4);
        assert_eq!(g.rules_for("VP").len(), 2);
        assert_eq!(g.rules_for("VP")[1], vec![Symbol::nonterminal("V")]);
        assert!(g.rules_for("NP").is_empty());
        assert_eq!(g.categories().collect::<Vec<_>>(), vec!["S", "VP", "PP"]);
    }

    #[test]
    fn dup_rule() {
        let g = GrammarBuilder::default()
            .rule("S", &["NP", "VP"])
            .rule("S", &["NP", "VP"])
            .into_grammar();
        assert!(matches!(g, Err(Error::DuplicateRule(r)) if r == "S -> NP VP"));

        let mut gb = GrammarBuilder::default();
        gb.rule_try("S", &["NP", "VP"]);
        gb.rule_try("S", &["NP", "VP"]);
        assert_eq!(gb.into_grammar().unwrap().len(), 1);
    }

    #[test]
    fn empty_rule() {
        let g = GrammarBuilder::default()
            .rule::<&str>("X", &[])
            .into_grammar();
        assert!(matches!(g, Err(Error::EmptyRule(r)) if r == "X"));
    }

    #[test]
    fn misplaced_terminal() {
        let g = GrammarBuilder::default()
            .production("X", vec![Symbol::nonterminal("NP"), Symbol::terminal("of")])
            .into_grammar();
        assert_eq!(g.unwrap_err().to_string(),
                   "Misplaced Terminal: X -> NP of (terminals may only lead a rule)");
    }

    #[test]
    fn first_error_wins() {
        let g = GrammarBuilder::default()
            .rule::<&str>("A", &[])
            .rule("B", &["C"])
            .rule("B", &["C"])
            .into_grammar();
        assert!(matches!(g, Err(Error::EmptyRule(_))));
    }

    #[test]
    fn build_lexicon() {
        let lx = LexiconBuilder::default()
            .words("N", &["dog", "cat"])
            .entry("N", &["new", "york"])
            .into_lexicon()
            .unwrap();
        assert_eq!(lx.len(), 3);
        assert_eq!(lx.rules_for("N")[2],
                   vec![Symbol::terminal("new"), Symbol::terminal("york")]);
        assert!(lx.productions().all(|(_, rhs)| rhs.iter().all(Symbol::is_terminal)));

        let dup = LexiconBuilder::default().words("N", &["dog", "dog"]).into_lexicon();
        assert!(matches!(dup, Err(Error::DuplicateRule(r)) if r == "N -> dog"));
    }

    #[test]
    fn rule_display() {
        let rule = Rule::new(NonTerminal::new("N"), vec![Symbol::terminal("dog")]);
        assert_eq!(rule.to_string(), "N -> dog");
        assert!(rule.is_lexical());
    }
}
