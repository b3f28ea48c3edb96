use crate::grammar::Rule;
use crate::symbol::{IdentityGen, NonTerminal, Symbol, Terminal};
use std::collections::VecDeque;
use std::fmt;

/// A point in the search: what's left to read, what's left to expand and
/// how we got here. States are never shared between branches, each branch
/// works on its own clone.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct ParserState {
    // front is the next token to match
    remaining: VecDeque<Terminal>,
    // last is the next category to expand
    frontier: Vec<NonTerminal>,
    derivation: Vec<Rule>,
}

impl ParserState {
    /// Seed state: the whole input still to read, only `start` to expand.
    pub fn new(input: &[Terminal], start: NonTerminal) -> Self {
        ParserState {
            remaining: input.iter().cloned().collect(),
            frontier: vec![start],
            derivation: Vec::new(),
        }
    }

    pub fn remaining(&self) -> &VecDeque<Terminal> {
        &self.remaining
    }

    /// Pending categories, bottom first. The last one is expanded next.
    pub fn frontier(&self) -> &[NonTerminal] {
        &self.frontier
    }

    /// Rules applied so far, in application order.
    pub fn derivation(&self) -> &[Rule] {
        &self.derivation
    }

    pub fn top(&self) -> Option<&NonTerminal> {
        self.frontier.last()
    }

    /// Nothing left to expand and nothing left to read.
    pub fn is_goal(&self) -> bool {
        self.remaining.is_empty() && self.frontier.is_empty()
    }

    /// Without empty rules every pending category covers at least one token,
    /// so a frontier larger than the input left can't succeed.
    pub fn is_too_long(&self) -> bool {
        self.frontier.len() > self.remaining.len()
    }

    /// Tokens matched so far. Terminals are consumed when their rule is
    /// applied, so the log lists them in input order.
    pub fn consumed(&self) -> Vec<Terminal> {
        self.derivation.iter()
            .flat_map(|rule| rule.rhs.iter())
            .filter_map(|sym| match sym {
                Symbol::Terminal(t) => Some(t.clone()),
                Symbol::NonTerminal(_) => None,
            })
            .collect()
    }

    /// The derivation with instance identities erased, ie: what two parses
    /// must share to be the same reading.
    pub fn structure(&self) -> Vec<String> {
        self.derivation.iter().map(|rule| rule.to_string()).collect()
    }

    /// Rewrite the top of the frontier with `rhs`.
    ///
    /// Categories in `rhs` are pushed with fresh identities so the first one
    /// ends on top. Leading terminals are matched against the input right
    /// away, left to right. Returns `None` when the rule doesn't apply: the
    /// frontier is empty, a terminal doesn't match, or the resulting state is
    /// too long. The state is consumed either way, so a failed branch leaves
    /// nothing behind.
    pub fn apply(mut self, rhs: &[Symbol], ids: &mut IdentityGen) -> Option<ParserState> {
        let lhs = self.frontier.pop()?;
        let rhs: Vec<Symbol> = rhs.iter().map(|sym| sym.instantiate(ids)).collect();

        let mut introduced_category = false;
        for sym in &rhs {
            match sym {
                Symbol::NonTerminal(_) => introduced_category = true,
                // a terminal behind a category can't be matched yet
                Symbol::Terminal(_) if introduced_category => return None,
                Symbol::Terminal(t) => {
                    if self.remaining.front() != Some(t) {
                        debug!("mismatch {} -> {:?} at {:?}",
                               lhs, t, self.remaining.front());
                        return None;
                    }
                    self.remaining.pop_front();
                }
            }
        }
        self.frontier.extend(rhs.iter().rev().filter_map(|sym| match sym {
            Symbol::NonTerminal(nt) => Some(nt.clone()),
            Symbol::Terminal(_) => None,
        }));
        self.derivation.push(Rule::new(lhs, rhs));

        if self.is_too_long() {
            debug!("prune {} ({} pending, {} left)",
                   self, self.frontier.len(), self.remaining.len());
            return None;
        }
        Some(self)
    }
}

impl fmt::Display for ParserState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let rules = self.derivation.iter()
            .map(|r| r.to_string()).collect::<Vec<_>>();
        write!(f, "{}", rules.join(", "))
    }
}

///////////////////////////////////////////////////////////////////////////////
