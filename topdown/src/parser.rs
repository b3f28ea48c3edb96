use crate::grammar::{Grammar, Lexicon};
use crate::state::ParserState;
use crate::symbol::{IdentityGen, NonTerminal, Symbol, Terminal};
use std::collections::HashSet;
use std::rc::Rc;

/// Exhaustive top-down parser over a grammar and a lexicon.
///
/// Termination relies on pruning states whose frontier outgrows the input
/// left to read. That bound holds for grammars without empty rules, but a
/// cycle of unit rules (`A -> B`, `B -> A`) expands forever without ever
/// growing the frontier: such a search doesn't return and memory keeps
/// growing. Check grammars with `Grammar::validate` first.
#[derive(Clone)]
pub struct TopDownParser<'g> {
    grammar: &'g Grammar,
    lexicon: &'g Lexicon,
    start: Rc<str>,
}

impl<'g> TopDownParser<'g> {
    pub fn new(grammar: &'g Grammar, lexicon: &'g Lexicon, start: impl Into<Rc<str>>) -> Self {
        TopDownParser { grammar, lexicon, start: start.into() }
    }

    pub fn start(&self) -> &str {
        &self.start
    }

    /// Candidate right-hand sides for `name`: grammar rules first, then
    /// lexical insertions.
    fn candidates(&self, name: &str) -> impl Iterator<Item=&'g [Symbol]> + 'g {
        let grammar: &'g Grammar = self.grammar;
        let lexicon: &'g Lexicon = self.lexicon;
        grammar.rules_for(name).iter()
            .chain(lexicon.rules_for(name))
            .map(Vec::as_slice)
    }

    pub fn seed(&self, input: &[Terminal], ids: &mut IdentityGen) -> ParserState {
        ParserState::new(input, NonTerminal::new(self.start.clone()).instantiate(ids))
    }

    /// Every state reachable from `state` through one or more rule
    /// applications, depth first: each successful expansion is followed by
    /// everything derived from it before the next candidate is tried.
    pub fn predict(&self, state: &ParserState, ids: &mut IdentityGen) -> Vec<ParserState> {
        let mut derivations = Vec::new();
        // nothing left to expand
        let top = match state.top() {
            Some(top) => top,
            None => return derivations,
        };
        for rhs in self.candidates(top.name()) {
            if let Some(next) = state.clone().apply(rhs, ids) {
                match next.is_goal() {
                    true => debug!("goal {}", next),
                    false => debug!("expand {:?}", next.derivation().last()),
                }
                let further = self.predict(&next, ids);
                derivations.push(next);
                derivations.extend(further);
            }
        }
        derivations
    }

    /// All complete derivations of `input`.
    ///
    /// The whole reachable state space is built before goals are picked out.
    /// Results come in discovery order with equal states listed once; since
    /// equality includes instance identities this hardly ever drops anything,
    /// see `dedup_structural`.
    pub fn search(&self, input: &[Terminal]) -> Vec<ParserState> {
        let mut ids = IdentityGen::default();
        let seed = self.seed(input, &mut ids);
        let reachable = self.predict(&seed, &mut ids);
        debug!("{} states reachable, {} identities minted",
               reachable.len() + 1, ids.minted());

        let mut seen = HashSet::new();
        std::iter::once(seed).chain(reachable)
            .filter(|state| state.is_goal())
            .filter(|state| seen.insert(state.clone()))
            .collect()
    }

    /// Lazy version of `search`: same goals, same order, same identities,
    /// but only the current branch is held in memory. Restart by calling it
    /// again.
    pub fn derivations(&self, input: &[Terminal]) -> Derivations<'g> {
        let mut ids = IdentityGen::default();
        let seed = self.seed(input, &mut ids);
        Derivations {
            parser: self.clone(),
            ids,
            branches: vec![Branch { state: seed, tried: 0 }],
            seen: HashSet::new(),
        }
    }
}

/// Search entry point: every goal state for `input` starting at `start`.
pub fn search(
    input: &[Terminal],
    grammar: &Grammar,
    lexicon: &Lexicon,
    start: &str,
) -> Vec<ParserState> {
    TopDownParser::new(grammar, lexicon, start).search(input)
}

/// Keep the first of every group of parses sharing the same derivation up to
/// instance identities.
pub fn dedup_structural(parses: Vec<ParserState>) -> Vec<ParserState> {
    let mut seen = HashSet::new();
    parses.into_iter()
        .filter(|parse| seen.insert(parse.structure()))
        .collect()
}

///////////////////////////////////////////////////////////////////////////////

// A state along with how many of its candidates were already tried.
struct Branch {
    state: ParserState,
    tried: usize,
}

/// Iterator over goal states, see `TopDownParser::derivations`.
pub struct Derivations<'g> {
    parser: TopDownParser<'g>,
    ids: IdentityGen,
    branches: Vec<Branch>,
    seen: HashSet<ParserState>,
}

impl<'g> Iterator for Derivations<'g> {
    type Item = ParserState;

    fn next(&mut self) -> Option<ParserState> {
        loop {
            let branch = self.branches.last_mut()?;
            let rhs = branch.state.top().and_then(|top|
                self.parser.candidates(top.name()).nth(branch.tried));
            let Some(rhs) = rhs else {
                // branch exhausted, backtrack
                self.branches.pop();
                continue;
            };
            branch.tried += 1;
            match branch.state.clone().apply(rhs, &mut self.ids) {
                None => (),
                Some(next) if next.is_goal() => {
                    debug!("goal {}", next);
                    if self.seen.insert(next.clone()) {
                        return Some(next);
                    }
                }
                Some(next) => {
                    debug!("expand {:?}", next.derivation().last());
                    self.branches.push(Branch { state: next, tried: 0 });
                }
            }
        }
    }
}
