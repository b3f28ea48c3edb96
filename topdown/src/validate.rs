use crate::grammar::{Grammar, Lexicon};
use crate::symbol::Symbol;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Something off about a grammar/lexicon pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Issue {
    /// Categories rewriting into each other through single-category rules.
    /// The search never terminates on such a grammar.
    UnitCycle(Vec<String>),
    /// Used on a right-hand side (or as start) but never defined.
    Undefined(String),
    /// Defined but can't be reached from the start symbol.
    Unreachable(String),
}

impl Issue {
    pub fn is_fatal(&self) -> bool {
        matches!(self, Issue::UnitCycle(_))
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Issue::UnitCycle(names) => {
                let first = names.first().map(String::as_str).unwrap_or_default();
                write!(f, "unit rule cycle: {} -> {}", names.join(" -> "), first)
            }
            Issue::Undefined(name) => write!(f, "undefined category: {}", name),
            Issue::Unreachable(name) => write!(f, "unreachable category: {}", name),
        }
    }
}

fn categories_in(rhs: &[Symbol]) -> impl Iterator<Item=&str> {
    rhs.iter().filter_map(|sym| match sym {
        Symbol::NonTerminal(nt) => Some(nt.name()),
        Symbol::Terminal(_) => None,
    })
}

impl Grammar {
    /// Check the grammar against its lexicon before searching from `start`.
    /// Issues come in a stable order: cycles, undefined, unreachable.
    pub fn validate(&self, lexicon: &Lexicon, start: &str) -> Vec<Issue> {
        let reachable = self.reachable(start);
        let mut issues = self.unit_cycles(&reachable);

        let defined = |name: &str|
            !self.rules_for(name).is_empty() || !lexicon.rules_for(name).is_empty();
        let mut reported = HashSet::new();
        let used = std::iter::once(start)
            .chain(self.productions().flat_map(|(_, rhs)| categories_in(rhs)));
        for name in used {
            if !defined(name) && reported.insert(name) {
                issues.push(Issue::Undefined(name.to_string()));
            }
        }

        let mut reported = HashSet::new();
        for name in self.categories().chain(lexicon.categories()) {
            if !reachable.contains(name) && reported.insert(name) {
                issues.push(Issue::Unreachable(name.to_string()));
            }
        }
        issues
    }

    // Categories derivable from `start`, `start` included.
    fn reachable<'g>(&'g self, start: &'g str) -> HashSet<&'g str> {
        let mut reachable = HashSet::from([start]);
        let mut pending = vec![start];
        while let Some(name) = pending.pop() {
            for rhs in self.rules_for(name) {
                for child in categories_in(rhs) {
                    if reachable.insert(child) {
                        pending.push(child);
                    }
                }
            }
        }
        reachable
    }

    /// Groups of categories that can rewrite into themselves through unit
    /// rules alone, in order of definition. Only cycles the search can walk
    /// into from `reachable` categories count.
    fn unit_cycles(&self, reachable: &HashSet<&str>) -> Vec<Issue> {
        let mut unit: HashMap<&str, Vec<&str>> = HashMap::new();
        for (lhs, rhs) in self.productions() {
            if let [Symbol::NonTerminal(nt)] = rhs {
                unit.entry(lhs).or_default().push(nt.name());
            }
        }

        let mut issues = Vec::new();
        let mut in_cycle = HashSet::new();
        for name in self.categories() {
            if in_cycle.contains(name) || !reachable.contains(name) {
                continue;
            }
            let from_name = reach(&unit, name);
            if !from_name.contains(name) {
                continue;
            }
            // members: everything that reaches back to `name`
            let members: Vec<&str> = self.categories()
                .filter(|other| from_name.contains(other) && reach(&unit, other).contains(name))
                .collect();
            in_cycle.extend(members.iter().copied());
            issues.push(Issue::UnitCycle(members.iter().map(|m| m.to_string()).collect()));
        }
        issues
    }
}

// Categories reachable from `from` following unit rules, one step or more.
fn reach<'g>(unit: &HashMap<&'g str, Vec<&'g str>>, from: &str) -> HashSet<&'g str> {
    let mut seen = HashSet::new();
    let mut pending: Vec<&str> = unit.get(from).cloned().unwrap_or_default();
    while let Some(name) = pending.pop() {
        if seen.insert(name) {
            pending.extend(unit.get(name).into_iter().flatten());
        }
    }
    seen
}

///////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::Issue;
    use crate::grammar::{GrammarBuilder, LexiconBuilder};

    #[test]
    fn clean_grammar() {
        let g = GrammarBuilder::default()
            .rule("S", &["NP", "VP"])
            .rule("NP", &["N"])
            .rule("VP", &["V"])
            .into_grammar().unwrap();
        let lx = LexiconBuilder::default()
            .words("N", &["dogs"])
            .words("V", &["bark"])
            .into_lexicon().unwrap();
        assert!(g.validate(&lx, "S").is_empty());
    }

    #[test]
    fn unit_cycles() {
        let g = GrammarBuilder::default()
            .rule("S", &["A"])
            .rule("A", &["B"])
            .rule("B", &["A"])
            .rule("B", &["C", "C"])
            .rule("C", &["C"])
            .into_grammar().unwrap();
        let lx = LexiconBuilder::default().words("C", &["c"]).into_lexicon().unwrap();
        let issues = g.validate(&lx, "S");
        assert_eq!(issues, vec![
            Issue::UnitCycle(vec!["A".to_string(), "B".to_string()]),
            Issue::UnitCycle(vec!["C".to_string()]),
        ]);
        assert!(issues.iter().all(Issue::is_fatal));
        assert_eq!(issues[0].to_string(), "unit rule cycle: A -> B -> A");
    }

    #[test]
    fn undefined_and_unreachable() {
        let g = GrammarBuilder::default()
            .rule("S", &["NP", "VP"])
            .rule("X", &["NP"])
            .into_grammar().unwrap();
        let lx = LexiconBuilder::default()
            .words("NP", &["dogs"])
            .words("Adj", &["big"])
            .into_lexicon().unwrap();
        let issues = g.validate(&lx, "S");
        assert_eq!(issues, vec![
            Issue::Undefined("VP".to_string()),
            Issue::Unreachable("X".to_string()),
            Issue::Unreachable("Adj".to_string()),
        ]);
        assert!(!issues.iter().any(Issue::is_fatal));
        assert_eq!(g.validate(&lx, "Z")[0], Issue::Undefined("Z".to_string()));
    }

    #[test]
    fn unreachable_cycles_are_harmless() {
        let g = GrammarBuilder::default()
            .rule("S", &["N", "N"])
            .rule("X", &["Y"])
            .rule("Y", &["X"])
            .into_grammar().unwrap();
        let lx = LexiconBuilder::default().words("N", &["dogs"]).into_lexicon().unwrap();
        let issues = g.validate(&lx, "S");
        assert_eq!(issues, vec![
            Issue::Unreachable("X".to_string()),
            Issue::Unreachable("Y".to_string()),
        ]);
        assert!(!issues.iter().any(Issue::is_fatal));

        let words: Vec<_> = ["dogs", "dogs"].iter().map(|w| crate::symbol::Terminal::from(*w)).collect();
        assert_eq!(crate::parser::search(&words, &g, &lx, "S").len(), 1);

        // the same cycle is fatal once the start symbol leads into it
        let issues = g.validate(&lx, "X");
        assert_eq!(issues[0], Issue::UnitCycle(vec!["X".to_string(), "Y".to_string()]));
        assert!(issues[0].is_fatal());
    }
}
