use crate::error::{Error, Result};
use crate::grammar::Rule;
use crate::symbol::{NonTerminal, Symbol, Terminal};
use std::slice;

#[derive(Debug, Clone, PartialEq)]
pub enum ParseTree {
    // "dog"
    Leaf(Terminal),
    // (N#5, [Leaf("dog")])
    Node(NonTerminal, Vec<ParseTree>),
}

impl ParseTree {
    /// Rebuild the tree a derivation log describes.
    ///
    /// The log is a leftmost derivation: each rule expands the leftmost
    /// category still pending. Replaying it depth first, every rule's
    /// left-hand side must be the very instance (same identity) the tree is
    /// waiting on, which is what tells sibling `NP`s apart.
    pub fn from_derivation(derivation: &[Rule]) -> Result<ParseTree> {
        let root = derivation.first()
            .ok_or_else(|| Error::MalformedDerivation("empty derivation".to_string()))?
            .lhs.clone();
        let mut rules = derivation.iter();
        let tree = ParseTree::expand(&root, &mut rules)?;
        if let Some(extra) = rules.next() {
            return Err(Error::MalformedDerivation(
                format!("{} left over after completing {}", extra, root)));
        }
        Ok(tree)
    }

    fn expand(category: &NonTerminal, rules: &mut slice::Iter<Rule>) -> Result<ParseTree> {
        let rule = rules.next().ok_or_else(|| Error::MalformedDerivation(
                format!("no expansion for {}", category)))?;
        if rule.lhs != *category {
            return Err(Error::MalformedDerivation(
                format!("expected expansion of {:?}, found {:?}", category, rule.lhs)));
        }
        let children = rule.rhs.iter().map(|sym| match sym {
            Symbol::Terminal(t) => Ok(ParseTree::Leaf(t.clone())),
            Symbol::NonTerminal(child) => ParseTree::expand(child, rules),
        }).collect::<Result<Vec<_>>>()?;
        Ok(ParseTree::Node(category.clone(), children))
    }

    /// Words at the leaves, left to right.
    pub fn leaves(&self) -> Vec<&Terminal> {
        match self {
            ParseTree::Leaf(t) => vec![t],
            ParseTree::Node(_, children) =>
                children.iter().flat_map(|c| c.leaves()).collect(),
        }
    }

    /// `(S (NP (Det the) (N dog)) (VP (V barks)))`
    pub fn brackets(&self) -> String {
        match self {
            ParseTree::Leaf(t) => t.surface().to_string(),
            ParseTree::Node(nt, children) => {
                let inner = children.iter()
                    .map(|c| c.brackets()).collect::<Vec<_>>().join(" ");
                format!("({} {})", nt.name(), inner)
            }
        }
    }

    pub fn print(&self) -> String {
        let mut out = String::new();
        self.print_helper("", &mut out);
        out
    }

    fn print_helper(&self, level: &str, out: &mut String) {
        match self {
            ParseTree::Leaf(t) => {
                *out += &format!("{}`-- {:?}\n", level, t.surface());
            },
            ParseTree::Node(nt, children) => {
                *out += &format!("{}`-- {}\n", level, nt.name());
                if let Some((last, rest)) = children.split_last() {
                    let l = format!("{}  |", level);
                    for n in rest { n.print_helper(&l, out); }
                    let l = format!("{}   ", level);
                    last.print_helper(&l, out);
                }
            }
        }
    }

    /// Graphviz source, render with `dot -Tpng`. Category nodes are keyed by
    /// instance identity, words get sequential ids.
    pub fn dot(&self) -> String {
        let mut out = String::from("digraph derivation {\n");
        let mut words = 0;
        self.dot_helper(&mut out, &mut words);
        out += "}\n";
        out
    }

    fn dot_helper(&self, out: &mut String, words: &mut usize) -> String {
        match self {
            ParseTree::Leaf(t) => {
                *words += 1;
                let id = format!("w{}", words);
                *out += &format!("  {} [label=\"{}\", shape=plaintext];\n",
                                 id, escape(t.surface()));
                id
            },
            ParseTree::Node(nt, children) => {
                let id = format!("n{}", nt.identity().index());
                *out += &format!("  {} [label=\"{}\"];\n", id, escape(nt.name()));
                for child in children {
                    let child_id = child.dot_helper(out, words);
                    *out += &format!("  {} -> {};\n", id, child_id);
                }
                id
            }
        }
    }
}

fn escape(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}

///////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::ParseTree;
    use crate::error::Error;
    use crate::grammar::Rule;
    use crate::symbol::{IdentityGen, NonTerminal, Symbol, Terminal};

    // S -> NP VP, NP -> the dog, VP -> barks
    fn derivation() -> Vec<Rule> {
        let mut ids = IdentityGen::default();
        let s = NonTerminal::new("S").instantiate(&mut ids);
        let np = NonTerminal::new("NP").instantiate(&mut ids);
        let vp = NonTerminal::new("VP").instantiate(&mut ids);
        vec![
            Rule::new(s, vec![Symbol::NonTerminal(np.clone()), Symbol::NonTerminal(vp.clone())]),
            Rule::new(np, vec![Symbol::terminal("the"), Symbol::terminal("dog")]),
            Rule::new(vp, vec![Symbol::terminal("barks")]),
        ]
    }

    #[test]
    fn rebuild() {
        let tree = ParseTree::from_derivation(&derivation()).unwrap();
        assert_eq!(tree.brackets(), "(S (NP the dog) (VP barks))");
        let leaves: Vec<_> = tree.leaves().into_iter().map(Terminal::surface).collect();
        assert_eq!(leaves, vec!["the", "dog", "barks"]);
    }

    #[test]
    fn print() {
        let tree = ParseTree::from_derivation(&derivation()).unwrap();
        let expected = concat!(
            "`-- S\n",
            "  |`-- NP\n",
            "  |  |`-- \"the\"\n",
            "  |   `-- \"dog\"\n",
            "   `-- VP\n",
            "      `-- \"barks\"\n",
        );
        assert_eq!(tree.print(), expected);
    }

    #[test]
    fn dot() {
        let tree = ParseTree::from_derivation(&derivation()).unwrap();
        let dot = tree.dot();
        assert!(dot.starts_with("digraph derivation {\n"));
        assert!(dot.contains("  n1 [label=\"S\"];\n"));
        assert!(dot.contains("  n1 -> n2;\n"));
        assert!(dot.contains("  n3 -> w3;\n"));
        assert!(dot.contains("  w2 [label=\"dog\", shape=plaintext];\n"));
        assert!(dot.ends_with("}\n"));
    }

    #[test]
    fn identities_must_match() {
        let mut rules = derivation();
        // NP rule rewritten for a different NP instance
        rules[1].lhs = NonTerminal::new("NP");
        assert!(matches!(ParseTree::from_derivation(&rules),
                         Err(Error::MalformedDerivation(_))));
    }

    #[test]
    fn incomplete_or_extra() {
        let rules = derivation();
        assert!(ParseTree::from_derivation(&rules[..2]).is_err());
        assert!(ParseTree::from_derivation(&[]).is_err());
        let mut extra = rules.clone();
        extra.push(rules[2].clone());
        assert!(ParseTree::from_derivation(&extra).is_err());
    }
}
