use crate::error::{Error, Result};
use crate::grammar::{Grammar, GrammarBuilder, Lexicon, LexiconBuilder};
use crate::symbol::Symbol;
use std::iter::Peekable;
use std::path::Path;
use std::str::Chars;

// Rule files look like:
//
//   # comment
//   S  -> NP VP
//   VP -> V NP PP | V NP
//   PP -> "with" NP
//
// One production per line (or ended by ';'), alternatives split by '|'.

#[derive(Clone, Debug, PartialEq)]
enum Token {
    Name(String),
    Quoted(String),
    Arrow,
    Bar,
    End,
}

struct RuleTokenizer<'a> {
    input: Peekable<Chars<'a>>,
    line: usize,
}

impl<'a> RuleTokenizer<'a> {
    fn new(src: &'a str) -> Self {
        RuleTokenizer { input: src.chars().peekable(), line: 1 }
    }

    fn syntax(&self, msg: impl Into<String>) -> Error {
        Error::Syntax { line: self.line, msg: msg.into() }
    }

    fn arrow_ahead(&self) -> bool {
        let mut ahead = self.input.clone();
        ahead.next() == Some('-') && ahead.next() == Some('>')
    }

    /// Next token along with the line it was found on.
    fn next_result(&mut self) -> Result<Option<(usize, Token)>> {
        let line = self.line;
        match self.input.next() {
            Some('\n') => {
                self.line += 1;
                Ok(Some((line, Token::End)))
            }
            Some(';') => Ok(Some((line, Token::End))),
            Some('|') => Ok(Some((line, Token::Bar))),
            Some('-') if self.input.peek() == Some(&'>') => {
                self.input.next();
                Ok(Some((line, Token::Arrow)))
            }
            // Swallow comments until EOL, the newline still ends the rule.
            Some('#') => {
                while let Some(&ch) = self.input.peek() {
                    if ch == '\n' {
                        break;
                    }
                    self.input.next();
                }
                self.next_result()
            }
            Some('"') => {
                let mut quoted = String::new();
                let mut escaped = false;
                while let Some(ch) = self.input.next() {
                    if ch == '\n' {
                        break;
                    }
                    if !escaped && ch == '\\' {
                        escaped = true;
                        continue;
                    }
                    if !escaped && ch == '"' {
                        if quoted.is_empty() {
                            return Err(self.syntax("Empty quoted word"));
                        }
                        return Ok(Some((line, Token::Quoted(quoted))));
                    }
                    quoted.push(ch);
                    escaped = false;
                }
                Err(self.syntax("Unfinished string missing close quote"))
            }
            // Swallow whitespace, newlines still end the rule.
            Some(x) if x.is_whitespace() => {
                while let Some(&ws) = self.input.peek() {
                    if ws == '\n' || !ws.is_whitespace() {
                        break;
                    }
                    self.input.next();
                }
                self.next_result()
            }
            Some(x) => {
                let mut name = x.to_string();
                while let Some(&ch) = self.input.peek() {
                    if ch.is_whitespace() || "|;#\"".contains(ch) || self.arrow_ahead() {
                        break;
                    }
                    name.push(ch);
                    self.input.next();
                }
                Ok(Some((line, Token::Name(name))))
            }
            None => Ok(None),
        }
    }
}

impl<'a> Iterator for RuleTokenizer<'a> {
    type Item = Result<(usize, Token)>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_result().transpose()
    }
}

#[derive(Debug, PartialEq)]
struct Production {
    line: usize,
    lhs: String,
    alternatives: Vec<Vec<Token>>,
}

/// Split source into productions. Alternatives only hold `Name`s and
/// `Quoted`s and are never empty.
fn productions(src: &str) -> Result<Vec<Production>> {
    let mut out = Vec::new();
    let mut tokens = RuleTokenizer::new(src);
    while let Some(next) = tokens.next() {
        let (line, token) = next?;
        let lhs = match token {
            Token::End => continue,
            Token::Name(name) => name,
            other => return Err(Error::Syntax {
                line, msg: format!("Expected a category, found {:?}", other) }),
        };
        match tokens.next().transpose()? {
            Some((_, Token::Arrow)) => (),
            _ => return Err(Error::Syntax {
                line, msg: format!("Expected '->' after {}", lhs) }),
        }
        let mut alternatives = vec![Vec::new()];
        loop {
            match tokens.next().transpose()? {
                None | Some((_, Token::End)) => break,
                Some((_, Token::Bar)) => alternatives.push(Vec::new()),
                Some((at, Token::Arrow)) => return Err(Error::Syntax {
                    line: at, msg: "Unexpected '->'".to_string() }),
                Some((_, item)) => {
                    if let Some(current) = alternatives.last_mut() {
                        current.push(item);
                    }
                }
            }
        }
        if alternatives.iter().any(Vec::is_empty) {
            return Err(Error::Syntax {
                line, msg: format!("Empty alternative for {} (epsilon productions are not supported)", lhs) });
        }
        out.push(Production { line, lhs, alternatives });
    }
    Ok(out)
}

fn in_line(line: usize, e: Error) -> Error {
    if matches!(e, Error::Syntax { .. }) {
        return e;
    }
    Error::Syntax { line, msg: e.to_string() }
}

/// Grammar rules from text. Bare words are categories, quoted words are
/// terminals and may only lead a rule.
pub fn parse_grammar(src: &str) -> Result<Grammar> {
    let mut gb = GrammarBuilder::default();
    for p in productions(src)? {
        for alternative in p.alternatives {
            let rhs = alternative.into_iter().filter_map(|item| match item {
                Token::Name(name) => Some(Symbol::nonterminal(name)),
                Token::Quoted(word) => Some(Symbol::terminal(word)),
                _ => None,
            }).collect();
            gb.push_rule(&p.lhs, rhs).map_err(|e| in_line(p.line, e))?;
        }
    }
    gb.into_grammar()
}

/// Lexical entries from text. Every item on the right is a word (quotes are
/// optional) and words are lower-cased.
pub fn parse_lexicon(src: &str) -> Result<Lexicon> {
    let mut lb = LexiconBuilder::default();
    for p in productions(src)? {
        for alternative in p.alternatives {
            let words: Vec<String> = alternative.into_iter().filter_map(|item| match item {
                Token::Name(word) | Token::Quoted(word) => Some(word.to_lowercase()),
                _ => None,
            }).collect();
            lb.push_entry(&p.lhs, &words).map_err(|e| in_line(p.line, e))?;
        }
    }
    lb.into_lexicon()
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .map_err(|source| Error::Io { path: path.to_path_buf(), source })
}

pub fn load_grammar(path: impl AsRef<Path>) -> Result<Grammar> {
    parse_grammar(&read(path.as_ref())?)
}

pub fn load_lexicon(path: impl AsRef<Path>) -> Result<Lexicon> {
    parse_lexicon(&read(path.as_ref())?)
}

///////////////////////////////////////////////////////////////////////////////
