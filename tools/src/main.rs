use clap::{Parser, ValueEnum};
use rustyline::error::ReadlineError;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use topdown::{ParseTree, ParserState, Terminal, TopDownParser};

#[derive(Clone, Copy, Debug, PartialEq, ValueEnum)]
enum Format {
    /// Derivation log followed by an indented tree
    Text,
    /// One bracketed tree per line
    Brackets,
    /// Derivation log only
    Log,
}

/// Find every parse of a sentence with an exhaustive top-down search.
#[derive(Parser, Debug)]
#[command(name = "topdown", version)]
struct Args {
    /// Grammar rules file
    grammar: PathBuf,
    /// Lexicon file
    lexicon: PathBuf,
    /// Start category
    start: String,
    /// Sentence to parse, read interactively when missing
    tokens: Vec<String>,
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,
    /// Write a Graphviz tree_<n>.dot file per parse into DIR
    #[arg(long, value_name = "DIR")]
    dot: Option<PathBuf>,
    /// Print parses as they're found instead of after the search
    #[arg(long)]
    lazy: bool,
    /// Search even if the grammar has unit rule cycles (may not terminate)
    #[arg(long)]
    unchecked: bool,
}

fn tokenize(sentence: &str) -> Vec<Terminal> {
    sentence.split_whitespace()
        .map(|w| Terminal::new(w.to_lowercase()))
        .collect()
}

fn render(parse: &ParserState, format: Format) -> Result<String, String> {
    let tree = ParseTree::from_derivation(parse.derivation()).map_err(|e| e.to_string())?;
    Ok(match format {
        Format::Text => format!("{}\n{}", parse, tree.print().trim_end()),
        Format::Brackets => tree.brackets(),
        Format::Log => parse.to_string(),
    })
}

fn write_dot(args: &Args, parse: &ParserState, n: usize) -> Result<(), String> {
    let dir = match &args.dot {
        Some(dir) => dir,
        None => return Ok(()),
    };
    let tree = ParseTree::from_derivation(parse.derivation()).map_err(|e| e.to_string())?;
    fs::create_dir_all(dir).map_err(|e| format!("{}: {}", dir.display(), e))?;
    let path = dir.join(format!("tree_{}.dot", n));
    fs::write(&path, tree.dot()).map_err(|e| format!("{}: {}", path.display(), e))
}

fn report(parser: &TopDownParser, args: &Args, sentence: &str) -> Result<(), String> {
    let input = tokenize(sentence);
    if args.lazy {
        let mut found = 0;
        for parse in parser.derivations(&input) {
            found += 1;
            println!("{}: {}", found, render(&parse, args.format)?);
            write_dot(args, &parse, found)?;
        }
        println!("{} parses found", found);
        return Ok(());
    }
    let parses = parser.search(&input);
    println!("{} parses found: ", parses.len());
    for (n, parse) in parses.iter().enumerate() {
        println!("{}: {}", n + 1, render(parse, args.format)?);
        write_dot(args, parse, n + 1)?;
    }
    Ok(())
}

fn run(args: Args) -> Result<(), String> {
    let grammar = topdown::load_grammar(&args.grammar).map_err(|e| e.to_string())?;
    let lexicon = topdown::load_lexicon(&args.lexicon).map_err(|e| e.to_string())?;

    let issues = grammar.validate(&lexicon, &args.start);
    for issue in &issues {
        eprintln!("warning: {}", issue);
    }
    if !args.unchecked && issues.iter().any(|i| i.is_fatal()) {
        return Err("search would not terminate, rerun with --unchecked to try anyway".to_string());
    }

    let parser = TopDownParser::new(&grammar, &lexicon, args.start.as_str());
    if !args.tokens.is_empty() {
        return report(&parser, &args, &args.tokens.join(" "));
    }

    let mut rl = rustyline::DefaultEditor::new().map_err(|e| e.to_string())?;
    loop {
        match rl.readline("~> ") {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                rl.add_history_entry(line.as_str()).map_err(|e| e.to_string())?;
                if let Err(e) = report(&parser, &args, &line) {
                    eprintln!("{}", e);
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => return Ok(()),
            Err(e) => return Err(e.to_string()),
        }
    }
}

fn main() -> ExitCode {
    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("topdown: {}", e);
            ExitCode::FAILURE
        }
    }
}
