use std::fs::read_to_string;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser as ClapParser};

use lexer::Lexer;
use parser::Parser;

#[derive(ClapParser, Debug)]
#[command(version, about, long_about = "Runs the sysyc SysY front end")]
struct CLI {
    /// Path to SysY source file
    path: String,

    #[command(flatten)]
    stage_options: StageOptions,
}

/// Which stage the front end should stop at
#[derive(Args, Debug)]
#[group(required = false, multiple = false)]
struct StageOptions {
    /// Stop after lexer and print the token stream
    #[arg(long)]
    lex: bool,

    /// Stop after parser and pretty-print the AST
    #[arg(long)]
    parse: bool,
}

pub fn main() -> Result<()> {
    let args = CLI::parse();

    run_driver(&args.path, &args.stage_options)
}

fn run_driver(path: &str, options: &StageOptions) -> Result<()> {
    let source =
        read_to_string(path).with_context(|| format!("could not read source file '{path}'"))?;

    let mut lexer = Lexer::new(&source);
    let tokens: Vec<_> = lexer.tokenize().collect();

    if options.lex {
        for token in &tokens {
            println!("{token:?}");
        }
        return Ok(());
    }

    let unit = match Parser::new(tokens).parse() {
        Ok(unit) => unit,
        Err(e) => bail!("{path}: {e}"),
    };

    if options.parse {
        println!("{unit:#?}");
    }

    Ok(())
}
