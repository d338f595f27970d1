use clap::{Parser as ClapParser, Subcommand};
use nodex_lang::cli::{self, CheckOptions, CheckResult, CliError};
use std::io::{self, Read};
use tracing_subscriber::EnvFilter;

#[derive(ClapParser)]
#[command(name = "nodex")]
#[command(about = "Nodex - A path expression language for ordered, named trees")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate and evaluate an expression
    Check {
        /// The expression to evaluate
        expression: String,

        /// JSON input (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<String>,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,

        /// Only validate syntax, don't evaluate
        #[arg(long)]
        syntax_only: bool,
    },

    /// List documentation categories
    Docs,

    /// Show documentation for a specific category
    Doc {
        /// Category name (use 'nodex docs' to list categories)
        category: String,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check {
            expression,
            input,
            pretty,
            syntax_only,
        } => run_check(expression, input, pretty, syntax_only),
        Commands::Docs => {
            print!("{}", cli::get_docs_overview());
            Ok(())
        }
        Commands::Doc { category } => cli::get_doc_category(&category).map(|content| {
            print!("{}", content);
        }),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn run_check(
    expression: String,
    input: Option<String>,
    pretty: bool,
    syntax_only: bool,
) -> Result<(), CliError> {
    let input = match input {
        Some(s) => Some(s),
        None if !syntax_only && !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Some(buffer)
        }
        None => None,
    };

    let options = CheckOptions {
        expression,
        input,
        pretty,
        syntax_only,
    };

    match cli::execute_check(&options)? {
        CheckResult::SyntaxValid => println!("Syntax is valid"),
        CheckResult::Success(output) => {
            if pretty {
                println!("{:#}", output);
            } else {
                println!("{}", output);
            }
        }
    }
    Ok(())
}
