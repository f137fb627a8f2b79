mod chars_cmd;
mod cli;
mod search_cmd;
mod shared;
mod text_cmd;
mod words_cmd;

use clap::Parser;
use cli::Cli;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        cli::Commands::Text {
            ref file,
            mode,
            ref format,
            ref page,
        } => text_cmd::run(file, mode, format, page),
        cli::Commands::Chars {
            ref file,
            ref format,
            ref page,
        } => chars_cmd::run(file, format, page),
        cli::Commands::Words {
            ref file,
            ref format,
            ref page,
        } => words_cmd::run(file, format, page),
        cli::Commands::Search {
            ref file,
            ref pattern,
            literal,
            ignore_case,
            ref format,
            ref page,
        } => search_cmd::run(file, pattern, literal, ignore_case, format, page),
    };

    if let Err(code) = result {
        std::process::exit(code);
    }
}
