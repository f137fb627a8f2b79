use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Extract text, words and characters from decoded PDF content streams.
#[derive(Debug, Parser)]
#[command(name = "textpool", about, version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Extract page text
    Text {
        /// Content stream file ('-' for stdin)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Serialization mode
        #[arg(long, value_enum, default_value_t = TextMode::Plain)]
        mode: TextMode,

        /// Output format
        #[arg(long, value_enum, default_value_t = TextFormat::Text)]
        format: TextFormat,

        #[command(flatten)]
        page: PageArgs,
    },

    /// Extract positioned characters
    Chars {
        /// Content stream file ('-' for stdin)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        #[command(flatten)]
        page: PageArgs,
    },

    /// Extract words with bounding box coordinates
    Words {
        /// Content stream file ('-' for stdin)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        #[command(flatten)]
        page: PageArgs,
    },

    /// Search page text for a pattern
    Search {
        /// Content stream file ('-' for stdin)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Regular expression (or literal text with --literal)
        #[arg(value_name = "PATTERN")]
        pattern: String,

        /// Match the pattern literally instead of as a regex
        #[arg(long)]
        literal: bool,

        /// Case-insensitive matching
        #[arg(long, short = 'i')]
        ignore_case: bool,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        #[command(flatten)]
        page: PageArgs,
    },
}

/// Page geometry, fonts and extraction options shared by all subcommands.
#[derive(Debug, Clone, Args)]
pub struct PageArgs {
    /// Page width in points (unrotated)
    #[arg(long, default_value_t = 612.0)]
    pub width: f64,

    /// Page height in points (unrotated)
    #[arg(long, default_value_t = 792.0)]
    pub height: f64,

    /// Page /Rotate value (0, 90, 180 or 270)
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    pub rotate: i32,

    /// JSON file with extraction options
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// JSON file describing the fonts used by the content stream
    #[arg(long, value_name = "FILE")]
    pub fonts: Option<PathBuf>,

    /// Keep words in content stream order
    #[arg(long)]
    pub raw_order: bool,

    /// Apply Unicode normalization to extracted text
    #[arg(long, value_enum)]
    pub unicode_norm: Option<UnicodeNormArg>,
}

/// Serialization mode for the text subcommand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TextMode {
    /// Lines in reading order
    Plain,
    /// Character grid mirroring the page layout
    Layout,
    /// Text column by column
    Columns,
}

/// Output format for the text subcommand.
#[derive(Debug, Clone, ValueEnum)]
pub enum TextFormat {
    /// Plain text output
    Text,
    /// JSON output
    Json,
}

/// Output format for chars/words/search subcommands.
#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Plain text (tab-separated)
    Text,
    /// JSON output
    Json,
    /// CSV output
    Csv,
}

/// Unicode normalization form for CLI arguments.
#[derive(Debug, Clone, ValueEnum)]
pub enum UnicodeNormArg {
    /// Canonical Decomposition, followed by Canonical Composition
    Nfc,
    /// Canonical Decomposition
    Nfd,
    /// Compatibility Decomposition, followed by Canonical Composition
    Nfkc,
    /// Compatibility Decomposition
    Nfkd,
}

impl UnicodeNormArg {
    /// Convert to the core library's `UnicodeNorm` enum.
    pub fn to_unicode_norm(&self) -> textpool::UnicodeNorm {
        match self {
            UnicodeNormArg::Nfc => textpool::UnicodeNorm::Nfc,
            UnicodeNormArg::Nfd => textpool::UnicodeNorm::Nfd,
            UnicodeNormArg::Nfkc => textpool::UnicodeNorm::Nfkc,
            UnicodeNormArg::Nfkd => textpool::UnicodeNorm::Nfkd,
        }
    }
}
