use clap::Parser;
use std::path::PathBuf;

/// Streams an intentionally terrible poem from the bundled demo backend
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Config .toml file
    #[arg(short, long, default_value = "./doggerel.toml")]
    pub config: PathBuf,

    /// Roast the image at this path instead of writing about a subject
    #[arg(short, long)]
    pub roast: Option<PathBuf>,

    /// Poem subject words
    pub subject: Vec<String>,
}

pub fn parse_cli() -> Cli {
    Cli::parse()
}
