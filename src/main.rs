//! Command-line front end for the AcadNusx to Unicode Georgian converter.
//!
//! Usage:
//!   nusx2geo input.docx [-o output-name] [--legacy-font NAME] [--replacement-font NAME]
//!
//! The converted document is written next to the input, named
//! "<input>-converted.docx" unless an output name is given.

use clap::Parser;
use nusx2geo::{LEGACY_FONT, REPLACEMENT_FONT, convert_file};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "nusx2geo",
    version,
    about = "Convert AcadNusx-encoded .docx files to Unicode Georgian"
)]
struct Cli {
    /// Input .docx file
    input: Option<PathBuf>,

    /// Output file name (defaults to the input name with a "-converted" suffix)
    #[arg(short, long)]
    output: Option<String>,

    /// Legacy glyph font name that gates conversion
    #[arg(long, default_value = LEGACY_FONT)]
    legacy_font: String,

    /// Font applied to converted runs
    #[arg(long, default_value = REPLACEMENT_FONT)]
    replacement_font: String,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match convert_file(
        cli.input.as_deref(),
        cli.output.as_deref(),
        &cli.legacy_font,
        &cli.replacement_font,
    ) {
        Ok(path) => println!("Document converted successfully. Saved as: {}", path.display()),
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(1);
        },
    }
}
