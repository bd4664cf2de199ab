//! doctools CLI - documentation maintenance tool

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;

use doctools::{postprocess_file, reformat_file_to, PostprocessOptions, SaveOptions};

#[derive(Parser)]
#[command(name = "doctools")]
#[command(version)]
#[command(about = "Reformat documentation index entries and postprocess the documentation PDF", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rewrite `pair:` index entries into `member (Class)` form
    #[command(name = "index-change")]
    IndexChange {
        /// Input index file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Directory for the new-<FILE> output (working directory if not specified)
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,
    },

    /// Add title and index entries to the table of contents, set metadata and compact the PDF in place
    #[command(name = "opt-pdf")]
    OptPdf {
        /// PDF file to rewrite
        #[arg(value_name = "FILE", default_value = doctools::DEFAULT_PDF_NAME)]
        input: PathBuf,

        /// Document title
        #[arg(long)]
        title: Option<String>,

        /// Document author
        #[arg(long)]
        author: Option<String>,

        /// Document subject
        #[arg(long)]
        subject: Option<String>,

        /// Document keywords
        #[arg(long)]
        keywords: Option<String>,

        /// Garbage collection level (0-4)
        #[arg(long, default_value = "4")]
        garbage: u8,

        /// Skip stream compression
        #[arg(long)]
        no_deflate: bool,

        /// Skip content stream cleanup
        #[arg(long)]
        no_clean: bool,

        /// Print the result as JSON instead of the size line
        #[arg(long)]
        json: bool,
    },

    /// Show version information
    Version,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::IndexChange { input, output } => cmd_index_change(&input, output.as_deref()),
        Commands::OptPdf {
            input,
            title,
            author,
            subject,
            keywords,
            garbage,
            no_deflate,
            no_clean,
            json,
        } => {
            let mut options = PostprocessOptions::new().with_save_options(
                SaveOptions::new()
                    .with_garbage(garbage)
                    .with_deflate(!no_deflate)
                    .with_clean(!no_clean),
            );
            if let Some(title) = title {
                options = options.with_title(title);
            }
            if let Some(author) = author {
                options = options.with_author(author);
            }
            if let Some(subject) = subject {
                options = options.with_subject(subject);
            }
            if let Some(keywords) = keywords {
                options = options.with_keywords(keywords);
            }
            cmd_opt_pdf(&input, &options, json)
        }
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn cmd_index_change(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let (path, stats) = reformat_file_to(input, output)?;

    println!(
        "{} {} ({} of {} lines rewritten)",
        "Saved to".green(),
        path.display(),
        stats.rewritten,
        stats.total
    );

    Ok(())
}

fn cmd_opt_pdf(
    input: &Path,
    options: &PostprocessOptions,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    log::debug!("Postprocessing {} with {:?}", input.display(), options.save);
    let result = postprocess_file(input, options)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", result.sizes);
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "doctools".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Documentation maintenance tool");
    println!();
    println!("License: MIT");
}
