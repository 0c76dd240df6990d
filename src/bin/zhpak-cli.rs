//! zhpak-cli - Command-line interface for zhpak
//!
//! A command-line tool for extracting and listing ZH PAK archives.

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::PathBuf;
use std::time::Instant;
use zhpak::{
    prepare_output_dir, DirectorySink, EntrySink, ExtractStats, PakReader, PathSafety, RawEntry,
};

#[derive(Parser)]
#[command(name = "zhpak-cli")]
#[command(about = "A CLI tool for extracting ZH PAK archives")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract every entry of a PAK file
    Extract {
        /// Package file
        input: PathBuf,

        /// Output directory (created if missing)
        output: PathBuf,

        /// Write entries whose names contain `..` or absolute paths as stored
        #[arg(long)]
        allow_unsafe_paths: bool,
    },

    /// List the entries of a PAK file without extracting them
    List {
        /// Package file
        input: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Extract {
            input,
            output,
            allow_unsafe_paths,
        } => extract_archive(&input, &output, allow_unsafe_paths, cli.verbose, cli.quiet)
            .map(|_| ()),
        Commands::List { input } => list_archive(&input, cli.verbose),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Wraps the directory sink with verbose output and progress reporting
struct ReportingSink {
    inner: DirectorySink,
    verbose: bool,
    progress: Option<ProgressBar>,
}

impl EntrySink for ReportingSink {
    fn begin_entry(&mut self, entry: &RawEntry<'_>) -> zhpak::Result<()> {
        if self.verbose {
            println!("processing file: {}", entry.name);
            if entry.header.is_compressed() {
                println!("  compressed");
            } else {
                println!("  not compressed");
            }
        }

        if let Some(ref pb) = self.progress {
            pb.set_position(entry.offset as u64);
        }
        Ok(())
    }

    fn write_entry(&mut self, index: usize, name: &str, data: &[u8]) -> zhpak::Result<()> {
        self.inner.write_entry(index, name, data)
    }
}

fn extract_archive(
    input: &PathBuf,
    output: &PathBuf,
    allow_unsafe_paths: bool,
    verbose: bool,
    quiet: bool,
) -> Result<ExtractStats, Box<dyn std::error::Error>> {
    if !input.is_file() {
        return Err(format!("invalid input file path: {}", input.display()).into());
    }
    prepare_output_dir(output)?;

    if verbose {
        println!("loading package file: {}", input.display());
    }

    let start_time = Instant::now();
    let data = fs::read(input)?;
    let input_size = data.len();

    // Show progress bar for large files
    let progress = if !quiet && !verbose && input_size > 1024 * 1024 {
        let pb = ProgressBar::new(input_size as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {bytes}/{total_bytes} {msg}",
                )?
                .progress_chars("#>-"),
        );
        pb.set_message("Extracting...");
        Some(pb)
    } else {
        None
    };

    let policy = if allow_unsafe_paths {
        PathSafety::Disabled
    } else {
        PathSafety::Strict
    };
    let mut sink = ReportingSink {
        inner: DirectorySink::new(output).with_path_safety(policy),
        verbose,
        progress,
    };

    let stats = PakReader::new(&data).extract_to(&mut sink)?;

    if let Some(ref pb) = sink.progress {
        pb.finish_with_message("Extraction complete");
    }

    if verbose {
        println!("done");
    }

    if !quiet {
        println!("✓ Extraction successful!");
        println!("  Entries: {} ({} compressed)", stats.entries, stats.compressed_entries);
        println!("  Input:   {} bytes", input_size);
        println!("  Output:  {} bytes", stats.output_bytes);
        println!(
            "  Written: {} files under {}",
            sink.inner.written().len(),
            sink.inner.root().display()
        );
        println!("  Time:    {:.2?}", start_time.elapsed());
    }

    Ok(stats)
}

fn list_archive(input: &PathBuf, verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    if !input.is_file() {
        return Err(format!("invalid input file path: {}", input.display()).into());
    }

    let data = fs::read(input)?;
    let entries = PakReader::new(&data).list()?;

    println!("PAK File Information:");
    println!("  File: {}", input.display());
    println!("  Size: {} bytes", data.len());
    println!("  Entries: {}", entries.len());
    println!();

    for entry in &entries {
        let kind = if entry.header.is_compressed() {
            "compressed"
        } else {
            "stored"
        };
        if verbose {
            println!(
                "{:>10} {:>10} {:<10} @{:08x} {}",
                entry.header.compressed_size,
                entry.header.decompressed_size,
                kind,
                entry.offset,
                entry.name
            );
        } else {
            println!(
                "{:>10} {:>10} {:<10} {}",
                entry.header.compressed_size, entry.header.decompressed_size, kind, entry.name
            );
        }
    }

    Ok(())
}
