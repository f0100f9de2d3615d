//! htpy command-line converter
//!
//! Converts HTML files (batch mode) or pasted markup (interactive mode)
//! into htpy Python code.
//!
//! - `htpy convert -o out/ a.html b.html`   # write out/a.py, out/b.py
//! - `htpy convert -s -f`                   # paste markup, print code

mod batch;
mod interactive;
mod report;

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::error::ErrorKind;
use clap::{Args, CommandFactory, Parser, Subcommand};
use htpy_convert::{BlackFormatter, ConvertOptions, ImportMode, convert};
use htpy_dom::{DocumentTree, NodeView};
use htpy_html::format_tree;
use serde::Serialize;

use report::{Verbosity, print_diagnostics};

/// HTML to htpy converter
#[derive(Parser, Debug)]
#[command(name = "htpy")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Paste markup and print the generated code
    htpy convert

    # Use .class#id shorthand and format with black
    htpy convert -s -f

    # Convert files into an existing directory
    htpy convert -o out/ index.html about.html

    # Inspect how markup was parsed
    htpy convert --dump-tree page.html
"#)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert html to python (htpy)
    Convert(ConvertArgs),
}

#[derive(Args, Debug)]
#[allow(clippy::struct_excessive_bools)]
struct ConvertArgs {
    /// Use shorthand syntax for class and id attributes
    #[arg(short, long)]
    shorthand: bool,

    /// Format output code (requires black installed)
    #[arg(short, long)]
    format: bool,

    /// Import statements to prepend: none, names or module
    #[arg(short, long, default_value = "none", value_name = "MODE")]
    imports: ImportMode,

    /// Existing output directory to store converted files
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Print the parsed document tree instead of converting
    #[arg(long)]
    dump_tree: bool,

    /// Print the batch report (or dumped tree) as JSON
    #[arg(long)]
    json: bool,

    /// Milliseconds of idle input that end a paste
    #[arg(long, default_value_t = 100, value_name = "MS")]
    idle_ms: u64,

    /// Print only results and errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Also print informational notes
    #[arg(short, long)]
    verbose: bool,

    /// Formatter program; it must read stdin and write stdout like `black -q -`
    #[arg(long, env = "HTPY_FORMATTER", default_value = "black", value_name = "PROGRAM")]
    formatter: String,

    /// Files to convert (requires --output)
    #[arg(value_name = "FILES")]
    files: Vec<PathBuf>,
}

impl ConvertArgs {
    const fn options(&self) -> ConvertOptions {
        ConvertOptions {
            shorthand: self.shorthand,
            format: self.format,
            imports: self.imports,
        }
    }

    const fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.verbose)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Convert(args) => run_convert(&args),
    }
}

fn run_convert(args: &ConvertArgs) -> Result<()> {
    if !args.files.is_empty() && args.output.is_none() && !args.dump_tree {
        Cli::command()
            .error(
                ErrorKind::MissingRequiredArgument,
                "Output is required when files are provided (use --output <DIR>)",
            )
            .exit();
    }

    if args.dump_tree {
        return dump_trees(args);
    }
    if !args.json && args.verbosity() != Verbosity::Quiet {
        print_banner(args);
    }

    let backend = BlackFormatter::with_program(&args.formatter);
    let options = args.options();

    let Some(output) = args.output.as_deref().filter(|_| !args.files.is_empty()) else {
        return run_interactive(args, &options, &backend);
    };

    let report = batch::run(&args.files, output, &options, &backend, |path, diagnostics| {
        print_diagnostics(diagnostics, args.verbosity(), Some(&path.display().to_string()));
    })?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("\n{}", report.summary());
    }
    if !report.failed.is_empty() {
        bail!(
            "{} of {} files failed to convert",
            report.failed.len(),
            args.files.len()
        );
    }
    Ok(())
}

/// Startup summary of the selected options.
fn print_banner(args: &ConvertArgs) {
    let output = args
        .output
        .as_deref()
        .map_or_else(|| "None".to_string(), |dir| dir.display().to_string());
    let files: Vec<String> = args
        .files
        .iter()
        .map(|path| path.display().to_string())
        .collect();

    println!();
    println!("HTML to HTPY converter");
    println!("selected options: ");
    println!("              format: {}", args.format);
    println!("  shorthand id class: {}", args.shorthand);
    println!("             imports: {}", args.imports);
    println!("              output: {output}");
    println!("               files: [{}]", files.join(", "));
}

fn run_interactive(
    args: &ConvertArgs,
    options: &ConvertOptions,
    backend: &BlackFormatter,
) -> Result<()> {
    if args.verbosity() != Verbosity::Quiet {
        interactive::print_prompt();
    }
    let markup = read_paste(args)?;

    let conversion = convert(&markup, options, backend).context("could not parse the pasted html")?;
    print_diagnostics(&conversion.diagnostics, args.verbosity(), None);
    if args.verbosity() != Verbosity::Quiet {
        interactive::print_result_banner();
    }
    print!("{}", conversion.source);
    Ok(())
}

fn read_paste(args: &ConvertArgs) -> Result<String> {
    let idle = Duration::from_millis(args.idle_ms);
    interactive::collect_paste(io::BufReader::new(io::stdin()), idle)
        .context("failed to read standard input")
}

/// `--dump-tree`: print how each input was parsed.
fn dump_trees(args: &ConvertArgs) -> Result<()> {
    if args.files.is_empty() {
        let markup = read_paste(args)?;
        let parsed = htpy_html::parse(&markup);
        print_diagnostics(&parsed.diagnostics, args.verbosity(), None);
        return print_tree(args, None, &parsed.tree);
    }

    for path in &args.files {
        let parsed = read_and_parse(path)?;
        let label = path.display().to_string();
        print_diagnostics(&parsed.diagnostics, args.verbosity(), Some(&label));
        print_tree(args, Some(&label), &parsed.tree)?;
    }
    Ok(())
}

fn read_and_parse(path: &Path) -> Result<htpy_html::ParsedDocument> {
    let bytes = std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    htpy_html::parse_bytes(&bytes).with_context(|| format!("failed to parse {}", path.display()))
}

/// JSON form of `--dump-tree`.
#[derive(Serialize)]
struct TreeDump<'a> {
    path: Option<&'a str>,
    forest: Vec<NodeView<'a>>,
}

fn print_tree(args: &ConvertArgs, label: Option<&str>, tree: &DocumentTree) -> Result<()> {
    if args.json {
        let dump = TreeDump {
            path: label,
            forest: tree.forest(),
        };
        println!("{}", serde_json::to_string_pretty(&dump)?);
    } else {
        if let Some(label) = label {
            println!("=== {label} ===");
        }
        print!("{}", format_tree(tree));
    }
    Ok(())
}
