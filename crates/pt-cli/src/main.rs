#![forbid(unsafe_code)]

//! probtree CLI - compile and validate probability-tree text.
//!
//! # Commands
//!
//! - `compile`: Compile tree text into graph elements JSON
//! - `validate`: Check input and report a structured diagnostic
//! - `stats`: Summarize the resolved tree (counts, depth, leaf probabilities)

use std::io::{self, Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pt_core::{CompileError, LabelMetrics, LabelMetricsConfig, TreeNode, format_percent};
use pt_parser::{parse_text_with_metrics, parse_tree};
use serde::Serialize;
use tracing::{debug, info};

/// probtree CLI - compile and validate probability-tree text.
#[derive(Debug, Parser)]
#[command(
    name = "pt-cli",
    version,
    about = "probtree CLI - compile and validate probability-tree text",
    long_about = "Compiles indentation-structured probability trees into the\n\
        flat node/edge element format consumed by the graph view.\n\n\
        Lines nest by indentation; a trailing parenthesized value is the\n\
        branch probability: \"Heads (50%)\" or \"Heads (0.5)\"."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose logging (can be repeated for more detail: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Compile tree text into graph elements JSON.
    Compile {
        /// Input file path or "-" for stdin. If omitted, reads from stdin.
        #[arg(default_value = "-")]
        input: String,

        /// Line number of the first input line; reported error lines are
        /// offset by this.
        #[arg(short = 'l', long, default_value_t = 0)]
        starting_line: usize,

        /// Maximum label characters per wrapped line
        #[arg(long)]
        wrap: Option<usize>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,

        /// Output file path. If omitted, writes to stdout.
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Validate tree text and report a structured diagnostic.
    Validate {
        /// Input file path or "-" for stdin.
        #[arg(default_value = "-")]
        input: String,

        /// Line number of the first input line.
        #[arg(short = 'l', long, default_value_t = 0)]
        starting_line: usize,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Summarize the resolved tree: counts, depth, leaf path probabilities.
    Stats {
        /// Input file path or "-" for stdin.
        #[arg(default_value = "-")]
        input: String,

        /// Line number of the first input line.
        #[arg(short = 'l', long, default_value_t = 0)]
        starting_line: usize,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Result of validating an input.
#[derive(Debug, Serialize)]
struct ValidateResult {
    valid: bool,
    node_count: usize,
    edge_count: usize,
    error: Option<ErrorReport>,
}

/// A compile error in machine-readable form.
#[derive(Debug, Serialize)]
struct ErrorReport {
    code: String,
    message: String,
    line: usize,
}

impl ErrorReport {
    fn from_error(error: &CompileError) -> Self {
        Self {
            code: error.code().as_str().to_string(),
            message: error.message().to_string(),
            line: error.line(),
        }
    }
}

/// Result of summarizing a tree.
#[derive(Debug, Serialize)]
struct StatsResult {
    node_count: usize,
    edge_count: usize,
    depth: usize,
    leaf_count: usize,
    leaves: Vec<LeafStat>,
}

#[derive(Debug, Serialize)]
struct LeafStat {
    label: String,
    line: usize,
    /// Product of branch probabilities from the root, canonical percentage;
    /// absent when any link on the path is unannotated.
    path_probability: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.quiet);

    match cli.command {
        Command::Compile {
            input,
            starting_line,
            wrap,
            pretty,
            output,
        } => cmd_compile(&input, starting_line, wrap, pretty, output.as_deref()),

        Command::Validate {
            input,
            starting_line,
            json,
        } => cmd_validate(&input, starting_line, json),

        Command::Stats {
            input,
            starting_line,
            json,
        } => cmd_stats(&input, starting_line, json),
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .without_time()
        .try_init();
}

fn load_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read from stdin")?;
        Ok(buffer)
    } else if Path::new(input).exists() {
        std::fs::read_to_string(input).context(format!("Failed to read file: {input}"))
    } else {
        // Treat as inline tree text
        Ok(input.to_string())
    }
}

fn write_output(output: Option<&str>, content: &str) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, content).context(format!("Failed to write to: {path}"))?;
            info!("Wrote output to: {path}");
        }
        None => {
            io::stdout()
                .write_all(content.as_bytes())
                .context("Failed to write to stdout")?;
            io::stdout()
                .write_all(b"\n")
                .context("Failed to write to stdout")?;
        }
    }
    Ok(())
}

fn label_metrics(wrap: Option<usize>) -> LabelMetrics {
    let mut config = LabelMetricsConfig::default();
    if let Some(max) = wrap {
        config.max_line_graphemes = max.max(1);
    }
    LabelMetrics::new(config)
}

fn report_and_exit(error: &CompileError) -> ! {
    eprintln!("error[{}]: {error}", error.code().as_str());
    std::process::exit(1);
}

// =============================================================================
// Command: compile
// =============================================================================

fn cmd_compile(
    input: &str,
    starting_line: usize,
    wrap: Option<usize>,
    pretty: bool,
    output: Option<&str>,
) -> Result<()> {
    let source = load_input(input)?;
    let metrics = label_metrics(wrap);

    let elements = match parse_text_with_metrics(&source, starting_line, &metrics) {
        Ok(elements) => elements,
        Err(error) => report_and_exit(&error),
    };

    debug!(
        "Compiled {} elements ({} nodes)",
        elements.len(),
        elements.iter().filter(|e| e.is_node()).count()
    );

    let json = if pretty {
        serde_json::to_string_pretty(&elements)?
    } else {
        serde_json::to_string(&elements)?
    };
    write_output(output, &json)
}

// =============================================================================
// Command: validate
// =============================================================================

fn cmd_validate(input: &str, starting_line: usize, json_output: bool) -> Result<()> {
    let source = load_input(input)?;

    let result = match parse_tree(&source, starting_line) {
        Ok(tree) => {
            let node_count = tree.as_ref().map_or(0, TreeNode::node_count);
            ValidateResult {
                valid: true,
                node_count,
                edge_count: node_count.saturating_sub(1),
                error: None,
            }
        }
        Err(error) => ValidateResult {
            valid: false,
            node_count: 0,
            edge_count: 0,
            error: Some(ErrorReport::from_error(&error)),
        },
    };

    if json_output {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else if result.valid {
        println!("✓ Valid probability tree");
        println!("  Nodes: {}", result.node_count);
        println!("  Edges: {}", result.edge_count);
    } else if let Some(error) = &result.error {
        println!("✗ Invalid probability tree");
        println!("  [{}] line {}: {}", error.code, error.line, error.message);
    }

    if !result.valid {
        std::process::exit(1);
    }
    Ok(())
}

// =============================================================================
// Command: stats
// =============================================================================

fn cmd_stats(input: &str, starting_line: usize, json_output: bool) -> Result<()> {
    let source = load_input(input)?;

    let tree = match parse_tree(&source, starting_line) {
        Ok(tree) => tree,
        Err(error) => report_and_exit(&error),
    };

    let result = stats_for(tree.as_ref());

    if json_output {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("Nodes:  {}", result.node_count);
        println!("Edges:  {}", result.edge_count);
        println!("Depth:  {}", result.depth);
        println!("Leaves: {}", result.leaf_count);
        for leaf in &result.leaves {
            let probability = leaf.path_probability.as_deref().unwrap_or("-");
            println!("  {} (line {}): {}", leaf.label, leaf.line, probability);
        }
    }

    Ok(())
}

fn stats_for(tree: Option<&TreeNode>) -> StatsResult {
    let Some(root) = tree else {
        return StatsResult {
            node_count: 0,
            edge_count: 0,
            depth: 0,
            leaf_count: 0,
            leaves: Vec::new(),
        };
    };

    let leaves: Vec<LeafStat> = root
        .leaves()
        .into_iter()
        .map(|leaf| LeafStat {
            label: leaf.label.clone(),
            line: leaf.line_number,
            path_probability: leaf.cumulative.map(format_percent),
        })
        .collect();

    let node_count = root.node_count();
    StatsResult {
        node_count,
        edge_count: node_count - 1,
        depth: root.depth(),
        leaf_count: leaves.len(),
        leaves,
    }
}
