//! CLI parse: clap types for rngr. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// rngr - constraint-based random graph generation
#[derive(Parser, Debug)]
#[command(name = "rngr")]
#[command(about = "Generate random graphs with degree and connectivity constraints")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (layered over the global config file)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (default: off)
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the request limits
    Limits,
    /// Generate one graph and print it
    Generate {
        /// Graph request as JSON, or @path to read it from a file
        #[arg(long)]
        spec: String,
        /// Output format (matrix, json, dot)
        #[arg(long, default_value = "matrix")]
        graph_kind: String,
    },
    /// Submit a batch, wait for every job and print the batch
    Batch {
        /// JSON array of graph requests or {"number": n, "base": request}, or @path
        #[arg(long)]
        specs: String,
        /// Also write every finished graph into this zip archive
        #[arg(long)]
        archive: Option<PathBuf>,
        /// Format of the archived graphs (matrix, json, dot)
        #[arg(long, default_value = "matrix")]
        graph_kind: String,
    },
    /// Send one request through the API router and print the response
    Request {
        /// HTTP method
        method: String,
        /// Request target, e.g. /api/v1/limits
        path: String,
        /// Request body
        #[arg(long)]
        body: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_generate() {
        let cli = Cli::try_parse_from([
            "rngr",
            "--verbose",
            "generate",
            "--spec",
            r#"{"type": "exact-degree", "nodes": 4, "node_degree": 2}"#,
            "--graph-kind",
            "dot",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Generate { spec, graph_kind } => {
                assert!(spec.contains("exact-degree"));
                assert_eq!(graph_kind, "dot");
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_request() {
        let cli = Cli::try_parse_from(["rngr", "request", "GET", "/api/v1/limits"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Request { ref method, ref path, body: None } if method == "GET" && path == "/api/v1/limits"
        ));
    }

    #[test]
    fn test_parse_batch_archive() {
        let cli = Cli::try_parse_from([
            "rngr",
            "batch",
            "--specs",
            "[]",
            "--archive",
            "graphs.zip",
        ])
        .unwrap();
        match cli.command {
            Commands::Batch {
                archive,
                graph_kind,
                ..
            } => {
                assert_eq!(archive, Some(PathBuf::from("graphs.zip")));
                assert_eq!(graph_kind, "matrix");
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_generate_requires_spec() {
        assert!(Cli::try_parse_from(["rngr", "generate"]).is_err());
    }
}
