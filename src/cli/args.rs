//! CLI argument definitions using clap
//!
//! Commands:
//! - okschema validate --schema <path> [--data <path>] [--config <path>] [flags]
//! - okschema check --schema <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// okschema - validate JSON documents against a recursive schema
#[derive(Parser, Debug)]
#[command(name = "okschema")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate a document and print the coerced result
    Validate {
        /// Path to the JSON schema
        #[arg(long)]
        schema: PathBuf,

        /// Path to the JSON document (stdin when omitted)
        #[arg(long)]
        data: Option<PathBuf>,

        /// Path to an engine configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Parse ints, floats and bools out of strings
        #[arg(long)]
        cast_from_string: bool,

        /// Accept infinite and NaN decimals
        #[arg(long)]
        allow_not_finite: bool,

        /// Require values that already have their declared types
        #[arg(long)]
        strict_types: bool,

        /// Log schema and validation events to stderr
        #[arg(long, short)]
        verbose: bool,
    },

    /// Compile a schema and report its defects
    Check {
        /// Path to the JSON schema
        #[arg(long)]
        schema: PathBuf,

        /// Log schema events to stderr
        #[arg(long, short)]
        verbose: bool,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_validate_flags() {
        let cli = Cli::parse_from([
            "okschema",
            "validate",
            "--schema",
            "schema.json",
            "--cast-from-string",
            "-v",
        ]);
        match cli.command {
            Command::Validate {
                schema,
                data,
                cast_from_string,
                strict_types,
                verbose,
                ..
            } => {
                assert_eq!(schema, PathBuf::from("schema.json"));
                assert!(data.is_none());
                assert!(cast_from_string);
                assert!(!strict_types);
                assert!(verbose);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_schema_is_required() {
        assert!(Cli::try_parse_from(["okschema", "check"]).is_err());
    }
}
