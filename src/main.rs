//! okschema CLI entry point
//!
//! This is a minimal entrypoint that:
//! 1. Parses CLI arguments and dispatches commands (via cli::run)
//! 2. Prints failures as a JSON response on stdout
//! 3. Exits with non-zero on failure
//!
//! All logic is delegated to the CLI module.

use okschema::cli;

fn main() {
    if let Err(e) = cli::run() {
        if cli::report(&e).is_err() {
            eprintln!("{}", e);
        }
        std::process::exit(e.exit_code());
    }
}
