//! DevCamper entry point
//!
//! Parses arguments and dispatches to the CLI module; errors go to
//! stderr with a non-zero exit code.

use devcamper::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
