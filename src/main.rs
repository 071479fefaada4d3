//! Binary entry point for `polyver`.

use std::process;

fn main() {
    if let Err(e) = polyver::run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
