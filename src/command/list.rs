use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;

use crate::error::Result;
use crate::workspace::{self, LoadConfig};

#[derive(Parser, Debug, Clone)]
pub struct ListArgs {
    /// Workspace root directory
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Ecosystem to load (rush, pnpm, npm, cargo, python or an alias),
    /// or "auto" to detect
    #[arg(long, short = 'e', default_value = "auto")]
    pub ecosystem: String,

    /// Glob pattern overriding the ecosystem's package patterns (repeatable)
    #[arg(long = "pattern", value_name = "GLOB")]
    pub patterns: Vec<String>,

    /// Print the workspace as JSON
    #[arg(long)]
    pub json: bool,
}

impl ListArgs {
    pub fn load_config(&self) -> LoadConfig {
        LoadConfig {
            package_patterns: if self.patterns.is_empty() {
                None
            } else {
                Some(self.patterns.clone())
            },
        }
    }
}

pub fn execute(args: ListArgs) -> Result<()> {
    let manager = workspace::resolve(&args.root, Some(args.ecosystem.as_str()))?;
    let ws = manager.load(&args.root, &args.load_config())?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&ws)?);
        return Ok(());
    }

    println!(
        "{} workspace at {}",
        ws.ecosystem.to_string().cyan().bold(),
        ws.root.display()
    );

    if ws.packages.is_empty() {
        println!("\n{}", "No packages found".yellow());
        return Ok(());
    }

    let name_width = ws
        .packages
        .iter()
        .map(|p| p.name.len())
        .max()
        .unwrap_or(0);

    println!();
    for pkg in &ws.packages {
        // Pad before coloring; ANSI escapes would break width formatting
        let name = format!("{:<name_width$}", pkg.name);
        let version = format!("{:<12}", pkg.version);
        println!(
            "  {}  {}  {}",
            name.bold(),
            version.green(),
            pkg.relative_path.dimmed(),
        );
    }

    println!(
        "\n{} {}",
        ws.packages.len().to_string().cyan().bold(),
        if ws.packages.len() == 1 {
            "package"
        } else {
            "packages"
        }
    );

    Ok(())
}
