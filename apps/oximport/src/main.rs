use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use log::{debug, info};
use rayon::prelude::*;
use std::collections::HashSet;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use oximport_core::{
    ModulePool, collect_candidates, find_git_root, globals_for, read_settings,
    read_tsconfig_paths, source_type_for, visit_identifiers, with_program,
};

#[derive(Parser)]
#[command(name = "oximport")]
#[command(about = "Import resolution tools for JavaScript/TypeScript projects", long_about = None)]
struct Cli {
    /// Project root; defaults to the enclosing git checkout.
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List every name a module exports, following re-exports
    Exports { file: PathBuf },
    /// List identifiers used in a file but bound nowhere in scope
    Undefined { file: PathBuf },
    /// Find project files that export the given identifier
    Suggest { identifier: String },
}

fn main() -> Result<()> {
    env_logger::init();

    // stdio is blocked by LineWriter, use a BufWriter to reduce syscalls.
    let mut stdout = BufWriter::new(std::io::stdout());

    let cli = Cli::parse();
    debug!("Parsed CLI arguments: {:?}", cli.command);

    let root = match &cli.root {
        Some(root) => root.clone(),
        None => find_git_root().or_else(|_| std::env::current_dir().map_err(anyhow::Error::from))?,
    };
    debug!("Using project root: {}", root.display());

    let start = Instant::now();

    match cli.command {
        Commands::Exports { file } => {
            let pool = ModulePool::new(root.clone(), read_tsconfig_paths(&root));
            let names = pool.exported_names_of(&file)?;
            if names.is_empty() {
                writeln!(stdout, "{} exports nothing", file.display())?;
            } else {
                for name in &names {
                    writeln!(stdout, "{}", name)?;
                }
            }
            writeln!(
                stdout,
                "\n{} {} names in {}ms.",
                "●".bright_blue(),
                names.len().to_string().cyan(),
                start.elapsed().as_millis().to_string().cyan()
            )?;
            stdout.flush()?;
        }
        Commands::Undefined { file } => {
            let settings = read_settings(&root)?;
            let names = undefined_identifiers(&file, &settings.environments)?;
            for name in &names {
                writeln!(stdout, "{}", name)?;
            }
            writeln!(
                stdout,
                "\n{} {} undefined identifiers in {}ms.",
                "●".bright_blue(),
                names.len().to_string().cyan(),
                start.elapsed().as_millis().to_string().cyan()
            )?;
            stdout.flush()?;
        }
        Commands::Suggest { identifier } => {
            let settings = read_settings(&root)?;
            let pool = ModulePool::new(root.clone(), read_tsconfig_paths(&root));
            let candidates = collect_candidates(&root, &settings.excludes)?;
            info!(
                "Scanning {} candidate files on {} threads",
                candidates.len(),
                rayon::current_num_threads()
            );

            let mut matches: Vec<PathBuf> = candidates
                .par_iter()
                .filter(|path| match pool.exported_names_of(path) {
                    Ok(names) => names.iter().any(|n| n == &identifier),
                    Err(e) => {
                        debug!("Skipping {}: {}", path.display(), e);
                        false
                    }
                })
                .cloned()
                .collect();
            matches.sort();

            for path in &matches {
                let shown = path.strip_prefix(&root).unwrap_or(path);
                writeln!(stdout, "{}", shown.display())?;
            }
            writeln!(
                stdout,
                "\n{} {} of {} files export '{}' ({}ms).",
                "●".bright_blue(),
                matches.len().to_string().cyan(),
                candidates.len().to_string().cyan(),
                identifier.green(),
                start.elapsed().as_millis().to_string().cyan()
            )?;
            stdout.flush()?;

            if matches.is_empty() {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

/// Names used in the file that are neither bound in scope nor supplied by a
/// configured environment; these are the candidates an editor would want an
/// import inserted for. JSX tags only count when capitalized, since
/// lowercase tags are host intrinsics.
fn undefined_identifiers(file: &Path, environments: &[String]) -> Result<Vec<String>> {
    let source = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let globals: HashSet<&str> = globals_for(environments).into_iter().collect();

    let mut seen = HashSet::new();
    let mut undefined = Vec::new();
    with_program(&source, source_type_for(file), |program| {
        visit_identifiers(program, |obs| {
            if obs.is_binding || (obs.is_reference && !obs.is_markup) {
                return;
            }
            if obs.is_markup && !obs.name.starts_with(char::is_uppercase) {
                return;
            }
            if obs.defined_in_scope.contains(&obs.name) || globals.contains(obs.name.as_str()) {
                return;
            }
            if seen.insert(obs.name.clone()) {
                undefined.push(obs.name.clone());
            }
        });
    })?;

    Ok(undefined)
}
