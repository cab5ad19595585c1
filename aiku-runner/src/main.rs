mod repl;
mod runner;

use clap::Parser;
use std::path::PathBuf;

/// Interpréteur pour le langage Aiku.
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Fichier .aiku à exécuter; sans fichier, démarre le REPL.
    path: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    match cli.path {
        None => {
            if let Err(err) = repl::start() {
                eprintln!("Erreur: {err}");
                std::process::exit(1);
            }
        }
        Some(path) => runner::run_file(&path),
    }
}
