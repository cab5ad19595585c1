use std::path::Path;
use std::process;

use aiku_interpreter::execute;

/// Reads and executes a source file; reports failures on stderr and exits
/// with status 1.
pub fn run_file(path: &Path) {
    let source = match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("Erreur lors de la lecture du fichier: {err}");
            process::exit(1);
        }
    };

    if let Err(err) = execute(&source) {
        eprintln!("Erreur: {err}");
        process::exit(1);
    }
}
