use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use aiku_core::lexer::Lexer;
use aiku_core::parser::Parser;
use aiku_interpreter::builtins;
use aiku_interpreter::environment::Environment;
use aiku_interpreter::evaluator;
use aiku_interpreter::value::Value;

const PROMPT: &str = "aiku> ";

pub fn start() -> Result<(), ReadlineError> {
    println!("Bienvenue dans le REPL Aiku! (Tapez \"quitter\" pour sortir)");

    // One environment for the whole session, so bindings persist across lines.
    let mut environment = builtins::global_environment();
    let mut rl = DefaultEditor::new()?;

    loop {
        let line = match rl.readline(PROMPT) {
            Err(ReadlineError::Interrupted) => continue, // Clear line
            Err(ReadlineError::Eof) => break,
            Err(err) => return Err(err),
            Ok(line) => line,
        };

        if line.trim().eq_ignore_ascii_case("quitter") {
            break;
        }
        rl.add_history_entry(line.as_str())?;

        match run_line(&line, &mut environment) {
            Ok(Value::Nil) => {}
            Ok(value) => println!("{}", value),
            Err(err) => eprintln!("Erreur: {err}"),
        }
    }

    println!("Au revoir!");
    Ok(())
}

fn run_line(
    line: &str,
    environment: &mut Environment,
) -> Result<Value, aiku_interpreter::Error> {
    let tokens = Lexer::new(line).tokenize()?;
    let program = Parser::new(tokens).parse_program()?;
    Ok(evaluator::eval_program(&program, environment)?)
}
