pub mod builtins;
pub mod environment;
pub mod evaluator;
pub mod value;

use thiserror::Error;

use aiku_core::lexer::{LexError, Lexer};
use aiku_core::parser::{ParseError, Parser};

use crate::builtins::OutputSink;
use crate::environment::Environment;
use crate::value::{RuntimeError, Value};

/// Any failure an execution can end with, tagged by pipeline stage.
#[derive(Debug, PartialEq, Error)]
pub enum Error {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

/// Lexes, parses and interprets a whole source text in a fresh root
/// environment, printing to stdout. Returns the last statement's value.
pub fn execute(source: &str) -> Result<Value, Error> {
    run(source, builtins::global_environment())
}

/// Same as [`execute`], with `afficher` writing to a caller-supplied sink.
pub fn execute_with_output(source: &str, output: OutputSink) -> Result<Value, Error> {
    run(source, builtins::global_environment_with_output(output))
}

fn run(source: &str, mut environment: Environment) -> Result<Value, Error> {
    let tokens = Lexer::new(source).tokenize()?;
    let program = Parser::new(tokens).parse_program()?;
    Ok(evaluator::eval_program(&program, &mut environment)?)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    fn run(source: &str) -> (Result<Value, Error>, String) {
        let buffer = Rc::new(RefCell::new(Vec::<u8>::new()));
        let result = execute_with_output(source, buffer.clone());
        let output = String::from_utf8(buffer.borrow().clone()).unwrap();
        (result, output)
    }

    #[test]
    fn test_executes_a_simple_program() {
        let (result, output) = run(
            "variable x = 5
             variable y = 3
             variable resultat = x + y
             afficher(resultat)",
        );
        assert_eq!(result, Ok(Value::Str("8".to_owned())));
        assert_eq!(output, "8\n");
    }

    #[test]
    fn test_each_stage_reports_its_own_error() {
        assert_eq!(
            execute("variable x = 5;"),
            Err(Error::Lex(LexError::UnexpectedCharacter {
                character: ';',
                position: 14
            }))
        );
        assert!(matches!(
            execute("fonction f() retourner 1"),
            Err(Error::Parse(ParseError::UnexpectedEndOfInput { .. }))
        ));
        assert_eq!(
            execute("inconnu"),
            Err(Error::Runtime(RuntimeError::UndefinedVariable(
                "inconnu".into()
            )))
        );
    }

    #[test]
    fn test_runs_are_independent() {
        // Bindings never leak between executions.
        assert_eq!(execute("variable x = 5"), Ok(Value::Number(5.0)));
        assert_eq!(
            execute("x"),
            Err(Error::Runtime(RuntimeError::UndefinedVariable("x".into())))
        );
    }
}
