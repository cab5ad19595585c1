use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use crate::environment::Environment;
use crate::value::{NativeFunction, Value};

/// Where `afficher` writes. The host owns the sink; the interpreter only ever
/// appends lines to it.
pub type OutputSink = Rc<RefCell<dyn Write>>;

/// Fresh root environment printing to stdout.
pub fn global_environment() -> Environment {
    global_environment_with_output(Rc::new(RefCell::new(io::stdout())))
}

/// Fresh root environment with the native capabilities bound, printing to the
/// given sink.
pub fn global_environment_with_output(output: OutputSink) -> Environment {
    let mut env = Environment::new();
    env.define("afficher".into(), Value::Native(afficher(output)));
    env.define("liste".into(), Value::Native(liste()));
    env
}

/// Variadic print: joins the display forms with single spaces, writes the
/// line, and returns the joined text.
fn afficher(output: OutputSink) -> NativeFunction {
    NativeFunction::new("afficher", move |args: Vec<Value>| {
        let line = args
            .iter()
            .map(|value| value.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        // Printing is best effort: a sink write failure is not a language
        // error, and the call still yields the joined text.
        let _ = writeln!(output.borrow_mut(), "{}", line);
        Ok(Value::Str(line))
    })
}

/// Identity constructor: its arguments, as a fresh list.
fn liste() -> NativeFunction {
    NativeFunction::new("liste", |args: Vec<Value>| Ok(Value::list(args)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(env: &Environment, name: &str, args: Vec<Value>) -> Value {
        match env.get(name) {
            Some(Value::Native(native)) => (native.func)(args).unwrap(),
            other => panic!("expected the native {}, got {:?}", name, other),
        }
    }

    #[test]
    fn test_afficher_joins_and_returns() {
        let buffer = Rc::new(RefCell::new(Vec::<u8>::new()));
        let env = global_environment_with_output(buffer.clone());

        let result = call(
            &env,
            "afficher",
            vec![
                Value::Str("total".to_owned()),
                Value::Number(8.0),
                Value::Nil,
            ],
        );

        assert_eq!(result, Value::Str("total 8 rien".to_owned()));
        assert_eq!(
            String::from_utf8(buffer.borrow().clone()).unwrap(),
            "total 8 rien\n"
        );
    }

    #[test]
    fn test_liste_builds_a_list_of_its_arguments() {
        let buffer = Rc::new(RefCell::new(Vec::<u8>::new()));
        let env = global_environment_with_output(buffer);

        let result = call(
            &env,
            "liste",
            vec![Value::Number(1.0), Value::Str("a".to_owned())],
        );

        let Value::List(elements) = result else {
            panic!("expected a list");
        };
        assert_eq!(
            *elements.borrow(),
            vec![Value::Number(1.0), Value::Str("a".to_owned())]
        );
    }
}
