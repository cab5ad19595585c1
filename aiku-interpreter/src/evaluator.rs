use std::rc::Rc;

use aiku_core::ast::{
    BinaryOperator, Expression, ForInStatement, Program, Statement,
};

use crate::environment::Environment;
use crate::value::{Closure, RuntimeError, Value};

pub fn eval_program(
    program: &Program,
    environment: &mut Environment,
) -> Result<Value, RuntimeError> {
    eval_block(&program.body, environment)
}

/// Runs a statement sequence and yields the last executed statement's value.
/// The sequence stops after a `retourner` that is directly one of its own
/// statements; a `retourner` nested in an inner block only ends that block.
fn eval_block(
    statements: &[Statement],
    environment: &mut Environment,
) -> Result<Value, RuntimeError> {
    let mut result = Value::Nil;
    for statement in statements {
        result = eval_statement(statement, environment)?;
        if matches!(statement, Statement::Return(_)) {
            break;
        }
    }
    Ok(result)
}

fn eval_statement(
    statement: &Statement,
    environment: &mut Environment,
) -> Result<Value, RuntimeError> {
    match statement {
        Statement::VariableDeclaration(declaration) => {
            let value = eval_expression(&declaration.value, environment)?;
            environment.define(declaration.name.name.clone(), value.clone());
            Ok(value)
        }
        Statement::FunctionDeclaration(declaration) => {
            // Captures the environment at declaration time; redeclaring the
            // same name overwrites.
            let closure = Value::Closure(Rc::new(Closure {
                params: declaration.params.clone(),
                body: declaration.body.clone(),
                env: environment.clone(),
            }));
            environment.define(declaration.name.name.clone(), closure.clone());
            Ok(closure)
        }
        Statement::Return(statement) => eval_expression(&statement.value, environment),
        Statement::If(statement) => {
            let test = eval_expression(&statement.test, environment)?;
            if is_truthy(&test) {
                eval_block(&statement.consequent, environment)
            } else {
                eval_block(&statement.alternate, environment)
            }
        }
        Statement::ForIn(statement) => eval_for_in(statement, environment),
        Statement::Expression(expression) => eval_expression(expression, environment),
    }
}

fn eval_for_in(
    statement: &ForInStatement,
    environment: &mut Environment,
) -> Result<Value, RuntimeError> {
    let iterable = eval_expression(&statement.iterable, environment)?;
    let Value::List(list) = iterable else {
        return Err(RuntimeError::NotIterable(iterable));
    };
    let items: Vec<Value> = list.borrow().clone();

    // One environment for the whole loop; the variable is re-defined each
    // iteration, so closures made in the body all see its latest value.
    let mut loop_environment = Environment::new_enclosed(environment.clone());
    for item in items {
        loop_environment.define(statement.variable.name.clone(), item);
        eval_block(&statement.body, &mut loop_environment)?;
    }
    Ok(Value::Nil)
}

/// Everything is truthy except `faux` and `rien`; in particular 0 and the
/// empty string are truthy.
pub fn is_truthy(value: &Value) -> bool {
    !matches!(value, Value::Nil | Value::Bool(false))
}

fn eval_expression(
    expression: &Expression,
    environment: &mut Environment,
) -> Result<Value, RuntimeError> {
    match expression {
        Expression::NumberLiteral(value) => Ok(Value::Number(*value)),
        Expression::StringLiteral(value) => Ok(Value::Str(value.clone())),
        Expression::Identifier(identifier) => environment
            .get(&identifier.name)
            .ok_or_else(|| RuntimeError::UndefinedVariable(identifier.name.clone())),
        Expression::ListLiteral(elements) => {
            let values = elements
                .iter()
                .map(|element| eval_expression(element, environment))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::list(values))
        }
        Expression::ListAccess { object, index } => {
            let object = eval_expression(object, environment)?;
            let index = eval_expression(index, environment)?;
            eval_list_access(object, index)
        }
        Expression::Call { callee, arguments } => {
            let function = environment
                .get(&callee.name)
                .ok_or_else(|| RuntimeError::UndefinedVariable(callee.name.clone()))?;
            match function {
                Value::Native(native) => {
                    let arguments = eval_expressions(arguments, environment)?;
                    (native.func)(arguments)
                }
                Value::Closure(closure) => {
                    let arguments = eval_expressions(arguments, environment)?;
                    apply_closure(&closure, arguments)
                }
                other => Err(RuntimeError::NotCallable(other)),
            }
        }
        Expression::Binary {
            operator,
            left,
            right,
        } => {
            let left = eval_expression(left, environment)?;
            let right = eval_expression(right, environment)?;
            eval_binary_operation(*operator, left, right)
        }
    }
}

fn eval_expressions(
    expressions: &[Expression],
    environment: &mut Environment,
) -> Result<Vec<Value>, RuntimeError> {
    let mut result = Vec::new();
    for expression in expressions {
        result.push(eval_expression(expression, environment)?);
    }
    Ok(result)
}

/// Lexical scoping: the call environment encloses the closure's captured
/// environment, never the caller's. Missing arguments bind to `rien`, excess
/// arguments are dropped.
fn apply_closure(closure: &Closure, arguments: Vec<Value>) -> Result<Value, RuntimeError> {
    let mut call_environment = Environment::new_enclosed(closure.env.clone());
    let mut arguments = arguments.into_iter();
    for param in &closure.params {
        call_environment.define(param.name.clone(), arguments.next().unwrap_or(Value::Nil));
    }
    eval_block(&closure.body, &mut call_environment)
}

fn eval_list_access(object: Value, index: Value) -> Result<Value, RuntimeError> {
    let Value::List(list) = object else {
        return Err(RuntimeError::NotIndexable(object));
    };
    let Value::Number(index) = index else {
        return Err(RuntimeError::InvalidIndex(index));
    };
    if index.fract() != 0.0 {
        return Err(RuntimeError::InvalidIndex(Value::Number(index)));
    }
    let list = list.borrow();
    if index < 0.0 || index >= list.len() as f64 {
        return Err(RuntimeError::IndexOutOfBounds {
            index,
            length: list.len(),
        });
    }
    Ok(list[index as usize].clone())
}

fn eval_binary_operation(
    operator: BinaryOperator,
    left: Value,
    right: Value,
) -> Result<Value, RuntimeError> {
    use BinaryOperator::*;
    match operator {
        // `+` concatenates display forms as soon as either side is a string.
        Plus => match (&left, &right) {
            (Value::Str(_), _) | (_, Value::Str(_)) => {
                Ok(Value::Str(format!("{}{}", left, right)))
            }
            (Value::Number(left), Value::Number(right)) => Ok(Value::Number(left + right)),
            _ => Err(RuntimeError::InvalidOperands {
                operator,
                left,
                right,
            }),
        },
        Minus => {
            let (left, right) = numeric_operands(operator, left, right)?;
            Ok(Value::Number(left - right))
        }
        Multiply => {
            let (left, right) = numeric_operands(operator, left, right)?;
            Ok(Value::Number(left * right))
        }
        Divide => {
            let (left, right) = numeric_operands(operator, left, right)?;
            if right == 0.0 {
                return Err(RuntimeError::DivisionByZero);
            }
            Ok(Value::Number(left / right))
        }
        GreaterThan => {
            let (left, right) = numeric_operands(operator, left, right)?;
            Ok(Value::Bool(left > right))
        }
        LessThan => {
            let (left, right) = numeric_operands(operator, left, right)?;
            Ok(Value::Bool(left < right))
        }
        GreaterEqual => {
            let (left, right) = numeric_operands(operator, left, right)?;
            Ok(Value::Bool(left >= right))
        }
        LessEqual => {
            let (left, right) = numeric_operands(operator, left, right)?;
            Ok(Value::Bool(left <= right))
        }
        Equal => Ok(Value::Bool(left == right)),
    }
}

fn numeric_operands(
    operator: BinaryOperator,
    left: Value,
    right: Value,
) -> Result<(f64, f64), RuntimeError> {
    match (&left, &right) {
        (Value::Number(left), Value::Number(right)) => Ok((*left, *right)),
        _ => Err(RuntimeError::InvalidOperands {
            operator,
            left,
            right,
        }),
    }
}
