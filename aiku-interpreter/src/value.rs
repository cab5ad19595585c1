use std::cell::RefCell;
use std::fmt::Display;
use std::rc::Rc;

use aiku_core::ast;
use thiserror::Error;

use crate::environment::Environment;

/// Runtime values. Lists and closures are reference values: cloning a `Value`
/// clones the handle, never the backing store.
#[derive(Debug, Clone)]
pub enum Value {
    Nil,
    Bool(bool),
    Number(f64),
    Str(String),
    List(Rc<RefCell<Vec<Value>>>),
    Closure(Rc<Closure>),
    Native(NativeFunction),
}

impl Value {
    pub fn list(elements: Vec<Value>) -> Value {
        Value::List(Rc::new(RefCell::new(elements)))
    }
}

/// Language equality: value equality for scalars, identity for lists,
/// closures and natives.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(left), Value::Bool(right)) => left == right,
            (Value::Number(left), Value::Number(right)) => left == right,
            (Value::Str(left), Value::Str(right)) => left == right,
            (Value::List(left), Value::List(right)) => Rc::ptr_eq(left, right),
            (Value::Closure(left), Value::Closure(right)) => Rc::ptr_eq(left, right),
            (Value::Native(left), Value::Native(right)) => left == right,
            _ => false,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Nil => write!(f, "rien"),
            Value::Bool(true) => write!(f, "vrai"),
            Value::Bool(false) => write!(f, "faux"),
            Value::Number(value) => write!(f, "{}", value),
            Value::Str(value) => write!(f, "{}", value),
            Value::List(elements) => {
                write!(f, "[")?;
                for (i, element) in elements.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", element)?;
                }
                write!(f, "]")
            }
            Value::Closure(_) => write!(f, "<fonction>"),
            Value::Native(native) => write!(f, "<native {}>", native.name),
        }
    }
}

pub struct Closure {
    pub params: Vec<ast::Identifier>,
    pub body: Vec<ast::Statement>,
    pub env: Environment,
}

// The captured environment may hold the closure itself, so Debug stays at the
// pointer level.
impl std::fmt::Debug for Closure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Closure")
            .field("ptr", &(self as *const Closure as usize))
            .finish()
    }
}

#[derive(Clone)]
pub struct NativeFunction {
    pub name: Rc<str>,
    #[allow(clippy::type_complexity)]
    pub func: Rc<dyn Fn(Vec<Value>) -> Result<Value, RuntimeError>>,
}

impl NativeFunction {
    pub fn new(
        name: impl Into<Rc<str>>,
        func: impl Fn(Vec<Value>) -> Result<Value, RuntimeError> + 'static,
    ) -> Self {
        NativeFunction {
            name: name.into(),
            func: Rc::new(func),
        }
    }
}

impl PartialEq for NativeFunction {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.func, &other.func)
    }
}

impl std::fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeFunction")
            .field("name", &self.name)
            .finish()
    }
}

#[derive(Debug, PartialEq, Error)]
pub enum RuntimeError {
    // NameError
    #[error("variable \"{0}\" is not defined")]
    UndefinedVariable(Rc<str>),
    #[error("cannot assign to undefined variable \"{0}\"")]
    AssignToUndefined(Rc<str>),

    // TypeError
    #[error("{0} is not a function")]
    NotCallable(Value),
    #[error("can only iterate over lists, got {0}")]
    NotIterable(Value),
    #[error("cannot index into {0}")]
    NotIndexable(Value),
    #[error("operator '{}' cannot be applied to {} and {}", .operator.as_str(), .left, .right)]
    InvalidOperands {
        operator: ast::BinaryOperator,
        left: Value,
        right: Value,
    },

    // IndexError
    #[error("list index must be a whole number, got {0}")]
    InvalidIndex(Value),
    #[error("list index {index} out of bounds for length {length}")]
    IndexOutOfBounds { index: f64, length: usize },

    // ArithmeticError
    #[error("division by zero")]
    DivisionByZero,
}
