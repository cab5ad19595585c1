use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::value::{RuntimeError, Value};

#[derive(Debug)]
struct EnvironmentCore {
    store: HashMap<Rc<str>, Value>,
    outer: Option<Environment>,
}

/// A scope in the chain. Cloning yields another handle to the same scope, so
/// closures can share their defining environment with the code that runs in
/// it.
#[derive(Debug, Clone)]
pub struct Environment {
    inner: Rc<RefCell<EnvironmentCore>>,
}

impl Environment {
    pub fn new() -> Self {
        Environment {
            inner: Rc::new(RefCell::new(EnvironmentCore {
                store: HashMap::new(),
                outer: None,
            })),
        }
    }

    pub fn new_enclosed(outer: Environment) -> Environment {
        Environment {
            inner: Rc::new(RefCell::new(EnvironmentCore {
                store: HashMap::new(),
                outer: Some(outer),
            })),
        }
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        let env = self.inner.borrow();
        env.store
            .get(key)
            .cloned()
            .or_else(|| env.outer.as_ref().and_then(|outer| outer.get(key)))
    }

    /// Binds in the current scope, shadowing any outer binding of the name.
    pub fn define(&mut self, key: Rc<str>, value: Value) {
        self.inner.borrow_mut().store.insert(key, value);
    }

    /// Rebinds the nearest enclosing scope that already defines the name.
    /// A binding is never created: reaching the root without finding one is a
    /// name error.
    pub fn assign(&mut self, key: &str, value: Value) -> Result<(), RuntimeError> {
        let mut env = self.inner.borrow_mut();
        if let Some(slot) = env.store.get_mut(key) {
            *slot = value;
            return Ok(());
        }
        match env.outer.as_mut() {
            Some(outer) => outer.assign(key, value),
            None => Err(RuntimeError::AssignToUndefined(key.into())),
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_walks_the_chain() {
        let mut outer = Environment::new();
        outer.define("x".into(), Value::Number(1.0));
        let inner = Environment::new_enclosed(outer);

        assert_eq!(inner.get("x"), Some(Value::Number(1.0)));
        assert_eq!(inner.get("y"), None);
    }

    #[test]
    fn test_define_shadows() {
        let mut outer = Environment::new();
        outer.define("x".into(), Value::Number(1.0));
        let mut inner = Environment::new_enclosed(outer.clone());
        inner.define("x".into(), Value::Number(2.0));

        assert_eq!(inner.get("x"), Some(Value::Number(2.0)));
        assert_eq!(outer.get("x"), Some(Value::Number(1.0)));
    }

    #[test]
    fn test_assign_mutates_nearest_defining_scope() {
        let mut outer = Environment::new();
        outer.define("x".into(), Value::Number(1.0));
        let mut inner = Environment::new_enclosed(outer.clone());

        assert_eq!(inner.assign("x", Value::Number(5.0)), Ok(()));
        assert_eq!(outer.get("x"), Some(Value::Number(5.0)));
        // No binding was created in the inner scope itself.
        assert!(inner.inner.borrow().store.is_empty());
    }

    #[test]
    fn test_assign_never_creates_a_binding() {
        let mut inner = Environment::new_enclosed(Environment::new());
        assert_eq!(
            inner.assign("x", Value::Number(5.0)),
            Err(RuntimeError::AssignToUndefined("x".into()))
        );
        assert_eq!(inner.get("x"), None);
    }
}
