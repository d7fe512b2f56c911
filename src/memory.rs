use crate::Error;
use crate::ast::Value;
use crate::primitives::is_primitive_name;
use std::collections::{HashMap, HashSet};

/// Symbol table for name resolution
///
/// There is no parent pointer. A local scope is a full copy of its enclosing memory
/// ([`Memory::snapshot`]) plus its own bindings, so scopes never share state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Memory {
    bindings: HashMap<String, Value>,
}

impl Memory {
    pub fn new() -> Self {
        Memory {
            bindings: HashMap::new(),
        }
    }

    /// Copy this memory for use as a local scope
    pub fn snapshot(&self) -> Memory {
        self.clone()
    }

    /// Bind `name`, replacing any earlier binding. Names carrying the primitive
    /// marker are reserved.
    pub fn define(&mut self, name: &str, value: Value) -> Result<(), Error> {
        if is_primitive_name(name) {
            return Err(Error::PrimitiveRedefinition(name.to_owned()));
        }
        self.bindings.insert(name.to_owned(), value);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.bindings.get(name)
    }

    /// Follow a chain of bindings starting at `name` until it reaches a value that is
    /// not a bound symbol. An unbound name resolves to itself, and a cycle stops at the
    /// first symbol seen twice.
    pub fn resolve(&self, name: &str) -> Value {
        let mut seen = HashSet::new();
        let mut current = name;
        loop {
            if !seen.insert(current) {
                return Value::Symbol(current.to_owned());
            }
            match self.bindings.get(current) {
                Some(Value::Symbol(next)) => current = next,
                Some(value) => return value.clone(),
                None => return Value::Symbol(current.to_owned()),
            }
        }
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Get all bindings
    /// Returns a Vec of (name, value) pairs sorted by name
    pub fn get_all_bindings(&self) -> Vec<(String, Value)> {
        let mut result: Vec<_> = self
            .bindings
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        result.sort_by(|a, b| a.0.cmp(&b.0));
        result
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used)] // test code OK
mod tests {
    use super::*;
    use crate::ast::{sym, val};

    #[test]
    fn test_define_and_get() {
        let mut memory = Memory::new();
        assert!(memory.is_empty());

        memory.define("a", val(10)).unwrap();
        assert_eq!(memory.get("a"), Some(&val(10)));
        assert_eq!(memory.get("b"), None);

        memory.define("a", val("redefined")).unwrap();
        assert_eq!(memory.get("a"), Some(&val("redefined")));
        assert_eq!(memory.len(), 1);
    }

    #[test]
    fn test_primitive_names_are_reserved() {
        let mut memory = Memory::new();
        assert_eq!(
            memory.define("%+", val(1)),
            Err(Error::PrimitiveRedefinition("%+".to_owned()))
        );
        assert!(memory.is_empty());
    }

    #[test]
    fn test_resolve_follows_chains() {
        let mut memory = Memory::new();
        memory.define("a", sym("b")).unwrap();
        memory.define("b", sym("c")).unwrap();
        memory.define("c", val(3)).unwrap();
        memory.define("self", sym("self")).unwrap();
        memory.define("ping", sym("pong")).unwrap();
        memory.define("pong", sym("ping")).unwrap();

        assert_eq!(memory.resolve("a"), val(3));
        assert_eq!(memory.resolve("c"), val(3));
        assert_eq!(memory.resolve("unbound"), sym("unbound"));
        assert_eq!(memory.resolve("self"), sym("self"));
        assert_eq!(memory.resolve("ping"), sym("ping"));
    }

    #[test]
    fn test_snapshot_is_independent() {
        let mut global = Memory::new();
        global.define("x", val(1)).unwrap();

        let mut local = global.snapshot();
        local.define("x", val(2)).unwrap();
        local.define("y", val(3)).unwrap();

        assert_eq!(global.get("x"), Some(&val(1)));
        assert_eq!(global.get("y"), None);
        assert_eq!(local.get("x"), Some(&val(2)));
    }

    #[test]
    fn test_get_all_bindings_sorted() {
        let mut memory = Memory::new();
        memory.define("zeta", val(1)).unwrap();
        memory.define("alpha", val(2)).unwrap();
        let names: Vec<_> = memory
            .get_all_bindings()
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }
}
