//! The universe scope: predeclared types visible in every file.

use std::collections::HashMap;

use super::{Alias, BasicKind, Interface, Named, Type, TypeArena, TypeId};

/// Predeclared types installed into an arena.
#[derive(Debug, Clone)]
pub struct Universe {
    scope: HashMap<&'static str, TypeId>,
    unsafe_pointer: TypeId,
}

impl Universe {
    pub fn install(arena: &mut TypeArena) -> Self {
        let mut scope = HashMap::new();
        for (name, kind) in BasicKind::universe() {
            scope.insert(name, arena.alloc(Type::Basic(kind)));
        }

        let error_iface = arena.alloc(Type::Interface(Interface { elements: 1 }));
        let error = arena.alloc(Type::Named(Named {
            name: "error".to_string(),
            package: None,
            underlying: error_iface,
        }));
        scope.insert("error", error);

        let empty = arena.alloc(Type::Interface(Interface::default()));
        let any = arena.alloc(Type::Alias(Alias {
            name: "any".to_string(),
            target: empty,
        }));
        scope.insert("any", any);

        let unsafe_pointer = arena.alloc(Type::Basic(BasicKind::UnsafePointer));

        Self {
            scope,
            unsafe_pointer,
        }
    }

    pub fn lookup(&self, name: &str) -> Option<TypeId> {
        self.scope.get(name).copied()
    }

    /// `unsafe.Pointer`.
    pub fn unsafe_pointer(&self) -> TypeId {
        self.unsafe_pointer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_universe_names() {
        let mut arena = TypeArena::new();
        let universe = Universe::install(&mut arena);

        let int = universe.lookup("int").unwrap();
        assert!(matches!(arena.get(int), Type::Basic(BasicKind::Int)));

        let error = universe.lookup("error").unwrap();
        assert!(matches!(arena.get(error), Type::Named(n) if n.package.is_none()));

        let any = universe.lookup("any").unwrap();
        assert!(matches!(arena.get(arena.underlying(any)), Type::Interface(i) if i.is_empty()));

        assert!(universe.lookup("Pointer").is_none());
        assert!(matches!(
            arena.get(universe.unsafe_pointer()),
            Type::Basic(BasicKind::UnsafePointer)
        ));
    }
}
