//! Resolved type model.
//!
//! Types live in a `TypeArena` and are referenced by `TypeId`. The set of
//! variants is closed: every structural kind the synthesizer dispatches on
//! has exactly one variant here.

mod basic;
mod resolve;
mod universe;

pub use basic::{BasicInfo, BasicKind};
pub use resolve::{FileScope, FileScopeId, ImportTarget, Resolver};
pub use universe::Universe;

use std::fmt;

/// Index of a type in its arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(u32);

impl TypeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Identity of a loaded package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackageId(pub u32);

impl PackageId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Channel direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChanDir {
    Both,
    Send,
    Recv,
}

#[derive(Debug, Clone)]
pub enum Type {
    /// Unresolved or ill-formed.
    Invalid,
    Basic(BasicKind),
    Named(Named),
    Alias(Alias),
    Pointer(TypeId),
    Slice(TypeId),
    Array(Array),
    Map(Map),
    Chan(Chan),
    Struct(Struct),
    Signature(Signature),
    Interface(Interface),
}

/// A declared type. `underlying` is always structural once resolved.
#[derive(Debug, Clone)]
pub struct Named {
    pub name: String,
    /// `None` for predeclared types such as `error`.
    pub package: Option<PackageId>,
    pub underlying: TypeId,
}

/// `type A = B`.
#[derive(Debug, Clone)]
pub struct Alias {
    pub name: String,
    pub target: TypeId,
}

#[derive(Debug, Clone)]
pub struct Array {
    pub len: u64,
    pub elem: TypeId,
}

#[derive(Debug, Clone)]
pub struct Map {
    pub key: TypeId,
    pub value: TypeId,
}

#[derive(Debug, Clone)]
pub struct Chan {
    pub dir: ChanDir,
    pub elem: TypeId,
}

#[derive(Debug, Clone, Default)]
pub struct Struct {
    pub fields: Vec<Field>,
}

/// A struct member.
#[derive(Debug, Clone)]
pub struct Field {
    pub name: String,
    pub ty: TypeId,
    /// Package the enclosing struct was declared in.
    pub package: Option<PackageId>,
    pub embedded: bool,
}

impl Field {
    /// Exported names start with an uppercase letter.
    pub fn is_exported(&self) -> bool {
        is_exported(&self.name)
    }
}

pub fn is_exported(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}

/// Function signature. For a variadic signature the last parameter's type
/// is the slice type `[]T`.
#[derive(Debug, Clone, Default)]
pub struct Signature {
    pub params: Vec<Param>,
    pub results: Vec<Param>,
    pub variadic: bool,
}

#[derive(Debug, Clone)]
pub struct Param {
    pub name: Option<String>,
    pub ty: TypeId,
}

#[derive(Debug, Clone, Default)]
pub struct Interface {
    /// Number of method and type elements; zero for `interface{}`.
    pub elements: usize,
}

impl Interface {
    pub fn is_empty(&self) -> bool {
        self.elements == 0
    }
}

/// Owner of all types of a program. Slot 0 is always `Invalid`.
#[derive(Debug, Clone)]
pub struct TypeArena {
    types: Vec<Type>,
}

impl Default for TypeArena {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeArena {
    pub fn new() -> Self {
        Self {
            types: vec![Type::Invalid],
        }
    }

    pub fn invalid(&self) -> TypeId {
        TypeId(0)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn alloc(&mut self, ty: Type) -> TypeId {
        let id = TypeId(self.types.len() as u32);
        self.types.push(ty);
        id
    }

    pub fn get(&self, id: TypeId) -> &Type {
        self.types.get(id.index()).unwrap_or(&Type::Invalid)
    }

    pub(crate) fn get_mut(&mut self, id: TypeId) -> Option<&mut Type> {
        self.types.get_mut(id.index())
    }

    /// Follow alias links to the aliased type. Cyclic chains yield `Invalid`.
    pub fn unalias(&self, id: TypeId) -> TypeId {
        let mut current = id;
        for _ in 0..self.types.len() {
            match self.get(current) {
                Type::Alias(alias) => current = alias.target,
                _ => return current,
            }
        }
        self.invalid()
    }

    /// Structural form of a type: aliases followed, one naming layer removed.
    pub fn underlying(&self, id: TypeId) -> TypeId {
        let id = self.unalias(id);
        match self.get(id) {
            Type::Named(named) => named.underlying,
            _ => id,
        }
    }

    /// Unwrap any number of pointer indirections and naming layers; return
    /// the struct underneath, if that is what the type denotes.
    pub fn deref_struct(&self, id: TypeId) -> Option<&Struct> {
        let mut current = self.underlying(id);
        let mut pointees = Vec::new();
        loop {
            match self.get(current) {
                Type::Pointer(elem) => {
                    let elem = self.unalias(*elem);
                    // Cyclic pointer type (`type P *P`).
                    if pointees.contains(&elem) {
                        return None;
                    }
                    pointees.push(elem);
                    current = self.underlying(elem);
                }
                Type::Struct(strukt) => return Some(strukt),
                _ => return None,
            }
        }
    }

    /// Human readable spelling, used in logs and test assertions.
    pub fn display(&self, id: TypeId) -> TypeDisplay<'_> {
        TypeDisplay { arena: self, id }
    }
}

/// `Display` adapter returned by [`TypeArena::display`].
pub struct TypeDisplay<'a> {
    arena: &'a TypeArena,
    id: TypeId,
}

impl fmt::Display for TypeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |id| self.arena.display(id);
        match self.arena.get(self.id) {
            Type::Invalid => write!(f, "invalid type"),
            Type::Basic(kind) => write!(f, "{}", kind.name()),
            Type::Named(named) => write!(f, "{}", named.name),
            Type::Alias(alias) => write!(f, "{}", alias.name),
            Type::Pointer(elem) => write!(f, "*{}", show(*elem)),
            Type::Slice(elem) => write!(f, "[]{}", show(*elem)),
            Type::Array(array) => write!(f, "[{}]{}", array.len, show(array.elem)),
            Type::Map(map) => write!(f, "map[{}]{}", show(map.key), show(map.value)),
            Type::Chan(chan) => match chan.dir {
                ChanDir::Both => write!(f, "chan {}", show(chan.elem)),
                ChanDir::Send => write!(f, "chan<- {}", show(chan.elem)),
                ChanDir::Recv => write!(f, "<-chan {}", show(chan.elem)),
            },
            Type::Struct(strukt) => {
                write!(f, "struct{{")?;
                for (i, field) in strukt.fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, "; ")?;
                    }
                    write!(f, "{} {}", field.name, show(field.ty))?;
                }
                write!(f, "}}")
            }
            Type::Signature(sig) => {
                write!(f, "func(")?;
                for (i, param) in sig.params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", show(param.ty))?;
                }
                write!(f, ")")?;
                match sig.results.len() {
                    0 => Ok(()),
                    1 => write!(f, " {}", show(sig.results[0].ty)),
                    _ => {
                        write!(f, " (")?;
                        for (i, result) in sig.results.iter().enumerate() {
                            if i > 0 {
                                write!(f, ", ")?;
                            }
                            write!(f, "{}", show(result.ty))?;
                        }
                        write!(f, ")")
                    }
                }
            }
            Type::Interface(iface) if iface.is_empty() => write!(f, "interface{{}}"),
            Type::Interface(_) => write!(f, "interface{{...}}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named_struct(arena: &mut TypeArena, name: &str, fields: Vec<Field>) -> TypeId {
        let strukt = arena.alloc(Type::Struct(Struct { fields }));
        arena.alloc(Type::Named(Named {
            name: name.to_string(),
            package: Some(PackageId(0)),
            underlying: strukt,
        }))
    }

    #[test]
    fn test_exported_names() {
        assert!(is_exported("Name"));
        assert!(is_exported("Ärger"));
        assert!(!is_exported("name"));
        assert!(!is_exported("_Name"));
        assert!(!is_exported(""));
    }

    #[test]
    fn test_deref_struct_through_pointers_and_names() {
        let mut arena = TypeArena::new();
        let foo = named_struct(&mut arena, "Foo", Vec::new());
        let ptr = arena.alloc(Type::Pointer(foo));
        let ptr_ptr = arena.alloc(Type::Pointer(ptr));
        let alias = arena.alloc(Type::Alias(Alias {
            name: "F".to_string(),
            target: ptr_ptr,
        }));
        assert!(arena.deref_struct(alias).is_some());
        assert!(arena.deref_struct(arena.invalid()).is_none());
    }

    #[test]
    fn test_cyclic_pointer_terminates() {
        let mut arena = TypeArena::new();
        let named = arena.alloc(Type::Named(Named {
            name: "P".to_string(),
            package: Some(PackageId(0)),
            underlying: TypeId(0),
        }));
        let ptr = arena.alloc(Type::Pointer(named));
        if let Some(Type::Named(n)) = arena.get_mut(named) {
            n.underlying = ptr;
        }
        assert!(arena.deref_struct(named).is_none());
    }

    #[test]
    fn test_cyclic_alias_is_invalid() {
        let mut arena = TypeArena::new();
        let a = arena.alloc(Type::Alias(Alias {
            name: "A".to_string(),
            target: TypeId(0),
        }));
        let b = arena.alloc(Type::Alias(Alias {
            name: "B".to_string(),
            target: a,
        }));
        if let Some(Type::Alias(alias)) = arena.get_mut(a) {
            alias.target = b;
        }
        assert_eq!(arena.unalias(a), arena.invalid());
    }

    #[test]
    fn test_display() {
        let mut arena = TypeArena::new();
        let int = arena.alloc(Type::Basic(BasicKind::Int));
        let string = arena.alloc(Type::Basic(BasicKind::String));
        let map = arena.alloc(Type::Map(Map {
            key: string,
            value: int,
        }));
        let chan = arena.alloc(Type::Chan(Chan {
            dir: ChanDir::Recv,
            elem: map,
        }));
        assert_eq!(arena.display(chan).to_string(), "<-chan map[string]int");
    }
}
