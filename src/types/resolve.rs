//! Resolution of written type expressions into arena types.
//!
//! Declarations of all packages are registered first and resolved lazily,
//! so references across files and packages work regardless of order.
//! Named types whose underlying type depends on themselves (`type A B;
//! type B A`) end up with an `Invalid` underlying type.

use std::collections::HashMap;

use tracing::debug;

use super::{
    Alias, Array, Chan, Field, Interface, Map, Named, PackageId, Param, Signature, Struct, Type,
    TypeArena, TypeId, Universe,
};
use crate::analysis::{ElisionRole, FieldDecl, FuncTypeExpr, ParamDecl, TypeDecl, TypeExpr};

/// What an import name refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportTarget {
    Package(PackageId),
    /// The `unsafe` pseudo package.
    Unsafe,
}

/// Names visible in one file beyond its package scope.
#[derive(Debug, Clone)]
pub struct FileScope {
    pub package: PackageId,
    /// Import name → target. Imports of packages that were not loaded are
    /// absent, so references through them resolve to `Invalid`.
    pub imports: HashMap<String, ImportTarget>,
    pub dot_imports: Vec<PackageId>,
}

impl FileScope {
    pub fn new(package: PackageId) -> Self {
        Self {
            package,
            imports: HashMap::new(),
            dot_imports: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileScopeId(usize);

enum DeclState {
    Pending { expr: TypeExpr, scope: FileScopeId },
    Resolving,
    Done,
}

/// Builds arena types from `TypeExpr`s.
pub struct Resolver<'a> {
    arena: &'a mut TypeArena,
    universe: Universe,
    /// Package scopes indexed by `PackageId`.
    packages: Vec<HashMap<String, TypeId>>,
    files: Vec<FileScope>,
    decls: HashMap<TypeId, DeclState>,
}

impl<'a> Resolver<'a> {
    pub fn new(arena: &'a mut TypeArena, package_count: usize) -> Self {
        let universe = Universe::install(arena);
        Self {
            arena,
            universe,
            packages: vec![HashMap::new(); package_count],
            files: Vec::new(),
            decls: HashMap::new(),
        }
    }

    pub fn add_file_scope(&mut self, scope: FileScope) -> FileScopeId {
        let id = FileScopeId(self.files.len());
        self.files.push(scope);
        id
    }

    /// Register a declaration in its package scope. Resolution of the
    /// declared type happens in [`Resolver::resolve_declarations`].
    pub fn declare(&mut self, scope: FileScopeId, decl: &TypeDecl) -> Option<TypeId> {
        if decl.name == "_" {
            return None;
        }
        let package = self.files[scope.0].package;
        if self.packages[package.index()].contains_key(&decl.name) {
            debug!(name = %decl.name, "ignoring duplicate type declaration");
            return None;
        }

        let placeholder = self.arena.invalid();
        let ty = if decl.alias {
            Type::Alias(Alias {
                name: decl.name.clone(),
                target: placeholder,
            })
        } else {
            Type::Named(Named {
                name: decl.name.clone(),
                package: Some(package),
                underlying: placeholder,
            })
        };
        let id = self.arena.alloc(ty);
        self.packages[package.index()].insert(decl.name.clone(), id);
        self.decls.insert(
            id,
            DeclState::Pending {
                expr: decl.ty.clone(),
                scope,
            },
        );
        Some(id)
    }

    /// Resolve every declared type.
    pub fn resolve_declarations(&mut self) {
        let mut ids: Vec<TypeId> = self.decls.keys().copied().collect();
        ids.sort();
        for id in ids {
            self.ensure_resolved(id);
        }
    }

    fn ensure_resolved(&mut self, id: TypeId) {
        if !matches!(self.decls.get(&id), Some(DeclState::Pending { .. })) {
            return;
        }
        let Some(DeclState::Pending { expr, scope }) = self.decls.insert(id, DeclState::Resolving)
        else {
            return;
        };

        let target = self.resolve(&expr, scope);
        let is_alias = matches!(self.arena.get(id), Type::Alias(_));
        if is_alias {
            if let Some(Type::Alias(alias)) = self.arena.get_mut(id) {
                alias.target = target;
            }
        } else {
            let underlying = self.underlying_of(target);
            if let Some(Type::Named(named)) = self.arena.get_mut(id) {
                named.underlying = underlying;
            }
        }
        self.decls.insert(id, DeclState::Done);
    }

    /// Like [`TypeArena::underlying`], resolving pending declarations on
    /// the way. A declaration still being resolved reads as `Invalid`.
    fn underlying_of(&mut self, id: TypeId) -> TypeId {
        let mut current = id;
        for _ in 0..self.arena.len() {
            self.ensure_resolved(current);
            match self.arena.get(current) {
                Type::Alias(alias) => current = alias.target,
                Type::Named(named) => return named.underlying,
                _ => return current,
            }
        }
        self.arena.invalid()
    }

    fn lookup(&self, scope: FileScopeId, name: &str) -> TypeId {
        let file = &self.files[scope.0];
        if let Some(id) = self.packages[file.package.index()].get(name) {
            return *id;
        }
        for package in &file.dot_imports {
            if let Some(id) = self.packages[package.index()].get(name) {
                return *id;
            }
        }
        self.universe
            .lookup(name)
            .unwrap_or_else(|| self.arena.invalid())
    }

    fn lookup_qualified(&self, scope: FileScopeId, package: &str, name: &str) -> TypeId {
        match self.files[scope.0].imports.get(package) {
            Some(ImportTarget::Package(id)) => self.packages[id.index()]
                .get(name)
                .copied()
                .unwrap_or_else(|| self.arena.invalid()),
            Some(ImportTarget::Unsafe) if name == "Pointer" => self.universe.unsafe_pointer(),
            _ => self.arena.invalid(),
        }
    }

    /// Resolve a type expression written in the file of `scope`.
    pub fn resolve(&mut self, expr: &TypeExpr, scope: FileScopeId) -> TypeId {
        match expr {
            TypeExpr::Name(name) => self.lookup(scope, name),
            TypeExpr::Qualified { package, name } => self.lookup_qualified(scope, package, name),
            TypeExpr::Pointer(inner) => {
                let elem = self.resolve(inner, scope);
                self.arena.alloc(Type::Pointer(elem))
            }
            TypeExpr::Slice(inner) => {
                let elem = self.resolve(inner, scope);
                self.arena.alloc(Type::Slice(elem))
            }
            TypeExpr::Array {
                len: Some(len),
                elem,
            } => {
                let elem = self.resolve(elem, scope);
                self.arena.alloc(Type::Array(Array { len: *len, elem }))
            }
            TypeExpr::Array { len: None, .. } | TypeExpr::ImplicitArray(_) => self.arena.invalid(),
            TypeExpr::Map { key, value } => {
                let key = self.resolve(key, scope);
                let value = self.resolve(value, scope);
                self.arena.alloc(Type::Map(Map { key, value }))
            }
            TypeExpr::Chan { dir, elem } => {
                let elem = self.resolve(elem, scope);
                self.arena.alloc(Type::Chan(Chan { dir: *dir, elem }))
            }
            TypeExpr::Func(func) => {
                let sig = self.signature(func, scope);
                self.arena.alloc(Type::Signature(sig))
            }
            TypeExpr::Struct(fields) => {
                let strukt = self.strukt(fields, scope);
                self.arena.alloc(Type::Struct(strukt))
            }
            TypeExpr::Interface { elements } => self.arena.alloc(Type::Interface(Interface {
                elements: *elements,
            })),
            TypeExpr::Unsupported(kind) => {
                debug!(kind = %kind, "unsupported type expression");
                self.arena.invalid()
            }
        }
    }

    /// Resolve the type of a composite literal. `[...]T` takes its length
    /// from the number of elements.
    pub fn resolve_literal_type(
        &mut self,
        expr: &TypeExpr,
        elements: usize,
        scope: FileScopeId,
    ) -> TypeId {
        match expr {
            TypeExpr::ImplicitArray(elem) => {
                let elem = self.resolve(elem, scope);
                self.arena.alloc(Type::Array(Array {
                    len: elements as u64,
                    elem,
                }))
            }
            _ => self.resolve(expr, scope),
        }
    }

    /// Type of an elided literal nested in a literal of type `parent`.
    /// An element type `*T` is stripped to `T`, since `&T` may be elided too.
    pub fn elided_type(&self, parent: TypeId, role: ElisionRole) -> Option<TypeId> {
        let elem = match (self.arena.get(self.arena.underlying(parent)), role) {
            (Type::Slice(elem), ElisionRole::Value) => *elem,
            (Type::Array(array), ElisionRole::Value) => array.elem,
            (Type::Map(map), ElisionRole::Key) => map.key,
            (Type::Map(map), ElisionRole::Value) => map.value,
            _ => return None,
        };
        match self.arena.get(self.arena.underlying(elem)) {
            Type::Pointer(inner) => Some(*inner),
            _ => Some(elem),
        }
    }

    fn params(&mut self, params: &[ParamDecl], scope: FileScopeId) -> Vec<Param> {
        params
            .iter()
            .map(|param| Param {
                name: param.name.clone(),
                ty: self.resolve(&param.ty, scope),
            })
            .collect()
    }

    fn signature(&mut self, func: &FuncTypeExpr, scope: FileScopeId) -> Signature {
        Signature {
            params: self.params(&func.params, scope),
            results: self.params(&func.results, scope),
            variadic: func.variadic,
        }
    }

    fn strukt(&mut self, decls: &[FieldDecl], scope: FileScopeId) -> Struct {
        let package = self.files[scope.0].package;
        let mut fields = Vec::new();
        for decl in decls {
            let ty = self.resolve(&decl.ty, scope);
            if decl.embedded {
                match decl.embedded_name() {
                    Some(name) => fields.push(Field {
                        name: name.to_string(),
                        ty,
                        package: Some(package),
                        embedded: true,
                    }),
                    None => debug!("skipping embedded field without a name"),
                }
                continue;
            }
            for name in &decl.names {
                fields.push(Field {
                    name: name.clone(),
                    ty,
                    package: Some(package),
                    embedded: false,
                });
            }
        }
        Struct { fields }
    }
}
