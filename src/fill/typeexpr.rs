//! Spelling types as Go syntax, as seen from one file.

use crate::analysis::{Program, SourceFile};
use crate::ast::{Expr, FieldGroup, FuncType};
use crate::types::{BasicKind, Named, PackageId, Param, Signature, Type, TypeId};

/// Produces the syntax naming a type.
pub trait TypeReconstructor {
    /// `None` when the type cannot be written down: invalid types,
    /// anonymous structs and non-empty anonymous interfaces.
    fn type_expr(&self, ty: TypeId) -> Option<Expr>;
}

/// Reconstructs types as written in `file`, a file of package `package`.
///
/// Types of other packages are qualified with the name the file imports
/// them under.
pub struct FileTypes<'a> {
    program: &'a Program,
    file: &'a SourceFile,
    package: PackageId,
}

impl<'a> FileTypes<'a> {
    pub fn new(program: &'a Program, file: &'a SourceFile, package: PackageId) -> Self {
        Self {
            program,
            file,
            package,
        }
    }

    /// Qualifier for a package path: the file's explicit import name if
    /// any, else `default`. A blank import cannot qualify anything.
    fn qualifier<'s>(&'s self, path: &str, default: &'s str) -> &'s str {
        self.file
            .syntax
            .import(path)
            .and_then(|import| import.name.as_deref())
            .filter(|name| *name != "_")
            .unwrap_or(default)
    }

    fn named(&self, named: &Named) -> Option<Expr> {
        let Some(package) = named.package.filter(|p| *p != self.package) else {
            return Some(Expr::ident(&named.name));
        };
        let package = self.program.package(package)?;
        match self.qualifier(&package.path, &package.name) {
            "." => Some(Expr::ident(&named.name)),
            qualifier => Some(Expr::selector(qualifier, &named.name)),
        }
    }
}

impl TypeReconstructor for FileTypes<'_> {
    fn type_expr(&self, ty: TypeId) -> Option<Expr> {
        let arena = self.program.arena();
        let boxed = |id: TypeId| self.type_expr(id).map(Box::new);

        match arena.get(ty) {
            Type::Invalid | Type::Struct(_) => None,
            Type::Basic(BasicKind::UnsafePointer) => Some(Expr::selector(
                self.qualifier("unsafe", "unsafe"),
                "Pointer",
            )),
            Type::Basic(kind) => Some(Expr::ident(kind.name())),
            Type::Named(named) => self.named(named),
            Type::Alias(_) => match arena.unalias(ty) {
                target if target == arena.invalid() => None,
                target => self.type_expr(target),
            },
            Type::Pointer(elem) => Some(Expr::Star(boxed(*elem)?)),
            Type::Slice(elem) => Some(Expr::ArrayType {
                len: None,
                elt: boxed(*elem)?,
            }),
            Type::Array(array) => Some(Expr::ArrayType {
                len: Some(Box::new(Expr::basic(array.len.to_string()))),
                elt: boxed(array.elem)?,
            }),
            Type::Map(map) => Some(Expr::MapType {
                key: boxed(map.key)?,
                value: boxed(map.value)?,
            }),
            Type::Chan(chan) => Some(Expr::ChanType {
                dir: chan.dir,
                value: boxed(chan.elem)?,
            }),
            Type::Signature(sig) => func_type(self, sig, false).map(Expr::FuncType),
            Type::Interface(iface) if iface.is_empty() => Some(Expr::InterfaceType),
            Type::Interface(_) => None,
        }
    }
}

/// Spell a signature. Parameter names are kept when `named_params` is set;
/// results are always unnamed. Any unspellable type spoils the whole
/// signature.
pub(crate) fn func_type(
    types: &dyn TypeReconstructor,
    sig: &Signature,
    named_params: bool,
) -> Option<FuncType> {
    let group = |param: &Param, named: bool| -> Option<FieldGroup> {
        let names = match &param.name {
            Some(name) if named && !name.is_empty() => vec![name.clone()],
            _ => Vec::new(),
        };
        Some(FieldGroup {
            names,
            ty: types.type_expr(param.ty)?,
        })
    };

    // Go allows either all parameters named or none.
    let named_params = named_params && sig.params.iter().all(|p| p.name.is_some());
    let params = sig
        .params
        .iter()
        .map(|p| group(p, named_params))
        .collect::<Option<Vec<_>>>()?;
    let results = sig
        .results
        .iter()
        .map(|r| group(r, false))
        .collect::<Option<Vec<_>>>()?;

    Some(FuncType {
        params,
        results,
        variadic: sig.variadic,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::printer::print_expr;
    use crate::token::FileSet;

    const LIB: &str = "package lib\n\ntype Config struct{ Name string }\n";

    /// Spell the type of the single `var x T` declaration's literal.
    fn spell(main: &str) -> Option<String> {
        let program =
            Program::from_sources(Some("m"), &[("lib/lib.go", LIB), ("main.go", main)]).unwrap();
        let package = program.package_by_path("m").unwrap();
        let file = &package.files[0];
        let types = FileTypes::new(&program, file, package.id);
        let ty = file.literal_type(0)?;
        let arena = program.arena();
        // Literals are `[]T{}`; spell `T`.
        let Type::Slice(elem) = arena.get(arena.underlying(ty)) else {
            panic!("expected a slice literal");
        };
        let expr = types.type_expr(*elem)?;
        Some(print_expr(&FileSet::new(), &expr).unwrap())
    }

    #[test]
    fn test_spell_basic_and_composite_types() {
        assert_eq!(spell("package main\nvar x = []int{}\n").as_deref(), Some("int"));
        assert_eq!(
            spell("package main\nvar x = []map[string][]*[4]byte{}\n").as_deref(),
            Some("map[string][]*[4]byte")
        );
        assert_eq!(
            spell("package main\nvar x = []func(a int, b ...string) (bool, error){}\n").as_deref(),
            Some("func(int, ...string) (bool, error)")
        );
        assert_eq!(
            spell("package main\nvar x = []chan<- any{}\n").as_deref(),
            Some("chan<- interface{}")
        );
    }

    #[test]
    fn test_spell_qualified_types() {
        let plain = "package main\nimport \"m/lib\"\nvar x = []lib.Config{}\n";
        assert_eq!(spell(plain).as_deref(), Some("lib.Config"));

        let renamed = "package main\nimport cfg \"m/lib\"\nvar x = []cfg.Config{}\n";
        assert_eq!(spell(renamed).as_deref(), Some("cfg.Config"));

        let dotted = "package main\nimport . \"m/lib\"\nvar x = []Config{}\n";
        assert_eq!(spell(dotted).as_deref(), Some("Config"));

        let unsafe_ptr = "package main\nimport \"unsafe\"\nvar x = []unsafe.Pointer{}\n";
        assert_eq!(spell(unsafe_ptr).as_deref(), Some("unsafe.Pointer"));
    }

    #[test]
    fn test_unspellable_types() {
        assert_eq!(spell("package main\nvar x = []struct{ A int }{}\n"), None);
        assert_eq!(
            spell("package main\nvar x = []interface{ M() }{}\n"),
            None
        );
        assert_eq!(
            spell("package main\nimport \"time\"\nvar x = []time.Time{}\n"),
            None
        );
        assert_eq!(spell("package main\nvar x = []map[string]Missing{}\n"), None);
    }
}
