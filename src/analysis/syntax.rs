//! Owned syntax summaries lowered from tree-sitter trees.
//!
//! Only what type resolution and literal filling need is kept: the package
//! clause, imports, package-level type declarations, and every aggregate
//! literal in preorder.

use std::fmt;

use crate::token;
use crate::types::ChanDir;

/// Source location span with byte offsets and line/column positions.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct Span {
    /// Start byte offset (0-indexed).
    pub start_byte: usize,
    /// End byte offset (0-indexed, exclusive).
    pub end_byte: usize,
    /// Start line (1-indexed).
    pub start_line: usize,
    /// Start column (1-indexed).
    pub start_col: usize,
    /// End line (1-indexed).
    pub end_line: usize,
    /// End column (1-indexed).
    pub end_col: usize,
}

impl Span {
    /// Create a span from a tree-sitter node.
    pub fn from_node(node: tree_sitter::Node) -> Self {
        let start = node.start_position();
        let end = node.end_position();
        Self {
            start_byte: node.start_byte(),
            end_byte: node.end_byte(),
            start_line: start.row + 1, // tree-sitter is 0-indexed
            start_col: start.column + 1,
            end_line: end.row + 1,
            end_col: end.column + 1,
        }
    }

    /// Create a span from byte offsets using a file's line table.
    pub fn from_offsets(file: &token::File, start: usize, end: usize) -> Self {
        let start_pos = file.position(file.pos(start));
        let end_pos = file.position(file.pos(end));
        Self {
            start_byte: start,
            end_byte: end,
            start_line: start_pos.line,
            start_col: start_pos.column,
            end_line: end_pos.line,
            end_col: end_pos.column,
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start_line, self.start_col)
    }
}

/// An import declaration.
#[derive(Debug, Clone)]
pub struct ImportSpec {
    /// Import path without quotes.
    pub path: String,
    /// Explicit name: an identifier, `.` or `_`.
    pub name: Option<String>,
    pub span: Span,
}

/// A package-level `type` declaration.
#[derive(Debug, Clone)]
pub struct TypeDecl {
    pub name: String,
    /// `type A = B`.
    pub alias: bool,
    pub ty: TypeExpr,
    pub span: Span,
}

/// A type as written in source.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeExpr {
    Name(String),
    Qualified { package: String, name: String },
    Pointer(Box<TypeExpr>),
    Slice(Box<TypeExpr>),
    /// `len` is `None` when the length is not an integer literal.
    Array { len: Option<u64>, elem: Box<TypeExpr> },
    /// `[...]T`, only valid as a composite literal type.
    ImplicitArray(Box<TypeExpr>),
    Map { key: Box<TypeExpr>, value: Box<TypeExpr> },
    Chan { dir: ChanDir, elem: Box<TypeExpr> },
    Func(FuncTypeExpr),
    Struct(Vec<FieldDecl>),
    Interface { elements: usize },
    /// Generic instantiations and anything else the resolver cannot model.
    Unsupported(String),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FuncTypeExpr {
    pub params: Vec<ParamDecl>,
    pub results: Vec<ParamDecl>,
    /// The last parameter is `...T`; its `ty` is then `Slice(T)`.
    pub variadic: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParamDecl {
    pub name: Option<String>,
    pub ty: TypeExpr,
}

/// One line of a struct body. Embedded fields have no names.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    pub names: Vec<String>,
    pub ty: TypeExpr,
    pub embedded: bool,
}

impl FieldDecl {
    /// Implicit name of an embedded field: the type name without package
    /// qualifier or pointer.
    pub fn embedded_name(&self) -> Option<&str> {
        let mut ty = &self.ty;
        loop {
            match ty {
                TypeExpr::Pointer(inner) => ty = inner,
                TypeExpr::Name(name) => return Some(name),
                TypeExpr::Qualified { name, .. } => return Some(name),
                _ => return None,
            }
        }
    }
}

/// Position of an elided literal inside its enclosing literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElisionRole {
    /// Map key.
    Key,
    /// Slice or array element, or map value.
    Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Elision {
    /// Index of the enclosing literal in `FileSyntax::literals`.
    pub parent: usize,
    pub role: ElisionRole,
}

/// An aggregate literal: `T{...}` or an elided `{...}` element.
#[derive(Debug, Clone)]
pub struct LiteralNode {
    /// Explicit type, absent for elided literals.
    pub ty: Option<TypeExpr>,
    /// Type reference exactly as written.
    pub type_text: Option<String>,
    /// The type reference is a bare identifier (`Foo{}`).
    pub type_is_ident: bool,
    /// Number of element entries between the braces.
    pub elements: usize,
    /// Whole literal, type reference through closing brace.
    pub span: Span,
    /// Byte offset of `{`.
    pub lbrace: usize,
    /// Byte offset of `}`.
    pub rbrace: usize,
    pub elided: Option<Elision>,
}

/// Everything extracted from a single Go file.
#[derive(Debug, Clone, Default)]
pub struct FileSyntax {
    /// Package clause name.
    pub package: Option<String>,
    pub imports: Vec<ImportSpec>,
    pub type_decls: Vec<TypeDecl>,
    /// Literals in preorder; an elided literal always follows its parent.
    pub literals: Vec<LiteralNode>,
    /// Whether the file had parse errors.
    pub has_parse_errors: bool,
}

impl FileSyntax {
    /// Import spec for a path, if the file imports it.
    pub fn import(&self, path: &str) -> Option<&ImportSpec> {
        self.imports.iter().find(|i| i.path == path)
    }
}
