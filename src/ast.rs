//! Synthesized Go expression trees.
//!
//! Nodes are built by the fill pass and rendered by [`crate::printer`].
//! Only identifiers, keys and composite braces carry positions; every other
//! node is position-free and the printer lays it out inline.

use crate::token::{Pos, NO_POS};
use crate::types::ChanDir;

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Ident {
        name: String,
        pos: Pos,
    },
    /// Literal token text such as `0` or `""`.
    BasicLit {
        value: String,
    },
    CompositeLit(CompositeLit),
    KeyValue {
        key: Box<Expr>,
        colon: Pos,
        value: Box<Expr>,
    },
    /// `&x`
    AddressOf(Box<Expr>),
    /// `*T` in type position.
    Star(Box<Expr>),
    Call {
        fun: Box<Expr>,
        args: Vec<Expr>,
    },
    /// `x.sel`
    Selector {
        x: Box<Expr>,
        sel: String,
    },
    /// `[len]elt`, or `[]elt` without a length.
    ArrayType {
        len: Option<Box<Expr>>,
        elt: Box<Expr>,
    },
    MapType {
        key: Box<Expr>,
        value: Box<Expr>,
    },
    ChanType {
        dir: ChanDir,
        value: Box<Expr>,
    },
    FuncType(FuncType),
    /// Function literal with an empty body.
    FuncLit(FuncType),
    /// `interface{}`
    InterfaceType,
    /// Source text reused as is, e.g. the type reference of a literal.
    Verbatim {
        text: String,
        pos: Pos,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompositeLit {
    pub ty: Option<Box<Expr>>,
    pub lbrace: Pos,
    pub elts: Vec<Expr>,
    pub rbrace: Pos,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FuncType {
    pub params: Vec<FieldGroup>,
    pub results: Vec<FieldGroup>,
    /// The last parameter's type is `[]T` and prints as `...T`.
    pub variadic: bool,
}

/// Parameters or results sharing one type: `a, b int`.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldGroup {
    pub names: Vec<String>,
    pub ty: Expr,
}

impl Expr {
    pub fn ident(name: impl Into<String>) -> Self {
        Expr::Ident {
            name: name.into(),
            pos: NO_POS,
        }
    }

    pub fn basic(value: impl Into<String>) -> Self {
        Expr::BasicLit {
            value: value.into(),
        }
    }

    /// `T{}` without elements or positions.
    pub fn empty_composite(ty: Expr) -> Self {
        Expr::CompositeLit(CompositeLit {
            ty: Some(Box::new(ty)),
            lbrace: NO_POS,
            elts: Vec::new(),
            rbrace: NO_POS,
        })
    }

    pub fn selector(x: impl Into<String>, sel: impl Into<String>) -> Self {
        Expr::Selector {
            x: Box::new(Expr::ident(x)),
            sel: sel.into(),
        }
    }

    pub fn call(fun: Expr, args: Vec<Expr>) -> Self {
        Expr::Call {
            fun: Box::new(fun),
            args,
        }
    }

    /// Starting position, or `NO_POS` for synthesized nodes.
    pub fn pos(&self) -> Pos {
        match self {
            Expr::Ident { pos, .. } | Expr::Verbatim { pos, .. } => *pos,
            Expr::CompositeLit(lit) => match &lit.ty {
                Some(ty) if ty.pos().is_valid() => ty.pos(),
                _ => lit.lbrace,
            },
            Expr::KeyValue { key, .. } => key.pos(),
            Expr::Call { fun, .. } => fun.pos(),
            Expr::Selector { x, .. } => x.pos(),
            _ => NO_POS,
        }
    }
}
