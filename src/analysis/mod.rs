//! Source loading and type analysis.
//!
//! Go files are parsed with tree-sitter and lowered into owned syntax
//! summaries, grouped into packages, and their type declarations resolved
//! into a shared type arena.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌──────────────┐     ┌───────────────┐
//! │ Source Files    │────▶│ GoAnalyzer   │────▶│ FileSyntax    │
//! └─────────────────┘     │ (tree-sitter)│     │ (Imports,     │
//!                         └──────────────┘     │  Types, Lits) │
//!                                              └───────────────┘
//!                                                      │
//!                                                      ▼
//!                         ┌──────────────┐     ┌───────────────┐
//!                         │ fill::Pass   │◀────│ Program       │
//!                         │              │     │ (Arena, Sites)│
//!                         └──────────────┘     └───────────────┘
//! ```

mod go;
mod program;
mod syntax;
mod traits;

use std::path::PathBuf;

use thiserror::Error;

pub use go::GoAnalyzer;
pub use program::{LoadOptions, Package, Program, SourceFile};
pub use syntax::{
    Elision, ElisionRole, FieldDecl, FileSyntax, FuncTypeExpr, ImportSpec, LiteralNode, ParamDecl,
    Span, TypeDecl, TypeExpr,
};
pub use traits::{LanguageAnalyzer, ParsedFile};

/// Errors that can occur while loading a program.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("path not found: {0}")]
    NotFound(PathBuf),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to walk {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
    #[error("failed to parse {path}: {message}")]
    Parse { path: String, message: String },
}
