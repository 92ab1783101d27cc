//! fillstruct - fill empty Go struct literals with zero values.
//!
//! Given `Foo{}` where `Foo` is a struct, fillstruct synthesizes
//! `Foo{ID: 0, Name: ""}` with every field accessible from the literal's
//! package, printed in gofmt layout, and offers it as a suggested fix.
//!
//! # Architecture
//!
//! - `analysis`: tree-sitter lowering of Go files and the program loader
//! - `types`: type arena and the declaration resolver
//! - `fill`: site selection, zero values and suggested fixes
//! - `ast`, `printer`: synthesized expressions and their gofmt rendering
//! - `token`: positions, files and file sets
//! - `config`, `report`, `cli`: the command-line tool

pub mod analysis;
pub mod ast;
pub mod cli;
pub mod config;
pub mod fill;
pub mod printer;
pub mod report;
pub mod token;
pub mod types;

pub use analysis::{GoAnalyzer, LanguageAnalyzer, LoadError, LoadOptions, Package, Program};
pub use config::Config;
pub use fill::{analyze_program, apply_edits, Diagnostic, Pass, SuggestedFix, TextEdit};
