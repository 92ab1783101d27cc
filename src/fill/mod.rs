//! The fill pass: find empty struct literals and suggest filling them with
//! zero values for every accessible member.
//!
//! ```go
//! var x = Foo{}
//! ```
//!
//! becomes
//!
//! ```go
//! var x = Foo{
//! 	ID:   0,
//! 	Name: "",
//! }
//! ```

mod fix;
mod populate;
mod typeexpr;

pub use fix::{apply_edits, Diagnostic, SuggestedFix, TextEdit};
pub use populate::populate_value;
pub use typeexpr::{FileTypes, TypeReconstructor};

use rayon::prelude::*;
use tracing::{debug, trace};

use crate::analysis::{LiteralNode, Package, Program, SourceFile, Span};
use crate::ast::{CompositeLit, Expr};
use crate::printer::print_expr;
use crate::token::{FileSet, NO_POS};

/// One run of the fill analysis over a package.
pub struct Pass<'a> {
    program: &'a Program,
    package: &'a Package,
}

impl<'a> Pass<'a> {
    pub fn new(program: &'a Program, package: &'a Package) -> Self {
        Self { program, package }
    }

    /// Diagnostics for every fillable literal of the package, in file and
    /// source order.
    pub fn run(&self) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        for file in &self.package.files {
            for (index, literal) in file.syntax.literals.iter().enumerate() {
                if let Some(diagnostic) = self.fill_literal(file, index, literal) {
                    diagnostics.push(diagnostic);
                }
            }
        }
        diagnostics
    }

    fn fill_literal(
        &self,
        file: &SourceFile,
        index: usize,
        literal: &LiteralNode,
    ) -> Option<Diagnostic> {
        let site = format!("{}:{}", file.name, literal.span);
        if literal.elements != 0 {
            debug!(site = %site, "literal already has elements");
            return None;
        }

        let pos = file.pos(literal.span.start_byte);
        let (Some(enclosing), Some(table)) = (self.program.file_at(pos), self.program.fset().file(pos))
        else {
            debug!(site = %site, "no enclosing file");
            return None;
        };

        let Some(ty) = file.literal_type(index) else {
            debug!(site = %site, "literal type unknown");
            return None;
        };
        let arena = self.program.arena();
        let Some(strukt) = arena.deref_struct(ty) else {
            debug!(site = %site, ty = %arena.display(ty), "not a struct literal");
            return None;
        };
        if strukt.fields.is_empty() {
            debug!(site = %site, "struct has no fields");
            return None;
        }

        // Positions for the new literal come from a private table so the
        // program's own file set stays untouched.
        let mut fset = FileSet::new();
        let tok = fset.add_file(&enclosing.name, enclosing.source.len());
        let lbrace = tok.pos(0);

        let types = FileTypes::new(self.program, enclosing, self.package.id);
        let mut pos = lbrace;
        let mut elts = Vec::new();
        for field in &strukt.fields {
            if field.package.is_some_and(|p| p != self.package.id) && !field.is_exported() {
                trace!(site = %site, field = %field.name, "field not accessible");
                continue;
            }
            let Some(value) = populate_value(arena, &types, field.ty) else {
                trace!(
                    site = %site,
                    field = %field.name,
                    ty = %arena.display(field.ty),
                    "no zero value for field"
                );
                continue;
            };
            pos = tok.next_line_pos(pos);
            elts.push(Expr::KeyValue {
                key: Box::new(Expr::Ident {
                    name: field.name.clone(),
                    pos,
                }),
                colon: pos,
                value: Box::new(value),
            });
        }

        if elts.is_empty() {
            debug!(site = %site, "no accessible fields");
            return None;
        }
        let rbrace = tok.next_line_pos(pos);

        let filled = Expr::CompositeLit(CompositeLit {
            ty: literal.type_text.as_ref().map(|text| {
                Box::new(Expr::Verbatim {
                    text: text.clone(),
                    pos: NO_POS,
                })
            }),
            lbrace,
            elts,
            rbrace,
        });
        let new_text = match print_expr(&fset, &filled) {
            Ok(text) => text,
            Err(e) => {
                debug!(site = %site, error = %e, "failed to render filled literal");
                return None;
            }
        };

        let message = match (&literal.type_text, literal.type_is_ident) {
            (Some(name), true) => format!("Fill {}", name),
            _ => "Fill struct".to_string(),
        };
        Some(Diagnostic {
            file: enclosing.name.clone(),
            span: Span::from_offsets(table, literal.lbrace, literal.rbrace + 1),
            message: message.clone(),
            fixes: vec![SuggestedFix {
                message,
                edits: vec![TextEdit {
                    start: literal.span.start_byte,
                    end: literal.span.end_byte,
                    new_text,
                }],
            }],
        })
    }
}

/// Run the pass over every package of `program` in parallel. The result is
/// sorted by file and position.
pub fn analyze_program(program: &Program) -> Vec<Diagnostic> {
    let mut diagnostics: Vec<Diagnostic> = program
        .packages()
        .par_iter()
        .flat_map_iter(|package| Pass::new(program, package).run())
        .collect();
    diagnostics.sort_by(|a, b| {
        a.file
            .cmp(&b.file)
            .then(a.span.start_byte.cmp(&b.span.start_byte))
    });
    diagnostics
}
