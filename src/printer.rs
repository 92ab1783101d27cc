//! Renders synthesized expressions as gofmt-formatted Go source.
//!
//! Layout is driven by positions: a composite literal whose first element
//! sits on a later line than its opening brace is printed one element per
//! line, indented by one tab, with `key:` cells padded so consecutive
//! values line up. Nodes without positions are printed inline.

use thiserror::Error;

use crate::ast::{CompositeLit, Expr, FieldGroup, FuncType};
use crate::token::{FileSet, Pos};
use crate::types::ChanDir;

/// Keys up to this many columns always align with their neighbours.
const SMALL_KEY_SIZE: usize = 40;
/// Key size ratio against the running geometric mean that starts a new
/// alignment section.
const KEY_RATIO_THRESHOLD: f64 = 2.5;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PrintError {
    #[error("identifier without a name")]
    EmptyIdent,
    #[error("literal without a value")]
    EmptyLiteral,
}

/// Render `expr`, resolving positions through `fset`.
pub fn print_expr(fset: &FileSet, expr: &Expr) -> Result<String, PrintError> {
    let mut printer = Printer::new(fset, 0);
    printer.expr(expr)?;
    Ok(printer.out)
}

struct Printer<'a> {
    fset: &'a FileSet,
    indent: usize,
    out: String,
}

/// One line of a multi-line composite body.
struct Row {
    /// `(key, value)` when the line is a single key:value element.
    pair: Option<(String, String)>,
    text: String,
}

impl Row {
    fn is_multiline(&self) -> bool {
        self.text.contains('\n')
    }

    /// Size used for the alignment decision; zero for multi-line rows.
    fn size(&self) -> usize {
        if self.is_multiline() {
            return 0;
        }
        match &self.pair {
            Some((key, _)) => key.len(),
            None => self.text.len(),
        }
    }
}

impl<'a> Printer<'a> {
    fn new(fset: &'a FileSet, indent: usize) -> Self {
        Self {
            fset,
            indent,
            out: String::new(),
        }
    }

    fn line(&self, pos: Pos) -> usize {
        self.fset.line(pos)
    }

    /// Render a sub-expression at the current indentation + `extra`.
    fn render(&self, expr: &Expr, extra: usize) -> Result<String, PrintError> {
        let mut sub = Printer::new(self.fset, self.indent + extra);
        sub.expr(expr)?;
        Ok(sub.out)
    }

    fn expr(&mut self, expr: &Expr) -> Result<(), PrintError> {
        match expr {
            Expr::Ident { name, .. } => {
                if name.is_empty() {
                    return Err(PrintError::EmptyIdent);
                }
                self.out.push_str(name);
            }
            Expr::BasicLit { value } => {
                if value.is_empty() {
                    return Err(PrintError::EmptyLiteral);
                }
                self.out.push_str(value);
            }
            Expr::Verbatim { text, .. } => {
                if text.is_empty() {
                    return Err(PrintError::EmptyIdent);
                }
                self.out.push_str(text);
            }
            Expr::CompositeLit(lit) => self.composite(lit)?,
            Expr::KeyValue { key, value, .. } => {
                self.expr(key)?;
                self.out.push_str(": ");
                self.expr(value)?;
            }
            Expr::AddressOf(x) => {
                self.out.push('&');
                self.expr(x)?;
            }
            Expr::Star(x) => {
                self.out.push('*');
                self.expr(x)?;
            }
            Expr::Call { fun, args } => {
                self.expr(fun)?;
                self.out.push('(');
                self.list(args)?;
                self.out.push(')');
            }
            Expr::Selector { x, sel } => {
                if sel.is_empty() {
                    return Err(PrintError::EmptyIdent);
                }
                self.expr(x)?;
                self.out.push('.');
                self.out.push_str(sel);
            }
            Expr::ArrayType { len, elt } => {
                self.out.push('[');
                if let Some(len) = len {
                    self.expr(len)?;
                }
                self.out.push(']');
                self.expr(elt)?;
            }
            Expr::MapType { key, value } => {
                self.out.push_str("map[");
                self.expr(key)?;
                self.out.push(']');
                self.expr(value)?;
            }
            Expr::ChanType { dir, value } => {
                self.out.push_str(match dir {
                    ChanDir::Both => "chan ",
                    ChanDir::Send => "chan<- ",
                    ChanDir::Recv => "<-chan ",
                });
                // `chan <-chan T` would parse as `chan<- (chan T)`.
                let ambiguous = *dir == ChanDir::Both
                    && matches!(**value, Expr::ChanType { dir: ChanDir::Recv, .. });
                if ambiguous {
                    self.out.push('(');
                    self.expr(value)?;
                    self.out.push(')');
                } else {
                    self.expr(value)?;
                }
            }
            Expr::FuncType(func) => self.func_type(func)?,
            Expr::FuncLit(func) => {
                self.func_type(func)?;
                self.out.push_str(" {}");
            }
            Expr::InterfaceType => self.out.push_str("interface{}"),
        }
        Ok(())
    }

    fn list(&mut self, exprs: &[Expr]) -> Result<(), PrintError> {
        for (i, expr) in exprs.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            self.expr(expr)?;
        }
        Ok(())
    }

    fn func_type(&mut self, func: &FuncType) -> Result<(), PrintError> {
        self.out.push_str("func(");
        self.fields(&func.params, func.variadic)?;
        self.out.push(')');

        match func.results.as_slice() {
            [] => {}
            [single] if single.names.is_empty() => {
                self.out.push(' ');
                self.expr(&single.ty)?;
            }
            results => {
                self.out.push_str(" (");
                self.fields(results, false)?;
                self.out.push(')');
            }
        }
        Ok(())
    }

    fn fields(&mut self, groups: &[FieldGroup], variadic: bool) -> Result<(), PrintError> {
        for (i, group) in groups.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            if !group.names.is_empty() {
                if group.names.iter().any(String::is_empty) {
                    return Err(PrintError::EmptyIdent);
                }
                self.out.push_str(&group.names.join(", "));
                self.out.push(' ');
            }
            let last = i + 1 == groups.len();
            match &group.ty {
                Expr::ArrayType { len: None, elt } if variadic && last => {
                    self.out.push_str("...");
                    self.expr(elt)?;
                }
                ty => self.expr(ty)?,
            }
        }
        Ok(())
    }

    fn composite(&mut self, lit: &CompositeLit) -> Result<(), PrintError> {
        if let Some(ty) = &lit.ty {
            self.expr(ty)?;
        }
        self.out.push('{');

        let Some(first) = lit.elts.first() else {
            self.out.push('}');
            return Ok(());
        };

        let lbrace_line = self.line(lit.lbrace);
        let first_line = self.line(first.pos());
        if lbrace_line == 0 || first_line <= lbrace_line {
            self.list(&lit.elts)?;
            self.out.push('}');
            return Ok(());
        }

        let rows = self.rows(&lit.elts)?;
        let inner = "\t".repeat(self.indent + 1);
        for section in sections(&rows) {
            let width = section
                .iter()
                .filter_map(|row| row.pair.as_ref().map(|(key, _)| key.chars().count() + 1))
                .max()
                .unwrap_or(0)
                + 1;
            for row in section {
                self.out.push('\n');
                self.out.push_str(&inner);
                match &row.pair {
                    Some((key, value)) => {
                        let cell = format!("{}:", key);
                        self.out.push_str(&format!("{:<width$}", cell, width = width));
                        self.out.push_str(value);
                    }
                    None => self.out.push_str(&row.text),
                }
            }
        }

        let last_line = lit.elts.last().map(|e| self.line(e.pos())).unwrap_or(0);
        let rbrace_line = self.line(lit.rbrace);
        if rbrace_line == 0 || rbrace_line > last_line {
            self.out.push_str(",\n");
            self.out.push_str(&"\t".repeat(self.indent));
        }
        self.out.push('}');
        Ok(())
    }

    /// Group elements into output lines. Elements sharing a line are joined
    /// and never take part in key alignment.
    fn rows(&self, elts: &[Expr]) -> Result<Vec<Row>, PrintError> {
        let mut lines: Vec<Vec<&Expr>> = Vec::new();
        let mut prev_line = 0;
        for elt in elts {
            let line = self.line(elt.pos());
            match lines.last_mut() {
                Some(current) if line == 0 || line <= prev_line => current.push(elt),
                _ => lines.push(vec![elt]),
            }
            if line > 0 {
                prev_line = line;
            }
        }

        let many = elts.len() > 1;
        let mut rows = Vec::with_capacity(lines.len());
        for (i, line) in lines.iter().enumerate() {
            let mut texts = Vec::with_capacity(line.len());
            for elt in line {
                texts.push(self.render(elt, 1)?);
            }
            let mut text = texts.join(", ");
            if i + 1 < lines.len() {
                text.push(',');
            }

            let pair = match line.as_slice() {
                [Expr::KeyValue { key, value, .. }] if many => {
                    let key = self.render(key, 1)?;
                    let value = self.render(value, 1)?;
                    let value = if i + 1 < lines.len() {
                        format!("{},", value)
                    } else {
                        value
                    };
                    (!key.contains('\n') && !value.contains('\n')).then_some((key, value))
                }
                _ => None,
            };
            rows.push(Row { pair, text });
        }
        Ok(rows)
    }
}

/// Split rows into alignment sections following gofmt: a new section starts
/// when a key is far longer or shorter than the geometric mean of the keys
/// before it, unless both it and its predecessor are small.
fn sections(rows: &[Row]) -> Vec<&[Row]> {
    let mut sections = Vec::new();
    let mut start = 0;
    let mut use_ff = true;
    let mut size = 0;
    let mut ln_sum = 0.0_f64;
    let mut count = 0_usize;

    for (i, row) in rows.iter().enumerate() {
        let prev_size = size;
        size = row.size();

        if prev_size > 0 && size > 0 {
            if count == 0 || (prev_size <= SMALL_KEY_SIZE && size <= SMALL_KEY_SIZE) {
                use_ff = false;
            } else {
                let geomean = (ln_sum / count as f64).exp();
                let ratio = size as f64 / geomean;
                use_ff = KEY_RATIO_THRESHOLD * ratio <= 1.0 || KEY_RATIO_THRESHOLD <= ratio;
            }
        }

        // Rows without a key cell end the column block on both sides.
        let after_plain = i > 0 && rows[i - 1].pair.is_none();
        if i > start && (use_ff || after_plain || row.pair.is_none()) {
            sections.push(&rows[start..i]);
            start = i;
        }

        if size > 0 {
            ln_sum += (size as f64).ln();
            count += 1;
        }
    }
    if start < rows.len() {
        sections.push(&rows[start..]);
    }
    sections
}
