//! Go syntax lowering using tree-sitter.
//!
//! Extracts:
//! - The package clause
//! - Imports with their explicit names
//! - Package-level type declarations, lowered to `TypeExpr`
//! - Every aggregate literal, explicit (`T{...}`) or elided (`{...}` inside
//!   an outer literal), in preorder

use std::path::Path;

use streaming_iterator::StreamingIterator;
use tracing::debug;
use tree_sitter::{Language, Node, Parser, Query, QueryCursor};

use crate::analysis::{
    Elision, ElisionRole, FieldDecl, FileSyntax, FuncTypeExpr, ImportSpec, LanguageAnalyzer,
    LiteralNode, ParamDecl, ParsedFile, Span, TypeDecl, TypeExpr,
};
use crate::types::ChanDir;

/// Tree-sitter query for package declaration.
const PACKAGE_QUERY: &str = r#"
(package_clause
  (package_identifier) @package_name
)
"#;

/// Tree-sitter query for import specs, grouped or not.
const IMPORT_QUERY: &str = r#"
(import_spec) @import
"#;

/// Tree-sitter query for package-level type declarations. Types declared
/// inside function bodies are not visible to other files and are skipped.
const TYPE_DECL_QUERY: &str = r#"
(source_file
  (type_declaration) @type_decl
)
"#;

/// Go language analyzer.
pub struct GoAnalyzer {
    language: Language,
}

impl GoAnalyzer {
    /// Create a new Go analyzer.
    pub fn new() -> Self {
        Self {
            language: tree_sitter_go::LANGUAGE.into(),
        }
    }

    /// Create a new parser for this thread.
    fn create_parser(&self) -> anyhow::Result<Parser> {
        let mut parser = Parser::new();
        parser.set_language(&self.language)?;
        Ok(parser)
    }

    /// Extract the package name from a parsed file.
    fn extract_package(&self, parsed: &ParsedFile) -> Option<String> {
        let query = Query::new(&self.language, PACKAGE_QUERY).ok()?;
        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(&query, parsed.tree.root_node(), &parsed.source[..]);

        if let Some(m) = matches.next() {
            for capture in m.captures {
                let name = query.capture_names()[capture.index as usize];
                if name == "package_name" {
                    return Some(parsed.node_text(capture.node).to_string());
                }
            }
        }
        None
    }

    /// Extract imports from a parsed file.
    fn extract_imports(&self, parsed: &ParsedFile) -> anyhow::Result<Vec<ImportSpec>> {
        let query = Query::new(&self.language, IMPORT_QUERY)?;
        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(&query, parsed.tree.root_node(), &parsed.source[..]);

        let mut imports = Vec::new();
        while let Some(m) = matches.next() {
            for capture in m.captures {
                let node = capture.node;
                let Some(path) = node.child_by_field_name("path") else {
                    continue;
                };
                let path = parsed
                    .node_text(path)
                    .trim_matches(|c| c == '"' || c == '`')
                    .to_string();
                if path.is_empty() {
                    continue;
                }
                let name = node
                    .child_by_field_name("name")
                    .map(|n| parsed.node_text(n).to_string());
                imports.push(ImportSpec {
                    path,
                    name,
                    span: Span::from_node(node),
                });
            }
        }

        imports.sort_by_key(|i| i.span.start_byte);
        Ok(imports)
    }

    /// Extract package-level type declarations.
    fn extract_type_decls(&self, parsed: &ParsedFile) -> anyhow::Result<Vec<TypeDecl>> {
        let query = Query::new(&self.language, TYPE_DECL_QUERY)?;
        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(&query, parsed.tree.root_node(), &parsed.source[..]);

        let mut decls = Vec::new();
        while let Some(m) = matches.next() {
            for capture in m.captures {
                let decl = capture.node;
                let mut walk = decl.walk();
                for spec in decl.named_children(&mut walk) {
                    let alias = match spec.kind() {
                        "type_spec" => false,
                        "type_alias" => true,
                        _ => continue,
                    };
                    let (Some(name), Some(ty)) = (
                        spec.child_by_field_name("name"),
                        spec.child_by_field_name("type"),
                    ) else {
                        continue;
                    };
                    let name = parsed.node_text(name).to_string();
                    if spec.child_by_field_name("type_parameters").is_some() {
                        debug!(name = %name, path = %parsed.path, "skipping generic type declaration");
                        continue;
                    }
                    decls.push(TypeDecl {
                        name,
                        alias,
                        ty: lower_type(parsed, ty),
                        span: Span::from_node(spec),
                    });
                }
            }
        }

        decls.sort_by_key(|d| d.span.start_byte);
        Ok(decls)
    }

    /// Extract every aggregate literal in preorder.
    fn extract_literals(&self, parsed: &ParsedFile) -> Vec<LiteralNode> {
        let mut literals = Vec::new();
        collect_literals(parsed, parsed.tree.root_node(), &mut literals);
        literals
    }
}

impl Default for GoAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageAnalyzer for GoAnalyzer {
    fn language_id(&self) -> &'static str {
        "go"
    }

    fn file_extensions(&self) -> &'static [&'static str] {
        &["go"]
    }

    fn parse(&self, path: &Path, source: &[u8]) -> anyhow::Result<ParsedFile> {
        let mut parser = self.create_parser()?;
        let tree = parser
            .parse(source, None)
            .ok_or_else(|| anyhow::anyhow!("failed to parse Go source: {}", path.display()))?;

        Ok(ParsedFile {
            tree,
            source: source.to_vec(),
            path: path.to_string_lossy().to_string(),
        })
    }

    fn extract(&self, parsed: &ParsedFile) -> anyhow::Result<FileSyntax> {
        let package = self.extract_package(parsed);
        let imports = self.extract_imports(parsed)?;
        let type_decls = self.extract_type_decls(parsed)?;
        let literals = self.extract_literals(parsed);

        Ok(FileSyntax {
            package,
            imports,
            type_decls,
            literals,
            has_parse_errors: parsed.tree.root_node().has_error(),
        })
    }
}

/// Lower a type node into a `TypeExpr`.
fn lower_type(parsed: &ParsedFile, node: Node) -> TypeExpr {
    let child = |field: &str| node.child_by_field_name(field);
    let boxed = |n: Option<Node>| match n {
        Some(n) => Box::new(lower_type(parsed, n)),
        None => Box::new(TypeExpr::Unsupported("missing".to_string())),
    };

    match node.kind() {
        "type_identifier" => TypeExpr::Name(parsed.node_text(node).to_string()),
        "qualified_type" => match (child("package"), child("name")) {
            (Some(package), Some(name)) => TypeExpr::Qualified {
                package: parsed.node_text(package).to_string(),
                name: parsed.node_text(name).to_string(),
            },
            _ => TypeExpr::Unsupported(node.kind().to_string()),
        },
        "pointer_type" => TypeExpr::Pointer(boxed(node.named_child(0))),
        "parenthesized_type" => match node.named_child(0) {
            Some(inner) => lower_type(parsed, inner),
            None => TypeExpr::Unsupported(node.kind().to_string()),
        },
        "slice_type" => TypeExpr::Slice(boxed(child("element"))),
        "array_type" => {
            let len = child("length")
                .filter(|n| n.kind() == "int_literal")
                .and_then(|n| parse_int(parsed.node_text(n)));
            TypeExpr::Array {
                len,
                elem: boxed(child("element")),
            }
        }
        "implicit_length_array_type" => TypeExpr::ImplicitArray(boxed(child("element"))),
        "map_type" => TypeExpr::Map {
            key: boxed(child("key")),
            value: boxed(child("value")),
        },
        "channel_type" => TypeExpr::Chan {
            dir: channel_dir(node),
            elem: boxed(child("value")),
        },
        "function_type" => TypeExpr::Func(lower_signature(parsed, node)),
        "struct_type" => TypeExpr::Struct(lower_fields(parsed, node)),
        "interface_type" => {
            let mut walk = node.walk();
            let elements = node
                .named_children(&mut walk)
                .filter(|n| n.kind() != "comment")
                .count();
            TypeExpr::Interface { elements }
        }
        other => TypeExpr::Unsupported(other.to_string()),
    }
}

/// `chan T`, `chan<- T` or `<-chan T`, read from the token order.
fn channel_dir(node: Node) -> ChanDir {
    let mut walk = node.walk();
    let tokens: Vec<&str> = node
        .children(&mut walk)
        .take(2)
        .map(|n| n.kind())
        .collect();
    match tokens.as_slice() {
        ["<-", ..] => ChanDir::Recv,
        ["chan", "<-"] => ChanDir::Send,
        _ => ChanDir::Both,
    }
}

fn lower_signature(parsed: &ParsedFile, node: Node) -> FuncTypeExpr {
    let mut sig = FuncTypeExpr::default();
    if let Some(params) = node.child_by_field_name("parameters") {
        sig.variadic = lower_params(parsed, params, &mut sig.params);
    }
    if let Some(result) = node.child_by_field_name("result") {
        if result.kind() == "parameter_list" {
            lower_params(parsed, result, &mut sig.results);
        } else {
            sig.results.push(ParamDecl {
                name: None,
                ty: lower_type(parsed, result),
            });
        }
    }
    sig
}

/// Lower a parameter list; returns whether it ends in a variadic parameter.
fn lower_params(parsed: &ParsedFile, list: Node, out: &mut Vec<ParamDecl>) -> bool {
    let mut variadic = false;
    let mut walk = list.walk();
    for decl in list.named_children(&mut walk) {
        let Some(ty) = decl.child_by_field_name("type") else {
            continue;
        };
        match decl.kind() {
            "parameter_declaration" => {
                let ty = lower_type(parsed, ty);
                let mut names_walk = decl.walk();
                let names: Vec<String> = decl
                    .children_by_field_name("name", &mut names_walk)
                    .map(|n| parsed.node_text(n).to_string())
                    .collect();
                if names.is_empty() {
                    out.push(ParamDecl { name: None, ty });
                } else {
                    for name in names {
                        out.push(ParamDecl {
                            name: Some(name),
                            ty: ty.clone(),
                        });
                    }
                }
            }
            "variadic_parameter_declaration" => {
                out.push(ParamDecl {
                    name: decl
                        .child_by_field_name("name")
                        .map(|n| parsed.node_text(n).to_string()),
                    ty: TypeExpr::Slice(Box::new(lower_type(parsed, ty))),
                });
                variadic = true;
            }
            _ => {}
        }
    }
    variadic
}

fn lower_fields(parsed: &ParsedFile, node: Node) -> Vec<FieldDecl> {
    let mut fields = Vec::new();
    let mut walk = node.walk();
    let Some(list) = node
        .named_children(&mut walk)
        .find(|n| n.kind() == "field_declaration_list")
    else {
        return fields;
    };

    let mut list_walk = list.walk();
    for decl in list.named_children(&mut list_walk) {
        if decl.kind() != "field_declaration" {
            continue;
        }
        let Some(ty_node) = decl.child_by_field_name("type") else {
            continue;
        };
        let mut names_walk = decl.walk();
        let names: Vec<String> = decl
            .children_by_field_name("name", &mut names_walk)
            .map(|n| parsed.node_text(n).to_string())
            .collect();

        let mut ty = lower_type(parsed, ty_node);
        let embedded = names.is_empty();
        if embedded {
            let mut token_walk = decl.walk();
            let starred = decl.children(&mut token_walk).any(|n| n.kind() == "*");
            if starred {
                ty = TypeExpr::Pointer(Box::new(ty));
            }
        }
        fields.push(FieldDecl {
            names,
            ty,
            embedded,
        });
    }
    fields
}

/// Closing brace of a `literal_value`, unless error recovery invented it.
fn closing_brace(body: Node) -> Option<usize> {
    let last = body.child(body.child_count().checked_sub(1)?)?;
    (last.kind() == "}" && !last.is_missing()).then(|| last.start_byte())
}

fn is_element(node: &Node) -> bool {
    matches!(node.kind(), "literal_element" | "keyed_element")
}

fn count_elements(body: Node) -> usize {
    let mut walk = body.walk();
    body.named_children(&mut walk).filter(is_element).count()
}

/// Walk `node` and record composite literals in preorder.
fn collect_literals(parsed: &ParsedFile, node: Node, out: &mut Vec<LiteralNode>) {
    if node.kind() == "composite_literal" {
        if let Some(body) = node.child_by_field_name("body") {
            if let Some(rbrace) = closing_brace(body) {
                let ty_node = node.child_by_field_name("type");
                let index = out.len();
                out.push(LiteralNode {
                    ty: ty_node.map(|n| lower_type(parsed, n)),
                    type_text: ty_node.map(|n| parsed.node_text(n).to_string()),
                    type_is_ident: ty_node.is_some_and(|n| n.kind() == "type_identifier"),
                    elements: count_elements(body),
                    span: Span::from_node(node),
                    lbrace: body.start_byte(),
                    rbrace,
                    elided: None,
                });
                collect_elements(parsed, body, index, out);
                return;
            }
        }
    }

    let mut walk = node.walk();
    for child in node.children(&mut walk) {
        collect_literals(parsed, child, out);
    }
}

/// Visit the elements of the literal body belonging to `out[parent]`.
fn collect_elements(parsed: &ParsedFile, body: Node, parent: usize, out: &mut Vec<LiteralNode>) {
    let mut walk = body.walk();
    for element in body.named_children(&mut walk) {
        match element.kind() {
            "literal_element" => {
                collect_element(parsed, element, parent, ElisionRole::Value, out);
            }
            "keyed_element" => {
                let mut element_walk = element.walk();
                let parts: Vec<Node> = element
                    .named_children(&mut element_walk)
                    .filter(|n| n.kind() == "literal_element")
                    .collect();
                if let [key, value] = parts.as_slice() {
                    collect_element(parsed, *key, parent, ElisionRole::Key, out);
                    collect_element(parsed, *value, parent, ElisionRole::Value, out);
                } else {
                    collect_literals(parsed, element, out);
                }
            }
            _ => collect_literals(parsed, element, out),
        }
    }
}

fn collect_element(
    parsed: &ParsedFile,
    element: Node,
    parent: usize,
    role: ElisionRole,
    out: &mut Vec<LiteralNode>,
) {
    let mut walk = element.walk();
    let inner = element
        .named_children(&mut walk)
        .find(|n| n.kind() != "comment");
    let Some(inner) = inner else {
        return;
    };

    if inner.kind() == "literal_value" {
        if let Some(rbrace) = closing_brace(inner) {
            let index = out.len();
            out.push(LiteralNode {
                ty: None,
                type_text: None,
                type_is_ident: false,
                elements: count_elements(inner),
                span: Span::from_node(inner),
                lbrace: inner.start_byte(),
                rbrace,
                elided: Some(Elision { parent, role }),
            });
            collect_elements(parsed, inner, index, out);
            return;
        }
    }
    collect_literals(parsed, inner, out);
}

/// Parse a Go integer literal: decimal, `0x`, `0o`, `0b`, legacy leading
/// `0` octal, with optional `_` separators.
fn parse_int(text: &str) -> Option<u64> {
    let digits: String = text.chars().filter(|c| *c != '_').collect();
    let lower = digits.to_ascii_lowercase();
    let (radix, rest) = if let Some(rest) = lower.strip_prefix("0x") {
        (16, rest)
    } else if let Some(rest) = lower.strip_prefix("0o") {
        (8, rest)
    } else if let Some(rest) = lower.strip_prefix("0b") {
        (2, rest)
    } else if lower.len() > 1 && lower.starts_with('0') {
        (8, &lower[1..])
    } else {
        (10, lower.as_str())
    };
    u64::from_str_radix(rest, radix).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract_go(source: &str) -> FileSyntax {
        let analyzer = GoAnalyzer::new();
        let parsed = analyzer
            .parse(Path::new("test.go"), source.as_bytes())
            .unwrap();
        analyzer.extract(&parsed).unwrap()
    }

    fn name(n: &str) -> TypeExpr {
        TypeExpr::Name(n.to_string())
    }

    #[test]
    fn test_language_and_extensions() {
        let analyzer = GoAnalyzer::new();
        assert_eq!(analyzer.language_id(), "go");
        assert!(analyzer.handles_extension("go"));
        assert!(!analyzer.handles_extension("rs"));
    }

    #[test]
    fn test_extract_package_and_imports() {
        let syntax = extract_go(
            r#"package main

import "fmt"

import (
    str "strings"
    . "math"
    _ "embed"
)
"#,
        );
        assert_eq!(syntax.package.as_deref(), Some("main"));
        assert_eq!(syntax.imports.len(), 4);
        assert_eq!(syntax.imports[0].path, "fmt");
        assert_eq!(syntax.imports[0].name, None);
        assert_eq!(syntax.import("strings").unwrap().name.as_deref(), Some("str"));
        assert_eq!(syntax.import("math").unwrap().name.as_deref(), Some("."));
        assert_eq!(syntax.import("embed").unwrap().name.as_deref(), Some("_"));
        assert!(!syntax.has_parse_errors);
    }

    #[test]
    fn test_extract_struct_declaration() {
        let syntax = extract_go(
            r#"package p

type Foo struct {
    ID, Count int
    name      string
    *Base
    sync.Mutex
    Tags      map[string][]byte
}
"#,
        );
        assert_eq!(syntax.type_decls.len(), 1);
        let decl = &syntax.type_decls[0];
        assert_eq!(decl.name, "Foo");
        assert!(!decl.alias);

        let TypeExpr::Struct(fields) = &decl.ty else {
            panic!("expected struct, got {:?}", decl.ty);
        };
        assert_eq!(fields.len(), 5);
        assert_eq!(fields[0].names, vec!["ID", "Count"]);
        assert_eq!(fields[0].ty, name("int"));
        assert!(fields[2].embedded);
        assert_eq!(fields[2].ty, TypeExpr::Pointer(Box::new(name("Base"))));
        assert_eq!(fields[3].embedded_name(), Some("Mutex"));
        assert_eq!(
            fields[4].ty,
            TypeExpr::Map {
                key: Box::new(name("string")),
                value: Box::new(TypeExpr::Slice(Box::new(name("byte")))),
            }
        );
    }

    #[test]
    fn test_extract_type_forms() {
        let syntax = extract_go(
            r#"package p

type (
    Grid    [0x10][2]float64
    In      <-chan int
    Out     chan<- string
    Both    chan bool
    Handler func(ctx Context, args ...string) (int, error)
    Any     = interface{}
    Stringer interface { String() string }
    List[T any] []T
    Local   [N]int
)
"#,
        );
        let by_name = |n: &str| {
            syntax
                .type_decls
                .iter()
                .find(|d| d.name == n)
                .unwrap_or_else(|| panic!("missing {}", n))
        };

        assert_eq!(
            by_name("Grid").ty,
            TypeExpr::Array {
                len: Some(16),
                elem: Box::new(TypeExpr::Array {
                    len: Some(2),
                    elem: Box::new(name("float64")),
                }),
            }
        );
        assert!(matches!(by_name("In").ty, TypeExpr::Chan { dir: ChanDir::Recv, .. }));
        assert!(matches!(by_name("Out").ty, TypeExpr::Chan { dir: ChanDir::Send, .. }));
        assert!(matches!(by_name("Both").ty, TypeExpr::Chan { dir: ChanDir::Both, .. }));

        let TypeExpr::Func(sig) = &by_name("Handler").ty else {
            panic!("expected func type");
        };
        assert!(sig.variadic);
        assert_eq!(sig.params.len(), 2);
        assert_eq!(sig.params[1].name.as_deref(), Some("args"));
        assert_eq!(sig.params[1].ty, TypeExpr::Slice(Box::new(name("string"))));
        assert_eq!(sig.results.len(), 2);

        assert!(by_name("Any").alias);
        assert_eq!(by_name("Any").ty, TypeExpr::Interface { elements: 0 });
        assert_eq!(by_name("Stringer").ty, TypeExpr::Interface { elements: 1 });
        assert!(syntax.type_decls.iter().all(|d| d.name != "List"));
        assert!(matches!(by_name("Local").ty, TypeExpr::Array { len: None, .. }));
    }

    #[test]
    fn test_local_types_are_not_declarations() {
        let syntax = extract_go(
            r#"package p

func f() {
    type local struct{ A int }
    _ = local{}
}
"#,
        );
        assert!(syntax.type_decls.is_empty());
        assert_eq!(syntax.literals.len(), 1);
    }

    #[test]
    fn test_extract_literals_in_preorder() {
        let source = r#"package p

var a = Foo{}
var b = &pkg.Bar{X: 1}
var c = []*Foo{{}, {}}
var d = map[string]Foo{"k": {}}
var e = struct{ A int }{}
"#;
        let syntax = extract_go(source);
        let lits = &syntax.literals;
        assert_eq!(lits.len(), 8);

        assert_eq!(lits[0].type_text.as_deref(), Some("Foo"));
        assert!(lits[0].type_is_ident);
        assert_eq!(lits[0].elements, 0);
        assert_eq!(&source[lits[0].span.start_byte..lits[0].span.end_byte], "Foo{}");
        assert_eq!(&source[lits[0].lbrace..=lits[0].lbrace], "{");
        assert_eq!(&source[lits[0].rbrace..=lits[0].rbrace], "}");

        assert_eq!(lits[1].type_text.as_deref(), Some("pkg.Bar"));
        assert!(!lits[1].type_is_ident);
        assert_eq!(lits[1].elements, 1);

        assert_eq!(lits[2].elements, 2);
        assert_eq!(
            lits[3].elided,
            Some(Elision {
                parent: 2,
                role: ElisionRole::Value
            })
        );
        assert_eq!(lits[4].elided.map(|e| e.parent), Some(2));

        assert_eq!(
            lits[6].elided,
            Some(Elision {
                parent: 5,
                role: ElisionRole::Value
            })
        );
        assert!(matches!(lits[7].ty, Some(TypeExpr::Struct(_))));
        assert!(!lits[7].type_is_ident);
    }

    #[test]
    fn test_literals_nested_in_expressions() {
        let syntax = extract_go(
            r#"package p

func f() []any {
    return []any{Foo{}, g(Bar{})}
}
"#,
        );
        let texts: Vec<_> = syntax
            .literals
            .iter()
            .map(|l| l.type_text.clone().unwrap_or_default())
            .collect();
        assert_eq!(texts, vec!["[]any", "Foo", "Bar"]);
        assert!(syntax.literals.iter().all(|l| l.elided.is_none()));
    }

    #[test]
    fn test_parse_int() {
        assert_eq!(parse_int("42"), Some(42));
        assert_eq!(parse_int("0"), Some(0));
        assert_eq!(parse_int("0x1F"), Some(31));
        assert_eq!(parse_int("0o17"), Some(15));
        assert_eq!(parse_int("017"), Some(15));
        assert_eq!(parse_int("0b101"), Some(5));
        assert_eq!(parse_int("1_000"), Some(1000));
        assert_eq!(parse_int("1e3"), None);
    }
}
