//! Program loading: files → packages → resolved types.
//!
//! A `Program` owns every loaded file, the file set that gives each file a
//! disjoint position range, and the type arena holding the resolved types
//! of all packages. It is immutable once built and safe to share across
//! threads.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use globset::GlobSet;
use rayon::prelude::*;
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

use super::{FileSyntax, GoAnalyzer, LanguageAnalyzer, LoadError};
use crate::token::{FileSet, Pos};
use crate::types::{FileScope, FileScopeId, ImportTarget, PackageId, Resolver, TypeArena, TypeId};

/// Options controlling which files are loaded.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Load `_test.go` files too.
    pub include_test_files: bool,
    /// Paths (relative to the root) matching this set are skipped.
    pub excluded: GlobSet,
    /// Module path overriding the one declared in `go.mod`.
    pub module: Option<String>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            include_test_files: false,
            excluded: GlobSet::empty(),
            module: None,
        }
    }
}

/// A loaded Go source file.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Path used for reading and writing the file.
    pub path: PathBuf,
    /// Path relative to the program root, `/` separated.
    pub name: String,
    pub source: String,
    pub syntax: FileSyntax,
    /// Base of this file in the program's file set.
    pub base: usize,
    /// Resolved type of each entry of `syntax.literals`.
    literal_types: Vec<Option<TypeId>>,
}

impl SourceFile {
    /// Program position of a byte offset.
    pub fn pos(&self, offset: usize) -> Pos {
        Pos::new(self.base + offset.min(self.source.len()))
    }

    pub fn end(&self) -> Pos {
        Pos::new(self.base + self.source.len())
    }

    pub fn contains(&self, pos: Pos) -> bool {
        self.base <= pos.get() && pos <= self.end()
    }

    /// Resolved type of the literal at `index`, if it could be determined.
    pub fn literal_type(&self, index: usize) -> Option<TypeId> {
        self.literal_types.get(index).copied().flatten()
    }
}

/// Files of one directory sharing a package clause.
#[derive(Debug, Clone)]
pub struct Package {
    pub id: PackageId,
    /// Import path.
    pub path: String,
    /// Name from the package clause.
    pub name: String,
    /// Directory relative to the root, empty for the root itself.
    pub dir: String,
    pub files: Vec<SourceFile>,
}

#[derive(Debug)]
pub struct Program {
    root: PathBuf,
    module: Option<String>,
    arena: TypeArena,
    fset: FileSet,
    packages: Vec<Package>,
}

/// A file read from disk or handed in by the caller, before parsing.
struct RawFile {
    path: PathBuf,
    name: String,
    source: String,
}

impl Program {
    /// Load every Go package under `root`.
    pub fn load(root: &Path, options: &LoadOptions) -> Result<Program, LoadError> {
        if !root.exists() {
            return Err(LoadError::NotFound(root.to_path_buf()));
        }

        let module = match &options.module {
            Some(module) => Some(module.clone()),
            None => read_module_path(root)?,
        };

        let analyzer = GoAnalyzer::new();
        let mut raw = Vec::new();
        for entry in WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_skipped_dir(e))
        {
            let entry = entry.map_err(|source| LoadError::Walk {
                path: root.to_path_buf(),
                source,
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
            if !analyzer.handles_extension(ext) {
                continue;
            }

            let name = relative_name(root, path);
            if name.ends_with("_test.go") && !options.include_test_files {
                continue;
            }
            if options.excluded.is_match(&name) {
                debug!(file = %name, "excluded by configuration");
                continue;
            }

            match fs::read_to_string(path) {
                Ok(source) => raw.push(RawFile {
                    path: path.to_path_buf(),
                    name,
                    source,
                }),
                Err(e) => warn!(file = %name, error = %e, "failed to read file, skipping"),
            }
        }

        let root = if root.is_file() {
            root.parent().unwrap_or(Path::new(".")).to_path_buf()
        } else {
            root.to_path_buf()
        };
        Self::build(root, module, raw)
    }

    /// Build a program from in-memory `(relative path, source)` pairs.
    pub fn from_sources(module: Option<&str>, files: &[(&str, &str)]) -> Result<Program, LoadError> {
        let raw = files
            .iter()
            .map(|(name, source)| RawFile {
                path: PathBuf::from(name),
                name: name.to_string(),
                source: source.to_string(),
            })
            .collect();
        Self::build(PathBuf::from("."), module.map(str::to_string), raw)
    }

    fn build(root: PathBuf, module: Option<String>, raw: Vec<RawFile>) -> Result<Program, LoadError> {
        let analyzer = GoAnalyzer::new();
        let parsed: Vec<(RawFile, FileSyntax)> = raw
            .into_par_iter()
            .map(|file| {
                let parse_error = |e: anyhow::Error| LoadError::Parse {
                    path: file.name.clone(),
                    message: format!("{:#}", e),
                };
                let tree = analyzer
                    .parse(&file.path, file.source.as_bytes())
                    .map_err(parse_error)?;
                let syntax = analyzer.extract(&tree).map_err(parse_error)?;
                Ok((file, syntax))
            })
            .collect::<Result<_, LoadError>>()?;

        // Group by directory and package clause; `foo_test` files next to
        // `foo` form their own package.
        let mut groups: BTreeMap<(String, String), Vec<(RawFile, FileSyntax)>> = BTreeMap::new();
        for (file, syntax) in parsed {
            let Some(package) = syntax.package.clone() else {
                debug!(file = %file.name, "no package clause, skipping");
                continue;
            };
            if syntax.has_parse_errors {
                debug!(file = %file.name, "file has syntax errors");
            }
            let dir = match file.name.rfind('/') {
                Some(i) => file.name[..i].to_string(),
                None => String::new(),
            };
            groups.entry((dir, package)).or_default().push((file, syntax));
        }

        let mut fset = FileSet::new();
        let mut packages = Vec::with_capacity(groups.len());
        for (index, ((dir, name), mut files)) in groups.into_iter().enumerate() {
            files.sort_by(|a, b| a.0.name.cmp(&b.0.name));
            let mut path = import_path(module.as_deref(), &dir);
            if name.ends_with("_test") && files.iter().all(|(f, _)| f.name.ends_with("_test.go")) {
                path.push_str("_test");
            }

            let files = files
                .into_iter()
                .map(|(file, syntax)| {
                    let table = fset.add_file(&file.name, file.source.len());
                    table.set_lines_for_content(file.source.as_bytes());
                    SourceFile {
                        base: table.base(),
                        path: file.path,
                        name: file.name,
                        source: file.source,
                        syntax,
                        literal_types: Vec::new(),
                    }
                })
                .collect();

            packages.push(Package {
                id: PackageId(index as u32),
                path,
                name,
                dir,
                files,
            });
        }

        let mut arena = TypeArena::new();
        resolve_program(&mut arena, &mut packages);

        let program = Program {
            root,
            module,
            arena,
            fset,
            packages,
        };
        info!(
            language = analyzer.language_id(),
            packages = program.packages.len(),
            files = program.files_scanned(),
            types = program.arena.len(),
            "loaded program"
        );
        Ok(program)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Module path from `go.mod` or the load options.
    pub fn module(&self) -> Option<&str> {
        self.module.as_deref()
    }

    pub fn arena(&self) -> &TypeArena {
        &self.arena
    }

    pub fn fset(&self) -> &FileSet {
        &self.fset
    }

    pub fn packages(&self) -> &[Package] {
        &self.packages
    }

    pub fn package(&self, id: PackageId) -> Option<&Package> {
        self.packages.get(id.index())
    }

    pub fn package_by_path(&self, path: &str) -> Option<&Package> {
        self.packages.iter().find(|p| p.path == path)
    }

    /// The loaded file whose position range contains `pos`.
    pub fn file_at(&self, pos: Pos) -> Option<&SourceFile> {
        let table = self.fset.file(pos)?;
        self.packages
            .iter()
            .flat_map(|p| p.files.iter())
            .find(|f| f.base == table.base() && f.contains(pos))
    }

    pub fn files_scanned(&self) -> usize {
        self.packages.iter().map(|p| p.files.len()).sum()
    }
}

/// Declare and resolve all package-level types, then compute the type of
/// every literal site.
fn resolve_program(arena: &mut TypeArena, packages: &mut [Package]) {
    let by_path: HashMap<String, (PackageId, String)> = packages
        .iter()
        .map(|p| (p.path.clone(), (p.id, p.name.clone())))
        .collect();

    let mut resolver = Resolver::new(arena, packages.len());
    let mut scopes: Vec<Vec<FileScopeId>> = Vec::with_capacity(packages.len());

    for package in packages.iter() {
        let mut file_scopes = Vec::with_capacity(package.files.len());
        for file in &package.files {
            let scope = resolver.add_file_scope(file_scope(package.id, &file.syntax, &by_path));
            for decl in &file.syntax.type_decls {
                resolver.declare(scope, decl);
            }
            file_scopes.push(scope);
        }
        scopes.push(file_scopes);
    }
    resolver.resolve_declarations();

    for (package, file_scopes) in packages.iter_mut().zip(scopes) {
        for (file, scope) in package.files.iter_mut().zip(file_scopes) {
            let mut types: Vec<Option<TypeId>> = Vec::with_capacity(file.syntax.literals.len());
            for literal in &file.syntax.literals {
                let ty = match (&literal.ty, literal.elided) {
                    (Some(expr), _) => {
                        Some(resolver.resolve_literal_type(expr, literal.elements, scope))
                    }
                    (None, Some(elision)) => types
                        .get(elision.parent)
                        .copied()
                        .flatten()
                        .and_then(|parent| resolver.elided_type(parent, elision.role)),
                    (None, None) => None,
                };
                types.push(ty);
            }
            file.literal_types = types;
        }
    }
}

fn file_scope(
    package: PackageId,
    syntax: &FileSyntax,
    by_path: &HashMap<String, (PackageId, String)>,
) -> FileScope {
    let mut scope = FileScope::new(package);
    for import in &syntax.imports {
        if import.path == "unsafe" {
            let name = import.name.clone().unwrap_or_else(|| "unsafe".to_string());
            scope.imports.insert(name, ImportTarget::Unsafe);
            continue;
        }
        let Some((id, default_name)) = by_path.get(&import.path) else {
            debug!(import = %import.path, "import not loaded; its types are unknown");
            continue;
        };
        match import.name.as_deref() {
            Some(".") => scope.dot_imports.push(*id),
            Some("_") => {}
            Some(name) => {
                scope.imports.insert(name.to_string(), ImportTarget::Package(*id));
            }
            None => {
                scope
                    .imports
                    .insert(default_name.clone(), ImportTarget::Package(*id));
            }
        }
    }
    scope
}

/// Directories the go tool ignores, plus vendored code.
fn is_skipped_dir(entry: &DirEntry) -> bool {
    if !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || name.starts_with('_') || name == "vendor" || name == "testdata"
}

fn relative_name(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    let name = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/");
    if name.is_empty() {
        path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    } else {
        name
    }
}

fn import_path(module: Option<&str>, dir: &str) -> String {
    match (module, dir.is_empty()) {
        (Some(module), true) => module.to_string(),
        (Some(module), false) => format!("{}/{}", module, dir),
        (None, true) => ".".to_string(),
        (None, false) => dir.to_string(),
    }
}

/// Module path declared by `root/go.mod`, if present.
fn read_module_path(root: &Path) -> Result<Option<String>, LoadError> {
    let go_mod = root.join("go.mod");
    if !go_mod.is_file() {
        return Ok(None);
    }
    let content = fs::read_to_string(&go_mod).map_err(|source| LoadError::Io {
        path: go_mod.clone(),
        source,
    })?;
    let module = parse_module_directive(&content);
    if module.is_none() {
        warn!(path = %go_mod.display(), "go.mod has no module directive");
    }
    Ok(module)
}

fn parse_module_directive(content: &str) -> Option<String> {
    content.lines().find_map(|line| {
        let line = line.split("//").next().unwrap_or("").trim();
        let rest = line.strip_prefix("module")?;
        if !rest.starts_with(char::is_whitespace) {
            return None;
        }
        let module = rest.trim().trim_matches(|c| c == '"' || c == '`');
        (!module.is_empty()).then(|| module.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Type;

    #[test]
    fn test_parse_module_directive() {
        assert_eq!(
            parse_module_directive("// comment\nmodule example.com/app\n\ngo 1.21\n"),
            Some("example.com/app".to_string())
        );
        assert_eq!(
            parse_module_directive("module \"quoted/mod\" // trailing\n"),
            Some("quoted/mod".to_string())
        );
        assert_eq!(parse_module_directive("modules foo\n"), None);
        assert_eq!(parse_module_directive("go 1.21\n"), None);
    }

    #[test]
    fn test_import_path() {
        assert_eq!(import_path(Some("example.com/app"), ""), "example.com/app");
        assert_eq!(import_path(Some("example.com/app"), "lib"), "example.com/app/lib");
        assert_eq!(import_path(None, ""), ".");
        assert_eq!(import_path(None, "lib/sub"), "lib/sub");
    }

    #[test]
    fn test_packages_grouped_by_directory() {
        let program = Program::from_sources(
            Some("example.com/app"),
            &[
                ("main.go", "package main\n"),
                ("lib/a.go", "package lib\n\ntype A struct{ X int }\n"),
                ("lib/b.go", "package lib\n\ntype B struct{ A A }\n"),
                ("lib/lib_test.go", "package lib_test\n"),
            ],
        )
        .unwrap();

        let paths: Vec<&str> = program.packages().iter().map(|p| p.path.as_str()).collect();
        assert_eq!(
            paths,
            vec!["example.com/app", "example.com/app/lib", "example.com/app/lib_test"]
        );
        let lib = program.package_by_path("example.com/app/lib").unwrap();
        assert_eq!(lib.name, "lib");
        assert_eq!(lib.files.len(), 2);
        assert_eq!(program.files_scanned(), 4);
    }

    #[test]
    fn test_file_positions_are_disjoint() {
        let program = Program::from_sources(
            None,
            &[("a.go", "package a\n"), ("b.go", "package a\n")],
        )
        .unwrap();
        let files = &program.packages()[0].files;
        assert!(files[0].end() < files[1].pos(0));
        let pos = files[1].pos(3);
        assert_eq!(program.file_at(pos).map(|f| f.name.as_str()), Some("b.go"));
        assert!(program.file_at(Pos::new(0)).is_none());
    }

    #[test]
    fn test_literal_types() {
        let program = Program::from_sources(
            Some("m"),
            &[
                (
                    "lib/lib.go",
                    "package lib\n\ntype Config struct{ Name string }\n",
                ),
                (
                    "main.go",
                    r#"package main

import (
    l "m/lib"
    "time"
)

type Foo struct{ ID int }

var a = Foo{}
var b = l.Config{}
var c = []*Foo{{}}
var d = map[Foo]string{{}: ""}
var e = time.Time{}
var f = [...]Foo{{}, {}}
"#,
                ),
            ],
        )
        .unwrap();

        let main = program.package_by_path("m").unwrap();
        let file = &main.files[0];
        let arena = program.arena();
        let show = |i: usize| {
            file.literal_type(i)
                .map(|t| arena.display(t).to_string())
                .unwrap_or_default()
        };
        assert_eq!(show(0), "Foo");
        assert_eq!(show(1), "Config");
        assert_eq!(show(2), "[]*Foo");
        assert_eq!(show(3), "Foo");
        assert_eq!(show(4), "map[Foo]string");
        assert_eq!(show(5), "Foo");
        assert_eq!(file.literal_type(6), Some(arena.invalid()));
        assert_eq!(show(7), "[2]Foo");
        assert_eq!(show(8), "Foo");

        let config = file.literal_type(1).unwrap();
        let Type::Named(named) = arena.get(config) else {
            panic!("expected named type");
        };
        assert_eq!(
            program.package(named.package.unwrap()).map(|p| p.path.as_str()),
            Some("m/lib")
        );
    }

    #[test]
    fn test_load_skips_vendor_and_tests() {
        let dir = tempfile::TempDir::new().unwrap();
        let root = dir.path();
        fs::write(root.join("go.mod"), "module example.com/demo\n").unwrap();
        fs::write(root.join("a.go"), "package demo\n").unwrap();
        fs::write(root.join("a_test.go"), "package demo\n").unwrap();
        fs::create_dir_all(root.join("vendor/x")).unwrap();
        fs::write(root.join("vendor/x/x.go"), "package x\n").unwrap();
        fs::create_dir_all(root.join("gen")).unwrap();
        fs::write(root.join("gen/g.go"), "package gen\n").unwrap();

        let mut builder = globset::GlobSetBuilder::new();
        builder.add(globset::Glob::new("gen/**").unwrap());
        let options = LoadOptions {
            include_test_files: false,
            excluded: builder.build().unwrap(),
            module: None,
        };
        let program = Program::load(root, &options).unwrap();
        assert_eq!(program.module(), Some("example.com/demo"));
        assert_eq!(program.files_scanned(), 1);
        assert_eq!(program.packages()[0].files[0].name, "a.go");

        let options = LoadOptions {
            include_test_files: true,
            ..LoadOptions::default()
        };
        let program = Program::load(root, &options).unwrap();
        assert_eq!(program.files_scanned(), 3);
    }

    #[test]
    fn test_load_missing_root() {
        let err = Program::load(Path::new("/nonexistent/fillstruct"), &LoadOptions::default())
            .unwrap_err();
        assert!(matches!(err, LoadError::NotFound(_)));
    }
}
