//! Source position bookkeeping.
//!
//! A `FileSet` hands out disjoint position ranges to the files added to it,
//! so a single `Pos` identifies both a file and a byte offset within it.
//! `Pos` zero is reserved as the invalid position; the first file of every
//! set starts at base 1.

use std::fmt;

/// A compact position within a `FileSet`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Pos(usize);

/// The invalid position. Synthesized nodes carry it.
pub const NO_POS: Pos = Pos(0);

impl Pos {
    pub const fn new(value: usize) -> Self {
        Self(value)
    }

    pub const fn get(self) -> usize {
        self.0
    }

    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Line and column (both 1-indexed, column counted in bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

/// Position table for one file: its base, size, and line start offsets.
#[derive(Debug, Clone)]
pub struct File {
    name: String,
    base: usize,
    size: usize,
    /// Byte offsets of line starts; `lines[0]` is always 0.
    lines: Vec<usize>,
}

impl File {
    fn new(name: &str, base: usize, size: usize) -> Self {
        Self {
            name: name.to_string(),
            base,
            size,
            lines: vec![0],
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base(&self) -> usize {
        self.base
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Position of a byte offset, clamped to the end of the file.
    pub fn pos(&self, offset: usize) -> Pos {
        Pos(self.base + offset.min(self.size))
    }

    /// Byte offset of a position, clamped to the file's range.
    pub fn offset(&self, pos: Pos) -> usize {
        pos.0.saturating_sub(self.base).min(self.size)
    }

    /// Whether `pos` lies within `[base, base + size]`.
    pub fn contains(&self, pos: Pos) -> bool {
        self.base <= pos.0 && pos.0 <= self.base + self.size
    }

    /// Record a new line start. Offsets must be strictly increasing and
    /// inside the file; anything else is ignored.
    pub fn add_line(&mut self, offset: usize) -> bool {
        let last = self.lines.last().copied().unwrap_or(0);
        if offset > last && offset < self.size {
            self.lines.push(offset);
            true
        } else {
            false
        }
    }

    /// Rebuild the line table from file content.
    pub fn set_lines_for_content(&mut self, content: &[u8]) {
        self.lines.clear();
        self.lines.push(0);
        for (i, byte) in content.iter().enumerate() {
            if *byte == b'\n' && i + 1 < self.size {
                self.lines.push(i + 1);
            }
        }
    }

    /// 1-indexed line containing `pos`.
    pub fn line(&self, pos: Pos) -> usize {
        let offset = self.offset(pos);
        self.lines.partition_point(|&start| start <= offset)
    }

    /// Start position of a 1-indexed line, if the table knows it.
    pub fn line_start(&self, line: usize) -> Option<Pos> {
        if line == 0 {
            return None;
        }
        self.lines.get(line - 1).map(|&offset| Pos(self.base + offset))
    }

    pub fn position(&self, pos: Pos) -> Position {
        let line = self.line(pos);
        let start = self.lines[line.saturating_sub(1)];
        Position {
            line,
            column: self.offset(pos) - start + 1,
        }
    }

    /// Start of the line after the one holding `pos`.
    ///
    /// Used to mint synthetic positions: when the table has no following
    /// line yet, one is added right after `pos`, growing the file when the
    /// new line would fall past its end. Only ever called on a private
    /// table, never on the program's own files.
    pub fn next_line_pos(&mut self, pos: Pos) -> Pos {
        let line = self.line(pos);
        if line + 1 > self.line_count() {
            let offset = self.offset(pos) + 1;
            if offset >= self.size {
                self.size = offset + 1;
            }
            self.add_line(offset);
        }
        Pos(self.base + self.lines[line])
    }
}

/// A set of files with disjoint position ranges.
#[derive(Debug, Clone, Default)]
pub struct FileSet {
    files: Vec<File>,
}

impl FileSet {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_base(&self) -> usize {
        self.files
            .last()
            .map(|f| f.base + f.size + 1)
            .unwrap_or(1)
    }

    /// Add a file of `size` bytes and return its table.
    ///
    /// Only the most recently added file is handed out mutably, so a table
    /// growing through `next_line_pos` never overlaps another file.
    pub fn add_file(&mut self, name: &str, size: usize) -> &mut File {
        let base = self.next_base();
        self.files.push(File::new(name, base, size));
        let last = self.files.len() - 1;
        &mut self.files[last]
    }

    /// The file containing `pos`.
    pub fn file(&self, pos: Pos) -> Option<&File> {
        if !pos.is_valid() {
            return None;
        }
        self.files.iter().find(|f| f.contains(pos))
    }

    /// Line of `pos`, or 0 for positions outside every file.
    pub fn line(&self, pos: Pos) -> usize {
        self.file(pos).map(|f| f.line(pos)).unwrap_or(0)
    }

    pub fn files(&self) -> &[File] {
        &self.files
    }
}
