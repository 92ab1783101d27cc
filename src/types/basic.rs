//! Predeclared basic types and their classification.

use phf::phf_map;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BasicKind {
    Bool,
    String,
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Uintptr,
    Float32,
    Float64,
    Complex64,
    Complex128,
    Byte,
    Rune,
    UnsafePointer,
}

/// Classification flags of a basic kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BasicInfo(u8);

impl BasicInfo {
    pub const BOOLEAN: BasicInfo = BasicInfo(1 << 0);
    pub const INTEGER: BasicInfo = BasicInfo(1 << 1);
    pub const UNSIGNED: BasicInfo = BasicInfo(1 << 2);
    pub const FLOAT: BasicInfo = BasicInfo(1 << 3);
    pub const COMPLEX: BasicInfo = BasicInfo(1 << 4);
    pub const STRING: BasicInfo = BasicInfo(1 << 5);
    pub const UNSAFE_POINTER: BasicInfo = BasicInfo(1 << 6);

    pub const NUMERIC: BasicInfo =
        BasicInfo(Self::INTEGER.0 | Self::UNSIGNED.0 | Self::FLOAT.0 | Self::COMPLEX.0);

    const fn union(self, other: BasicInfo) -> BasicInfo {
        BasicInfo(self.0 | other.0)
    }

    /// True when any flag of `other` is set.
    pub const fn intersects(self, other: BasicInfo) -> bool {
        self.0 & other.0 != 0
    }
}

/// Lookup table for the predeclared names.
static BASIC_NAMES: phf::Map<&'static str, BasicKind> = phf_map! {
    "bool" => BasicKind::Bool,
    "string" => BasicKind::String,
    "int" => BasicKind::Int,
    "int8" => BasicKind::Int8,
    "int16" => BasicKind::Int16,
    "int32" => BasicKind::Int32,
    "int64" => BasicKind::Int64,
    "uint" => BasicKind::Uint,
    "uint8" => BasicKind::Uint8,
    "uint16" => BasicKind::Uint16,
    "uint32" => BasicKind::Uint32,
    "uint64" => BasicKind::Uint64,
    "uintptr" => BasicKind::Uintptr,
    "float32" => BasicKind::Float32,
    "float64" => BasicKind::Float64,
    "complex64" => BasicKind::Complex64,
    "complex128" => BasicKind::Complex128,
    "byte" => BasicKind::Byte,
    "rune" => BasicKind::Rune,
};

impl BasicKind {
    /// Predeclared basic type by name. `unsafe.Pointer` is not a universe
    /// name and is resolved through the `unsafe` import instead.
    pub fn from_name(name: &str) -> Option<Self> {
        BASIC_NAMES.get(name).copied()
    }

    /// All kinds reachable through the universe scope.
    pub fn universe() -> impl Iterator<Item = (&'static str, BasicKind)> {
        BASIC_NAMES.entries().map(|(name, kind)| (*name, *kind))
    }

    pub fn name(self) -> &'static str {
        match self {
            BasicKind::Bool => "bool",
            BasicKind::String => "string",
            BasicKind::Int => "int",
            BasicKind::Int8 => "int8",
            BasicKind::Int16 => "int16",
            BasicKind::Int32 => "int32",
            BasicKind::Int64 => "int64",
            BasicKind::Uint => "uint",
            BasicKind::Uint8 => "uint8",
            BasicKind::Uint16 => "uint16",
            BasicKind::Uint32 => "uint32",
            BasicKind::Uint64 => "uint64",
            BasicKind::Uintptr => "uintptr",
            BasicKind::Float32 => "float32",
            BasicKind::Float64 => "float64",
            BasicKind::Complex64 => "complex64",
            BasicKind::Complex128 => "complex128",
            BasicKind::Byte => "byte",
            BasicKind::Rune => "rune",
            BasicKind::UnsafePointer => "Pointer",
        }
    }

    pub fn info(self) -> BasicInfo {
        match self {
            BasicKind::Bool => BasicInfo::BOOLEAN,
            BasicKind::String => BasicInfo::STRING,
            BasicKind::Int
            | BasicKind::Int8
            | BasicKind::Int16
            | BasicKind::Int32
            | BasicKind::Int64
            | BasicKind::Rune => BasicInfo::INTEGER,
            BasicKind::Uint
            | BasicKind::Uint8
            | BasicKind::Uint16
            | BasicKind::Uint32
            | BasicKind::Uint64
            | BasicKind::Uintptr
            | BasicKind::Byte => BasicInfo::INTEGER.union(BasicInfo::UNSIGNED),
            BasicKind::Float32 | BasicKind::Float64 => BasicInfo::FLOAT,
            BasicKind::Complex64 | BasicKind::Complex128 => BasicInfo::COMPLEX,
            BasicKind::UnsafePointer => BasicInfo::UNSAFE_POINTER,
        }
    }
}
