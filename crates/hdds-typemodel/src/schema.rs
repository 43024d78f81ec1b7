// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Host type system: type descriptors and schema declarations.
//!
//! A [`TypeDescriptor`] is the stable identity of a data type and the key
//! of every model cache. Scalars are identified by their [`ScalarKind`];
//! declared types (struct, table, union, enum) are identified by the
//! address of their `'static` [`TypeDecl`], the same way compiled host
//! types are. Because declarations are statics, self-referential and
//! mutually-recursive schemas are plain static references:
//!
//! ```
//! use hdds_typemodel::schema::{MemberDecl, TypeDecl, TypeDescriptor};
//!
//! static NODE_MEMBERS: [MemberDecl; 2] = [
//!     MemberDecl::new("value", TypeDescriptor::INT32),
//!     MemberDecl::new("next", TypeDescriptor::decl(&NODE)),
//! ];
//! static NODE: TypeDecl = TypeDecl::table("demo::Node", &NODE_MEMBERS);
//!
//! let node = TypeDescriptor::decl(&NODE);
//! assert_eq!(node.name(), "demo::Node");
//! ```
//!
//! Member metadata ([`MemberMetadata`]) is carried verbatim for resolvers;
//! nothing in the container interprets it.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::ptr;

/// Fixed-width primitive kinds understood by the scalar resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Bool,
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Float32,
    Float64,
}

impl ScalarKind {
    /// All scalar kinds, in declaration order.
    pub const ALL: [ScalarKind; 11] = [
        ScalarKind::Bool,
        ScalarKind::Int8,
        ScalarKind::UInt8,
        ScalarKind::Int16,
        ScalarKind::UInt16,
        ScalarKind::Int32,
        ScalarKind::UInt32,
        ScalarKind::Int64,
        ScalarKind::UInt64,
        ScalarKind::Float32,
        ScalarKind::Float64,
    ];

    /// Encoded size in bytes.
    pub const fn size(self) -> usize {
        match self {
            ScalarKind::Bool | ScalarKind::Int8 | ScalarKind::UInt8 => 1,
            ScalarKind::Int16 | ScalarKind::UInt16 => 2,
            ScalarKind::Int32 | ScalarKind::UInt32 | ScalarKind::Float32 => 4,
            ScalarKind::Int64 | ScalarKind::UInt64 | ScalarKind::Float64 => 8,
        }
    }

    /// Scalars are naturally aligned.
    pub const fn alignment(self) -> usize {
        self.size()
    }

    pub const fn is_integer(self) -> bool {
        !matches!(
            self,
            ScalarKind::Bool | ScalarKind::Float32 | ScalarKind::Float64
        )
    }

    pub const fn is_signed(self) -> bool {
        matches!(
            self,
            ScalarKind::Int8 | ScalarKind::Int16 | ScalarKind::Int32 | ScalarKind::Int64
        )
    }

    /// Inclusive value range for integer kinds, `None` otherwise.
    pub const fn integer_range(self) -> Option<(i128, i128)> {
        match self {
            ScalarKind::Int8 => Some((i8::MIN as i128, i8::MAX as i128)),
            ScalarKind::UInt8 => Some((0, u8::MAX as i128)),
            ScalarKind::Int16 => Some((i16::MIN as i128, i16::MAX as i128)),
            ScalarKind::UInt16 => Some((0, u16::MAX as i128)),
            ScalarKind::Int32 => Some((i32::MIN as i128, i32::MAX as i128)),
            ScalarKind::UInt32 => Some((0, u32::MAX as i128)),
            ScalarKind::Int64 => Some((i64::MIN as i128, i64::MAX as i128)),
            ScalarKind::UInt64 => Some((0, u64::MAX as i128)),
            ScalarKind::Bool | ScalarKind::Float32 | ScalarKind::Float64 => None,
        }
    }

    /// Schema-language spelling (`int32`, `float64`, ...).
    pub const fn name(self) -> &'static str {
        match self {
            ScalarKind::Bool => "bool",
            ScalarKind::Int8 => "int8",
            ScalarKind::UInt8 => "uint8",
            ScalarKind::Int16 => "int16",
            ScalarKind::UInt16 => "uint16",
            ScalarKind::Int32 => "int32",
            ScalarKind::UInt32 => "uint32",
            ScalarKind::Int64 => "int64",
            ScalarKind::UInt64 => "uint64",
            ScalarKind::Float32 => "float32",
            ScalarKind::Float64 => "float64",
        }
    }
}

/// Kind of a declared (non-scalar) type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    /// Fixed-size inline aggregate.
    Struct,
    /// Offset-referenced aggregate with a vtable.
    Table,
    /// Discriminated union of tables/structs.
    Union,
    /// Named integer constants over an underlying scalar.
    Enum { underlying: ScalarKind },
}

impl DeclKind {
    pub const fn name(self) -> &'static str {
        match self {
            DeclKind::Struct => "struct",
            DeclKind::Table => "table",
            DeclKind::Union => "union",
            DeclKind::Enum { .. } => "enum",
        }
    }
}

/// One `key = value` tag attached to a member.
pub type Tag = (&'static str, &'static str);

/// Declarative per-member metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberMetadata {
    /// Explicit ordering index (vtable slot for tables).
    pub index: Option<u16>,
    pub deprecated: bool,
    pub tags: &'static [Tag],
}

impl MemberMetadata {
    pub const EMPTY: MemberMetadata = MemberMetadata {
        index: None,
        deprecated: false,
        tags: &[],
    };

    /// Value of the tag named `key`, if present. A bare tag has an empty value.
    pub fn tag(&self, key: &str) -> Option<&'static str> {
        self.tags.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
    }

    pub fn has_tag(&self, key: &str) -> bool {
        self.tag(key).is_some()
    }
}

impl Default for MemberMetadata {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// A struct/table field or a union variant.
#[derive(Debug, Clone, Copy)]
pub struct MemberDecl {
    pub name: &'static str,
    pub ty: TypeDescriptor,
    pub metadata: MemberMetadata,
}

impl MemberDecl {
    pub const fn new(name: &'static str, ty: TypeDescriptor) -> Self {
        Self {
            name,
            ty,
            metadata: MemberMetadata::EMPTY,
        }
    }

    pub const fn with_index(mut self, index: u16) -> Self {
        self.metadata.index = Some(index);
        self
    }

    pub const fn deprecated(mut self) -> Self {
        self.metadata.deprecated = true;
        self
    }

    pub const fn with_tags(mut self, tags: &'static [Tag]) -> Self {
        self.metadata.tags = tags;
        self
    }
}

/// A named enum constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumLiteral {
    pub name: &'static str,
    pub value: i128,
}

impl EnumLiteral {
    pub const fn new(name: &'static str, value: i128) -> Self {
        Self { name, value }
    }
}

/// Declaration of a struct, table, union or enum.
#[derive(Debug)]
pub struct TypeDecl {
    pub name: &'static str,
    pub kind: DeclKind,
    /// Fields (struct/table) or variants (union). Empty for enums.
    pub members: &'static [MemberDecl],
    /// Constants (enum only).
    pub literals: &'static [EnumLiteral],
}

impl TypeDecl {
    pub const fn structure(name: &'static str, members: &'static [MemberDecl]) -> Self {
        Self {
            name,
            kind: DeclKind::Struct,
            members,
            literals: &[],
        }
    }

    pub const fn table(name: &'static str, members: &'static [MemberDecl]) -> Self {
        Self {
            name,
            kind: DeclKind::Table,
            members,
            literals: &[],
        }
    }

    pub const fn union(name: &'static str, variants: &'static [MemberDecl]) -> Self {
        Self {
            name,
            kind: DeclKind::Union,
            members: variants,
            literals: &[],
        }
    }

    pub const fn enumeration(
        name: &'static str,
        underlying: ScalarKind,
        literals: &'static [EnumLiteral],
    ) -> Self {
        Self {
            name,
            kind: DeclKind::Enum { underlying },
            members: &[],
            literals,
        }
    }
}

/// Stable identity of a data type; cache key of the resolution engine.
///
/// Equality and hashing are total: scalars compare by kind, declarations
/// by the identity (address) of their static declaration.
#[derive(Clone, Copy)]
pub enum TypeDescriptor {
    Scalar(ScalarKind),
    Decl(&'static TypeDecl),
}

impl TypeDescriptor {
    pub const BOOL: TypeDescriptor = TypeDescriptor::Scalar(ScalarKind::Bool);
    pub const INT8: TypeDescriptor = TypeDescriptor::Scalar(ScalarKind::Int8);
    pub const UINT8: TypeDescriptor = TypeDescriptor::Scalar(ScalarKind::UInt8);
    pub const INT16: TypeDescriptor = TypeDescriptor::Scalar(ScalarKind::Int16);
    pub const UINT16: TypeDescriptor = TypeDescriptor::Scalar(ScalarKind::UInt16);
    pub const INT32: TypeDescriptor = TypeDescriptor::Scalar(ScalarKind::Int32);
    pub const UINT32: TypeDescriptor = TypeDescriptor::Scalar(ScalarKind::UInt32);
    pub const INT64: TypeDescriptor = TypeDescriptor::Scalar(ScalarKind::Int64);
    pub const UINT64: TypeDescriptor = TypeDescriptor::Scalar(ScalarKind::UInt64);
    pub const FLOAT32: TypeDescriptor = TypeDescriptor::Scalar(ScalarKind::Float32);
    pub const FLOAT64: TypeDescriptor = TypeDescriptor::Scalar(ScalarKind::Float64);

    pub const fn scalar(kind: ScalarKind) -> Self {
        TypeDescriptor::Scalar(kind)
    }

    pub const fn decl(decl: &'static TypeDecl) -> Self {
        TypeDescriptor::Decl(decl)
    }

    pub fn name(&self) -> &'static str {
        match self {
            TypeDescriptor::Scalar(kind) => kind.name(),
            TypeDescriptor::Decl(decl) => decl.name,
        }
    }

    pub fn as_scalar(&self) -> Option<ScalarKind> {
        match self {
            TypeDescriptor::Scalar(kind) => Some(*kind),
            TypeDescriptor::Decl(_) => None,
        }
    }

    pub fn as_decl(&self) -> Option<&'static TypeDecl> {
        match self {
            TypeDescriptor::Scalar(_) => None,
            TypeDescriptor::Decl(decl) => Some(decl),
        }
    }
}

impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (TypeDescriptor::Scalar(a), TypeDescriptor::Scalar(b)) => a == b,
            (TypeDescriptor::Decl(a), TypeDescriptor::Decl(b)) => ptr::eq(*a, *b),
            _ => false,
        }
    }
}

impl Eq for TypeDescriptor {}

impl Hash for TypeDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            TypeDescriptor::Scalar(kind) => {
                0u8.hash(state);
                kind.hash(state);
            }
            TypeDescriptor::Decl(decl) => {
                1u8.hash(state);
                ptr::hash(*decl, state);
            }
        }
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDescriptor::Scalar(kind) => write!(f, "Scalar({})", kind.name()),
            TypeDescriptor::Decl(decl) => write!(f, "{}({})", decl.kind.name(), decl.name),
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<ScalarKind> for TypeDescriptor {
    fn from(kind: ScalarKind) -> Self {
        TypeDescriptor::Scalar(kind)
    }
}

impl From<&'static TypeDecl> for TypeDescriptor {
    fn from(decl: &'static TypeDecl) -> Self {
        TypeDescriptor::Decl(decl)
    }
}
