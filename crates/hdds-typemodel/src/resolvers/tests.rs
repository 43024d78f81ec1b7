// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com
//! Tests for the built-in resolvers and models.

use super::*;
use crate::container::Container;
use crate::error::ResolveError;
use crate::model::{downcast_model, Layout, ModelKind};
use crate::schema::{EnumLiteral, MemberDecl, ScalarKind, TypeDecl};

// --- schema fixtures ------------------------------------------------------

static VEC3_FIELDS: [MemberDecl; 3] = [
    MemberDecl::new("x", TypeDescriptor::FLOAT32),
    MemberDecl::new("y", TypeDescriptor::FLOAT32),
    MemberDecl::new("z", TypeDescriptor::FLOAT32),
];
static VEC3: TypeDecl = TypeDecl::structure("test::Vec3", &VEC3_FIELDS);

static PADDED_FIELDS: [MemberDecl; 3] = [
    MemberDecl::new("a", TypeDescriptor::UINT8),
    MemberDecl::new("b", TypeDescriptor::INT32),
    MemberDecl::new("c", TypeDescriptor::INT16),
];
static PADDED: TypeDecl = TypeDecl::structure("test::Padded", &PADDED_FIELDS);

static OUTER_FIELDS: [MemberDecl; 3] = [
    MemberDecl::new("flag", TypeDescriptor::BOOL),
    MemberDecl::new("pos", TypeDescriptor::decl(&VEC3)),
    MemberDecl::new("color", TypeDescriptor::decl(&COLOR)),
];
static OUTER: TypeDecl = TypeDecl::structure("test::Outer", &OUTER_FIELDS);

static COLOR_LITERALS: [EnumLiteral; 3] = [
    EnumLiteral::new("Red", 0),
    EnumLiteral::new("Green", 1),
    EnumLiteral::new("Blue", 2),
];
static COLOR: TypeDecl = TypeDecl::enumeration("test::Color", ScalarKind::UInt8, &COLOR_LITERALS);

static WEAPON_FIELDS: [MemberDecl; 1] = [MemberDecl::new("damage", TypeDescriptor::INT16)];
static WEAPON: TypeDecl = TypeDecl::table("test::Weapon", &WEAPON_FIELDS);

static EQUIPMENT_VARIANTS: [MemberDecl; 2] = [
    MemberDecl::new("weapon", TypeDescriptor::decl(&WEAPON)),
    MemberDecl::new("offset", TypeDescriptor::decl(&VEC3)),
];
static EQUIPMENT: TypeDecl = TypeDecl::union("test::Equipment", &EQUIPMENT_VARIANTS);

static MONSTER_FIELDS: [MemberDecl; 5] = [
    MemberDecl::new("id", TypeDescriptor::UINT32).with_tags(&[("key", "")]),
    MemberDecl::new("pos", TypeDescriptor::decl(&VEC3)),
    MemberDecl::new("color", TypeDescriptor::decl(&COLOR)),
    MemberDecl::new("equipped", TypeDescriptor::decl(&EQUIPMENT)),
    MemberDecl::new("hp", TypeDescriptor::INT16).deprecated(),
];
static MONSTER: TypeDecl = TypeDecl::table("test::Monster", &MONSTER_FIELDS);

// --- scalar -----------------------------------------------------------------

#[test]
fn test_scalar_models() {
    let container = Container::create_default();
    for kind in ScalarKind::ALL {
        let model = container.create_model(TypeDescriptor::scalar(kind));
        assert_eq!(model.kind(), ModelKind::Scalar);
        assert_eq!(model.layout(), Some(Layout::new(kind.size(), kind.alignment())));
        let scalar = downcast_model::<ScalarModel>(&model).unwrap();
        assert_eq!(scalar.scalar_kind(), kind);
    }
    assert_eq!(container.len(), ScalarKind::ALL.len());
}

#[test]
fn test_resolvers_decline_foreign_descriptors() {
    let container = Container::new();
    assert!(container.resolver_names().is_empty());
    let container = Container::create_default();
    assert_eq!(container.resolver_names(), vec!["scalar", "composite"]);

    // Composite-only container cannot resolve scalar members.
    let container = Container::builder().resolver(CompositeResolver).build();
    let err = container.resolve(TypeDescriptor::decl(&VEC3)).unwrap_err();
    assert_eq!(
        err,
        ResolveError::NotResolvable {
            descriptor: TypeDescriptor::FLOAT32
        }
    );
    assert!(container.is_empty());
}

// --- structs ----------------------------------------------------------------

#[test]
fn test_struct_layout() {
    let container = Container::create_default();
    let model = container.create_model(TypeDescriptor::decl(&VEC3));
    assert_eq!(model.layout(), Some(Layout::new(12, 4)));

    let model = container.create_model(TypeDescriptor::decl(&PADDED));
    let padded = downcast_model::<StructModel>(&model).unwrap();
    let layout = padded.struct_layout().unwrap();
    let offsets: Vec<_> = layout.fields.iter().map(|f| f.offset).collect();
    assert_eq!(offsets, vec![0, 4, 8]);
    assert_eq!(layout.size, 12);
    assert_eq!(layout.alignment, 4);
}

#[test]
fn test_nested_struct_and_enum_layout() {
    let container = Container::create_default();
    let model = container.create_model(TypeDescriptor::decl(&OUTER));
    let outer = downcast_model::<StructModel>(&model).unwrap();
    let layout = outer.struct_layout().unwrap();

    assert_eq!(layout.fields[0].offset, 0);
    assert_eq!(layout.fields[1].offset, 4);
    assert_eq!(layout.fields[1].size, 12);
    assert_eq!(layout.fields[2].offset, 16);
    assert_eq!(layout.size, 20);

    // Nested types were resolved in the same transaction.
    assert!(container.contains(TypeDescriptor::decl(&VEC3)));
    assert!(container.contains(TypeDescriptor::decl(&COLOR)));
    assert!(container.contains(TypeDescriptor::UINT8));
    let pos = outer.member_model("pos").unwrap();
    let cached = container.try_get_model(TypeDescriptor::decl(&VEC3)).unwrap();
    assert!(std::sync::Arc::ptr_eq(&pos, &cached));
}

static HOLDS_TABLE_FIELDS: [MemberDecl; 1] =
    [MemberDecl::new("weapon", TypeDescriptor::decl(&WEAPON))];
static HOLDS_TABLE: TypeDecl = TypeDecl::structure("test::HoldsTable", &HOLDS_TABLE_FIELDS);

static DEPRECATED_FIELDS: [MemberDecl; 1] =
    [MemberDecl::new("old", TypeDescriptor::INT32).deprecated()];
static DEPRECATED_STRUCT: TypeDecl = TypeDecl::structure("test::Deprecated", &DEPRECATED_FIELDS);

static EMPTY_STRUCT: TypeDecl = TypeDecl::structure("test::Empty", &[]);

#[test]
fn test_struct_rejections() {
    let container = Container::create_default();

    let err = container.resolve(TypeDescriptor::decl(&HOLDS_TABLE)).unwrap_err();
    assert!(err.to_string().contains("non-inline"), "{}", err);

    let err = container.resolve(TypeDescriptor::decl(&DEPRECATED_STRUCT)).unwrap_err();
    assert!(err.to_string().contains("deprecated"), "{}", err);

    let err = container.resolve(TypeDescriptor::decl(&EMPTY_STRUCT)).unwrap_err();
    assert!(err.to_string().contains("at least one member"), "{}", err);

    assert!(container.is_empty());
}

static RECURSIVE_FIELDS: [MemberDecl; 2] = [
    MemberDecl::new("value", TypeDescriptor::INT32),
    MemberDecl::new("again", TypeDescriptor::decl(&RECURSIVE_STRUCT)),
];
static RECURSIVE_STRUCT: TypeDecl = TypeDecl::structure("test::Recursive", &RECURSIVE_FIELDS);

#[test]
fn test_struct_containing_itself_never_converges() {
    let container = Container::create_default();
    let err = container
        .resolve(TypeDescriptor::decl(&RECURSIVE_STRUCT))
        .unwrap_err();
    match &err {
        ResolveError::Validation { descriptor, source } => {
            assert_eq!(*descriptor, TypeDescriptor::decl(&RECURSIVE_STRUCT));
            assert!(source.reason.contains("did not converge"), "{}", source);
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(container.stats().rolled_back >= 1);
    assert!(container.is_empty(), "int32 resolved in the same transaction is discarded too");
}

// --- tables -----------------------------------------------------------------

#[test]
fn test_table_slots_and_key() {
    let container = Container::create_default();
    let model = container.create_model(TypeDescriptor::decl(&MONSTER));
    assert_eq!(model.kind(), ModelKind::Table);
    assert_eq!(model.layout(), Some(Layout::UOFFSET));

    let monster = downcast_model::<TableModel>(&model).unwrap();
    let slots = monster.slots().unwrap();
    let placement: Vec<_> = slots.iter().map(|s| (s.name, s.slot, s.width)).collect();
    assert_eq!(
        placement,
        vec![
            ("id", 0, 1),
            ("pos", 1, 1),
            ("color", 2, 1),
            ("equipped", 3, 2),
            ("hp", 5, 1),
        ]
    );
    assert!(slots[4].deprecated);
    assert_eq!(monster.key_field().map(|s| s.name), Some("id"));
    assert_eq!(monster.vtable_len(), Some(6));
}

static INDEXED_FIELDS: [MemberDecl; 3] = [
    MemberDecl::new("late", TypeDescriptor::INT64).with_index(4),
    MemberDecl::new("item", TypeDescriptor::decl(&EQUIPMENT)).with_index(0),
    MemberDecl::new("early", TypeDescriptor::BOOL).with_index(2),
];
static INDEXED: TypeDecl = TypeDecl::table("test::Indexed", &INDEXED_FIELDS);

static MIXED_FIELDS: [MemberDecl; 2] = [
    MemberDecl::new("a", TypeDescriptor::INT64).with_index(1),
    MemberDecl::new("b", TypeDescriptor::INT64),
];
static MIXED: TypeDecl = TypeDecl::table("test::Mixed", &MIXED_FIELDS);

static COLLIDING_FIELDS: [MemberDecl; 2] = [
    MemberDecl::new("item", TypeDescriptor::decl(&EQUIPMENT)).with_index(0),
    MemberDecl::new("flag", TypeDescriptor::BOOL).with_index(1),
];
static COLLIDING: TypeDecl = TypeDecl::table("test::Colliding", &COLLIDING_FIELDS);

#[test]
fn test_table_explicit_indices() {
    let container = Container::create_default();
    let model = container.create_model(TypeDescriptor::decl(&INDEXED));
    let table = downcast_model::<TableModel>(&model).unwrap();
    let placement: Vec<_> = table
        .slots()
        .unwrap()
        .iter()
        .map(|s| (s.name, s.slot))
        .collect();
    assert_eq!(placement, vec![("late", 4), ("item", 0), ("early", 2)]);
    assert_eq!(table.vtable_len(), Some(5));
}

#[test]
fn test_table_index_errors() {
    let container = Container::create_default();

    let err = container.resolve(TypeDescriptor::decl(&MIXED)).unwrap_err();
    assert!(err.to_string().contains("explicit index"), "{}", err);

    let err = container.resolve(TypeDescriptor::decl(&COLLIDING)).unwrap_err();
    assert!(err.to_string().contains("collides"), "{}", err);
    assert!(!container.contains(TypeDescriptor::decl(&EQUIPMENT)));
}

static TWO_KEYS_FIELDS: [MemberDecl; 2] = [
    MemberDecl::new("a", TypeDescriptor::INT32).with_tags(&[("key", "")]),
    MemberDecl::new("b", TypeDescriptor::INT32).with_tags(&[("key", "")]),
];
static TWO_KEYS: TypeDecl = TypeDecl::table("test::TwoKeys", &TWO_KEYS_FIELDS);

static TABLE_KEY_FIELDS: [MemberDecl; 1] =
    [MemberDecl::new("weapon", TypeDescriptor::decl(&WEAPON)).with_tags(&[("key", "")])];
static TABLE_KEY: TypeDecl = TypeDecl::table("test::TableKey", &TABLE_KEY_FIELDS);

#[test]
fn test_table_key_errors() {
    let container = Container::create_default();

    let err = container.resolve(TypeDescriptor::decl(&TWO_KEYS)).unwrap_err();
    assert!(err.to_string().contains("both tagged"), "{}", err);

    let err = container.resolve(TypeDescriptor::decl(&TABLE_KEY)).unwrap_err();
    assert!(err.to_string().contains("scalar or enum"), "{}", err);
}

// --- unions -----------------------------------------------------------------

static SCALAR_UNION_VARIANTS: [MemberDecl; 1] = [MemberDecl::new("n", TypeDescriptor::INT32)];
static SCALAR_UNION: TypeDecl = TypeDecl::union("test::ScalarUnion", &SCALAR_UNION_VARIANTS);

static DUP_UNION_VARIANTS: [MemberDecl; 2] = [
    MemberDecl::new("a", TypeDescriptor::decl(&WEAPON)),
    MemberDecl::new("b", TypeDescriptor::decl(&WEAPON)),
];
static DUP_UNION: TypeDecl = TypeDecl::union("test::DupUnion", &DUP_UNION_VARIANTS);

static NESTED_UNION_VARIANTS: [MemberDecl; 1] =
    [MemberDecl::new("inner", TypeDescriptor::decl(&EQUIPMENT))];
static NESTED_UNION: TypeDecl = TypeDecl::union("test::NestedUnion", &NESTED_UNION_VARIANTS);

static EMPTY_UNION: TypeDecl = TypeDecl::union("test::EmptyUnion", &[]);

#[test]
fn test_union_variants() {
    let container = Container::create_default();
    let model = container.create_model(TypeDescriptor::decl(&EQUIPMENT));
    let union = downcast_model::<UnionModel>(&model).unwrap();
    assert_eq!(union.variants().len(), 2);
    assert_eq!(union.discriminant(TypeDescriptor::decl(&WEAPON)), Some(1));
    assert_eq!(union.discriminant(TypeDescriptor::decl(&VEC3)), Some(2));
    assert_eq!(union.discriminant(TypeDescriptor::INT32), None);
}

#[test]
fn test_union_rejections() {
    let container = Container::create_default();
    for (decl, needle) in [
        (&SCALAR_UNION, "tables or structs"),
        (&DUP_UNION, "more than one variant"),
        (&NESTED_UNION, "tables or structs"),
        (&EMPTY_UNION, "at least one variant"),
    ] {
        let err = container.resolve(TypeDescriptor::decl(decl)).unwrap_err();
        assert!(err.to_string().contains(needle), "{}: {}", decl.name, err);
    }
    assert!(container.is_empty());
}

// --- enums ------------------------------------------------------------------

static OVERFLOW_LITERALS: [EnumLiteral; 2] = [EnumLiteral::new("Low", 0), EnumLiteral::new("High", 300)];
static OVERFLOW_ENUM: TypeDecl =
    TypeDecl::enumeration("test::Overflow", ScalarKind::UInt8, &OVERFLOW_LITERALS);

static FLOAT_LITERALS: [EnumLiteral; 1] = [EnumLiteral::new("Half", 0)];
static FLOAT_ENUM: TypeDecl =
    TypeDecl::enumeration("test::FloatEnum", ScalarKind::Float32, &FLOAT_LITERALS);

static DUP_LITERALS: [EnumLiteral; 2] = [EnumLiteral::new("A", 0), EnumLiteral::new("A", 1)];
static DUP_ENUM: TypeDecl = TypeDecl::enumeration("test::DupEnum", ScalarKind::Int8, &DUP_LITERALS);

static ALIAS_LITERALS: [EnumLiteral; 3] = [
    EnumLiteral::new("Min", -32768),
    EnumLiteral::new("Default", 0),
    EnumLiteral::new("Zero", 0),
];
static ALIAS_ENUM: TypeDecl =
    TypeDecl::enumeration("test::AliasEnum", ScalarKind::Int16, &ALIAS_LITERALS);

static EMPTY_ENUM: TypeDecl = TypeDecl::enumeration("test::EmptyEnum", ScalarKind::Int32, &[]);

#[test]
fn test_enum_model() {
    let container = Container::create_default();
    let model = container.create_model(TypeDescriptor::decl(&COLOR));
    assert_eq!(model.kind(), ModelKind::Enum);
    assert_eq!(model.layout(), Some(Layout::new(1, 1)));
    let color = downcast_model::<EnumModel>(&model).unwrap();
    assert_eq!(color.underlying(), ScalarKind::UInt8);
    assert_eq!(color.value_of("Blue"), Some(2));
    assert_eq!(color.value_of("Purple"), None);

    let model = container.create_model(TypeDescriptor::decl(&ALIAS_ENUM));
    assert_eq!(model.layout(), Some(Layout::new(2, 2)));
}

#[test]
fn test_enum_rejections() {
    let container = Container::create_default();
    for (decl, needle) in [
        (&OVERFLOW_ENUM, "does not fit"),
        (&FLOAT_ENUM, "not an integer"),
        (&DUP_ENUM, "declared twice"),
        (&EMPTY_ENUM, "at least one literal"),
    ] {
        let err = container.resolve(TypeDescriptor::decl(decl)).unwrap_err();
        assert!(err.to_string().contains(needle), "{}: {}", decl.name, err);
    }
}

// --- custom layouts inside structs ------------------------------------------

/// `int32` replacement reporting an arbitrary layout.
#[derive(Debug)]
struct OddInt(Layout);

impl crate::model::TypeModel for OddInt {
    fn descriptor(&self) -> TypeDescriptor {
        TypeDescriptor::INT32
    }

    fn kind(&self) -> ModelKind {
        ModelKind::Scalar
    }

    fn initialize(&self, _cx: &mut ResolveContext<'_>) -> Result<(), ResolveError> {
        Ok(())
    }

    fn validate(&self) -> crate::model::Validation {
        crate::model::Validation::Ok
    }

    fn layout(&self) -> Option<Layout> {
        Some(self.0)
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

struct OddIntResolver(Layout);

impl TypeResolver for OddIntResolver {
    fn name(&self) -> &str {
        "odd-int"
    }

    fn try_claim(&self, descriptor: TypeDescriptor, _cx: &ResolveContext<'_>) -> Option<ModelRef> {
        (descriptor == TypeDescriptor::INT32).then(|| Arc::new(OddInt(self.0)) as ModelRef)
    }
}

fn container_with_int32_layout(layout: Layout) -> Container {
    let mut container = Container::new();
    container.register_resolver(OddIntResolver(layout));
    container.register_resolver(ScalarResolver);
    container.register_resolver(CompositeResolver);
    container
}

static TWO_INTS_FIELDS: [MemberDecl; 3] = [
    MemberDecl::new("flag", TypeDescriptor::UINT8),
    MemberDecl::new("a", TypeDescriptor::INT32),
    MemberDecl::new("b", TypeDescriptor::INT32),
];
static TWO_INTS: TypeDecl = TypeDecl::structure("test::TwoInts", &TWO_INTS_FIELDS);

#[test]
fn test_struct_rejects_invalid_member_alignment() {
    for alignment in [0, 3, 12] {
        let container = container_with_int32_layout(Layout::new(4, alignment));
        let err = container.resolve(TypeDescriptor::decl(&TWO_INTS)).unwrap_err();
        match &err {
            ResolveError::Validation { descriptor, source } => {
                assert_eq!(*descriptor, TypeDescriptor::decl(&TWO_INTS));
                assert!(source.reason.contains("powers of two"), "{}", source);
            }
            other => panic!("alignment {}: unexpected error {:?}", alignment, other),
        }
        assert!(container.is_empty());
    }
}

#[test]
fn test_struct_size_overflow_is_fatal() {
    let container = container_with_int32_layout(Layout::new(usize::MAX - 2, 1));
    let err = container.resolve(TypeDescriptor::decl(&TWO_INTS)).unwrap_err();
    assert!(err.to_string().contains("overflows"), "{}", err);
    assert!(container.is_empty());

    // A well-formed custom layout still lays out normally.
    let container = container_with_int32_layout(Layout::new(8, 8));
    let model = container.create_model(TypeDescriptor::decl(&TWO_INTS));
    assert_eq!(model.layout(), Some(Layout::new(24, 8)));
}
