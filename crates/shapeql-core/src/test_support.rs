//! Shared fixtures for unit tests.

use crate::{
    config::CompileConfig,
    error::CompileError,
    eval::{Dataset, Datum},
    model::{EntityModel, SchemaModel},
    query::{CompileRequest, CompiledQuery, Compiler},
    value::{ScalarType, Value},
};

/// Bar -> Foo (required) -> BarDeep collection / optional nested object,
/// plus a nullable variant whose relations are all optional.
pub(crate) fn schema() -> SchemaModel {
    SchemaModel::new([
        EntityModel::new("Bar")
            .key("id", ScalarType::Text)
            .one("foo", "Foo"),
        EntityModel::new("Foo")
            .key("id", ScalarType::Text)
            .scalar("barShort", ScalarType::Int)
            .scalar("barString", ScalarType::Text)
            .scalar("barEnum", ScalarType::Enum)
            .scalar("barBool", ScalarType::Bool)
            .many("objectArray", "BarDeep")
            .optional("nestedObject", "BarDeep"),
        EntityModel::new("BarDeep")
            .key("id", ScalarType::Text)
            .one("foo", "FooDeep"),
        EntityModel::new("FooDeep")
            .key("id", ScalarType::Text)
            .scalar("barShort", ScalarType::Int)
            .scalar("barString", ScalarType::Text),
        EntityModel::new("BarNullable")
            .key("id", ScalarType::Text)
            .optional("foo", "FooNullable"),
        EntityModel::new("FooNullable")
            .key("id", ScalarType::Text)
            .nullable("barShort", ScalarType::Int)
            .nullable("barString", ScalarType::Text)
            .optional("nested", "FooDeep"),
        EntityModel::new("Orphan")
            .key("id", ScalarType::Text)
            .optional("ghost", "Ghost"),
        EntityModel::new("Ghost").nullable("label", ScalarType::Text),
    ])
    .expect("fixture schema")
}

pub(crate) fn compile(request: &CompileRequest) -> Result<CompiledQuery, CompileError> {
    compile_with(&CompileConfig::default(), request)
}

pub(crate) fn compile_with(
    config: &CompileConfig,
    request: &CompileRequest,
) -> Result<CompiledQuery, CompileError> {
    let schema = schema();
    Compiler::new(&schema, config).compile(request)
}

pub(crate) fn text(value: &str) -> Datum {
    Datum::value(value)
}

fn bar_deep(id: &str, short: i64, string: &str) -> Datum {
    Datum::record([
        ("id", text(id)),
        (
            "foo",
            Datum::record([
                ("id", text(&format!("{id}-foo"))),
                ("barShort", Datum::value(short)),
                ("barString", text(string)),
            ]),
        ),
    ])
}

/// Two `Bar` rows, each with a mixed `objectArray`; only the first has a
/// nested object.
pub(crate) fn bars() -> Dataset {
    let first = Datum::record([
        ("id", text("bar-1")),
        (
            "foo",
            Datum::record([
                ("id", text("foo-1")),
                ("barShort", Datum::value(12_i64)),
                ("barString", text("testatest")),
                ("barEnum", Datum::value(Value::enumeration("BAR"))),
                ("barBool", Datum::value(true)),
                (
                    "objectArray",
                    Datum::list([
                        bar_deep("d-1", 12, "a"),
                        bar_deep("d-2", 14, "d"),
                        bar_deep("d-3", 13, "a"),
                    ]),
                ),
                ("nestedObject", bar_deep("n-1", 1, "nested")),
            ]),
        ),
    ]);
    let second = Datum::record([
        ("id", text("bar-2")),
        (
            "foo",
            Datum::record([
                ("id", text("foo-2")),
                ("barShort", Datum::value(14_i64)),
                ("barString", text("testbtest")),
                ("barEnum", Datum::value(Value::enumeration("BAZ"))),
                ("barBool", Datum::value(false)),
                ("objectArray", Datum::list([bar_deep("d-4", 5, "b")])),
                ("nestedObject", Datum::Null),
            ]),
        ),
    ]);

    Dataset::new().with_rows("Bar", [first, second])
}

/// `BarNullable` rows: one with a populated relation, one whose relation
/// exists with null fields, one whose relation is absent, and one
/// left-join miss that arrives as a record of nulls.
pub(crate) fn nullable_bars() -> Dataset {
    let present = Datum::record([
        ("id", text("n-1")),
        (
            "foo",
            Datum::record([
                ("id", text("fn-1")),
                ("barShort", Datum::value(7_i64)),
                ("barString", text("seven")),
                (
                    "nested",
                    Datum::record([
                        ("id", text("deep-1")),
                        ("barShort", Datum::value(70_i64)),
                        ("barString", text("deep")),
                    ]),
                ),
            ]),
        ),
    ]);
    let null_fields = Datum::record([
        ("id", text("n-2")),
        (
            "foo",
            Datum::record([
                ("id", text("fn-2")),
                ("barShort", Datum::Null),
                ("barString", Datum::Null),
                ("nested", Datum::Null),
            ]),
        ),
    ]);
    let absent = Datum::record([("id", text("n-3")), ("foo", Datum::Null)]);
    let join_miss = Datum::record([
        ("id", text("n-4")),
        (
            "foo",
            Datum::record([
                ("id", Datum::Null),
                ("barShort", Datum::Null),
                ("barString", Datum::Null),
                ("nested", Datum::Null),
            ]),
        ),
    ]);

    Dataset::new().with_rows("BarNullable", [present, null_fields, absent, join_miss])
}
