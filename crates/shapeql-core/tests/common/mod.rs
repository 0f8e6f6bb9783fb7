#![allow(dead_code)]

use shapeql_core::{
    eval::{Dataset, Datum, Evaluator, NullSemantics},
    prelude::*,
};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

pub fn schema() -> SchemaModel {
    serde_json::from_str(include_str!("../fixtures/schema.json")).expect("fixture schema")
}

pub fn compile(request: &CompileRequest) -> CompiledQuery {
    init_tracing();

    let schema = schema();
    let config = CompileConfig::default();
    Compiler::new(&schema, &config)
        .compile(request)
        .expect("request compiles")
}

/// Compile and evaluate under strict semantics, returning the row list.
pub fn run(request: &CompileRequest, data: &Dataset) -> Vec<Datum> {
    let expr = compile(request).into_expr();
    let result = Evaluator::new(data, NullSemantics::Strict)
        .evaluate(&expr)
        .expect("guarded expression evaluates");

    result.as_list().expect("row sequence").to_vec()
}

pub fn text(value: &str) -> Datum {
    Datum::value(value)
}

pub fn deep(id: &str, short: i64, string: &str) -> Datum {
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

/// Two `Bar` rows; the first holds two matching children out of three,
/// the second holds none.
pub fn bars() -> Dataset {
    let row = |id: &str, string: &str, children: Vec<Datum>| {
        Datum::record([
            ("id", text(id)),
            (
                "foo",
                Datum::record([
                    ("id", text(&format!("{id}-foo"))),
                    ("barString", text(string)),
                    ("objectArray", Datum::list(children)),
                ]),
            ),
        ])
    };

    Dataset::new().with_rows(
        "Bar",
        [
            row(
                "bar-1",
                "testatest",
                vec![
                    deep("d-1", 12, "a"),
                    deep("d-2", 14, "d"),
                    deep("d-3", 13, "a"),
                ],
            ),
            row("bar-2", "testbtest", vec![deep("d-4", 5, "b")]),
        ],
    )
}

pub fn nullable_row(id: &str, foo: Datum) -> Datum {
    Datum::record([("id", text(id)), ("foo", foo)])
}

pub fn foo_nullable(id: &str, short: Datum, string: Datum, nested: Datum) -> Datum {
    foo_nullable_record(text(id), short, string, nested)
}

fn foo_nullable_record(id: Datum, short: Datum, string: Datum, nested: Datum) -> Datum {
    Datum::record([
        ("id", id),
        ("barShort", short),
        ("barString", string),
        ("nested", nested),
    ])
}

/// A left-join miss as a row backend delivers it: the relation's columns
/// are present but every one of them is null.
pub fn null_join_row() -> Datum {
    foo_nullable_record(Datum::Null, Datum::Null, Datum::Null, Datum::Null)
}

pub fn foo_deep(id: &str, string: &str) -> Datum {
    Datum::record([
        ("id", text(id)),
        ("barShort", Datum::value(1_i64)),
        ("barString", text(string)),
    ])
}
