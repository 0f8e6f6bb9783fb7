mod common;

use common::{bars, compile, deep, foo_deep, foo_nullable, null_join_row, nullable_row, run, text};
use shapeql_core::{
    eval::{Dataset, Datum, Evaluator, NullSemantics},
    prelude::*,
};

fn filtered_children(siblings: impl IntoIterator<Item = ShapeNode>) -> CompileRequest {
    let mut children: Vec<ShapeNode> = siblings.into_iter().collect();
    children.push(
        ShapeNode::relation(
            "objectArray",
            [ShapeNode::relation(
                "foo",
                [ShapeNode::field("barString"), ShapeNode::field("barShort")],
            )],
        )
        .filtered(PredicateNode::eq("foo.barString", "a")),
    );

    CompileRequest::new("Bar", [ShapeNode::relation("foo", children)])
}

fn projected_child(string: &str, short: i64) -> Datum {
    Datum::record([(
        "foo",
        Datum::record([
            ("barString", text(string)),
            ("barShort", Datum::value(short)),
        ]),
    )])
}

fn nullable_dataset() -> Dataset {
    Dataset::new().with_rows(
        "BarNullable",
        [
            nullable_row(
                "n-1",
                foo_nullable(
                    "fn-1",
                    Datum::value(7_i64),
                    text("seven"),
                    foo_deep("deep-1", "deep"),
                ),
            ),
            nullable_row(
                "n-2",
                foo_nullable("fn-2", Datum::Null, Datum::Null, Datum::Null),
            ),
            nullable_row("n-3", Datum::Null),
            nullable_row("n-4", null_join_row()),
        ],
    )
}

//
// Filtered child collections
//

#[test]
fn filtered_children_keep_only_matching_elements() {
    let rows = run(&filtered_children([]), &bars());

    assert_eq!(
        rows,
        [
            Datum::record([(
                "foo",
                Datum::record([(
                    "objectArray",
                    Datum::list([projected_child("a", 12), projected_child("a", 13)]),
                )]),
            )]),
            Datum::record([(
                "foo",
                Datum::record([("objectArray", Datum::list([]))]),
            )]),
        ]
    );
}

#[test]
fn sibling_projection_does_not_disturb_filter() {
    let rows = run(&filtered_children([ShapeNode::field("barString")]), &bars());

    assert_eq!(rows.len(), 2);
    assert_eq!(
        rows[0],
        Datum::record([(
            "foo",
            Datum::record([
                ("barString", text("testatest")),
                (
                    "objectArray",
                    Datum::list([projected_child("a", 12), projected_child("a", 13)]),
                ),
            ]),
        )])
    );
    assert_eq!(
        rows[1].get("foo").and_then(|foo| foo.get("barString")),
        Some(&text("testbtest"))
    );
}

#[test]
fn json_request_matches_builder_request() {
    let request: CompileRequest =
        serde_json::from_str(include_str!("fixtures/filtered_children.json")).expect("request");

    assert_eq!(request, filtered_children([]));
    assert_eq!(
        compile(&request).fingerprint(),
        compile(&filtered_children([])).fingerprint()
    );
}

#[test]
fn root_filter_reaches_through_collection() {
    let request = CompileRequest::new("Bar", [ShapeNode::field("id")]).filter(PredicateNode::any(
        "foo.objectArray",
        PredicateNode::gte("foo.barShort", 14),
    ));
    let rows = run(&request, &bars());

    assert_eq!(rows, [Datum::record([("id", text("bar-1"))])]);
}

//
// Outer-join absence
//

#[test]
fn absent_relation_projects_absent_identity() {
    let request = CompileRequest::new(
        "BarNullable",
        [ShapeNode::relation("foo", [ShapeNode::field("id")])],
    );
    let rows = run(&request, &nullable_dataset());

    assert_eq!(rows[2], Datum::record([("foo", Datum::Null)]));
    assert_eq!(rows[3], Datum::record([("foo", Datum::Null)]));
    assert_eq!(
        rows[1],
        Datum::record([("foo", Datum::record([("id", text("fn-2"))]))])
    );
}

#[test]
fn absent_relation_suppresses_whole_subtree() {
    let request = CompileRequest::new(
        "BarNullable",
        [ShapeNode::relation(
            "foo",
            [
                ShapeNode::field("id"),
                ShapeNode::field("barString"),
                ShapeNode::relation("nested", [ShapeNode::field("barString")]),
            ],
        )],
    );
    let rows = run(&request, &nullable_dataset());

    assert_eq!(
        rows,
        [
            Datum::record([(
                "foo",
                Datum::record([
                    ("id", text("fn-1")),
                    ("barString", text("seven")),
                    ("nested", Datum::record([("barString", text("deep"))])),
                ]),
            )]),
            Datum::record([(
                "foo",
                Datum::record([
                    ("id", text("fn-2")),
                    ("barString", Datum::Null),
                    ("nested", Datum::Null),
                ]),
            )]),
            Datum::record([("foo", Datum::Null)]),
            Datum::record([("foo", Datum::Null)]),
        ]
    );
}

#[test]
fn null_fields_stay_distinct_from_absence_under_filter() {
    let request = CompileRequest::new(
        "BarNullable",
        [
            ShapeNode::field("id"),
            ShapeNode::relation("foo", [ShapeNode::field("barString")]),
        ],
    )
    .filter(PredicateNode::is_not_null("foo"));
    let rows = run(&request, &nullable_dataset());

    let ids: Vec<_> = rows
        .iter()
        .filter_map(|row| row.get("id").cloned())
        .collect();
    assert_eq!(ids, [text("n-1"), text("n-2")]);
    assert_eq!(
        rows[1].get("foo"),
        Some(&Datum::record([("barString", Datum::Null)]))
    );
}

#[test]
fn comparison_through_absent_relation_excludes_row() {
    let request = CompileRequest::new("BarNullable", [ShapeNode::field("id")])
        .filter(PredicateNode::ne("foo.nested.barString", "deep"));
    let rows = run(&request, &nullable_dataset());

    assert!(rows.is_empty());
}

#[test]
fn guarded_expression_agrees_across_null_semantics() {
    let request = CompileRequest::new(
        "BarNullable",
        [ShapeNode::relation(
            "foo",
            [ShapeNode::relation("nested", [ShapeNode::field("id")])],
        )],
    )
    .filter(PredicateNode::is_null("foo.nested.barString"));
    let compiled = compile(&request);
    let data = nullable_dataset();

    let strict = Evaluator::new(&data, NullSemantics::Strict).evaluate(compiled.expr());
    let propagate = Evaluator::new(&data, NullSemantics::Propagate).evaluate(compiled.expr());

    assert!(strict.is_ok());
    assert_eq!(strict, propagate);
}

#[test]
fn required_relation_projects_without_guard() {
    let data = Dataset::new().with_rows("BarDeep", [deep("d-9", 3, "z")]);
    let request = CompileRequest::new(
        "BarDeep",
        [ShapeNode::relation("foo", [ShapeNode::field("barShort")])],
    );

    assert_eq!(
        run(&request, &data),
        [Datum::record([(
            "foo",
            Datum::record([("barShort", Datum::value(3_i64))]),
        )])]
    );
}
