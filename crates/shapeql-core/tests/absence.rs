mod common;

use common::{compile, foo_deep, foo_nullable, null_join_row, nullable_row, text};
use proptest::prelude::*;
use shapeql_core::{
    eval::{Dataset, Datum, Evaluator, NullSemantics},
    prelude::*,
};

///
/// Join
///
/// How a generated `BarNullable` row carries its `foo` relation. A miss
/// arrives either as a null reference or as a record whose columns are all
/// null, depending on the backend.
///

#[derive(Clone, Debug)]
enum Join {
    Missing,
    NullRecord,
    Present(Foo),
}

impl Join {
    const fn present(&self) -> Option<&Foo> {
        match self {
            Self::Present(foo) => Some(foo),
            Self::Missing | Self::NullRecord => None,
        }
    }
}

#[derive(Clone, Debug)]
struct Foo {
    short: Option<i64>,
    string: Option<String>,
    nested: Option<String>,
}

fn arb_foo() -> impl Strategy<Value = Foo> {
    (
        prop::option::of(-5_i64..5),
        prop::option::of("[a-c]{0,2}"),
        prop::option::of("[a-c]{1,2}"),
    )
        .prop_map(|(short, string, nested)| Foo {
            short,
            string,
            nested,
        })
}

fn arb_rows() -> impl Strategy<Value = Vec<Join>> {
    let join = prop_oneof![
        Just(Join::Missing),
        Just(Join::NullRecord),
        arb_foo().prop_map(Join::Present),
    ];

    prop::collection::vec(join, 0..6)
}

fn or_null<T: Into<Value>>(value: Option<T>) -> Datum {
    value.map_or(Datum::Null, Datum::value)
}

fn dataset(rows: &[Join]) -> Dataset {
    let rows = rows.iter().enumerate().map(|(index, join)| {
        let foo = match join {
            Join::Missing => Datum::Null,
            Join::NullRecord => null_join_row(),
            Join::Present(foo) => {
                let nested = foo.nested.as_deref().map_or(Datum::Null, |string| {
                    foo_deep(&format!("deep-{index}"), string)
                });
                foo_nullable(
                    &format!("fn-{index}"),
                    or_null(foo.short),
                    or_null(foo.string.clone()),
                    nested,
                )
            }
        };
        nullable_row(&format!("n-{index}"), foo)
    });

    Dataset::new().with_rows("BarNullable", rows)
}

fn full_shape() -> CompileRequest {
    CompileRequest::new(
        "BarNullable",
        [
            ShapeNode::field("id"),
            ShapeNode::relation(
                "foo",
                [
                    ShapeNode::field("barShort"),
                    ShapeNode::field("barString"),
                    ShapeNode::relation("nested", [ShapeNode::field("barString")]),
                ],
            ),
        ],
    )
}

proptest! {
    #[test]
    fn absence_ignores_ordinary_null_fields(rows in arb_rows()) {
        let compiled = compile(&full_shape());
        let data = dataset(&rows);
        let result = Evaluator::new(&data, NullSemantics::Strict)
            .evaluate(compiled.expr())
            .expect("guarded projection never faults");
        let output = result.as_list().expect("rows");

        prop_assert_eq!(output.len(), rows.len());
        for (join, out) in rows.iter().zip(output) {
            let foo = out.get("foo").expect("foo member");
            match join.present() {
                None => prop_assert!(foo.is_null()),
                Some(expected) => {
                    prop_assert_eq!(foo.get("barShort"), Some(&or_null(expected.short)));
                    prop_assert_eq!(
                        foo.get("barString"),
                        Some(&or_null(expected.string.clone()))
                    );

                    let nested = foo.get("nested").expect("nested member");
                    match &expected.nested {
                        None => prop_assert!(nested.is_null()),
                        Some(string) => {
                            prop_assert_eq!(nested, &Datum::record([("barString", text(string))]));
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn null_semantics_agree_once_guarded(rows in arb_rows()) {
        let compiled = compile(&full_shape());
        let data = dataset(&rows);

        let strict = Evaluator::new(&data, NullSemantics::Strict).evaluate(compiled.expr());
        let propagate = Evaluator::new(&data, NullSemantics::Propagate).evaluate(compiled.expr());

        prop_assert!(strict.is_ok());
        prop_assert_eq!(strict, propagate);
    }

    #[test]
    fn present_filter_matches_present_rows(rows in arb_rows()) {
        let request = CompileRequest::new("BarNullable", [ShapeNode::field("id")])
            .filter(PredicateNode::is_not_null("foo.nested"));
        let compiled = compile(&request);
        let data = dataset(&rows);
        let result = Evaluator::new(&data, NullSemantics::Strict)
            .evaluate(compiled.expr())
            .expect("evaluates");

        let expected: Vec<Datum> = rows
            .iter()
            .enumerate()
            .filter(|(_, join)| join.present().is_some_and(|foo| foo.nested.is_some()))
            .map(|(index, _)| Datum::record([("id", text(&format!("n-{index}")))]))
            .collect();

        prop_assert_eq!(result.as_list().expect("rows"), expected.as_slice());
    }
}
