//! End-to-end rendering of expressions and documents

mod common;

use common::{render, render_text, test_functions, try_render_with};
use pretty_assertions::assert_eq;
use rjson::parser::tokenize;
use rjson::{Context, FunctionRegistry, RenderConfig, Value, render_string, render_template};
use rstest::rstest;
use serde_json::json;

#[rstest]
#[case("")]
#[case("plain text")]
#[case("100% sure")]
#[case("{\"not\": \"parsed\"}")]
fn text_without_sentinel_is_unchanged(#[case] text: &str) {
    assert_eq!(render_text(text, json!({})), json!(text));
}

#[rstest]
#[case("Hello $user.name!")]
#[case("$a + $b * 2")]
#[case("$pair(1, 'two', three)[2]")]
#[case("<$a|$b>")]
fn tokenizing_is_deterministic(#[case] text: &str) {
    assert_eq!(tokenize(text), tokenize(text));
}

#[test]
fn single_expression_keeps_its_type() {
    assert_eq!(render(json!({"a": 1, "b": "$a"}), json!({})), json!({"a": 1, "b": 1}));
    assert_eq!(
        render(json!({"list": "$items"}), json!({"items": [1, "x"]})),
        json!({"list": [1, "x"]})
    );
}

#[test]
fn text_around_expressions() {
    let ctx = json!({"user": {"name": "Ada"}});
    assert_eq!(render_text("Hello $user.name!", ctx.clone()), json!("Hello Ada!"));
    assert_eq!(render_text("<$user.name>", ctx), json!("<Ada>"));
}

#[rstest]
#[case("$a + $b * 2", json!(5))]
#[case("$($a + $b) * 2", json!(6))]
#[case("$a - $b - 1", json!(0))]
#[case("$a - b - 1", json!(-2))]
#[case("$a * 1.5", json!(1.5))]
#[case("$x / $b", json!(2))]
#[case("$y / $b", json!(2.5))]
#[case("$s + '!'", json!("hi!"))]
#[case("$n + $b", json!("12"))]
#[case("$m - $b", json!(3))]
#[case("$missing + 1", json!(1))]
fn arithmetic(#[case] text: &str, #[case] expected: serde_json::Value) {
    let ctx = json!({"a": 1, "b": 2, "x": 4, "y": 5, "s": "hi", "n": "1", "m": "5"});
    assert_eq!(render_text(text, ctx), expected);
}

#[test]
fn nested_dollar_operand_takes_the_rest_of_the_expression() {
    // A `$` inside an operand opens a new full expression, so whatever
    // follows it binds tighter than the operator before it.
    let ctx = json!({"a": 10, "b": 3});
    assert_eq!(render_text("$a * $b + 1", ctx.clone()), json!(40));
    assert_eq!(render_text("$a - $b - 1", ctx.clone()), json!(8));
    assert_eq!(render_text("$a * b + 1", ctx.clone()), json!(31));
    assert_eq!(render_text("$($a * $b) + 1", ctx), json!(31));
}

#[rstest]
#[case("<$flag>", "<true>")]
#[case("<$missing>", "<>")]
#[case("<$f>", "<2.0>")]
#[case("<$list>", "<[1,2]>")]
#[case("<$obj>", r#"<{"a":1}>"#)]
fn stringification_in_text(#[case] text: &str, #[case] expected: &str) {
    let ctx = json!({"flag": true, "f": 2.0, "list": [1, 2], "obj": {"a": 1}});
    assert_eq!(render_text(text, ctx), json!(expected));
}

#[rstest]
#[case("$user.scores[1]", json!(85))]
#[case("$user.scores[-1]", json!(77))]
#[case("$user.scores[9]", json!(null))]
#[case("$user.scores[i]", json!(77))]
#[case("$user.scores[$i]", json!(77))]
#[case("$user.name.first", json!(null))]
#[case("$user.name[0]", json!("A"))]
#[case("$user[0]", json!("Ada"))]
#[case("$nothing.at.all[3]", json!(null))]
fn accessors(#[case] text: &str, #[case] expected: serde_json::Value) {
    let ctx = json!({"i": 2, "user": {"name": "Ada", "scores": [90, 85, 77]}});
    assert_eq!(render_text(text, ctx), expected);
}

#[test]
fn function_calls() {
    let ctx = json!({"teams": ["red", "blue"]});
    assert_eq!(render_text("$pair(1, 'two', three)[2]", ctx.clone()), json!("three"));
    assert_eq!(render_text("$len($teams)", ctx.clone()), json!(2));
    assert_eq!(render_text("$len([1, 2, 3])", ctx.clone()), json!(3));
    assert_eq!(render_text("$len($pair(1, 2))", ctx.clone()), json!(2));
    assert_eq!(
        render_text("$pair([1, $teams[0]], 'x')", ctx),
        json!([[1, "red"], "x"])
    );
}

#[test]
fn whole_object_repeat() {
    assert_eq!(
        render(json!({"_repeat": 3, "val": "$_index"}), json!({})),
        json!([{"val": 0}, {"val": 1}, {"val": 2}])
    );
}

#[test]
fn keyed_repeat_with_expression_count() {
    assert_eq!(
        render(
            json!({"rows": {"_repeat": "$n", "i": "$_index", "of": "$_repeat"}}),
            json!({"n": 2})
        ),
        json!({"rows": [{"i": 0, "of": 2}, {"i": 1, "of": 2}]})
    );
}

#[test]
fn repeated_key_sees_previous_items() {
    assert_eq!(
        render(json!({"items": {"_repeat": 3, "seen": "$len($items)"}}), json!({})),
        json!({"items": [{"seen": 0}, {"seen": 1}, {"seen": 2}]})
    );
}

#[test]
fn nested_documents() {
    let template = json!({
        "title": "Report for $user.name",
        "meta": {"count": 2, "tags": ["a", "$user.name"]},
        "flags": [true, null, 1.5]
    });
    assert_eq!(
        render(template, json!({"user": {"name": "Ada"}})),
        json!({
            "title": "Report for Ada",
            "meta": {"count": 2, "tags": ["a", "Ada"]},
            "flags": [true, null, 1.5]
        })
    );
}

#[test]
fn trailing_words_after_an_expression_are_dropped() {
    assert_eq!(render_text("Hello $name and more", json!({"name": "Ada"})), json!("Hello Ada"));
}

#[test]
fn comparison_operators_are_text_by_default() {
    assert_eq!(render_text("$a > 1", json!({"a": 2})), json!("2> 1"));
}

#[rstest]
#[case("$a > 1", json!(true))]
#[case("$a == 2", json!(true))]
#[case("$a != 2", json!(false))]
#[case("$a <= 1", json!(false))]
#[case("$a > 1 ? 'big' : 'small'", json!("big"))]
#[case("$a < 1 ? 'big' : 'small'", json!("small"))]
fn extended_operators(#[case] text: &str, #[case] expected: serde_json::Value) {
    let config = RenderConfig::new().with_extended_operators(true);
    assert_eq!(
        try_render_with(json!(text), json!({"a": 2}), config).unwrap(),
        expected
    );
}

#[test]
fn convenience_entry_points() {
    let context = Context::new().with("name", "Ada");
    let functions = FunctionRegistry::new();
    assert_eq!(
        render_string("Hi $name", &context, &functions).unwrap(),
        Value::from("Hi Ada")
    );

    let template = Value::from(json!({"_repeat": 2, "who": "$name"}));
    let rendered = render_template(&template, &context, &test_functions()).unwrap();
    assert_eq!(
        serde_json::Value::from(rendered),
        json!([{"who": "Ada"}, {"who": "Ada"}])
    );
}
