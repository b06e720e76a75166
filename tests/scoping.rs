//! Visibility of bindings across keys, iterations and nesting levels

mod common;

use common::{context, render, test_functions};
use pretty_assertions::assert_eq;
use rjson::{Context, Renderer, Value};
use serde_json::json;

#[test]
fn hoisted_binding_is_visible_to_later_keys() {
    assert_eq!(
        render(
            json!({"_set.total": "$a+$b", "sum": "$total"}),
            json!({"a": 2, "b": 3})
        ),
        json!({"sum": 5})
    );
}

#[test]
fn ordinary_keys_bind_in_document_order() {
    assert_eq!(
        render(json!({"b": "$a", "a": 1, "c": "$a"}), json!({})),
        json!({"b": null, "a": 1, "c": 1})
    );
}

#[test]
fn local_bindings_stay_inside_their_object() {
    assert_eq!(
        render(
            json!({"inner": {"x": 1}, "after": "$x", "via": "$inner.x"}),
            json!({})
        ),
        json!({"inner": {"x": 1}, "after": null, "via": 1})
    );
}

#[test]
fn hoisted_bindings_reach_the_parent() {
    assert_eq!(
        render(json!({"inner": {"_set.x": 1}, "after": "$x"}), json!({})),
        json!({"inner": {}, "after": 1})
    );
}

#[test]
fn hoisted_bindings_reach_every_ancestor() {
    let template = json!({
        "a": {"b": {"c": {"_set.deep": "found"}}},
        "top": "$deep"
    });
    assert_eq!(
        render(template, json!({})),
        json!({"a": {"b": {"c": {}}}, "top": "found"})
    );
}

#[test]
fn sibling_iterations_do_not_share_locals() {
    assert_eq!(
        render(json!({"_repeat": 2, "before": "$a", "a": "$_index"}), json!({})),
        json!([{"before": null, "a": 0}, {"before": null, "a": 1}])
    );
}

#[test]
fn hoisted_bindings_flow_between_iterations_and_out() {
    let template = json!({
        "rows": {"_repeat": 3, "prev": "$last", "_set.last": "$_index"},
        "final": "$last"
    });
    assert_eq!(
        render(template, json!({})),
        json!({
            "rows": [{"prev": null}, {"prev": 0}, {"prev": 1}],
            "final": 2
        })
    );
}

#[test]
fn array_elements_do_not_see_each_other() {
    assert_eq!(
        render(json!({"list": [{"_set.x": 1}, "$x"], "after": "$x"}), json!({})),
        json!({"list": [{}, null], "after": 1})
    );
}

#[test]
fn whole_object_repeat_effects_reach_the_parent() {
    assert_eq!(
        render(
            json!({"list": [{"_repeat": 2, "_set.seen": "$_index"}], "last": "$seen"}),
            json!({})
        ),
        json!({"list": [[{}, {}]], "last": 1})
    );
}

#[test]
fn repeated_arrays_are_always_hoisted() {
    assert_eq!(
        render(
            json!({"outer": {"rows": {"_repeat": 2, "v": 1}}, "count": "$len($rows)"}),
            json!({})
        ),
        json!({"outer": {"rows": [{"v": 1}, {"v": 1}]}, "count": 2})
    );
}

#[test]
fn hidden_repeat_binds_without_output() {
    assert_eq!(
        render(
            json!({"_set.rows": {"_repeat": 2, "i": "$_index"}, "n": "$len($rows)", "first": "$rows[0].i"}),
            json!({})
        ),
        json!({"n": 2, "first": 0})
    );
}

#[test]
fn set_namespace_collects_hoisted_bindings() {
    assert_eq!(
        render(
            json!({"a": {"_set.x": 1}, "b": {"_set.y": 2}, "all": "$_set"}),
            json!({})
        ),
        json!({"a": {}, "b": {}, "all": {"x": 1, "y": 2}})
    );
}

#[test]
fn initial_context_hoisted_layer() {
    let ctx = json!({"_set": {"g": "x"}, "local": 1});
    assert_eq!(
        render(json!({"direct": "$g", "namespaced": "$_set.g", "local": "$local"}), ctx),
        json!({"direct": "x", "namespaced": "x", "local": 1})
    );
}

#[test]
fn render_in_place_exposes_hoisted_bindings() {
    let functions = test_functions();
    let renderer = Renderer::new(&functions);
    let mut ctx = context(json!({"seed": 3}));

    let first = Value::from(json!({"_set.count": "$seed * 2", "ignored": 1}));
    renderer.render_in_place(&first, &mut ctx).unwrap();
    assert_eq!(ctx.hoisted().get("count"), Some(&Value::Integer(6)));
    assert_eq!(ctx.locals().get("ignored"), None);

    let second = Value::from(json!("$count + 1"));
    assert_eq!(renderer.render(&second, &ctx).unwrap(), Value::Integer(7));
}

#[test]
fn caller_context_is_not_modified() {
    let functions = test_functions();
    let ctx = Context::new().with("a", 1);
    let before = ctx.clone();
    let template = Value::from(json!({"_set.b": 2, "a": 5}));
    let rendered = Renderer::new(&functions).render_with_effects(&template, &ctx).unwrap();

    assert_eq!(ctx, before);
    assert_eq!(rendered.effects.get("b"), Some(&Value::Integer(2)));
    assert_eq!(rendered.effects.len(), 1);
}
