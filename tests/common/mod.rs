//! Shared helpers for integration tests

#![allow(dead_code)]

use rjson::{Context, FunctionError, FunctionRegistry, RenderConfig, RenderError, Renderer, Value};
use serde_json::json;

/// Registry with a few small functions used across tests
pub fn test_functions() -> FunctionRegistry {
    let mut functions = FunctionRegistry::new();
    functions.register_fn("len", |args| match args.first() {
        Some(Value::Array(items)) => Ok(Value::from(items.len())),
        Some(Value::Object(map)) => Ok(Value::from(map.len())),
        Some(Value::String(s)) => Ok(Value::from(s.chars().count())),
        Some(other) => Err(FunctionError::argument_type("len", 0, "collection", other)),
        None => Ok(Value::Integer(0)),
    });
    functions.register_fn("pair", |args| Ok(Value::Array(args.to_vec())));
    functions.register_fn("fail", |_| Err(FunctionError::evaluation("fail", "always fails")));
    functions
}

pub fn context(value: serde_json::Value) -> Context {
    Context::from_value(Value::from(value)).expect("context must be an object")
}

pub fn try_render_with(
    template: serde_json::Value,
    ctx: serde_json::Value,
    config: RenderConfig,
) -> Result<serde_json::Value, RenderError> {
    let functions = test_functions();
    Renderer::new(&functions)
        .with_config(config)
        .render(&Value::from(template), &context(ctx))
        .map(Into::into)
}

pub fn try_render(
    template: serde_json::Value,
    ctx: serde_json::Value,
) -> Result<serde_json::Value, RenderError> {
    try_render_with(template, ctx, RenderConfig::default())
}

pub fn render(template: serde_json::Value, ctx: serde_json::Value) -> serde_json::Value {
    try_render(template, ctx).expect("render should succeed")
}

pub fn render_text(text: &str, ctx: serde_json::Value) -> serde_json::Value {
    render(json!(text), ctx)
}
