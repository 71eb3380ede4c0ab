//! Generic structural tree-rewrite over JSON documents.
//!
//! This is the single primitive every concrete transformer composes:
//! attendance-day reshaping, bail-status expansion and property
//! add/rename/remove all reduce to "replace the nodes whose path matches".

use serde_json::{Map, Value as JsonValue};

use crate::error::TransformError;
use crate::path::{Path, PathSegment};

/// Rewrite `doc` by replacing every node whose path satisfies `matcher` with
/// the output of `transform`.
///
/// - The input is never mutated; the output is a fresh value.
/// - Matched nodes are **not** recursed into: `transform` owns the full
///   subtree it receives.
/// - Non-matching nodes are copied structurally, children visited
///   individually.
/// - `transform` receives the matched node's path for error context. A type
///   assertion failure inside it must surface as a [`TransformError`], never
///   fall back to the original value.
pub fn rewrite<M, F>(doc: &JsonValue, matcher: M, transform: F) -> Result<JsonValue, TransformError>
where
    M: Fn(&Path) -> bool,
    F: Fn(&Path, &JsonValue) -> Result<JsonValue, TransformError>,
{
    let mut stack: Vec<PathSegment> = Vec::new();
    walk(doc, &mut stack, &matcher, &transform)
}

fn walk<M, F>(
    node: &JsonValue,
    stack: &mut Vec<PathSegment>,
    matcher: &M,
    transform: &F,
) -> Result<JsonValue, TransformError>
where
    M: Fn(&Path) -> bool,
    F: Fn(&Path, &JsonValue) -> Result<JsonValue, TransformError>,
{
    if matcher(stack) {
        return transform(stack, node);
    }

    match node {
        JsonValue::Object(map) => {
            let mut out = Map::with_capacity(map.len());
            for (key, value) in map {
                stack.push(PathSegment::Key(key.clone()));
                let rewritten = walk(value, stack, matcher, transform)?;
                stack.pop();
                out.insert(key.clone(), rewritten);
            }
            Ok(JsonValue::Object(out))
        }
        JsonValue::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for (index, value) in items.iter().enumerate() {
                stack.push(PathSegment::Index(index));
                out.push(walk(value, stack, matcher, transform)?);
                stack.pop();
            }
            Ok(JsonValue::Array(out))
        }
        leaf => Ok(leaf.clone()),
    }
}

/// Does any node whose path satisfies `matcher` also satisfy `predicate`?
///
/// Matched nodes are not descended into, mirroring [`rewrite`].
pub fn any_node<M, P>(doc: &JsonValue, matcher: M, predicate: P) -> bool
where
    M: Fn(&Path) -> bool,
    P: Fn(&JsonValue) -> bool,
{
    let mut stack: Vec<PathSegment> = Vec::new();
    probe(doc, &mut stack, &matcher, &predicate)
}

fn probe<M, P>(node: &JsonValue, stack: &mut Vec<PathSegment>, matcher: &M, predicate: &P) -> bool
where
    M: Fn(&Path) -> bool,
    P: Fn(&JsonValue) -> bool,
{
    if matcher(stack) {
        return predicate(node);
    }

    match node {
        JsonValue::Object(map) => map.iter().any(|(key, value)| {
            stack.push(PathSegment::Key(key.clone()));
            let hit = probe(value, stack, matcher, predicate);
            stack.pop();
            hit
        }),
        JsonValue::Array(items) => items.iter().enumerate().any(|(index, value)| {
            stack.push(PathSegment::Index(index));
            let hit = probe(value, stack, matcher, predicate);
            stack.pop();
            hit
        }),
        _ => false,
    }
}
