//! Program and value encoding

use serde_json::{Map, Value as JsonValue, json};

use super::FORMAT_VERSION;
use crate::ir::{CompiledProgram, LogicalOperation, MathOperation, UnaryLogicalOp};
use crate::model::RuntimeValue;

/// Encode a program inside a versioned envelope
pub fn encode(program: &CompiledProgram) -> JsonValue {
    json!({
        "version": FORMAT_VERSION,
        "program": encode_node(program),
    })
}

/// Canonical byte form of a program
///
/// Object keys are emitted in sorted order, so structurally equal programs
/// always produce identical bytes.
pub fn to_canonical_bytes(program: &CompiledProgram) -> Vec<u8> {
    sort_keys(encode(program)).to_string().into_bytes()
}

/// Rebuild every object of `json` with its keys inserted in sorted order
///
/// The written order then no longer depends on how `serde_json::Map` is
/// backed in the final build.
pub(super) fn sort_keys(json: JsonValue) -> JsonValue {
    match json {
        JsonValue::Object(map) => {
            let mut entries: Vec<(String, JsonValue)> = map.into_iter().collect();
            entries.sort_by(|(a, _), (b, _)| a.cmp(b));
            JsonValue::Object(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, sort_keys(value)))
                    .collect(),
            )
        }
        JsonValue::Array(items) => JsonValue::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}

/// Encode a single node without the envelope
pub fn encode_node(program: &CompiledProgram) -> JsonValue {
    let mut node = Map::new();
    node.insert("kind".into(), program.node_kind().into());

    match program {
        CompiledProgram::Identity => {}
        CompiledProgram::Lookup(binding) => {
            node.insert("binding".into(), binding.id().into());
        }
        CompiledProgram::Immediate(inner) | CompiledProgram::Defer(inner) => {
            node.insert("inner".into(), encode_node(inner));
        }
        CompiledProgram::FunctionDef {
            binding,
            body,
            input,
        } => {
            node.insert("binding".into(), binding.id().into());
            node.insert("body".into(), encode_node(body));
            node.insert("input".into(), encode_node(input));
        }
        CompiledProgram::Literal { value, constructor } => {
            node.insert("value".into(), encode_value(value));
            node.insert("constructor".into(), constructor.name().into());
        }
        CompiledProgram::Pipe { left, right } => {
            node.insert("left".into(), encode_node(left));
            node.insert("right".into(), encode_node(right));
        }
        CompiledProgram::EqualTo { left, right, tag } => {
            node.insert("left".into(), encode_node(left));
            node.insert("right".into(), encode_node(right));
            node.insert("tag".into(), tag.name().into());
        }
        CompiledProgram::Math { operation, tag } => {
            node.insert("tag".into(), tag.name().into());
            match operation {
                MathOperation::Binary { op, left, right } => {
                    node.insert("op".into(), op.name().into());
                    node.insert("left".into(), encode_node(left));
                    node.insert("right".into(), encode_node(right));
                }
                MathOperation::Unary { op, operand } => {
                    node.insert("op".into(), op.name().into());
                    node.insert("operand".into(), encode_node(operand));
                }
            }
        }
        CompiledProgram::Logical(operation) => match operation {
            LogicalOperation::Binary { op, left, right } => {
                node.insert("op".into(), op.name().into());
                node.insert("left".into(), encode_node(left));
                node.insert("right".into(), encode_node(right));
            }
            LogicalOperation::Unary { operand, op } => {
                node.insert("operand".into(), encode_node(operand));
                match op {
                    UnaryLogicalOp::Not => {
                        node.insert("op".into(), "not".into());
                    }
                    UnaryLogicalOp::Diverge { is_true, is_false } => {
                        node.insert("op".into(), "diverge".into());
                        node.insert("is_true".into(), encode_node(is_true));
                        node.insert("is_false".into(), encode_node(is_false));
                    }
                }
            }
        },
        CompiledProgram::TupleGetIndex { tuple, index } => {
            node.insert("tuple".into(), encode_node(tuple));
            node.insert("index".into(), (*index as u64).into());
        }
    }

    JsonValue::Object(node)
}

/// Encode a runtime value as `{"type": ..., "value": ...}`
///
/// Decimals are written as normalised strings so no precision is lost.
pub fn encode_value(value: &RuntimeValue) -> JsonValue {
    let payload = match value {
        RuntimeValue::Unit => JsonValue::Null,
        RuntimeValue::Boolean(b) => JsonValue::Bool(*b),
        RuntimeValue::Integer(i) => JsonValue::from(*i),
        RuntimeValue::Decimal(d) => JsonValue::String(d.normalize().to_string()),
        RuntimeValue::String(s) => JsonValue::String(s.clone()),
        RuntimeValue::Sequence(items) => JsonValue::Array(items.iter().map(encode_value).collect()),
        RuntimeValue::Record(fields) => JsonValue::Object(
            fields
                .iter()
                .map(|(name, field)| (name.clone(), encode_value(field)))
                .collect(),
        ),
    };
    json!({
        "type": value.kind().name(),
        "value": payload,
    })
}
