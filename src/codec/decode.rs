//! Program and value decoding

use std::str::FromStr;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Map, Value as JsonValue};

use super::FORMAT_VERSION;
use super::error::{CodecError, CodecResult};
use crate::capability::{ConstructorKind, EquatableKind, NumericKind};
use crate::config::EngineConfig;
use crate::ir::{
    BinaryLogicalOp, BinaryMathOp, Binding, CompiledProgram, LogicalOperation, MathOperation,
    ProgramRef, UnaryLogicalOp, UnaryMathOp,
};
use crate::model::{Record, RuntimeValue};

/// Decode an enveloped program under the default configuration
///
/// The program must be well formed and no deeper than the default evaluator
/// accepts.
pub fn decode(json: &JsonValue) -> CodecResult<CompiledProgram> {
    decode_with(json, &EngineConfig::default())
}

/// Decode an enveloped program under `config`
///
/// Programs deeper than [`EngineConfig::max_depth`] allows are rejected with
/// [`CodecError::TooDeep`]. The well-formedness check runs only when
/// `validate_on_decode` is set.
pub fn decode_with(json: &JsonValue, config: &EngineConfig) -> CodecResult<CompiledProgram> {
    let program = decode_unvalidated(json)?;
    // The root is evaluated at depth 0, so one extra level still fits.
    let limit = config.max_depth.saturating_add(1);
    let depth = program.depth();
    if depth > limit {
        return Err(CodecError::TooDeep { depth, limit });
    }
    if config.validate_on_decode {
        program.validate()?;
    }
    Ok(program)
}

/// Decode an enveloped program without the well-formedness check
pub fn decode_unvalidated(json: &JsonValue) -> CodecResult<CompiledProgram> {
    let version = json
        .get("version")
        .and_then(JsonValue::as_u64)
        .ok_or(CodecError::MissingVersion)?;
    if version != FORMAT_VERSION {
        return Err(CodecError::UnsupportedVersion {
            found: version,
            supported: FORMAT_VERSION,
        });
    }
    let program = json.get("program").ok_or_else(|| CodecError::MissingField {
        kind: "envelope".to_string(),
        field: "program",
    })?;
    decode_node(program)
}

/// Parse and decode an enveloped program from raw bytes
pub fn from_slice(bytes: &[u8]) -> CodecResult<CompiledProgram> {
    from_slice_with(bytes, &EngineConfig::default())
}

/// Parse and decode an enveloped program from raw bytes under `config`
///
/// JSON nesting is bounded by a limit derived from `max_depth` before parsing
/// starts, so every program the evaluator can run is also accepted here.
pub fn from_slice_with(bytes: &[u8], config: &EngineConfig) -> CodecResult<CompiledProgram> {
    check_nesting(bytes, json_depth_limit(config))?;
    let mut deserializer = serde_json::Deserializer::from_slice(bytes);
    deserializer.disable_recursion_limit();
    let json = JsonValue::deserialize(&mut deserializer)?;
    deserializer.end()?;
    decode_with(&json, config)
}

/// Deepest JSON nesting accepted by `from_slice_with`
///
/// One level for the envelope, one per program level and two per level of a
/// literal value, each bounded by `max_depth`.
fn json_depth_limit(config: &EngineConfig) -> usize {
    config.max_depth.saturating_add(1).saturating_mul(3).saturating_add(1)
}

fn check_nesting(bytes: &[u8], limit: usize) -> CodecResult<()> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for &byte in bytes {
        if in_string {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match byte {
            b'"' => in_string = true,
            b'{' | b'[' => {
                depth += 1;
                if depth > limit {
                    return Err(CodecError::TooDeep { depth, limit });
                }
            }
            b'}' | b']' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    Ok(())
}

/// Decode a single node without the envelope
pub fn decode_node(json: &JsonValue) -> CodecResult<CompiledProgram> {
    let node = json.as_object().ok_or(CodecError::InvalidField {
        field: "node",
        expected: "an object",
    })?;
    let kind = node
        .get("kind")
        .and_then(JsonValue::as_str)
        .ok_or(CodecError::InvalidField {
            field: "kind",
            expected: "a string",
        })?;
    let fields = Fields { kind, node };

    Ok(match kind {
        "identity" => CompiledProgram::Identity,
        "lookup" => CompiledProgram::Lookup(fields.binding()?),
        "immediate" => CompiledProgram::Immediate(fields.child("inner")?),
        "defer" => CompiledProgram::Defer(fields.child("inner")?),
        "function_def" => CompiledProgram::FunctionDef {
            binding: fields.binding()?,
            body: fields.child("body")?,
            input: fields.child("input")?,
        },
        "literal" => CompiledProgram::Literal {
            value: decode_value(fields.get("value")?)?,
            constructor: fields.tag("constructor", ConstructorKind::from_name)?,
        },
        "pipe" => CompiledProgram::Pipe {
            left: fields.child("left")?,
            right: fields.child("right")?,
        },
        "equal_to" => CompiledProgram::EqualTo {
            left: fields.child("left")?,
            right: fields.child("right")?,
            tag: fields.tag("tag", EquatableKind::from_name)?,
        },
        "math" => {
            let tag = fields.tag("tag", NumericKind::from_name)?;
            let op = fields.str("op")?;
            let operation = if let Some(op) = BinaryMathOp::from_name(op) {
                MathOperation::Binary {
                    op,
                    left: fields.child("left")?,
                    right: fields.child("right")?,
                }
            } else if let Some(op) = UnaryMathOp::from_name(op) {
                MathOperation::Unary {
                    op,
                    operand: fields.child("operand")?,
                }
            } else {
                return Err(unknown("op", op));
            };
            CompiledProgram::Math { operation, tag }
        }
        "logical" => {
            let op = fields.str("op")?;
            CompiledProgram::Logical(match op {
                "not" => LogicalOperation::Unary {
                    operand: fields.child("operand")?,
                    op: UnaryLogicalOp::Not,
                },
                "diverge" => LogicalOperation::Unary {
                    operand: fields.child("operand")?,
                    op: UnaryLogicalOp::Diverge {
                        is_true: fields.child("is_true")?,
                        is_false: fields.child("is_false")?,
                    },
                },
                other => LogicalOperation::Binary {
                    op: BinaryLogicalOp::from_name(other).ok_or_else(|| unknown("op", other))?,
                    left: fields.child("left")?,
                    right: fields.child("right")?,
                },
            })
        }
        "tuple_get_index" => CompiledProgram::TupleGetIndex {
            tuple: fields.child("tuple")?,
            index: fields.index()?,
        },
        other => return Err(CodecError::UnknownKind(other.to_string())),
    })
}

/// Decode a `{"type": ..., "value": ...}` runtime value
pub fn decode_value(json: &JsonValue) -> CodecResult<RuntimeValue> {
    let ty = json
        .get("type")
        .and_then(JsonValue::as_str)
        .ok_or(CodecError::InvalidField {
            field: "type",
            expected: "a string",
        })?;
    let payload = json.get("value").unwrap_or(&JsonValue::Null);

    Ok(match ty {
        "unit" => RuntimeValue::Unit,
        "boolean" => RuntimeValue::Boolean(payload.as_bool().ok_or(invalid_value("a boolean"))?),
        "integer" => RuntimeValue::Integer(payload.as_i64().ok_or(invalid_value("a 64-bit integer"))?),
        "decimal" => {
            let text = payload.as_str().ok_or(invalid_value("a decimal string"))?;
            RuntimeValue::Decimal(Decimal::from_str(text).map_err(|_| invalid_value("a decimal string"))?)
        }
        "string" => RuntimeValue::String(
            payload
                .as_str()
                .ok_or(invalid_value("a string"))?
                .to_string(),
        ),
        "sequence" => RuntimeValue::Sequence(
            payload
                .as_array()
                .ok_or(invalid_value("an array"))?
                .iter()
                .map(decode_value)
                .collect::<CodecResult<Vec<_>>>()?,
        ),
        "record" => RuntimeValue::Record(
            payload
                .as_object()
                .ok_or(invalid_value("an object"))?
                .iter()
                .map(|(name, field)| Ok((name.clone(), decode_value(field)?)))
                .collect::<CodecResult<Record>>()?,
        ),
        other => return Err(unknown("type", other)),
    })
}

/// Field accessors for one node, reporting errors against its kind
struct Fields<'a> {
    kind: &'a str,
    node: &'a Map<String, JsonValue>,
}

impl<'a> Fields<'a> {
    fn get(&self, field: &'static str) -> CodecResult<&'a JsonValue> {
        self.node.get(field).ok_or_else(|| CodecError::MissingField {
            kind: self.kind.to_string(),
            field,
        })
    }

    fn str(&self, field: &'static str) -> CodecResult<&'a str> {
        self.get(field)?.as_str().ok_or(CodecError::InvalidField {
            field,
            expected: "a string",
        })
    }

    fn child(&self, field: &'static str) -> CodecResult<ProgramRef> {
        decode_node(self.get(field)?).map(Arc::new)
    }

    fn binding(&self) -> CodecResult<Binding> {
        self.get("binding")?
            .as_u64()
            .map(Binding::from_raw)
            .ok_or(CodecError::InvalidField {
                field: "binding",
                expected: "a non-negative integer",
            })
    }

    fn index(&self) -> CodecResult<usize> {
        self.get("index")?
            .as_u64()
            .and_then(|index| usize::try_from(index).ok())
            .ok_or(CodecError::InvalidField {
                field: "index",
                expected: "a non-negative integer",
            })
    }

    fn tag<T>(&self, field: &'static str, parse: fn(&str) -> Option<T>) -> CodecResult<T> {
        let name = self.str(field)?;
        parse(name).ok_or_else(|| unknown(field, name))
    }
}

fn unknown(field: &'static str, name: &str) -> CodecError {
    CodecError::UnknownTag {
        field,
        name: name.to_string(),
    }
}

fn invalid_value(expected: &'static str) -> CodecError {
    CodecError::InvalidField {
        field: "value",
        expected,
    }
}
