//! Schema extraction from `basic.config.ts` / `basic.config.js`.
//!
//! The file is parsed with oxc and the AST walked as JSON. Recognized
//! locations, first match wins:
//!
//! - a top-level `schema` binding (`export const schema = {...}` or plain
//!   `const schema = ...`)
//! - the `schema` property of a default-exported object
//! - a default-exported object that is itself a schema
//!
//! Only literal data is evaluated: objects, arrays, strings, numbers,
//! booleans, null, unary minus, parentheses and TS `as`/`satisfies`.
//! Identifiers resolve through other top-level `const` bindings.

use super::{Extracted, SchemaExtractor};
use crate::error::{CliError, Result};
use oxc::allocator::Allocator;
use oxc::parser::Parser;
use oxc::span::SourceType;
use serde_json::{Map, Number, Value};
use std::collections::HashMap;
use std::ops::Range;
use std::path::Path;

const MAX_DEPTH: usize = 64;

/// Largest integer a JS number holds exactly.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Extractor for JS/TS config modules.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScriptExtractor;

impl SchemaExtractor for ScriptExtractor {
    fn extract(&self, source: &str, path: &Path) -> Result<Option<Extracted>> {
        let program = parse_program(source, path)?;
        let empty = Vec::new();
        let body = program["body"].as_array().unwrap_or(&empty);
        let bindings = collect_top_level_bindings(body);

        let Some(node) = find_schema_object(body, &bindings) else {
            return Ok(None);
        };
        let Some(span) = node_span(node) else {
            return Err(parse_error(path, "schema object has no source position"));
        };

        let evaluator = Evaluator {
            source,
            path,
            bindings: &bindings,
        };
        let value = evaluator.evaluate(node, 0)?;
        Ok(Some(Extracted { value, span }))
    }
}

/// Parse `source` and hand back the program as a JSON tree.
fn parse_program(source: &str, path: &Path) -> Result<Value> {
    let allocator = Allocator::default();
    let source_type = SourceType::from_path(path).unwrap_or_default();
    let ret = Parser::new(&allocator, source, source_type).parse();

    if ret.panicked || !ret.errors.is_empty() {
        let details = ret
            .errors
            .first()
            .map_or_else(|| "parser gave up".to_string(), ToString::to_string);
        return Err(parse_error(path, details));
    }

    Ok(serde_json::to_value(&ret.program)?)
}

fn parse_error(path: &Path, details: impl Into<String>) -> CliError {
    CliError::ConfigParse {
        file: path.to_path_buf(),
        details: details.into(),
    }
}

fn node_type(node: &Value) -> &str {
    node["type"].as_str().unwrap_or_default()
}

/// Byte range of a node, from flattened `start`/`end` or a nested `span`.
fn node_span(node: &Value) -> Option<Range<usize>> {
    let read = |holder: &Value| {
        let start = usize::try_from(holder["start"].as_u64()?).ok()?;
        let end = usize::try_from(holder["end"].as_u64()?).ok()?;
        Some(start..end)
    };
    read(node).or_else(|| read(&node["span"]))
}

/// Strip wrappers that do not change the value: parentheses and TS casts.
fn unwrap_expression(mut node: &Value) -> &Value {
    while matches!(
        node_type(node),
        "ParenthesizedExpression" | "TSAsExpression" | "TSSatisfiesExpression" | "TSNonNullExpression"
    ) {
        node = &node["expression"];
    }
    node
}

/// Map every top-level `const`/`let`/`var` name to its initializer.
fn collect_top_level_bindings(body: &[Value]) -> HashMap<&str, &Value> {
    let mut bindings = HashMap::new();

    for node in body {
        let declaration = match node_type(node) {
            "ExportNamedDeclaration" => &node["declaration"],
            "VariableDeclaration" => node,
            _ => continue,
        };
        if node_type(declaration) != "VariableDeclaration" {
            continue;
        }
        let Some(declarators) = declaration["declarations"].as_array() else {
            continue;
        };
        for declarator in declarators {
            let init = &declarator["init"];
            if init.is_null() {
                continue;
            }
            if let Some(name) = declarator["id"]["name"].as_str() {
                bindings.insert(name, init);
            }
        }
    }

    bindings
}

/// Follow wrappers and identifier references down to an object literal.
fn resolve_object<'a>(node: &'a Value, bindings: &HashMap<&str, &'a Value>) -> Option<&'a Value> {
    let mut current = unwrap_expression(node);
    for _ in 0..MAX_DEPTH {
        match node_type(current) {
            "ObjectExpression" => return Some(current),
            "Identifier" | "IdentifierReference" => {
                let name = current["name"].as_str()?;
                current = unwrap_expression(*bindings.get(name)?);
            }
            _ => return None,
        }
    }
    None
}

fn is_property(node: &Value) -> bool {
    matches!(node_type(node), "ObjectProperty" | "Property")
}

/// Static name of a property key, or `None` for computed keys.
fn property_key(prop: &Value) -> Option<String> {
    if prop["computed"].as_bool() == Some(true) {
        return None;
    }
    let key = &prop["key"];
    match node_type(key) {
        "Identifier" | "IdentifierName" => key["name"].as_str().map(str::to_string),
        _ => match &key["value"] {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        },
    }
}

fn find_property<'a>(object: &'a Value, name: &str) -> Option<&'a Value> {
    object["properties"]
        .as_array()?
        .iter()
        .filter(|prop| is_property(prop))
        .find(|prop| property_key(prop).as_deref() == Some(name))
        .map(|prop| &prop["value"])
}

fn find_schema_object<'a>(
    body: &'a [Value],
    bindings: &HashMap<&str, &'a Value>,
) -> Option<&'a Value> {
    if let Some(object) = bindings
        .get("schema")
        .and_then(|init| resolve_object(*init, bindings))
    {
        return Some(object);
    }

    let default_export = body
        .iter()
        .find(|node| node_type(node) == "ExportDefaultDeclaration")?;
    let exported = resolve_object(&default_export["declaration"], bindings)?;

    if let Some(value) = find_property(exported, "schema") {
        return resolve_object(value, bindings);
    }

    let looks_like_schema = find_property(exported, "project_id").is_some()
        && find_property(exported, "tables").is_some();
    looks_like_schema.then_some(exported)
}

/// Turns literal AST nodes into JSON values.
struct Evaluator<'a> {
    source: &'a str,
    path: &'a Path,
    bindings: &'a HashMap<&'a str, &'a Value>,
}

impl Evaluator<'_> {
    fn evaluate(&self, node: &Value, depth: usize) -> Result<Value> {
        if depth > MAX_DEPTH {
            return Err(self.unsupported(node, "nesting is too deep"));
        }
        let node = unwrap_expression(node);

        match node_type(node) {
            "ObjectExpression" => self.object(node, depth),
            "ArrayExpression" => self.array(node, depth),
            "StringLiteral" | "BooleanLiteral" => Ok(node["value"].clone()),
            "NullLiteral" => Ok(Value::Null),
            "NumericLiteral" => self.number(node),
            "Literal" => self.literal(node),
            "TemplateLiteral" => self.template(node),
            "UnaryExpression" => self.unary(node, depth),
            "Identifier" | "IdentifierReference" => {
                let name = node["name"].as_str().unwrap_or_default();
                match self.bindings.get(name) {
                    Some(init) => self.evaluate(init, depth + 1),
                    None => Err(self.unsupported(node, &format!("unknown identifier '{name}'"))),
                }
            }
            other => Err(self.unsupported(node, &format!("unsupported expression {other}"))),
        }
    }

    fn object(&self, node: &Value, depth: usize) -> Result<Value> {
        let mut map = Map::new();
        for prop in node["properties"].as_array().into_iter().flatten() {
            if !is_property(prop) || prop["method"].as_bool() == Some(true) {
                return Err(self.unsupported(prop, "only plain key: value properties are allowed"));
            }
            if matches!(prop["kind"].as_str(), Some("get" | "set")) {
                return Err(self.unsupported(prop, "getters and setters are not allowed"));
            }
            let Some(key) = property_key(prop) else {
                return Err(self.unsupported(prop, "computed keys are not allowed"));
            };
            let value = self.evaluate(&prop["value"], depth + 1)?;
            map.insert(key, value);
        }
        Ok(Value::Object(map))
    }

    fn array(&self, node: &Value, depth: usize) -> Result<Value> {
        let mut items = Vec::new();
        for element in node["elements"].as_array().into_iter().flatten() {
            if element.is_null() || node_type(element) == "Elision" {
                return Err(self.unsupported(node, "array holes are not allowed"));
            }
            items.push(self.evaluate(element, depth + 1)?);
        }
        Ok(Value::Array(items))
    }

    fn number(&self, node: &Value) -> Result<Value> {
        let Some(raw) = node["value"].as_f64() else {
            return Err(self.unsupported(node, "malformed number"));
        };
        self.normalize_number(node, raw)
    }

    /// Integral values become JSON integers so `version: 1` reads as `1`.
    #[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
    fn normalize_number(&self, node: &Value, raw: f64) -> Result<Value> {
        if raw.fract() == 0.0 && raw.abs() <= MAX_SAFE_INTEGER {
            return Ok(Value::from(raw as i64));
        }
        Number::from_f64(raw)
            .map(Value::Number)
            .ok_or_else(|| self.unsupported(node, "number is not finite"))
    }

    /// ESTree-style `Literal` that can hold any primitive.
    fn literal(&self, node: &Value) -> Result<Value> {
        if !node["regex"].is_null() || !node["bigint"].is_null() {
            return Err(self.unsupported(node, "regex and bigint literals are not allowed"));
        }
        match &node["value"] {
            Value::Number(n) => match n.as_f64() {
                Some(raw) => self.normalize_number(node, raw),
                None => Ok(Value::Number(n.clone())),
            },
            value => Ok(value.clone()),
        }
    }

    fn template(&self, node: &Value) -> Result<Value> {
        let has_expressions = node["expressions"]
            .as_array()
            .is_some_and(|exprs| !exprs.is_empty());
        let quasis = node["quasis"].as_array();
        match quasis.map(Vec::as_slice) {
            Some([quasi]) if !has_expressions => {
                let cooked = &quasi["value"]["cooked"];
                let text = cooked.as_str().or_else(|| quasi["value"]["raw"].as_str());
                text.map(|s| Value::String(s.to_string()))
                    .ok_or_else(|| self.unsupported(node, "malformed template string"))
            }
            _ => Err(self.unsupported(node, "template strings with ${} are not allowed")),
        }
    }

    fn unary(&self, node: &Value, depth: usize) -> Result<Value> {
        let operator = node["operator"].as_str().unwrap_or_default();
        let argument = self.evaluate(&node["argument"], depth + 1)?;
        let Value::Number(n) = &argument else {
            return Err(self.unsupported(node, "unary operators apply to numbers only"));
        };
        match operator {
            "+" | "UnaryPlus" => Ok(argument.clone()),
            "-" | "UnaryNegation" => {
                if let Some(i) = n.as_i64() {
                    Ok(Value::from(-i))
                } else {
                    let raw = n.as_f64().unwrap_or_default();
                    self.normalize_number(node, -raw)
                }
            }
            other => Err(self.unsupported(node, &format!("unsupported operator {other}"))),
        }
    }

    fn unsupported(&self, node: &Value, reason: &str) -> CliError {
        let location = node_span(node)
            .and_then(|span| self.source.get(..span.start))
            .map(|head| format!(" at line {}", head.matches('\n').count() + 1))
            .unwrap_or_default();
        parse_error(self.path, format!("{reason}{location}"))
    }
}
