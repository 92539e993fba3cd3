//! Declarative schemas and the validator that enforces them.
//!
//! A [`Schema`] is a JSON Schema (draft-07 subset) document. It is usually
//! derived from a Rust type with [`Schema::of`], so the same declaration
//! produces both the compile-time type and the runtime check.

use std::sync::Arc;

use regex::Regex;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::{Map, Number, Value};
use tracing::warn;

use crate::error::{FieldPath, IssueKind, ValidationError, ValidationIssue, ValidationResult};

/// Maximum number of `$ref` hops followed without descending into the value.
const MAX_REF_DEPTH: usize = 64;

/// A declarative description of a data shape.
///
/// Cheap to clone; the underlying document is shared.
#[derive(Debug, Clone)]
pub struct Schema {
    root: Arc<Value>,
    title: Option<String>,
}

impl Schema {
    /// Generate the schema for `T`.
    ///
    /// Doc comments become `description`s, `#[serde(default)]` fields become
    /// optional properties carrying a `default`, and `#[serde(rename_all)]`
    /// controls the wire field names.
    #[must_use]
    pub fn of<T: JsonSchema>() -> Self {
        let root = schemars::schema_for!(T);
        // A schema that cannot be serialized rejects everything.
        let value = serde_json::to_value(&root).unwrap_or(Value::Bool(false));
        Self::from_value(value)
    }

    /// Wrap an existing JSON Schema document.
    #[must_use]
    pub fn from_value(root: Value) -> Self {
        let title = root
            .get("title")
            .and_then(Value::as_str)
            .map(str::to_owned);
        Self {
            root: Arc::new(root),
            title,
        }
    }

    /// The schema's title (the Rust type name for derived schemas).
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// The raw JSON Schema document.
    #[must_use]
    pub fn as_value(&self) -> &Value {
        &self.root
    }

    /// Validate `value`, returning a normalized copy with declared defaults
    /// filled in for absent optional properties.
    ///
    /// `value` itself is never modified, so validating the same value twice
    /// produces identical results.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] listing every field that failed.
    pub fn validate(&self, value: &Value) -> ValidationResult<Value> {
        let mut issues = Vec::new();
        let validator = Validator { root: &self.root };
        let normalized = validator.check(&self.root, value, &FieldPath::root(), &mut issues, 0);
        if issues.is_empty() {
            Ok(normalized)
        } else {
            Err(ValidationError::new(self.title.clone(), issues))
        }
    }

    /// Validate `value` and convert the normalized result into `T`.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if validation fails or the normalized
    /// value does not deserialize into `T`.
    pub fn parse<T: DeserializeOwned>(&self, value: &Value) -> ValidationResult<T> {
        let normalized = self.validate(value)?;
        serde_json::from_value(normalized).map_err(|e| {
            ValidationError::new(
                self.title.clone(),
                vec![ValidationIssue {
                    path: FieldPath::root(),
                    kind: IssueKind::Deserialize {
                        message: e.to_string(),
                    },
                }],
            )
        })
    }

    /// Whether `value` satisfies this schema.
    #[must_use]
    pub fn is_valid(&self, value: &Value) -> bool {
        self.validate(value).is_ok()
    }
}

/// Validate `value` against the schema derived from `T` and deserialize it.
///
/// Convenience for one-off checks; capabilities cache their [`Schema`]s.
///
/// # Errors
///
/// Returns a [`ValidationError`] naming each offending field.
pub fn validate_as<T: JsonSchema + DeserializeOwned>(value: &Value) -> ValidationResult<T> {
    Schema::of::<T>().parse(value)
}

struct Validator<'a> {
    root: &'a Value,
}

impl Validator<'_> {
    fn check(
        &self,
        schema: &Value,
        value: &Value,
        path: &FieldPath,
        issues: &mut Vec<ValidationIssue>,
        depth: usize,
    ) -> Value {
        let obj = match schema {
            Value::Bool(true) => return value.clone(),
            Value::Bool(false) => {
                push(issues, path, IssueKind::Rejected);
                return value.clone();
            },
            Value::Object(obj) => obj,
            _ => return value.clone(),
        };

        if let Some(Value::String(reference)) = obj.get("$ref") {
            if depth >= MAX_REF_DEPTH {
                warn!(reference = %reference, "schema reference chain too deep");
                push(issues, path, IssueKind::Rejected);
                return value.clone();
            }
            return match self.resolve(reference) {
                Some(target) => self.check(target, value, path, issues, depth.saturating_add(1)),
                None => {
                    warn!(reference = %reference, "unresolvable schema reference");
                    push(issues, path, IssueKind::Rejected);
                    value.clone()
                },
            };
        }

        let mut current = value.clone();

        if let Some(Value::Array(all)) = obj.get("allOf") {
            for sub in all {
                current = self.check(sub, &current, path, issues, depth);
            }
        }
        if let Some(Value::Array(alternatives)) = obj.get("anyOf") {
            current = self.check_alternatives(alternatives, &current, path, issues, depth);
        }
        if let Some(Value::Array(alternatives)) = obj.get("oneOf") {
            current = self.check_one_of(alternatives, &current, path, issues, depth);
        }

        // `2.0` under an integer schema becomes `2` so typed fields accept it.
        if let (Some(types), Value::Number(n)) = (obj.get("type"), &current)
            && allows_integer(types)
            && let Some(whole) = whole_number(n)
        {
            current = Value::Number(whole);
        }

        if let Some(Value::Array(allowed)) = obj.get("enum")
            && !allowed.contains(&current)
        {
            push(
                issues,
                path,
                IssueKind::NotInEnum {
                    allowed: allowed.iter().map(Value::to_string).collect(),
                },
            );
            return current;
        }
        if let Some(expected) = obj.get("const")
            && expected != &current
        {
            push(
                issues,
                path,
                IssueKind::NotInEnum {
                    allowed: vec![expected.to_string()],
                },
            );
            return current;
        }
        if let Some(types) = obj.get("type")
            && !type_matches(types, &current)
        {
            push(
                issues,
                path,
                IssueKind::TypeMismatch {
                    expected: type_names(types),
                    actual: json_type(&current).to_owned(),
                },
            );
            return current;
        }

        match &mut current {
            Value::Object(map) => self.check_object(obj, map, path, issues, depth),
            Value::Array(items) => self.check_array(obj, items, path, issues, depth),
            Value::String(s) => check_string(obj, s, path, issues),
            Value::Number(n) => check_number(obj, n, path, issues),
            Value::Null | Value::Bool(_) => {},
        }
        current
    }

    fn check_object(
        &self,
        schema: &Map<String, Value>,
        map: &mut Map<String, Value>,
        path: &FieldPath,
        issues: &mut Vec<ValidationIssue>,
        depth: usize,
    ) {
        let properties = schema.get("properties").and_then(Value::as_object);

        if let Some(Value::Array(required)) = schema.get("required") {
            for name in required.iter().filter_map(Value::as_str) {
                if !map.contains_key(name) {
                    push(issues, &path.key(name), IssueKind::Missing);
                }
            }
        }

        if let Some(props) = properties {
            for (name, prop_schema) in props {
                if let Some(present) = map.get(name).cloned() {
                    let normalized =
                        self.check(prop_schema, &present, &path.key(name), issues, depth);
                    map.insert(name.clone(), normalized);
                } else if let Some(default) = self.default_of(prop_schema, depth) {
                    map.insert(name.clone(), default);
                }
            }
        }

        let extra_keys: Vec<String> = map
            .keys()
            .filter(|k| properties.is_none_or(|p| !p.contains_key(*k)))
            .cloned()
            .collect();
        match schema.get("additionalProperties") {
            Some(Value::Bool(false)) => {
                for key in extra_keys {
                    push(issues, &path.key(&key), IssueKind::UnknownField);
                }
            },
            Some(extra @ Value::Object(_)) => {
                for key in extra_keys {
                    if let Some(present) = map.get(&key).cloned() {
                        let normalized = self.check(extra, &present, &path.key(&key), issues, depth);
                        map.insert(key, normalized);
                    }
                }
            },
            _ => {},
        }
    }

    fn check_array(
        &self,
        schema: &Map<String, Value>,
        items: &mut [Value],
        path: &FieldPath,
        issues: &mut Vec<ValidationIssue>,
        depth: usize,
    ) {
        match schema.get("items") {
            Some(Value::Array(tuple)) => {
                for (i, (item, item_schema)) in items.iter_mut().zip(tuple).enumerate() {
                    *item = self.check(item_schema, item, &path.index(i), issues, depth);
                }
            },
            Some(item_schema) => {
                for (i, item) in items.iter_mut().enumerate() {
                    *item = self.check(item_schema, item, &path.index(i), issues, depth);
                }
            },
            None => {},
        }

        let len = items.len();
        if let Some(min) = schema.get("minItems").and_then(Value::as_u64)
            && (len as u64) < min
        {
            push(
                issues,
                path,
                IssueKind::Length {
                    bound: format!("at least {min} items"),
                    actual: len,
                },
            );
        }
        if let Some(max) = schema.get("maxItems").and_then(Value::as_u64)
            && (len as u64) > max
        {
            push(
                issues,
                path,
                IssueKind::Length {
                    bound: format!("at most {max} items"),
                    actual: len,
                },
            );
        }
        if schema.get("uniqueItems").and_then(Value::as_bool) == Some(true) {
            for (i, item) in items.iter().enumerate() {
                if items[..i].contains(item) {
                    push(issues, &path.index(i), IssueKind::Duplicate);
                }
            }
        }
    }

    fn check_alternatives(
        &self,
        alternatives: &[Value],
        value: &Value,
        path: &FieldPath,
        issues: &mut Vec<ValidationIssue>,
        depth: usize,
    ) -> Value {
        let mut attempts = Vec::with_capacity(alternatives.len());
        for alternative in alternatives {
            let mut scratch = Vec::new();
            let normalized = self.check(alternative, value, path, &mut scratch, depth);
            if scratch.is_empty() {
                return normalized;
            }
            attempts.push(scratch);
        }

        // Unit enums with documented variants arrive as one `enum` per variant.
        let mut allowed = Vec::new();
        let all_enum_misses = attempts.iter().all(|attempt| {
            attempt.iter().all(|issue| {
                if let (true, IssueKind::NotInEnum { allowed: a }) = (&issue.path == path, &issue.kind)
                {
                    allowed.extend(a.iter().cloned());
                    true
                } else {
                    false
                }
            })
        });
        if all_enum_misses && !allowed.is_empty() {
            push(issues, path, IssueKind::NotInEnum { allowed });
            return value.clone();
        }

        // An alternative whose failures all sit below this path accepted the
        // value's outer shape; its nested failures are the useful report.
        let mut shaped: Vec<Vec<ValidationIssue>> = attempts
            .into_iter()
            .filter(|attempt| attempt.iter().all(|issue| &issue.path != path))
            .collect();
        if shaped.len() == 1 {
            issues.append(&mut shaped[0]);
        } else {
            push(issues, path, IssueKind::NoVariantMatched);
        }
        value.clone()
    }

    /// Like `anyOf`, but a value accepted by more than one alternative is
    /// ambiguous and rejected.
    fn check_one_of(
        &self,
        alternatives: &[Value],
        value: &Value,
        path: &FieldPath,
        issues: &mut Vec<ValidationIssue>,
        depth: usize,
    ) -> Value {
        let accepted = alternatives
            .iter()
            .filter(|alternative| {
                let mut scratch = Vec::new();
                self.check(alternative, value, path, &mut scratch, depth);
                scratch.is_empty()
            })
            .count();
        if accepted > 1 {
            push(issues, path, IssueKind::AmbiguousVariant { matched: accepted });
            return value.clone();
        }
        self.check_alternatives(alternatives, value, path, issues, depth)
    }

    fn resolve(&self, reference: &str) -> Option<&Value> {
        let pointer = reference.strip_prefix('#')?;
        self.root.pointer(pointer)
    }

    fn default_of(&self, schema: &Value, depth: usize) -> Option<Value> {
        if let Some(default) = schema.get("default") {
            return Some(default.clone());
        }
        if depth >= MAX_REF_DEPTH {
            return None;
        }
        let reference = schema.get("$ref").and_then(Value::as_str)?;
        let target = self.resolve(reference)?;
        self.default_of(target, depth.saturating_add(1))
    }
}

fn push(issues: &mut Vec<ValidationIssue>, path: &FieldPath, kind: IssueKind) {
    issues.push(ValidationIssue {
        path: path.clone(),
        kind,
    });
}

fn check_string(
    schema: &Map<String, Value>,
    s: &str,
    path: &FieldPath,
    issues: &mut Vec<ValidationIssue>,
) {
    let len = s.chars().count();
    if let Some(min) = schema.get("minLength").and_then(Value::as_u64)
        && (len as u64) < min
    {
        push(
            issues,
            path,
            IssueKind::Length {
                bound: format!("at least {min} characters"),
                actual: len,
            },
        );
    }
    if let Some(max) = schema.get("maxLength").and_then(Value::as_u64)
        && (len as u64) > max
    {
        push(
            issues,
            path,
            IssueKind::Length {
                bound: format!("at most {max} characters"),
                actual: len,
            },
        );
    }
    if let Some(pattern) = schema.get("pattern").and_then(Value::as_str) {
        match Regex::new(pattern) {
            Ok(re) if !re.is_match(s) => push(
                issues,
                path,
                IssueKind::Pattern {
                    pattern: pattern.to_owned(),
                },
            ),
            Ok(_) => {},
            Err(e) => warn!(pattern, error = %e, "ignoring invalid schema pattern"),
        }
    }
}

fn check_number(
    schema: &Map<String, Value>,
    n: &Number,
    path: &FieldPath,
    issues: &mut Vec<ValidationIssue>,
) {
    let Some(actual) = n.as_f64() else {
        return;
    };
    let bound = |keyword: &str| schema.get(keyword).and_then(Value::as_f64);

    if let Some(min) = bound("minimum")
        && actual < min
    {
        push(
            issues,
            path,
            IssueKind::OutOfRange {
                bound: format!(">= {min}"),
                actual,
            },
        );
    }
    if let Some(max) = bound("maximum")
        && actual > max
    {
        push(
            issues,
            path,
            IssueKind::OutOfRange {
                bound: format!("<= {max}"),
                actual,
            },
        );
    }
    if let Some(min) = bound("exclusiveMinimum")
        && actual <= min
    {
        push(
            issues,
            path,
            IssueKind::OutOfRange {
                bound: format!("> {min}"),
                actual,
            },
        );
    }
    if let Some(max) = bound("exclusiveMaximum")
        && actual >= max
    {
        push(
            issues,
            path,
            IssueKind::OutOfRange {
                bound: format!("< {max}"),
                actual,
            },
        );
    }
}

fn type_matches(types: &Value, value: &Value) -> bool {
    match types {
        Value::String(t) => matches_type(t, value),
        Value::Array(ts) => ts
            .iter()
            .filter_map(Value::as_str)
            .any(|t| matches_type(t, value)),
        _ => true,
    }
}

fn matches_type(name: &str, value: &Value) -> bool {
    match name {
        "null" => value.is_null(),
        "boolean" => value.is_boolean(),
        "object" => value.is_object(),
        "array" => value.is_array(),
        "string" => value.is_string(),
        "number" => value.is_number(),
        "integer" => match value {
            Value::Number(n) => n.is_i64() || n.is_u64() || whole_number(n).is_some(),
            _ => false,
        },
        _ => true,
    }
}

fn allows_integer(types: &Value) -> bool {
    match types {
        Value::String(t) => t == "integer",
        Value::Array(ts) => ts.iter().any(|t| t.as_str() == Some("integer")),
        _ => false,
    }
}

/// The integer equal to a float `n`, if `n` is whole and fits in 64 bits.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn whole_number(n: &Number) -> Option<Number> {
    if n.is_i64() || n.is_u64() {
        return None;
    }
    let f = n.as_f64()?;
    if !f.is_finite() || f.fract() != 0.0 {
        return None;
    }
    if (0.0..18_446_744_073_709_551_616.0).contains(&f) {
        Some(Number::from(f as u64))
    } else if (-9_223_372_036_854_775_808.0..0.0).contains(&f) {
        Some(Number::from(f as i64))
    } else {
        None
    }
}

fn type_names(types: &Value) -> String {
    match types {
        Value::String(t) => t.clone(),
        Value::Array(ts) => ts
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join("|"),
        other => other.to_string(),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Object(_) => "object",
        Value::Array(_) => "array",
        Value::String(_) => "string",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "number",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
    #[serde(rename_all = "lowercase")]
    enum Mood {
        Calm,
        Stormy,
    }

    fn default_mood() -> Mood {
        Mood::Calm
    }

    fn default_count() -> u32 {
        3
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
    #[serde(rename_all = "camelCase", deny_unknown_fields)]
    struct Sample {
        /// A required name.
        name: String,
        #[serde(default = "default_count")]
        #[schemars(range(min = 1, max = 10))]
        repeat_count: u32,
        #[serde(default = "default_mood")]
        mood: Mood,
        #[serde(default)]
        tags: Vec<String>,
        nickname: Option<String>,
        inner: Option<Inner>,
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
    struct Inner {
        label: String,
        weight: f64,
    }

    #[test]
    fn test_defaults_are_applied() {
        let schema = Schema::of::<Sample>();
        let out = schema.validate(&json!({"name": "x"})).unwrap();
        assert_eq!(out["repeatCount"], json!(3));
        assert_eq!(out["mood"], json!("calm"));
        assert_eq!(out["tags"], json!([]));
        assert!(out.get("nickname").is_none_or(Value::is_null));
    }

    #[test]
    fn test_missing_required_field_is_named() {
        let schema = Schema::of::<Sample>();
        let err = schema.validate(&json!({"repeatCount": 2})).unwrap_err();
        assert!(err.mentions("name"));
        assert_eq!(err.issue_for("name").unwrap().kind, IssueKind::Missing);
    }

    #[test]
    fn test_wrong_primitive_type_is_named() {
        let schema = Schema::of::<Sample>();
        let err = schema.validate(&json!({"name": 42})).unwrap_err();
        let issue = err.issue_for("name").unwrap();
        assert_eq!(
            issue.kind,
            IssueKind::TypeMismatch {
                expected: "string".into(),
                actual: "integer".into(),
            }
        );
    }

    #[test]
    fn test_enum_membership() {
        let schema = Schema::of::<Sample>();
        let err = schema
            .validate(&json!({"name": "x", "mood": "sunny"}))
            .unwrap_err();
        assert!(matches!(
            err.issue_for("mood").unwrap().kind,
            IssueKind::NotInEnum { .. }
        ));
    }

    #[test]
    fn test_range_bounds() {
        let schema = Schema::of::<Sample>();
        let err = schema
            .validate(&json!({"name": "x", "repeatCount": 11}))
            .unwrap_err();
        assert!(matches!(
            err.issue_for("repeatCount").unwrap().kind,
            IssueKind::OutOfRange { .. }
        ));
    }

    #[test]
    fn test_unknown_fields_rejected_for_closed_objects() {
        let schema = Schema::of::<Sample>();
        let err = schema
            .validate(&json!({"name": "x", "colour": "red"}))
            .unwrap_err();
        assert_eq!(err.issue_for("colour").unwrap().kind, IssueKind::UnknownField);
    }

    #[test]
    fn test_nested_optional_object_reports_inner_field() {
        let schema = Schema::of::<Sample>();
        let err = schema
            .validate(&json!({"name": "x", "inner": {"label": "a"}}))
            .unwrap_err();
        assert!(err.mentions("inner.weight"), "{err}");

        let ok = schema.validate(&json!({"name": "x", "inner": null}));
        assert!(ok.is_ok());
    }

    #[test]
    fn test_array_items_are_checked() {
        let schema = Schema::of::<Sample>();
        let err = schema
            .validate(&json!({"name": "x", "tags": ["a", 1]}))
            .unwrap_err();
        assert!(err.mentions("tags[1]"));
    }

    #[test]
    fn test_parse_into_type() {
        let schema = Schema::of::<Sample>();
        let parsed: Sample = schema
            .parse(&json!({"name": "x", "mood": "stormy"}))
            .unwrap();
        assert_eq!(parsed.mood, Mood::Stormy);
        assert_eq!(parsed.repeat_count, 3);
    }

    #[test]
    fn test_validation_is_idempotent() {
        let schema = Schema::of::<Sample>();
        let input = json!({"name": "x", "tags": ["t"]});
        let first = schema.validate(&input).unwrap();
        let second = schema.validate(&input).unwrap();
        assert_eq!(first, second);
        assert_eq!(input, json!({"name": "x", "tags": ["t"]}));
        assert_eq!(schema.validate(&first).unwrap(), first);
    }

    #[test]
    fn test_hand_written_schema() {
        let schema = Schema::from_value(json!({
            "type": "object",
            "required": ["code"],
            "properties": {
                "code": {"type": "string", "pattern": "^[A-Z]{3}$", "minLength": 3}
            }
        }));
        assert!(schema.is_valid(&json!({"code": "ABC"})));
        let err = schema.validate(&json!({"code": "abc"})).unwrap_err();
        assert!(matches!(
            err.issue_for("code").unwrap().kind,
            IssueKind::Pattern { .. }
        ));
    }

    #[test]
    fn test_boolean_schemas() {
        assert!(Schema::from_value(json!(true)).is_valid(&json!({"any": 1})));
        assert!(!Schema::from_value(json!(false)).is_valid(&json!(null)));
    }

    #[test]
    fn test_integer_accepts_whole_floats() {
        let schema = Schema::from_value(json!({"type": "integer"}));
        assert_eq!(schema.validate(&json!(2.0)).unwrap(), json!(2));
        assert!(!schema.is_valid(&json!(2.5)));
        assert!(!schema.is_valid(&json!(1e30)));
    }

    #[test]
    fn test_whole_float_parses_into_unsigned_field() {
        #[derive(Debug, Deserialize, JsonSchema)]
        struct Trip {
            days: u8,
        }

        let trip: Trip = Schema::of::<Trip>().parse(&json!({"days": 2.0})).unwrap();
        assert_eq!(trip.days, 2);
    }

    #[test]
    fn test_one_of_rejects_ambiguous_value() {
        let schema = Schema::from_value(json!({
            "oneOf": [{"type": "integer"}, {"type": "number"}]
        }));
        assert!(schema.is_valid(&json!(1.5)));
        let err = schema.validate(&json!(3)).unwrap_err();
        assert_eq!(
            err.issues[0].kind,
            IssueKind::AmbiguousVariant { matched: 2 }
        );
    }

    #[test]
    fn test_unique_items() {
        let schema = Schema::from_value(json!({
            "type": "array",
            "items": {"type": "string"},
            "uniqueItems": true
        }));
        assert!(schema.is_valid(&json!(["a", "b"])));
        let err = schema.validate(&json!(["a", "b", "a"])).unwrap_err();
        assert_eq!(err.fields(), vec!["[2]".to_string()]);
        assert_eq!(err.issues[0].kind, IssueKind::Duplicate);
    }
}
