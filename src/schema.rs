use serde_json::{Map, Value};

/// Primitive JSON types a scalar field can be constrained to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueType {
    String,
    Number,
    Boolean,
}

impl ValueType {
    pub fn name(self) -> &'static str {
        match self {
            ValueType::String => "string",
            ValueType::Number => "number",
            ValueType::Boolean => "boolean",
        }
    }
}

#[derive(Clone, Debug)]
pub enum FieldShape {
    Scalar(ValueType),
    /// Ordered sequence; element shape is not checked.
    List,
    /// Nested mapping validated against its own schema.
    Object(Schema),
}

#[derive(Clone, Debug)]
pub struct FieldRule {
    pub required: bool,
    pub shape: FieldShape,
}

impl FieldRule {
    pub fn required(shape: FieldShape) -> Self {
        Self {
            required: true,
            shape,
        }
    }

    pub fn optional(shape: FieldShape) -> Self {
        Self {
            required: false,
            shape,
        }
    }
}

/// A recursive field descriptor. Entries keep authoring order so validation
/// errors come out in a deterministic, schema-declared order.
#[derive(Clone, Debug, Default)]
pub struct Schema {
    entries: Vec<(String, FieldRule)>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: impl Into<String>, rule: FieldRule) -> Self {
        self.entries.push((name.into(), rule));
        self
    }

    pub fn entries(&self) -> &[(String, FieldRule)] {
        &self.entries
    }
}

/// The fixed schema for article configuration documents.
pub fn article_schema() -> Schema {
    use FieldShape::{List, Object, Scalar};
    use ValueType::String as Str;

    Schema::new()
        .field(
            "meta",
            FieldRule::required(Object(
                Schema::new()
                    .field("template", FieldRule::required(Scalar(Str)))
                    .field("title", FieldRule::required(Scalar(Str)))
                    .field("word_count", FieldRule::optional(Scalar(Str)))
                    .field("reading_time", FieldRule::optional(Scalar(Str)))
                    .field("image_count", FieldRule::optional(Scalar(Str))),
            )),
        )
        .field(
            "hook",
            FieldRule::required(Object(
                Schema::new()
                    .field("scenario", FieldRule::required(Scalar(Str)))
                    .field("discovery", FieldRule::required(Scalar(Str)))
                    .field("surprise", FieldRule::required(Scalar(Str))),
            )),
        )
        .field(
            "project",
            FieldRule::required(Object(
                Schema::new()
                    .field("name", FieldRule::required(Scalar(Str)))
                    .field("tagline", FieldRule::optional(Scalar(Str)))
                    .field("github_url", FieldRule::optional(Scalar(Str)))
                    .field("website", FieldRule::optional(Scalar(Str))),
            )),
        )
        .field(
            "installation",
            FieldRule::required(Object(
                Schema::new()
                    .field("prerequisites", FieldRule::required(List))
                    .field("steps", FieldRule::required(List)),
            )),
        )
        .field("use_cases", FieldRule::required(List))
        .field(
            "cta",
            FieldRule::required(Object(
                Schema::new().field("benefits", FieldRule::required(List)),
            )),
        )
}

#[derive(Clone, Debug, Default, serde::Serialize)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Validates a configuration document against a schema. Pure: all findings are
/// returned, nothing is printed and no state is kept between calls.
pub fn validate(doc: &Value, schema: &Schema) -> ValidationReport {
    let mut report = ValidationReport::default();

    match doc.as_object() {
        Some(root) => validate_object(root, schema, "", &mut report.errors),
        None => report.errors.push(format!(
            "configuration root must be an object, actual {}",
            json_type_name(doc)
        )),
    }

    lint(doc, &mut report.warnings);
    report
}

fn validate_object(
    obj: &Map<String, Value>,
    schema: &Schema,
    parent: &str,
    errors: &mut Vec<String>,
) {
    for (key, rule) in schema.entries() {
        let path = if parent.is_empty() {
            key.clone()
        } else {
            format!("{parent}.{key}")
        };

        // Explicit null counts as absent.
        let value = obj.get(key).filter(|v| !v.is_null());

        let Some(value) = value else {
            if rule.required {
                errors.push(format!("missing required field: {path}"));
            }
            continue;
        };

        match &rule.shape {
            FieldShape::Object(nested) => match value.as_object() {
                Some(map) => validate_object(map, nested, &path, errors),
                None => errors.push(type_mismatch(&path, "object", value)),
            },
            FieldShape::List => {
                if !value.is_array() {
                    errors.push(type_mismatch(&path, "array", value));
                }
            }
            FieldShape::Scalar(expected) => {
                if json_type_name(value) != expected.name() {
                    errors.push(type_mismatch(&path, expected.name(), value));
                }
            }
        }
    }
}

fn type_mismatch(path: &str, expected: &str, actual: &Value) -> String {
    format!(
        "field \"{path}\" type mismatch: expected {expected}, actual {}",
        json_type_name(actual)
    )
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Content-quality heuristics. Only fields that are present and well-typed are
/// inspected, so a structurally broken document never panics the linter.
fn lint(doc: &Value, warnings: &mut Vec<String>) {
    if let Some(cases) = doc.pointer("/use_cases").and_then(Value::as_array) {
        if cases.is_empty() {
            warnings.push("use_cases is empty: provide 2-3 use cases".to_string());
        }
    }

    if let Some(steps) = doc.pointer("/installation/steps").and_then(Value::as_array) {
        if steps.len() < 3 {
            warnings
                .push("installation.steps has fewer than 3 steps: aim for at least 3".to_string());
        }
    }

    if let Some(title) = doc.pointer("/meta/title").and_then(Value::as_str) {
        if title.chars().count() < 20 {
            warnings.push(
                "meta.title is short: 20-50 characters tends to earn more clicks".to_string(),
            );
        }
        if !title.contains('（') && !title.contains('(') {
            warnings.push(
                "meta.title has no parenthetical: consider one, e.g. a tutorial or resource note"
                    .to_string(),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_doc() -> Value {
        json!({
            "meta": {
                "template": "basic",
                "title": "A very long title that easily clears twenty (附教程)"
            },
            "hook": {
                "scenario": "late night debugging",
                "discovery": "found a tool",
                "surprise": "it worked first try"
            },
            "project": { "name": "Foo" },
            "installation": {
                "prerequisites": ["rustup"],
                "steps": ["install", "configure", "run"]
            },
            "use_cases": [{}, {}, {}],
            "cta": { "benefits": ["free"] }
        })
    }

    #[test]
    fn report_serializes_with_stable_field_names() {
        let report = ValidationReport {
            errors: vec!["missing required field: hook".to_string()],
            warnings: vec!["title is short".to_string()],
        };
        let json: Value = serde_json::to_value(&report).unwrap();
        assert_eq!(json["errors"][0], "missing required field: hook");
        assert_eq!(json["warnings"][0], "title is short");
    }

    #[test]
    fn valid_document_has_no_errors() {
        let report = validate(&valid_doc(), &article_schema());
        assert!(report.errors.is_empty(), "{:?}", report.errors);
        assert!(report.is_valid());
    }

    #[test]
    fn each_missing_required_field_is_named() {
        for path in [
            "meta", "hook", "project", "installation", "use_cases", "cta",
        ] {
            let mut doc = valid_doc();
            doc.as_object_mut().unwrap().remove(path);
            let report = validate(&doc, &article_schema());
            assert!(
                report
                    .errors
                    .iter()
                    .any(|e| e == &format!("missing required field: {path}")),
                "expected error for {path}, got {:?}",
                report.errors
            );
        }
    }

    #[test]
    fn missing_nested_field_uses_dotted_path() {
        let mut doc = valid_doc();
        doc.pointer_mut("/hook")
            .unwrap()
            .as_object_mut()
            .unwrap()
            .remove("surprise");
        let report = validate(&doc, &article_schema());
        assert!(
            report
                .errors
                .contains(&"missing required field: hook.surprise".to_string())
        );
    }

    #[test]
    fn explicit_null_counts_as_missing() {
        let mut doc = valid_doc();
        *doc.pointer_mut("/project/name").unwrap() = Value::Null;
        let report = validate(&doc, &article_schema());
        assert!(
            report
                .errors
                .contains(&"missing required field: project.name".to_string())
        );
    }

    #[test]
    fn type_mismatch_names_expected_and_actual() {
        let mut doc = valid_doc();
        *doc.pointer_mut("/installation/prerequisites").unwrap() = json!("rustup");
        let report = validate(&doc, &article_schema());
        assert!(report.errors.contains(
            &"field \"installation.prerequisites\" type mismatch: expected array, actual string"
                .to_string()
        ));
    }

    #[test]
    fn mapping_does_not_pass_an_array_check() {
        let mut doc = valid_doc();
        *doc.pointer_mut("/use_cases").unwrap() = json!({"0": "a"});
        let report = validate(&doc, &article_schema());
        assert!(
            report
                .errors
                .contains(&"field \"use_cases\" type mismatch: expected array, actual object".to_string())
        );
    }

    #[test]
    fn array_does_not_pass_an_object_check() {
        let mut doc = valid_doc();
        *doc.pointer_mut("/cta").unwrap() = json!(["benefits"]);
        let report = validate(&doc, &article_schema());
        assert!(
            report
                .errors
                .contains(&"field \"cta\" type mismatch: expected object, actual array".to_string())
        );
        // Interior is not checked once the container type is wrong.
        assert!(!report.errors.iter().any(|e| e.contains("cta.benefits")));
    }

    #[test]
    fn optional_absent_field_is_skipped() {
        // No word_count anywhere in valid_doc; no error, no type check.
        let report = validate(&valid_doc(), &article_schema());
        assert!(!report.errors.iter().any(|e| e.contains("word_count")));
    }

    #[test]
    fn non_object_root_is_an_error() {
        let report = validate(&json!([1, 2, 3]), &article_schema());
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].contains("root must be an object"));
    }

    #[test]
    fn empty_use_cases_warns() {
        let mut doc = valid_doc();
        *doc.pointer_mut("/use_cases").unwrap() = json!([]);
        let report = validate(&doc, &article_schema());
        assert!(report.is_valid());
        assert!(report.warnings.iter().any(|w| w.contains("use_cases")));
    }

    #[test]
    fn three_use_cases_do_not_warn() {
        let report = validate(&valid_doc(), &article_schema());
        assert!(!report.warnings.iter().any(|w| w.contains("use_cases")));
    }

    #[test]
    fn few_installation_steps_warn() {
        let mut doc = valid_doc();
        *doc.pointer_mut("/installation/steps").unwrap() = json!(["one", "two"]);
        let report = validate(&doc, &article_schema());
        assert!(report.is_valid());
        assert!(
            report
                .warnings
                .iter()
                .any(|w| w.contains("installation.steps"))
        );
    }

    #[test]
    fn short_title_warns_on_length() {
        let mut doc = valid_doc();
        *doc.pointer_mut("/meta/title").unwrap() = json!("AI");
        let report = validate(&doc, &article_schema());
        assert!(report.warnings.iter().any(|w| w.contains("short")));
    }

    #[test]
    fn long_title_with_fullwidth_parens_has_no_title_warnings() {
        let mut doc = valid_doc();
        // 30 scalar values, includes a full-width parenthetical.
        *doc.pointer_mut("/meta/title").unwrap() =
            json!("一二三四五六七八九十一二三四五六七八九十一二三四五六（教程）");
        let report = validate(&doc, &article_schema());
        assert!(
            !report.warnings.iter().any(|w| w.contains("meta.title")),
            "{:?}",
            report.warnings
        );
    }

    #[test]
    fn title_without_parenthetical_warns() {
        let mut doc = valid_doc();
        *doc.pointer_mut("/meta/title").unwrap() =
            json!("a perfectly long title without any bracket");
        let report = validate(&doc, &article_schema());
        assert!(report.warnings.iter().any(|w| w.contains("parenthetical")));
    }

    #[test]
    fn lints_survive_structurally_broken_documents() {
        let report = validate(&json!({"meta": "oops", "installation": 3}), &article_schema());
        assert!(!report.is_valid());
        // Reaching here without a panic is the point.
    }
}
