use serde::Serialize;
use serde_json::Value;

use crate::models::{
    AttributeValue, CategoryFieldWithMeta, DynamicAttributes, FieldType, RawAttributes,
};

/// Coerce raw attributes to the declared field types.
///
/// Each field is looked up by `name`, then by `label` when the name key is
/// absent or `null`. Missing, `null` and empty-string values are skipped; an
/// empty string under `name` does not fall back to `label`. Values that cannot be coerced are
/// dropped silently; use [`validate_required`] to find what is missing.
pub fn normalize(raw: &RawAttributes, fields: &[CategoryFieldWithMeta]) -> DynamicAttributes {
    let mut clean = DynamicAttributes::new();
    for field in fields {
        let Some(value) = lookup(raw, field) else {
            continue;
        };
        let coerced = match field.field_type {
            FieldType::Number => as_number(value).map(AttributeValue::Number),
            FieldType::Text | FieldType::Select => as_text(value).map(AttributeValue::Text),
        };
        match coerced {
            Some(v) => {
                clean.insert(field.name.clone(), v);
            }
            None => {
                tracing::debug!(field = %field.name, raw = %value, "Dropped attribute value");
            }
        }
    }
    clean
}

/// Problem found by [`validate_required`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum AttributeIssue {
    /// Required field absent after normalization
    Missing { field: String },
    /// Select value outside the declared options
    NotAnOption { field: String, value: String },
}

/// Check normalized attributes against the resolved fields.
pub fn validate_required(
    fields: &[CategoryFieldWithMeta],
    attrs: &DynamicAttributes,
) -> Vec<AttributeIssue> {
    let mut issues = Vec::new();
    for field in fields {
        match attrs.get(&field.name) {
            None if field.required => issues.push(AttributeIssue::Missing {
                field: field.name.clone(),
            }),
            Some(AttributeValue::Text(value)) if field.field_type == FieldType::Select => {
                let allowed = field
                    .options
                    .as_ref()
                    .is_none_or(|opts| opts.is_empty() || opts.iter().any(|o| o == value));
                if !allowed {
                    issues.push(AttributeIssue::NotAnOption {
                        field: field.name.clone(),
                        value: value.clone(),
                    });
                }
            }
            _ => {}
        }
    }
    issues
}

fn lookup<'a>(raw: &'a RawAttributes, field: &CategoryFieldWithMeta) -> Option<&'a Value> {
    let value = raw
        .get(&field.name)
        .filter(|v| !v.is_null())
        .or_else(|| raw.get(&field.label))?;
    is_present(value).then_some(value)
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

fn as_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        Value::Bool(b) => f64::from(u8::from(*b)),
        _ => return None,
    };
    n.is_finite().then_some(n)
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(_) | Value::Bool(_) => Some(value.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn meta(name: &str, label: &str, field_type: FieldType, required: bool) -> CategoryFieldWithMeta {
        CategoryFieldWithMeta {
            name: name.into(),
            label: label.into(),
            field_type,
            options: None,
            required,
            inherited: false,
            source_category_name: "Электроника".into(),
        }
    }

    fn raw(value: Value) -> RawAttributes {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    fn phone_fields() -> Vec<CategoryFieldWithMeta> {
        vec![
            meta("brand", "Бренд", FieldType::Text, true),
            meta("screen_size", "Диагональ", FieldType::Number, false),
            CategoryFieldWithMeta {
                options: Some(vec!["Новый".into(), "Б/у".into()]),
                ..meta("condition", "Состояние", FieldType::Select, true)
            },
        ]
    }

    #[test]
    fn empty_input_gives_empty_output() {
        assert!(normalize(&RawAttributes::new(), &phone_fields()).is_empty());
    }

    #[test]
    fn number_coercion() {
        let fields = vec![meta("screen_size", "Диагональ", FieldType::Number, false)];

        let out = normalize(&raw(json!({"screen_size": "12.5"})), &fields);
        assert_eq!(out["screen_size"], AttributeValue::Number(12.5));

        let out = normalize(&raw(json!({"screen_size": " 6.1 "})), &fields);
        assert_eq!(out["screen_size"], AttributeValue::Number(6.1));

        let out = normalize(&raw(json!({"screen_size": 7})), &fields);
        assert_eq!(out["screen_size"], AttributeValue::Number(7.0));

        let out = normalize(&raw(json!({"screen_size": true})), &fields);
        assert_eq!(out["screen_size"], AttributeValue::Number(1.0));

        assert!(normalize(&raw(json!({"screen_size": "abc"})), &fields).is_empty());
        assert!(normalize(&raw(json!({"screen_size": "inf"})), &fields).is_empty());
        assert!(normalize(&raw(json!({"screen_size": [1]})), &fields).is_empty());
    }

    #[test]
    fn text_coercion() {
        let fields = vec![meta("model", "Модель", FieldType::Text, false)];

        let out = normalize(&raw(json!({"model": 15})), &fields);
        assert_eq!(out["model"], AttributeValue::Text("15".into()));

        let out = normalize(&raw(json!({"model": false})), &fields);
        assert_eq!(out["model"], AttributeValue::Text("false".into()));

        assert!(normalize(&raw(json!({"model": {"a": 1}})), &fields).is_empty());
    }

    #[test]
    fn label_fallback_and_skips() {
        let input = raw(json!({
            "Бренд": "Apple",
            "screen_size": "",
            "Диагональ": "6.7",
            "condition": null,
            "warranty": "2 года"
        }));
        let out = normalize(&input, &phone_fields());

        assert_eq!(out.len(), 1);
        assert_eq!(out["brand"], AttributeValue::Text("Apple".into()));
        // Blank under the name wins over the label
        assert!(!out.contains_key("screen_size"));
        assert!(!out.contains_key("warranty"));

        let out = normalize(
            &raw(json!({"screen_size": null, "Диагональ": "6.7"})),
            &phone_fields(),
        );
        assert_eq!(out["screen_size"], AttributeValue::Number(6.7));
    }

    #[test]
    fn output_follows_field_order() {
        let input = raw(json!({"condition": "Новый", "screen_size": 6.1, "brand": "Apple"}));
        let out = normalize(&input, &phone_fields());
        assert_eq!(
            out.keys().collect::<Vec<_>>(),
            ["brand", "screen_size", "condition"]
        );
    }

    #[test]
    fn name_takes_priority_over_label() {
        let input = raw(json!({"brand": "Samsung", "Бренд": "Apple"}));
        let out = normalize(&input, &phone_fields());
        assert_eq!(out["brand"], AttributeValue::Text("Samsung".into()));
    }

    #[test]
    fn required_and_options_are_reported() {
        let fields = phone_fields();
        let attrs = normalize(&raw(json!({"condition": "Сломан"})), &fields);

        let issues = validate_required(&fields, &attrs);
        assert_eq!(
            issues,
            vec![
                AttributeIssue::Missing { field: "brand".into() },
                AttributeIssue::NotAnOption {
                    field: "condition".into(),
                    value: "Сломан".into()
                },
            ]
        );

        let ok = normalize(&raw(json!({"brand": "Apple", "Состояние": "Новый"})), &fields);
        assert!(validate_required(&fields, &ok).is_empty());
    }
}
