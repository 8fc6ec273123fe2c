//! Declarative validation of request option structs.
//!
//! Each option struct carries a rule list naming fields by their serialized
//! (serde) names. The [`Validator`] evaluates the rules against the
//! serialized JSON form of the struct and collects every failure, so a
//! caller sees all problems at once. The validator is an explicitly
//! constructed instance owned by the composition root; there is no global
//! state, and independent clients never share validator state.

use std::fmt;

use regex::Regex;
use serde::Serialize;

/// One failed rule, attributed to a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Every rule failure collected over one options struct. Displays as a
/// comma-joined list, e.g.
/// `name: name is a required field, flavor: flavor is a required field`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    failures: Vec<FieldError>,
}

impl ValidationError {
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationError {
            failures: vec![FieldError {
                field: field.into(),
                message: message.into(),
            }],
        }
    }

    pub fn failures(&self) -> &[FieldError] {
        &self.failures
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .failures
            .iter()
            .map(|failure| format!("{}: {}", failure.field, failure.message))
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "{}", joined)
    }
}

impl std::error::Error for ValidationError {}

/// A single declarative constraint over the serialized form of an options
/// struct. Field names are the serde names, not the Rust identifiers.
#[derive(Debug, Clone)]
pub enum Rule {
    /// The field must be set.
    Required { field: &'static str },
    /// The field, when set, must be one of the allowed string values.
    Enum {
        field: &'static str,
        allowed: &'static [&'static str],
    },
    /// The field is required exactly when `when` holds one of the listed
    /// values.
    RequiredForEqual {
        field: &'static str,
        when: &'static str,
        equals_any: &'static [&'static str],
    },
    /// The field must be unset when `when` holds one of the listed values.
    SuppressedForEqual {
        field: &'static str,
        when: &'static str,
        equals_any: &'static [&'static str],
    },
    /// The field may only be set while `other` is unset.
    AllowedWithout {
        field: &'static str,
        other: &'static str,
    },
    /// The field may only be set while every one of `others` is unset.
    AllowedWithoutAll {
        field: &'static str,
        others: &'static [&'static str],
    },
    /// The field, when set, must match the pattern.
    Regex {
        field: &'static str,
        pattern: &'static str,
    },
}

#[derive(Debug, Clone, Default)]
pub struct Validator;

impl Validator {
    pub fn new() -> Self {
        Validator
    }

    /// Serialize `options` and evaluate every rule against it. All failures
    /// are collected before returning.
    pub fn validate<T: Serialize>(&self, options: &T, rules: &[Rule]) -> Result<(), ValidationError> {
        let value = serde_json::to_value(options)
            .map_err(|e| ValidationError::single("options", format!("not serializable: {}", e)))?;
        self.validate_value(&value, rules)
    }

    pub fn validate_value(
        &self,
        value: &serde_json::Value,
        rules: &[Rule],
    ) -> Result<(), ValidationError> {
        let mut failures = Vec::new();
        for rule in rules {
            if let Some(failure) = evaluate(rule, value) {
                failures.push(failure);
            }
        }
        if failures.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { failures })
        }
    }
}

fn evaluate(rule: &Rule, value: &serde_json::Value) -> Option<FieldError> {
    match rule {
        Rule::Required { field } => {
            if is_unset(value.get(*field)) {
                return Some(FieldError {
                    field: (*field).to_string(),
                    message: format!("{} is a required field", field),
                });
            }
        }
        Rule::Enum { field, allowed } => {
            if let Some(text) = set_string(value, field) {
                if !allowed.contains(&text.as_str()) {
                    return Some(FieldError {
                        field: (*field).to_string(),
                        message: format!(
                            "{} must be one of [{}], got {:?}",
                            field,
                            allowed.join(", "),
                            text
                        ),
                    });
                }
            }
        }
        Rule::RequiredForEqual {
            field,
            when,
            equals_any,
        } => {
            if let Some(trigger) = set_string(value, when) {
                if equals_any.contains(&trigger.as_str()) && is_unset(value.get(*field)) {
                    return Some(FieldError {
                        field: (*field).to_string(),
                        message: format!("{} is required when {} is {:?}", field, when, trigger),
                    });
                }
            }
        }
        Rule::SuppressedForEqual {
            field,
            when,
            equals_any,
        } => {
            if let Some(trigger) = set_string(value, when) {
                if equals_any.contains(&trigger.as_str()) && !is_unset(value.get(*field)) {
                    return Some(FieldError {
                        field: (*field).to_string(),
                        message: format!("{} must not be set when {} is {:?}", field, when, trigger),
                    });
                }
            }
        }
        Rule::AllowedWithout { field, other } => {
            if !is_unset(value.get(*field)) && !is_unset(value.get(*other)) {
                return Some(FieldError {
                    field: (*field).to_string(),
                    message: format!("{} is allowed only when {} is not set", field, other),
                });
            }
        }
        Rule::AllowedWithoutAll { field, others } => {
            if !is_unset(value.get(*field)) {
                if let Some(conflict) = others.iter().find(|other| !is_unset(value.get(**other))) {
                    return Some(FieldError {
                        field: (*field).to_string(),
                        message: format!("{} is allowed only when {} is not set", field, conflict),
                    });
                }
            }
        }
        Rule::Regex { field, pattern } => {
            if let Some(text) = set_string(value, field) {
                match Regex::new(pattern) {
                    Ok(regex) => {
                        if !regex.is_match(&text) {
                            return Some(FieldError {
                                field: (*field).to_string(),
                                message: format!("{} must match {}", field, pattern),
                            });
                        }
                    }
                    Err(_) => {
                        return Some(FieldError {
                            field: (*field).to_string(),
                            message: format!("{} has an invalid pattern {:?}", field, pattern),
                        });
                    }
                }
            }
        }
    }
    None
}

/// A field is unset when it is absent, null or an empty string. Optional
/// fields on option structs use `skip_serializing_if`, so absence is the
/// common case.
fn is_unset(value: Option<&serde_json::Value>) -> bool {
    match value {
        None => true,
        Some(serde_json::Value::Null) => true,
        Some(serde_json::Value::String(text)) => text.is_empty(),
        Some(_) => false,
    }
}

/// String form of a set field. Numbers and booleans compare by their
/// display form so enum-like numeric fields work with string rule tables.
fn set_string(value: &serde_json::Value, field: &str) -> Option<String> {
    let field_value = value.get(field)?;
    if is_unset(Some(field_value)) {
        return None;
    }
    match field_value {
        serde_json::Value::String(text) => Some(text.clone()),
        serde_json::Value::Number(number) => Some(number.to_string()),
        serde_json::Value::Bool(flag) => Some(flag.to_string()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Debug, Serialize, Default)]
    struct DemoOptions {
        #[serde(skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        source: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        image_id: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        snapshot_id: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        version: Option<String>,
    }

    fn validator() -> Validator {
        Validator::new()
    }

    #[test]
    fn test_required_for_equal_fails_only_on_match() {
        let rules = [Rule::RequiredForEqual {
            field: "image_id",
            when: "source",
            equals_any: &["image"],
        }];

        let opts = DemoOptions {
            source: Some("image".to_string()),
            ..DemoOptions::default()
        };
        let err = validator().validate(&opts, &rules).unwrap_err();
        assert_eq!(
            err.to_string(),
            "image_id: image_id is required when source is \"image\""
        );

        // Conditioning value differs: the rule does not fire.
        let opts = DemoOptions {
            source: Some("snapshot".to_string()),
            ..DemoOptions::default()
        };
        assert!(validator().validate(&opts, &rules).is_ok());

        // Target set: the rule is satisfied.
        let opts = DemoOptions {
            source: Some("image".to_string()),
            image_id: Some("img-1".to_string()),
            ..DemoOptions::default()
        };
        assert!(validator().validate(&opts, &rules).is_ok());
    }

    #[test]
    fn test_two_missing_required_fields_join_comma_separated() {
        let rules = [
            Rule::Required { field: "name" },
            Rule::Required { field: "version" },
        ];
        let err = validator()
            .validate(&DemoOptions::default(), &rules)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "name: name is a required field, version: version is a required field"
        );
        assert_eq!(err.failures().len(), 2);
    }

    #[test]
    fn test_enum_rule_rejects_unlisted_value() {
        let rules = [Rule::Enum {
            field: "source",
            allowed: &["image", "snapshot", "volume"],
        }];
        let opts = DemoOptions {
            source: Some("floppy".to_string()),
            ..DemoOptions::default()
        };
        let err = validator().validate(&opts, &rules).unwrap_err();
        assert!(err.to_string().contains("must be one of"));

        let opts = DemoOptions {
            source: Some("snapshot".to_string()),
            ..DemoOptions::default()
        };
        assert!(validator().validate(&opts, &rules).is_ok());

        // Unset fields are not constrained by the enum rule.
        assert!(validator().validate(&DemoOptions::default(), &rules).is_ok());
    }

    #[test]
    fn test_suppressed_for_equal() {
        let rules = [Rule::SuppressedForEqual {
            field: "image_id",
            when: "source",
            equals_any: &["snapshot"],
        }];
        let opts = DemoOptions {
            source: Some("snapshot".to_string()),
            image_id: Some("img-1".to_string()),
            ..DemoOptions::default()
        };
        let err = validator().validate(&opts, &rules).unwrap_err();
        assert!(err.to_string().contains("must not be set"));
    }

    #[test]
    fn test_allowed_without_pair_and_set() {
        let rules = [
            Rule::AllowedWithout {
                field: "image_id",
                other: "snapshot_id",
            },
            Rule::AllowedWithoutAll {
                field: "snapshot_id",
                others: &["image_id", "version"],
            },
        ];
        let opts = DemoOptions {
            image_id: Some("img-1".to_string()),
            snapshot_id: Some("snap-1".to_string()),
            ..DemoOptions::default()
        };
        let err = validator().validate(&opts, &rules).unwrap_err();
        assert_eq!(err.failures().len(), 2);

        let opts = DemoOptions {
            image_id: Some("img-1".to_string()),
            ..DemoOptions::default()
        };
        assert!(validator().validate(&opts, &rules).is_ok());
    }

    #[test]
    fn test_regex_rule() {
        let rules = [Rule::Regex {
            field: "name",
            pattern: "^[a-z0-9-]+$",
        }];
        let opts = DemoOptions {
            name: Some("web-1".to_string()),
            ..DemoOptions::default()
        };
        assert!(validator().validate(&opts, &rules).is_ok());

        let opts = DemoOptions {
            name: Some("Web 1!".to_string()),
            ..DemoOptions::default()
        };
        let err = validator().validate(&opts, &rules).unwrap_err();
        assert!(err.to_string().contains("must match"));
    }

    #[test]
    fn test_empty_string_counts_as_unset() {
        let rules = [Rule::Required { field: "name" }];
        let opts = DemoOptions {
            name: Some(String::new()),
            ..DemoOptions::default()
        };
        assert!(validator().validate(&opts, &rules).is_err());
    }
}
