//! Validation rules derived from field schemas

use chrono::NaiveDate;
use regex::Regex;

use super::FormValue;
use crate::auth::is_valid_email;
use crate::error::Error;
use crate::schema::{FieldSchema, FieldType};

/// Minimum password length when the schema sets none
pub const DEFAULT_PASSWORD_MIN: usize = 6;

/// A single check applied to a non-empty value
#[derive(Debug, Clone)]
pub enum Rule {
    Email,
    MinLength(usize),
    MaxLength(usize),
    Pattern { regex: Regex, message: String },
    Date,
}

impl Rule {
    /// The error message when `value` breaks this rule
    pub fn check(&self, value: &str) -> Option<String> {
        let len = value.chars().count();
        match self {
            Rule::Email if !is_valid_email(value) => Some("Invalid email address".to_string()),
            Rule::MinLength(min) if len < *min => Some(format!("Must be at least {} characters", min)),
            Rule::MaxLength(max) if len > *max => Some(format!("Must be at most {} characters", max)),
            Rule::Pattern { regex, message } if !regex.is_match(value) => Some(message.clone()),
            Rule::Date if NaiveDate::parse_from_str(value, "%Y-%m-%d").is_err() => Some("Invalid date".to_string()),
            _ => None,
        }
    }
}

/// Rules of one field
#[derive(Debug, Clone)]
pub struct FieldRules {
    pub key: String,
    pub label: String,
    pub required: bool,
    pub rules: Vec<Rule>,
}

impl FieldRules {
    /// Derive the rules for `field` from its type and validation settings
    pub fn derive(field: &FieldSchema) -> Result<Self, Error> {
        let validation = &field.validation;
        let mut rules = Vec::new();

        let pattern = |message: &str| -> Result<Option<Rule>, Error> {
            validation
                .pattern
                .as_deref()
                .map(|pattern| {
                    Regex::new(pattern)
                        .map(|regex| Rule::Pattern {
                            regex,
                            message: message.to_string(),
                        })
                        .map_err(|e| Error::config(format!("field '{}' pattern: {}", field.key, e)))
                })
                .transpose()
        };

        match field.field_type {
            FieldType::Email => {
                rules.push(Rule::Email);
                rules.extend(pattern("Invalid email address")?);
            }
            FieldType::Password => {
                rules.push(Rule::MinLength(validation.min.unwrap_or(DEFAULT_PASSWORD_MIN)));
                rules.extend(validation.max.map(Rule::MaxLength));
            }
            FieldType::Date => rules.push(Rule::Date),
            FieldType::Boolean => {}
            FieldType::Text | FieldType::Textarea | FieldType::Select => {
                rules.extend(validation.min.map(Rule::MinLength));
                rules.extend(validation.max.map(Rule::MaxLength));
                rules.extend(pattern("Invalid format")?);
            }
        }

        Ok(Self {
            key: field.key.clone(),
            label: field.label.clone(),
            // A checkbox always has a value
            required: field.required && field.field_type != FieldType::Boolean,
            rules,
        })
    }

    /// The first failing message for `value`, if any
    pub fn check(&self, value: &FormValue) -> Option<String> {
        let text = match value {
            FormValue::Bool(_) => return None,
            FormValue::Text(text) => text.trim(),
        };

        if text.is_empty() {
            return self.required.then(|| format!("{} is required", self.label));
        }

        self.rules.iter().find_map(|rule| rule.check(text))
    }
}

/// Validation contract of a whole form
#[derive(Debug, Clone)]
pub struct FormSchema {
    fields: Vec<FieldRules>,
}

impl FormSchema {
    /// Derive rules for every editable field; readonly fields are not checked
    pub fn from_fields(fields: &[FieldSchema]) -> Result<Self, Error> {
        let fields = fields
            .iter()
            .filter(|field| !field.readonly)
            .map(FieldRules::derive)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { fields })
    }

    pub fn rules(&self, key: &str) -> Option<&FieldRules> {
        self.fields.iter().find(|rules| rules.key == key)
    }

    /// Check every field, returning `(key, message)` pairs in field order
    pub fn validate<'a, F>(&self, value_of: F) -> Vec<(String, String)>
    where
        F: Fn(&str) -> Option<&'a FormValue>,
    {
        let empty = FormValue::Text(String::new());
        self.fields
            .iter()
            .filter_map(|rules| {
                let value = value_of(&rules.key).unwrap_or(&empty);
                rules.check(value).map(|message| (rules.key.clone(), message))
            })
            .collect()
    }
}
