//! Declarative field schemas
//!
//! A [`FieldSchema`] describes one editable attribute of a record: how it is
//! labelled, which input it is edited with and which rules its value must
//! satisfy. Entity configurations are built from lists of these.

use serde::{Deserialize, Serialize};

use crate::images::ImageCategory;

/// Value type of a field, which selects its input widget and base validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Email,
    Password,
    Date,
    Boolean,
    Select,
    Textarea,
}

impl FieldType {
    /// The HTML input type used for single-line inputs
    pub fn input_type(&self) -> &'static str {
        match self {
            FieldType::Text | FieldType::Select | FieldType::Textarea => "text",
            FieldType::Email => "email",
            FieldType::Password => "password",
            FieldType::Date => "date",
            FieldType::Boolean => "checkbox",
        }
    }
}

/// What a text value represents, declared rather than guessed from the key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    #[default]
    Standard,
    /// URL of an image picked from a catalog category
    Image(ImageCategory),
}

/// One entry of a select field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    pub fn new(value: &str, label: &str) -> Self {
        Self {
            value: value.to_string(),
            label: label.to_string(),
        }
    }
}

/// Optional length and pattern constraints
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldValidation {
    /// Minimum length in characters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<usize>,

    /// Maximum length in characters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<usize>,

    /// Regular expression the whole value must match
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

impl FieldValidation {
    pub fn is_empty(&self) -> bool {
        self.min.is_none() && self.max.is_none() && self.pattern.is_none()
    }
}

/// Declarative description of one editable attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSchema {
    pub key: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub kind: FieldKind,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub readonly: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<SelectOption>>,
    #[serde(default, skip_serializing_if = "FieldValidation::is_empty")]
    pub validation: FieldValidation,
}

impl FieldSchema {
    /// Create an optional, editable field of the given type
    pub fn new(key: &str, label: &str, field_type: FieldType) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            field_type,
            kind: FieldKind::Standard,
            required: false,
            readonly: false,
            placeholder: None,
            options: None,
            validation: FieldValidation::default(),
        }
    }

    pub fn text(key: &str, label: &str) -> Self {
        Self::new(key, label, FieldType::Text)
    }

    pub fn email(key: &str, label: &str) -> Self {
        Self::new(key, label, FieldType::Email)
    }

    pub fn password(key: &str, label: &str) -> Self {
        Self::new(key, label, FieldType::Password)
    }

    pub fn date(key: &str, label: &str) -> Self {
        Self::new(key, label, FieldType::Date)
    }

    pub fn boolean(key: &str, label: &str) -> Self {
        Self::new(key, label, FieldType::Boolean)
    }

    pub fn textarea(key: &str, label: &str) -> Self {
        Self::new(key, label, FieldType::Textarea)
    }

    /// A select field; options keep the order given here
    pub fn select(key: &str, label: &str, options: Vec<SelectOption>) -> Self {
        let mut field = Self::new(key, label, FieldType::Select);
        field.options = Some(options);
        field
    }

    /// A text field holding an image URL from `category`
    pub fn image(key: &str, label: &str, category: ImageCategory) -> Self {
        let mut field = Self::text(key, label);
        field.kind = FieldKind::Image(category);
        field
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn readonly(mut self) -> Self {
        self.readonly = true;
        self
    }

    pub fn placeholder(mut self, value: &str) -> Self {
        self.placeholder = Some(value.to_string());
        self
    }

    pub fn min(mut self, value: usize) -> Self {
        self.validation.min = Some(value);
        self
    }

    pub fn max(mut self, value: usize) -> Self {
        self.validation.max = Some(value);
        self
    }

    pub fn pattern(mut self, value: &str) -> Self {
        self.validation.pattern = Some(value.to_string());
        self
    }

    /// Image catalog category, when the field is an image URL
    pub fn image_category(&self) -> Option<ImageCategory> {
        match self.kind {
            FieldKind::Image(category) => Some(category),
            FieldKind::Standard => None,
        }
    }

    /// Select options, empty for every other type
    pub fn select_options(&self) -> &[SelectOption] {
        self.options.as_deref().unwrap_or(&[])
    }
}
