//! Input widgets chosen per field

use serde::Serialize;

use super::FormValue;
use crate::images::ImageCategory;
use crate::schema::{FieldSchema, FieldType, SelectOption};

/// Rows of a text area
pub const TEXTAREA_ROWS: u8 = 4;

/// The control a field is edited with
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "widget", rename_all = "snake_case")]
pub enum WidgetKind {
    Checkbox,
    Select {
        /// Leading empty choice, `Select <label>`
        placeholder: String,
        options: Vec<SelectOption>,
    },
    TextArea {
        rows: u8,
    },
    ImagePicker {
        category: ImageCategory,
    },
    Input {
        input_type: &'static str,
    },
}

impl WidgetKind {
    pub fn for_field(field: &FieldSchema) -> Self {
        if let Some(category) = field.image_category() {
            return WidgetKind::ImagePicker { category };
        }

        match field.field_type {
            FieldType::Boolean => WidgetKind::Checkbox,
            FieldType::Select => WidgetKind::Select {
                placeholder: format!("Select {}", field.label),
                options: field.select_options().to_vec(),
            },
            FieldType::Textarea => WidgetKind::TextArea { rows: TEXTAREA_ROWS },
            other => WidgetKind::Input {
                input_type: other.input_type(),
            },
        }
    }
}

/// A rendered form control with its current state
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Widget {
    pub id: String,
    pub label: String,
    pub required: bool,
    #[serde(flatten)]
    pub kind: WidgetKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    pub disabled: bool,
    pub value: FormValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(rename = "aria-invalid")]
    pub aria_invalid: bool,
    #[serde(rename = "aria-describedby", skip_serializing_if = "Option::is_none")]
    pub aria_describedby: Option<String>,
}

impl Widget {
    pub fn new(field: &FieldSchema, value: FormValue, error: Option<String>) -> Self {
        Self {
            id: field.key.clone(),
            label: field.label.clone(),
            required: field.required,
            kind: WidgetKind::for_field(field),
            placeholder: field.placeholder.clone(),
            disabled: field.readonly,
            value,
            aria_invalid: error.is_some(),
            aria_describedby: error.as_ref().map(|_| error_id(&field.key)),
            error,
        }
    }
}

/// Element id of a field's error message
pub fn error_id(key: &str) -> String {
    format!("{}-error", key)
}
