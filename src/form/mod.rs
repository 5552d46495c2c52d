//! Dynamic forms built from an entity's field schemas
//!
//! An [`EntityForm`] holds the values, errors and submit state of one create or
//! edit panel. Rules come from [`FormSchema`], controls from [`Widget`], and the
//! actual write is delegated to a [`SubmitHandler`].
//!
//! # Example
//!
//! ```
//! use entity_admin::entities::EntityKind;
//! use entity_admin::form::EntityForm;
//!
//! let config = EntityKind::LetterExercises.config();
//! let mut form = EntityForm::new(&config, None).unwrap();
//! form.set("title", "Vowels").unwrap();
//! assert_eq!(form.title(), "Create Letter Exercise");
//! assert!(form.validate().is_err());
//! ```

mod validation;
mod widget;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::debug;

use crate::entity::{EntityConfig, Record};
use crate::error::Error;
use crate::render::{is_truthy, DateValue};
use crate::schema::{FieldSchema, FieldType};

pub use validation::*;
pub use widget::*;

/// Value held by a form control
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FormValue {
    Text(String),
    Bool(bool),
}

impl FormValue {
    /// The empty value for a field of `field_type`
    pub fn empty(field_type: FieldType) -> Self {
        match field_type {
            FieldType::Boolean => FormValue::Bool(false),
            _ => FormValue::Text(String::new()),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FormValue::Text(text) => Some(text),
            FormValue::Bool(_) => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FormValue::Bool(b) => Some(*b),
            FormValue::Text(_) => None,
        }
    }

    fn from_record(field: &FieldSchema, value: &Value) -> Self {
        if field.field_type == FieldType::Boolean {
            return FormValue::Bool(is_truthy(Some(value)));
        }

        let text = match value {
            Value::Null => String::new(),
            Value::String(s) if field.field_type == FieldType::Date => normalize_date(s),
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            other => other.to_string(),
        };
        FormValue::Text(text)
    }
}

impl From<&str> for FormValue {
    fn from(value: &str) -> Self {
        FormValue::Text(value.to_string())
    }
}

impl From<String> for FormValue {
    fn from(value: String) -> Self {
        FormValue::Text(value)
    }
}

impl From<bool> for FormValue {
    fn from(value: bool) -> Self {
        FormValue::Bool(value)
    }
}

/// Reduce a date or timestamp to `YYYY-MM-DD`; unparseable input is kept as is
pub fn normalize_date(value: &str) -> String {
    DateValue::parse(value)
        .map(|date| date.day().format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| value.to_string())
}

/// Starting values of a form: empty for a new record, coerced from `record` otherwise
pub fn initial_values(fields: &[FieldSchema], record: Option<&Record>) -> HashMap<String, FormValue> {
    fields
        .iter()
        .map(|field| {
            let value = record
                .and_then(|record| record.get(&field.key))
                .map(|value| FormValue::from_record(field, value))
                .unwrap_or_else(|| FormValue::empty(field.field_type));
            (field.key.clone(), value)
        })
        .collect()
}

/// Whether the form creates a record or updates the one keyed `key`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit { key: String },
}

/// Performs the write for a submitted form
#[async_trait]
pub trait SubmitHandler: Send + Sync {
    async fn submit(&self, mode: &FormMode, payload: Map<String, Value>) -> Result<(), Error>;
}

/// Result of a submit attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Submitted,
    /// Validation failed; nothing was sent
    Invalid { field: String, message: String },
    /// The handler failed; the message is shown on the form
    Failed { message: String },
    /// Another submit is still in flight
    Busy,
}

/// State of a create or edit form
#[derive(Debug, Clone)]
pub struct EntityForm {
    display_name: String,
    fields: Vec<FieldSchema>,
    schema: FormSchema,
    mode: FormMode,
    values: HashMap<String, FormValue>,
    /// Values the form was opened with
    initial: HashMap<String, FormValue>,
    errors: HashMap<String, String>,
    form_error: Option<String>,
    submitting: bool,
}

impl EntityForm {
    /// A create form when `record` is `None`, an edit form for it otherwise
    pub fn new(config: &EntityConfig, record: Option<&Record>) -> Result<Self, Error> {
        let mode = match record {
            None => FormMode::Create,
            Some(record) => FormMode::Edit {
                key: config
                    .record_key(record)
                    .ok_or_else(|| Error::not_found(format!("{} without {}", config.name, config.primary_key)))?,
            },
        };

        let values = initial_values(&config.fields, record);
        Ok(Self {
            display_name: config.display_name.clone(),
            schema: FormSchema::from_fields(&config.fields)?,
            initial: values.clone(),
            values,
            fields: config.fields.clone(),
            mode,
            errors: HashMap::new(),
            form_error: None,
            submitting: false,
        })
    }

    pub fn mode(&self) -> &FormMode {
        &self.mode
    }

    pub fn is_edit(&self) -> bool {
        matches!(self.mode, FormMode::Edit { .. })
    }

    /// Heading and submit label while idle
    pub fn title(&self) -> String {
        let verb = if self.is_edit() { "Update" } else { "Create" };
        format!("{} {}", verb, self.display_name)
    }

    pub fn submit_label(&self) -> String {
        match (self.submitting, self.is_edit()) {
            (true, true) => "Updating...".to_string(),
            (true, false) => "Creating...".to_string(),
            (false, _) => self.title(),
        }
    }

    pub fn aria_label(&self) -> String {
        format!("{} form", self.title().to_lowercase())
    }

    pub fn value(&self, key: &str) -> Option<&FormValue> {
        self.values.get(key)
    }

    /// Set a field's value; a field already showing an error is re-checked
    pub fn set<V: Into<FormValue>>(&mut self, key: &str, value: V) -> Result<(), Error> {
        let field = self
            .fields
            .iter()
            .find(|field| field.key == key)
            .ok_or_else(|| Error::not_found(format!("field {}", key)))?;

        if field.readonly {
            return Err(Error::validation(key, format!("{} is read-only", field.label)));
        }

        let value = value.into();
        let matches_type = match value {
            FormValue::Bool(_) => field.field_type == FieldType::Boolean,
            FormValue::Text(_) => field.field_type != FieldType::Boolean,
        };
        if !matches_type {
            return Err(Error::validation(key, format!("{} has the wrong value type", field.label)));
        }

        if self.errors.contains_key(key) {
            match self.schema.rules(key).and_then(|rules| rules.check(&value)) {
                Some(message) => self.errors.insert(key.to_string(), message),
                None => self.errors.remove(key),
            };
        }
        self.values.insert(key.to_string(), value);
        Ok(())
    }

    /// Set a field from text input, parsing booleans for checkbox fields
    pub fn set_input(&mut self, key: &str, input: &str) -> Result<(), Error> {
        let is_boolean = self
            .fields
            .iter()
            .any(|field| field.key == key && field.field_type == FieldType::Boolean);

        if !is_boolean {
            return self.set(key, input);
        }

        let checked = match input.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => true,
            "false" | "no" | "off" | "0" | "" => false,
            _ => return Err(Error::validation(key, "Expected true or false")),
        };
        self.set(key, checked)
    }

    /// Run every rule, replacing the inline errors; returns the first failure
    pub fn validate(&mut self) -> Result<(), Error> {
        let failures = self.schema.validate(|key| self.values.get(key));
        self.errors = failures.iter().cloned().collect();

        match failures.into_iter().next() {
            Some((field, message)) => Err(Error::Validation { field, message }),
            None => Ok(()),
        }
    }

    pub fn error(&self, key: &str) -> Option<&str> {
        self.errors.get(key).map(String::as_str)
    }

    /// The first inline error in field order
    pub fn first_error(&self) -> Option<(&str, &str)> {
        self.fields
            .iter()
            .find_map(|field| self.errors.get_key_value(&field.key))
            .map(|(key, message)| (key.as_str(), message.as_str()))
    }

    pub fn form_error(&self) -> Option<&str> {
        self.form_error.as_deref()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Controls in field order
    pub fn widgets(&self) -> Vec<Widget> {
        self.fields
            .iter()
            .map(|field| {
                let value = self
                    .values
                    .get(&field.key)
                    .cloned()
                    .unwrap_or_else(|| FormValue::empty(field.field_type));
                Widget::new(field, value, self.errors.get(&field.key).cloned())
            })
            .collect()
    }

    /// The request body. Readonly fields and empty optional values are left
    /// out, except that an edit sends `""` for a field the user cleared.
    /// Passwords left empty always keep the current one.
    pub fn payload(&self) -> Map<String, Value> {
        let mut payload = Map::new();
        for field in self.fields.iter().filter(|field| !field.readonly) {
            match self.values.get(&field.key) {
                Some(FormValue::Bool(b)) => {
                    payload.insert(field.key.clone(), Value::Bool(*b));
                }
                Some(FormValue::Text(text))
                    if !text.trim().is_empty() || field.required || self.was_cleared(field) =>
                {
                    payload.insert(field.key.clone(), Value::String(text.clone()));
                }
                None if field.field_type == FieldType::Boolean => {
                    payload.insert(field.key.clone(), Value::Bool(false));
                }
                _ => {}
            }
        }
        payload
    }

    /// Whether an edit emptied a field that had a value when the form opened
    fn was_cleared(&self, field: &FieldSchema) -> bool {
        if !self.is_edit() || field.field_type == FieldType::Password {
            return false;
        }
        let empty = |value: Option<&FormValue>| {
            value
                .and_then(FormValue::as_text)
                .map_or(true, |text| text.trim().is_empty())
        };
        empty(self.values.get(&field.key)) && !empty(self.initial.get(&field.key))
    }

    /// Validate and mark the form as submitting, returning the payload to send
    pub fn begin_submit(&mut self) -> Result<Map<String, Value>, SubmitOutcome> {
        if self.submitting {
            return Err(SubmitOutcome::Busy);
        }

        if let Err(Error::Validation { field, message }) = self.validate() {
            debug!(field = %field, "form validation failed");
            return Err(SubmitOutcome::Invalid { field, message });
        }

        self.form_error = None;
        self.submitting = true;
        Ok(self.payload())
    }

    /// Settle a submit started with [`EntityForm::begin_submit`]
    pub fn finish_submit(&mut self, result: Result<(), Error>) -> SubmitOutcome {
        self.submitting = false;
        match result {
            Ok(()) => SubmitOutcome::Submitted,
            Err(e) => {
                let message = e.user_message();
                self.form_error = Some(message.clone());
                SubmitOutcome::Failed { message }
            }
        }
    }

    /// Validate, then hand the payload to `handler`
    pub async fn submit<H: SubmitHandler + ?Sized>(&mut self, handler: &H) -> SubmitOutcome {
        let payload = match self.begin_submit() {
            Ok(payload) => payload,
            Err(outcome) => return outcome,
        };

        let mode = self.mode.clone();
        let result = handler.submit(&mode, payload).await;
        self.finish_submit(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::EntityKind;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<(FormMode, Map<String, Value>)>>,
        fail_with: Option<String>,
    }

    #[async_trait]
    impl SubmitHandler for Recorder {
        async fn submit(&self, mode: &FormMode, payload: Map<String, Value>) -> Result<(), Error> {
            self.calls.lock().unwrap().push((mode.clone(), payload));
            match &self.fail_with {
                Some(message) => Err(Error::Api {
                    status: 400,
                    message: message.clone(),
                }),
                None => Ok(()),
            }
        }
    }

    fn fill_letter_exercise(form: &mut EntityForm) {
        form.set("title", "Vowels").unwrap();
        form.set("description", "Learn the five vowels").unwrap();
        form.set("durationMinutes", "10").unwrap();
        form.set("mainColor", "#FF5733").unwrap();
        form.set("thumbnailUrl", "http://localhost:3000/public/letters/a.png").unwrap();
        form.set("xp", "100").unwrap();
        form.set("difficulty", "easy").unwrap();
    }

    #[test]
    fn new_records_start_empty() {
        let config = EntityKind::Users.config();
        let values = initial_values(&config.fields, None);
        assert_eq!(values["email"], FormValue::from(""));
        assert_eq!(values["isAdmin"], FormValue::Bool(false));
    }

    #[test]
    fn edit_values_are_coerced() {
        let config = EntityKind::ChildUsers.config();
        let record = Record::from_value(json!({
            "id": "c1",
            "birthdate": "2018-05-04T00:00:00.000Z",
            "xp": 120,
            "avatarUrl": null
        }))
        .unwrap();
        let values = initial_values(&config.fields, Some(&record));
        assert_eq!(values["birthdate"], FormValue::from("2018-05-04"));
        assert_eq!(values["xp"], FormValue::from("120"));
        assert_eq!(values["avatarUrl"], FormValue::from(""));
        assert_eq!(values["firstName"], FormValue::from(""));
    }

    #[test]
    fn unparseable_dates_are_kept() {
        assert_eq!(normalize_date("someday"), "someday");
        assert_eq!(normalize_date("2020-02-29"), "2020-02-29");
    }

    #[test]
    fn zoneless_birthdates_pass_validation() {
        assert_eq!(normalize_date("2018-05-04T00:00:00"), "2018-05-04");
        assert_eq!(normalize_date("2018-05-04 00:00:00"), "2018-05-04");

        let config = EntityKind::ChildUsers.config();
        let record = Record::from_value(json!({
            "id": "c1",
            "parent": "p",
            "firstName": "Tom",
            "username": "tommy",
            "birthdate": "2018-05-04T00:00:00"
        }))
        .unwrap();
        let mut form = EntityForm::new(&config, Some(&record)).unwrap();
        assert_eq!(form.value("birthdate"), Some(&FormValue::from("2018-05-04")));
        assert!(form.validate().is_ok());
    }

    #[test]
    fn titles_follow_the_mode() {
        let config = EntityKind::LetterExercises.config();
        let create = EntityForm::new(&config, None).unwrap();
        assert_eq!(create.title(), "Create Letter Exercise");
        assert_eq!(create.aria_label(), "create letter exercise form");

        let record = Record::from_value(json!({ "id": "l1", "title": "A" })).unwrap();
        let edit = EntityForm::new(&config, Some(&record)).unwrap();
        assert_eq!(edit.title(), "Update Letter Exercise");
        assert_eq!(edit.mode(), &FormMode::Edit { key: "l1".to_string() });
    }

    #[test]
    fn readonly_fields_cannot_be_set() {
        let config = EntityKind::ChildUsers.config();
        let mut form = EntityForm::new(&config, None).unwrap();
        assert!(matches!(form.set("xp", "5"), Err(Error::Validation { .. })));
        assert!(matches!(form.set("nope", "5"), Err(Error::NotFound(_))));
    }

    #[test]
    fn payload_rules() {
        let config = EntityKind::Users.config();
        let record = Record::from_value(json!({
            "id": "u1",
            "email": "a@b.com",
            "firstName": "Ada",
            "lastName": "Lovelace",
            "googleId": "g-1",
            "isAdmin": true
        }))
        .unwrap();
        let form = EntityForm::new(&config, Some(&record)).unwrap();
        let payload = form.payload();

        assert_eq!(payload["email"], json!("a@b.com"));
        assert_eq!(payload["isAdmin"], json!(true));
        assert_eq!(payload["emailVerified"], json!(false));
        assert!(!payload.contains_key("password"));
        assert!(!payload.contains_key("googleId"));
        assert!(!payload.contains_key("id"));
    }

    #[test]
    fn cleared_fields_are_sent_empty_on_edit() {
        let config = EntityKind::ChildUsers.config();
        let record = Record::from_value(json!({
            "id": "c1",
            "parent": "p",
            "firstName": "Tom",
            "username": "tommy",
            "birthdate": "2018-05-04",
            "avatarUrl": "http://x/a.png"
        }))
        .unwrap();
        let mut form = EntityForm::new(&config, Some(&record)).unwrap();
        assert!(!form.payload().is_empty());

        form.set("avatarUrl", "").unwrap();
        let payload = form.payload();
        assert_eq!(payload["avatarUrl"], json!(""));
        assert_eq!(payload["firstName"], json!("Tom"));

        let mut create = EntityForm::new(&config, None).unwrap();
        create.set("avatarUrl", "").unwrap();
        assert!(!create.payload().contains_key("avatarUrl"));
    }

    #[test]
    fn empty_passwords_keep_the_current_one() {
        let config = EntityKind::Users.config();
        let record = Record::from_value(json!({ "id": "u1", "email": "a@b.com", "password": "hash" })).unwrap();
        let mut form = EntityForm::new(&config, Some(&record)).unwrap();
        form.set("password", "").unwrap();
        assert!(!form.payload().contains_key("password"));
    }

    #[test]
    fn set_input_parses_checkboxes() {
        let config = EntityKind::Users.config();
        let mut form = EntityForm::new(&config, None).unwrap();
        form.set_input("isAdmin", "yes").unwrap();
        assert_eq!(form.value("isAdmin"), Some(&FormValue::Bool(true)));
        assert!(form.set_input("isAdmin", "maybe").is_err());
        assert!(form.set("isAdmin", "true").is_err());
    }

    #[tokio::test]
    async fn invalid_forms_never_reach_the_handler() {
        let config = EntityKind::LetterExercises.config();
        let mut form = EntityForm::new(&config, None).unwrap();
        let handler = Recorder::default();

        let outcome = form.submit(&handler).await;
        assert_eq!(
            outcome,
            SubmitOutcome::Invalid {
                field: "title".to_string(),
                message: "Title is required".to_string()
            }
        );
        assert!(handler.calls.lock().unwrap().is_empty());
        assert_eq!(form.error("description"), Some("Description is required"));

        let widgets = form.widgets();
        let title = widgets.iter().find(|w| w.id == "title").unwrap();
        assert!(title.aria_invalid);
    }

    #[tokio::test]
    async fn errors_clear_as_fields_are_fixed() {
        let config = EntityKind::LetterExercises.config();
        let mut form = EntityForm::new(&config, None).unwrap();
        assert!(form.validate().is_err());

        form.set("title", "Vo").unwrap();
        assert_eq!(form.error("title"), Some("Must be at least 3 characters"));
        form.set("title", "Vowels").unwrap();
        assert_eq!(form.error("title"), None);
        assert_eq!(form.first_error(), Some(("description", "Description is required")));
    }

    #[tokio::test]
    async fn handler_failures_keep_the_form_open() {
        let config = EntityKind::LetterExercises.config();
        let mut form = EntityForm::new(&config, None).unwrap();
        fill_letter_exercise(&mut form);
        let handler = Recorder {
            fail_with: Some("Title already taken".to_string()),
            ..Recorder::default()
        };

        let outcome = form.submit(&handler).await;
        assert_eq!(
            outcome,
            SubmitOutcome::Failed {
                message: "Title already taken".to_string()
            }
        );
        assert_eq!(form.form_error(), Some("Title already taken"));
        assert!(!form.is_submitting());
    }

    #[tokio::test]
    async fn successful_submit_sends_the_payload() {
        let config = EntityKind::LetterExercises.config();
        let mut form = EntityForm::new(&config, None).unwrap();
        fill_letter_exercise(&mut form);
        let handler = Recorder::default();

        assert_eq!(form.submit(&handler).await, SubmitOutcome::Submitted);

        let calls = handler.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        let (mode, payload) = &calls[0];
        assert_eq!(mode, &FormMode::Create);
        assert_eq!(payload["difficulty"], json!("easy"));
        assert!(!payload.contains_key("user"));
    }

    #[test]
    fn second_submit_is_rejected_while_in_flight() {
        let config = EntityKind::LetterExercises.config();
        let mut form = EntityForm::new(&config, None).unwrap();
        fill_letter_exercise(&mut form);

        assert!(form.begin_submit().is_ok());
        assert!(form.is_submitting());
        assert_eq!(form.submit_label(), "Creating...");
        assert_eq!(form.begin_submit(), Err(SubmitOutcome::Busy));

        assert_eq!(form.finish_submit(Ok(())), SubmitOutcome::Submitted);
        assert_eq!(form.submit_label(), "Create Letter Exercise");
    }
}
