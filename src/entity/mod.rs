//! Entity configurations
//!
//! An [`EntityConfig`] declares everything the back-office needs to manage one
//! record type: its editable fields, the columns of its table and detail views,
//! where it lives in the API and which actions are offered.

mod record;

use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::auth::Identity;
use crate::error::Error;
use crate::render::CellRenderer;
use crate::schema::{FieldSchema, FieldType};

pub use record::*;

/// Decides per row whether the delete action is offered
pub type DeletePredicate = Arc<dyn Fn(&Record, Option<&Identity>) -> bool + Send + Sync>;

/// Delete action setting
#[derive(Clone, Default)]
pub enum DeleteAction {
    Disabled,
    #[default]
    Enabled,
    /// Enabled for rows where the predicate holds
    Conditional(DeletePredicate),
}

impl DeleteAction {
    /// Build a conditional delete action from a closure
    pub fn when<F>(predicate: F) -> Self
    where
        F: Fn(&Record, Option<&Identity>) -> bool + Send + Sync + 'static,
    {
        DeleteAction::Conditional(Arc::new(predicate))
    }

    /// Whether `record` may be deleted by `identity`
    pub fn allows(&self, record: &Record, identity: Option<&Identity>) -> bool {
        match self {
            DeleteAction::Disabled => false,
            DeleteAction::Enabled => true,
            DeleteAction::Conditional(predicate) => predicate(record, identity),
        }
    }
}

impl fmt::Debug for DeleteAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeleteAction::Disabled => f.write_str("Disabled"),
            DeleteAction::Enabled => f.write_str("Enabled"),
            DeleteAction::Conditional(_) => f.write_str("Conditional(..)"),
        }
    }
}

/// Which actions an entity page offers
#[derive(Debug, Clone)]
pub struct Actions {
    pub create: bool,
    pub edit: bool,
    pub delete: DeleteAction,
    pub view: bool,
}

impl Default for Actions {
    fn default() -> Self {
        Self {
            create: true,
            edit: true,
            delete: DeleteAction::Enabled,
            view: true,
        }
    }
}

/// Where the list of records is read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListSource {
    /// `GET /{api_endpoint}` returns the array directly
    Endpoint,
    /// `GET /{path}` returns `{ <path>: { <group>: [...] } }`
    Grouped { path: String, group: String },
}

/// One column of the table or detail view
#[derive(Clone)]
pub struct Column {
    pub key: String,
    pub label: String,
    pub renderer: Option<Arc<dyn CellRenderer>>,
}

impl Column {
    pub fn new(key: &str, label: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            renderer: None,
        }
    }

    /// Render this column's cells with `renderer` instead of the default chain
    pub fn with_renderer<R: CellRenderer + 'static>(mut self, renderer: R) -> Self {
        self.renderer = Some(Arc::new(renderer));
        self
    }
}

impl fmt::Debug for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("key", &self.key)
            .field("label", &self.label)
            .field("custom_renderer", &self.renderer.is_some())
            .finish()
    }
}

/// Declarative description of a record type
#[derive(Debug, Clone)]
pub struct EntityConfig {
    pub name: String,
    pub name_plural: String,
    /// Path of the resource, without a leading slash (`users`, `exercises/letter`)
    pub api_endpoint: String,
    pub display_name: String,
    pub display_name_plural: String,
    pub primary_key: String,
    pub fields: Vec<FieldSchema>,
    pub table_columns: Vec<Column>,
    pub detail_fields: Option<Vec<Column>>,
    pub actions: Actions,
    pub list_source: ListSource,
    /// Endpoint receiving creates whose payload sets `isAdmin`
    pub admin_create_endpoint: Option<String>,
}

impl EntityConfig {
    pub fn new(
        name: &str,
        name_plural: &str,
        api_endpoint: &str,
        display_name: &str,
        display_name_plural: &str,
    ) -> Self {
        Self {
            name: name.to_string(),
            name_plural: name_plural.to_string(),
            api_endpoint: api_endpoint.trim_matches('/').to_string(),
            display_name: display_name.to_string(),
            display_name_plural: display_name_plural.to_string(),
            primary_key: "id".to_string(),
            fields: Vec::new(),
            table_columns: Vec::new(),
            detail_fields: None,
            actions: Actions::default(),
            list_source: ListSource::Endpoint,
            admin_create_endpoint: None,
        }
    }

    pub fn with_primary_key(mut self, key: &str) -> Self {
        self.primary_key = key.to_string();
        self
    }

    pub fn with_fields(mut self, fields: Vec<FieldSchema>) -> Self {
        self.fields = fields;
        self
    }

    pub fn with_columns(mut self, columns: Vec<Column>) -> Self {
        self.table_columns = columns;
        self
    }

    pub fn with_detail_fields(mut self, columns: Vec<Column>) -> Self {
        self.detail_fields = Some(columns);
        self
    }

    pub fn with_actions(mut self, actions: Actions) -> Self {
        self.actions = actions;
        self
    }

    /// Read records from the `group` entry of the grouped `path` listing
    pub fn grouped_under(mut self, path: &str, group: &str) -> Self {
        self.list_source = ListSource::Grouped {
            path: path.trim_matches('/').to_string(),
            group: group.to_string(),
        };
        self
    }

    pub fn with_admin_create_endpoint(mut self, endpoint: &str) -> Self {
        self.admin_create_endpoint = Some(endpoint.trim_matches('/').to_string());
        self
    }

    /// Check the configuration's invariants
    pub fn validate(&self) -> Result<(), Error> {
        if self.primary_key.is_empty() {
            return Err(Error::config(format!("{}: primary key is empty", self.name)));
        }

        let mut seen = HashSet::new();
        for field in &self.fields {
            if !seen.insert(field.key.as_str()) {
                return Err(Error::config(format!(
                    "{}: duplicate field key '{}'",
                    self.name, field.key
                )));
            }

            let is_select = field.field_type == FieldType::Select;
            match (is_select, field.options.as_ref()) {
                (true, None) => {
                    return Err(Error::config(format!(
                        "{}: select field '{}' has no options",
                        self.name, field.key
                    )))
                }
                (false, Some(_)) => {
                    return Err(Error::config(format!(
                        "{}: field '{}' has options but is not a select",
                        self.name, field.key
                    )))
                }
                _ => {}
            }

            if let Some(pattern) = &field.validation.pattern {
                regex::Regex::new(pattern).map_err(|e| {
                    Error::config(format!("{}: field '{}' pattern: {}", self.name, field.key, e))
                })?;
            }
        }

        if self.table_columns.is_empty() {
            return Err(Error::config(format!("{}: no table columns", self.name)));
        }

        Ok(())
    }

    /// The field schema for `key`
    pub fn field(&self, key: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|field| field.key == key)
    }

    /// Columns of the detail view
    pub fn detail_columns(&self) -> &[Column] {
        self.detail_fields.as_deref().unwrap_or(&self.table_columns)
    }

    /// Key of the cached record list
    pub fn cache_key(&self) -> &str {
        &self.api_endpoint
    }

    /// Cache keys to invalidate after a successful write
    pub fn invalidation_keys(&self) -> Vec<String> {
        let mut keys = vec![self.api_endpoint.clone()];
        if let ListSource::Grouped { path, .. } = &self.list_source {
            keys.push(path.clone());
        }
        keys
    }

    /// Path read to list the records
    pub fn list_path(&self) -> String {
        match &self.list_source {
            ListSource::Endpoint => format!("/{}", self.api_endpoint),
            ListSource::Grouped { path, .. } => format!("/{}", path),
        }
    }

    /// Path of a single record
    pub fn item_path(&self, id: &str) -> String {
        format!("/{}/{}", self.api_endpoint, id)
    }

    /// Path a create payload is posted to
    pub fn create_path(&self, payload: &serde_json::Map<String, Value>) -> String {
        let wants_admin = payload.get("isAdmin").and_then(Value::as_bool).unwrap_or(false);
        match &self.admin_create_endpoint {
            Some(endpoint) if wants_admin => format!("/{}", endpoint),
            _ => format!("/{}", self.api_endpoint),
        }
    }

    /// Pull this entity's records out of the list response payload
    pub fn extract_records(&self, data: Value) -> Vec<Record> {
        match &self.list_source {
            ListSource::Endpoint => records_from_value(data),
            ListSource::Grouped { path, group } => match data {
                Value::Object(mut map) => map
                    .remove(path)
                    .and_then(|grouped| match grouped {
                        Value::Object(mut groups) => groups.remove(group),
                        _ => None,
                    })
                    .map(records_from_value)
                    .unwrap_or_default(),
                _ => Vec::new(),
            },
        }
    }

    /// Primary key value of `record`
    pub fn record_key(&self, record: &Record) -> Option<String> {
        record.get_str(&self.primary_key)
    }

    /// Whether the row for `record` offers a delete action
    pub fn can_delete(&self, record: &Record, identity: Option<&Identity>) -> bool {
        self.actions.delete.allows(record, identity)
    }
}
