//! Table and detail view models for entity records
//!
//! Every cell goes through a [`CellRenderer`]. Columns may supply their own;
//! the rest fall back to [`default_display`]: dates become date strings,
//! booleans `Yes`/`No`, missing values `N/A`, and everything else its string
//! form.

mod renderers;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::Serialize;
use serde_json::Value;
use std::fmt;

use crate::auth::Identity;
use crate::entity::{Column, EntityConfig, Record};
use crate::schema::FieldType;

pub use renderers::*;

/// Placeholder for absent values
pub const NOT_AVAILABLE: &str = "N/A";

/// Color hint for badges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Success,
    Danger,
    Warning,
    Info,
}

/// What a cell shows
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DisplayValue {
    Text { text: String },
    /// Monospaced text such as identifiers
    Mono { text: String },
    Badge { text: String, tone: Tone },
}

impl DisplayValue {
    pub fn text<T: Into<String>>(text: T) -> Self {
        DisplayValue::Text { text: text.into() }
    }

    pub fn mono<T: Into<String>>(text: T) -> Self {
        DisplayValue::Mono { text: text.into() }
    }

    pub fn badge<T: Into<String>>(text: T, tone: Tone) -> Self {
        DisplayValue::Badge {
            text: text.into(),
            tone,
        }
    }

    pub fn not_available() -> Self {
        Self::text(NOT_AVAILABLE)
    }

    /// The plain text of the value
    pub fn as_str(&self) -> &str {
        match self {
            DisplayValue::Text { text } | DisplayValue::Mono { text } | DisplayValue::Badge { text, .. } => {
                text
            }
        }
    }
}

impl fmt::Display for DisplayValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Turns a cell value into what is displayed
pub trait CellRenderer: Send + Sync {
    fn render(&self, value: Option<&Value>, record: &Record) -> DisplayValue;
}

impl<F> CellRenderer for F
where
    F: Fn(Option<&Value>, &Record) -> DisplayValue + Send + Sync,
{
    fn render(&self, value: Option<&Value>, record: &Record) -> DisplayValue {
        self(value, record)
    }
}

/// How date values are spelled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateStyle {
    /// `1/31/2024`
    Date,
    /// `1/31/2024, 2:05:09 PM` for timestamps, date only for plain dates
    DateTime,
}

/// Whether a value should be read as a date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueHint {
    Plain,
    Date,
}

/// A parsed date or timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateValue {
    Day(NaiveDate),
    Timestamp(DateTime<Utc>),
}

impl DateValue {
    /// Parse an RFC 3339 timestamp, a timestamp without zone (read as UTC) or
    /// a `YYYY-MM-DD` date
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
            return Some(DateValue::Timestamp(ts.with_timezone(&Utc)));
        }
        for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
            if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
                return Some(DateValue::Timestamp(Utc.from_utc_datetime(&naive)));
            }
        }
        NaiveDate::parse_from_str(value, "%Y-%m-%d").ok().map(DateValue::Day)
    }

    /// The calendar day
    pub fn day(&self) -> NaiveDate {
        match self {
            DateValue::Day(day) => *day,
            DateValue::Timestamp(ts) => ts.date_naive(),
        }
    }

    pub fn format(&self, style: DateStyle) -> String {
        match (self, style) {
            (DateValue::Timestamp(ts), DateStyle::DateTime) => {
                ts.format("%-m/%-d/%Y, %-I:%M:%S %p").to_string()
            }
            _ => self.day().format("%-m/%-d/%Y").to_string(),
        }
    }
}

/// The default fallback chain for a value without a custom renderer
pub fn default_display(value: Option<&Value>, hint: ValueHint, style: DateStyle) -> DisplayValue {
    match value {
        None | Some(Value::Null) => DisplayValue::not_available(),
        Some(Value::Bool(b)) => DisplayValue::text(if *b { "Yes" } else { "No" }),
        Some(Value::String(s)) if s.is_empty() => DisplayValue::not_available(),
        Some(Value::String(s)) => match hint {
            ValueHint::Date => DateValue::parse(s)
                .map(|date| DisplayValue::text(date.format(style)))
                .unwrap_or_else(|| DisplayValue::text(s.clone())),
            ValueHint::Plain => DisplayValue::text(s.clone()),
        },
        Some(Value::Number(n)) => DisplayValue::text(n.to_string()),
        Some(other) => DisplayValue::text(other.to_string()),
    }
}

/// Whether the column `key` of `config` holds dates
pub fn hint_for(config: &EntityConfig, key: &str) -> ValueHint {
    let declared_date = config
        .field(key)
        .map(|field| field.field_type == FieldType::Date)
        .unwrap_or(false);
    if declared_date || matches!(key, "createdAt" | "updatedAt") {
        ValueHint::Date
    } else {
        ValueHint::Plain
    }
}

/// Render one cell
pub fn render_cell(config: &EntityConfig, column: &Column, record: &Record, style: DateStyle) -> DisplayValue {
    let value = record.get(&column.key);
    match &column.renderer {
        Some(renderer) => renderer.render(value, record),
        None => default_display(value, hint_for(config, &column.key), style),
    }
}

/// Actions offered on one row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RowActions {
    pub view: bool,
    pub edit: bool,
    pub delete: bool,
}

impl RowActions {
    /// Resolve the actions for `record` as seen by `identity`
    pub fn for_record(config: &EntityConfig, record: &Record, identity: Option<&Identity>) -> Self {
        Self {
            view: config.actions.view,
            edit: config.actions.edit,
            delete: config.can_delete(record, identity),
        }
    }
}

/// One table row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    /// Primary key of the record
    pub key: String,
    pub cells: Vec<DisplayValue>,
    pub actions: RowActions,
}

/// View model of an entity list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableView {
    pub title: String,
    pub caption: String,
    pub headers: Vec<String>,
    pub rows: Vec<TableRow>,
    /// Whether the create button is shown
    pub can_create: bool,
    /// Shown instead of the table when there are no rows
    pub empty_message: Option<String>,
}

impl TableView {
    /// Build the table for `records`
    pub fn build(config: &EntityConfig, records: &[Record], identity: Option<&Identity>) -> Self {
        let rows: Vec<TableRow> = records
            .iter()
            .map(|record| TableRow {
                key: config.record_key(record).unwrap_or_default(),
                cells: config
                    .table_columns
                    .iter()
                    .map(|column| render_cell(config, column, record, DateStyle::Date))
                    .collect(),
                actions: RowActions::for_record(config, record, identity),
            })
            .collect();

        let plural = config.display_name_plural.to_lowercase();
        let empty_message = rows.is_empty().then(|| format!("No {} found.", plural));

        Self {
            title: config.display_name_plural.clone(),
            caption: format!("{} {}", rows.len(), plural),
            headers: config.table_columns.iter().map(|c| c.label.clone()).collect(),
            rows,
            can_create: config.actions.create,
            empty_message,
        }
    }

    /// The row for the record with primary key `key`
    pub fn row(&self, key: &str) -> Option<&TableRow> {
        self.rows.iter().find(|row| row.key == key)
    }
}

/// One labelled value of the detail view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailEntry {
    pub label: String,
    pub value: DisplayValue,
}

/// View model of a single record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailView {
    pub title: String,
    pub entries: Vec<DetailEntry>,
}

impl DetailView {
    pub fn build(config: &EntityConfig, record: &Record) -> Self {
        Self {
            title: format!("{} Details", config.display_name),
            entries: config
                .detail_columns()
                .iter()
                .map(|column| DetailEntry {
                    label: column.label.clone(),
                    value: render_cell(config, column, record, DateStyle::DateTime),
                })
                .collect(),
        }
    }

    /// The value shown for `label`
    pub fn value(&self, label: &str) -> Option<&DisplayValue> {
        self.entries.iter().find(|entry| entry.label == label).map(|entry| &entry.value)
    }
}

/// The explicit confirmation step before a delete is issued
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeleteConfirmation {
    /// Primary key of the record to delete
    pub key: String,
    pub title: String,
    pub description: String,
    pub confirm_label: String,
    pub cancel_label: String,
}

impl DeleteConfirmation {
    pub fn new(config: &EntityConfig, key: &str) -> Self {
        Self {
            key: key.to_string(),
            title: "Are you sure?".to_string(),
            description: format!(
                "This action cannot be undone. This will permanently delete the {}.",
                config.display_name.to_lowercase()
            ),
            confirm_label: "Delete".to_string(),
            cancel_label: "Cancel".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldSchema;
    use serde_json::json;

    fn config() -> EntityConfig {
        EntityConfig::new("child", "children", "child-users", "Child", "Children")
            .with_fields(vec![
                FieldSchema::text("firstName", "First Name"),
                FieldSchema::date("birthdate", "Birth Date"),
            ])
            .with_columns(vec![
                Column::new("firstName", "First Name"),
                Column::new("birthdate", "Birth Date"),
                Column::new("active", "Active"),
                Column::new("xp", "XP"),
            ])
    }

    fn record(value: Value) -> Record {
        Record::from_value(value).unwrap()
    }

    #[test]
    fn fallback_chain() {
        assert_eq!(default_display(None, ValueHint::Plain, DateStyle::Date).as_str(), "N/A");
        assert_eq!(default_display(Some(&Value::Null), ValueHint::Plain, DateStyle::Date).as_str(), "N/A");
        assert_eq!(default_display(Some(&json!(true)), ValueHint::Plain, DateStyle::Date).as_str(), "Yes");
        assert_eq!(default_display(Some(&json!(false)), ValueHint::Plain, DateStyle::Date).as_str(), "No");
        assert_eq!(default_display(Some(&json!(12)), ValueHint::Plain, DateStyle::Date).as_str(), "12");
        assert_eq!(
            default_display(Some(&json!("2020-01-31")), ValueHint::Date, DateStyle::Date).as_str(),
            "1/31/2020"
        );
        assert_eq!(
            default_display(Some(&json!("soon")), ValueHint::Date, DateStyle::Date).as_str(),
            "soon"
        );
        assert_eq!(
            default_display(Some(&json!("2020-01-31")), ValueHint::Plain, DateStyle::Date).as_str(),
            "2020-01-31"
        );
    }

    #[test]
    fn detail_timestamps_include_the_time() {
        let value = json!("2024-03-05T14:07:09.000Z");
        assert_eq!(
            default_display(Some(&value), ValueHint::Date, DateStyle::DateTime).as_str(),
            "3/5/2024, 2:07:09 PM"
        );
        assert_eq!(
            default_display(Some(&value), ValueHint::Date, DateStyle::Date).as_str(),
            "3/5/2024"
        );
    }

    #[test]
    fn zoneless_timestamps_parse() {
        let day = NaiveDate::from_ymd_opt(2018, 5, 4).unwrap();
        for value in ["2018-05-04T00:00:00", "2018-05-04 00:00:00", "2018-05-04T13:45:10.250"] {
            assert_eq!(DateValue::parse(value).map(|date| date.day()), Some(day), "{}", value);
        }
        assert_eq!(DateValue::parse("2018-05-04T25:00:00"), None);
    }

    #[test]
    fn table_uses_columns_and_fallbacks() {
        let config = config();
        let records = vec![
            record(json!({ "id": "c1", "firstName": "Ana", "birthdate": "2019-06-01", "active": true, "xp": 10 })),
            record(json!({ "id": "c2", "firstName": "Bo" })),
        ];

        let table = TableView::build(&config, &records, None);
        assert_eq!(table.headers, vec!["First Name", "Birth Date", "Active", "XP"]);
        assert_eq!(table.caption, "2 children");
        assert_eq!(table.empty_message, None);

        let first: Vec<&str> = table.rows[0].cells.iter().map(DisplayValue::as_str).collect();
        assert_eq!(first, vec!["Ana", "6/1/2019", "Yes", "10"]);

        let second: Vec<&str> = table.rows[1].cells.iter().map(DisplayValue::as_str).collect();
        assert_eq!(second, vec!["Bo", "N/A", "N/A", "N/A"]);
        assert_eq!(table.rows[1].key, "c2");
    }

    #[test]
    fn custom_renderer_wins() {
        let config = config().with_columns(vec![Column::new("firstName", "Name").with_renderer(
            |value: Option<&Value>, record: &Record| {
                let name = value.and_then(Value::as_str).unwrap_or("?");
                DisplayValue::text(format!("{} ({})", name, record.id().unwrap_or_default()))
            },
        )]);
        let table = TableView::build(&config, &[record(json!({ "id": "c9", "firstName": "Cy" }))], None);
        assert_eq!(table.rows[0].cells[0].as_str(), "Cy (c9)");
    }

    #[test]
    fn empty_table_has_a_message() {
        let table = TableView::build(&config(), &[], None);
        assert_eq!(table.caption, "0 children");
        assert_eq!(table.empty_message.as_deref(), Some("No children found."));
    }

    #[test]
    fn detail_falls_back_to_table_columns() {
        let config = config();
        let detail = DetailView::build(&config, &record(json!({ "id": "c1", "firstName": "Ana" })));
        assert_eq!(detail.title, "Child Details");
        assert_eq!(detail.entries.len(), 4);
        assert_eq!(detail.value("First Name").map(DisplayValue::as_str), Some("Ana"));
    }
}
