//! Reusable cell renderers

use serde_json::Value;

use super::{default_display, DateStyle, DateValue, DisplayValue, Tone, ValueHint, CellRenderer};
use crate::entity::Record;

/// First `len` characters of an identifier followed by `...`
#[derive(Debug, Clone, Copy)]
pub struct ShortId {
    pub len: usize,
}

impl CellRenderer for ShortId {
    fn render(&self, value: Option<&Value>, _record: &Record) -> DisplayValue {
        match value.and_then(Value::as_str) {
            Some(id) => DisplayValue::mono(format!("{}...", id.chars().take(self.len).collect::<String>())),
            None => DisplayValue::not_available(),
        }
    }
}

/// Two badges chosen by the truthiness of the value
#[derive(Debug, Clone)]
pub struct BoolBadge {
    pub when_true: (String, Tone),
    pub when_false: (String, Tone),
}

impl BoolBadge {
    pub fn new(when_true: &str, true_tone: Tone, when_false: &str, false_tone: Tone) -> Self {
        Self {
            when_true: (when_true.to_string(), true_tone),
            when_false: (when_false.to_string(), false_tone),
        }
    }
}

impl CellRenderer for BoolBadge {
    fn render(&self, value: Option<&Value>, _record: &Record) -> DisplayValue {
        let (text, tone) = if is_truthy(value) {
            &self.when_true
        } else {
            &self.when_false
        };
        DisplayValue::badge(text.clone(), *tone)
    }
}

/// The value as text, or `N/A` when it is missing or empty
#[derive(Debug, Clone, Copy)]
pub struct OrNotAvailable;

impl CellRenderer for OrNotAvailable {
    fn render(&self, value: Option<&Value>, _record: &Record) -> DisplayValue {
        default_display(value, ValueHint::Plain, DateStyle::Date)
    }
}

/// A date or timestamp in a fixed style, `N/A` when absent
#[derive(Debug, Clone, Copy)]
pub struct LocalDate(pub DateStyle);

impl CellRenderer for LocalDate {
    fn render(&self, value: Option<&Value>, _record: &Record) -> DisplayValue {
        match value.and_then(Value::as_str) {
            Some(s) if !s.is_empty() => DateValue::parse(s)
                .map(|date| DisplayValue::text(date.format(self.0)))
                .unwrap_or_else(|| DisplayValue::text("Invalid Date")),
            _ => DisplayValue::not_available(),
        }
    }
}

/// JavaScript-style truthiness of a JSON value
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn short_id_truncates() {
        let rendered = ShortId { len: 8 }.render(Some(&json!("0123456789abcdef")), &Record::default());
        assert_eq!(rendered, DisplayValue::mono("01234567..."));
    }

    #[test]
    fn bool_badge_follows_truthiness() {
        let badge = BoolBadge::new("Verified", Tone::Success, "Not Verified", Tone::Danger);
        assert_eq!(badge.render(Some(&json!(true)), &Record::default()).as_str(), "Verified");
        assert_eq!(badge.render(None, &Record::default()).as_str(), "Not Verified");
    }

    #[test]
    fn or_not_available_handles_empty_strings() {
        assert_eq!(OrNotAvailable.render(Some(&json!("")), &Record::default()).as_str(), "N/A");
        assert_eq!(OrNotAvailable.render(Some(&json!("g-1")), &Record::default()).as_str(), "g-1");
    }

    #[test]
    fn local_date_flags_garbage() {
        let render = LocalDate(DateStyle::Date);
        assert_eq!(render.render(Some(&json!("nope")), &Record::default()).as_str(), "Invalid Date");
        assert_eq!(render.render(None, &Record::default()).as_str(), "N/A");
    }
}
