//! Dashboard: entity cards and admin statistics

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use serde_json::Value;

use crate::api::ApiClient;
use crate::auth::{AuthProvider, Identity};
use crate::entities::EntityKind;
use crate::entity::{records_from_value, Record};
use crate::error::Error;
use crate::query::QueryCache;
use crate::render::DateValue;
use crate::routes::Route;

/// One slice of a distribution chart
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Slice {
    pub name: String,
    pub value: usize,
    pub color: &'static str,
}

impl Slice {
    fn new(name: &str, value: usize, color: &'static str) -> Self {
        Self {
            name: name.to_string(),
            value,
            color,
        }
    }
}

/// Statistics shown to administrators
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_users: usize,
    pub total_child_users: usize,
    pub total_exercises: usize,
    /// Exercises per kind; empty kinds are left out
    pub exercise_distribution: Vec<Slice>,
    /// Children per age group; empty groups are left out
    pub age_distribution: Vec<Slice>,
}

/// Link to an entity screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityCard {
    pub title: &'static str,
    pub description: &'static str,
    pub path: String,
    pub icon: &'static str,
    pub admin_only: bool,
}

const EXERCISE_GROUPS: [(&str, &str, &str); 4] = [
    ("letter", "Letter Exercises", "#475569"),
    ("animal", "Animal Exercises", "#0F766E"),
    ("number", "Number Exercises", "#1D4ED8"),
    ("color", "Color Exercises", "#7C3AED"),
];

const AGE_GROUPS: [(&str, i32, &str); 4] = [
    ("0-3 years", 3, "#334155"),
    ("4-6 years", 6, "#0369A1"),
    ("7-9 years", 9, "#059669"),
    ("10+ years", i32::MAX, "#9333EA"),
];

fn card(kind: EntityKind) -> EntityCard {
    let (title, description, icon) = match kind {
        EntityKind::Users => ("Users", "Manage user accounts and permissions", "👥"),
        EntityKind::ChildUsers => ("Child Users", "Manage child user profiles", "👶"),
        EntityKind::LetterExercises => ("Letter Exercises", "Manage letter learning exercises", "🔤"),
        EntityKind::AnimalExercises => ("Animal Exercises", "Manage animal learning exercises", "🐾"),
        EntityKind::NumberExercises => ("Number Exercises", "Manage number learning exercises", "🔢"),
        EntityKind::ColorExercises => ("Color Exercises", "Manage color learning exercises", "🎨"),
    };
    EntityCard {
        title,
        description,
        path: Route::Entity(kind).path(),
        icon,
        admin_only: kind.admin_only(),
    }
}

/// Cards visible to `identity`; admin-only cards need an admin
pub fn entity_cards(identity: Option<&Identity>) -> Vec<EntityCard> {
    let is_admin = identity.map(|identity| identity.is_admin).unwrap_or(false);
    EntityKind::ALL
        .into_iter()
        .map(card)
        .filter(|card| !card.admin_only || is_admin)
        .collect()
}

/// Count the exercises of each kind in a `GET /exercises` payload
pub fn exercise_distribution(data: &Value) -> Vec<Slice> {
    EXERCISE_GROUPS
        .iter()
        .map(|&(group, name, color)| {
            let count = data
                .get("exercises")
                .and_then(|exercises| exercises.get(group))
                .and_then(Value::as_array)
                .map(Vec::len)
                .unwrap_or(0);
            Slice::new(name, count, color)
        })
        .filter(|slice| slice.value > 0)
        .collect()
}

/// Whole years between `birthdate` and `today`
pub fn age_on(birthdate: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - birthdate.year();
    if (today.month(), today.day()) < (birthdate.month(), birthdate.day()) {
        age -= 1;
    }
    age
}

/// Group children by age on `today`; children without a readable birthdate
/// are not counted
pub fn age_distribution(children: &[Record], today: NaiveDate) -> Vec<Slice> {
    let mut counts = [0usize; AGE_GROUPS.len()];
    for child in children {
        let Some(birthdate) = child.get_str("birthdate").and_then(|s| DateValue::parse(&s)) else {
            continue;
        };
        let age = age_on(birthdate.day(), today);
        if let Some(index) = AGE_GROUPS.iter().position(|&(_, upper, _)| age <= upper) {
            counts[index] += 1;
        }
    }

    AGE_GROUPS
        .iter()
        .zip(counts)
        .filter(|(_, count)| *count > 0)
        .map(|(&(name, _, color), count)| Slice::new(name, count, color))
        .collect()
}

/// Dashboard data source
#[derive(Debug, Clone)]
pub struct Dashboard {
    api: ApiClient,
    auth: AuthProvider,
    cache: QueryCache,
}

impl Dashboard {
    pub fn new(api: ApiClient, auth: AuthProvider, cache: QueryCache) -> Self {
        Self { api, auth, cache }
    }

    /// Greeting line, preferring the user's first name
    pub fn greeting(&self) -> String {
        let name = self
            .auth
            .user()
            .and_then(|user| user.first_name.clone().filter(|name| !name.is_empty()).or(Some(user.email)))
            .unwrap_or_default();
        format!("Welcome back, {}! Manage your Lexo platform entities.", name)
    }

    pub fn cards(&self) -> Vec<EntityCard> {
        entity_cards(self.auth.identity().as_ref())
    }

    async fn list(&self, key: &str) -> Result<Value, Error> {
        let path = format!("/{}", key);
        self.cache
            .fetch(key, || async {
                let response = self.api.get::<Value>(&path).await?;
                Ok::<_, Error>(response.into_data().unwrap_or(Value::Null))
            })
            .await
    }

    /// Statistics as of `today`; `None` unless the identity is an admin
    pub async fn stats(&self, today: NaiveDate) -> Result<Option<DashboardStats>, Error> {
        if !self.auth.is_admin() {
            return Ok(None);
        }

        let (users, children, exercises) =
            tokio::try_join!(self.list("users"), self.list("child-users"), self.list("exercises"))?;

        let count = |value: &Value| value.as_array().map(Vec::len).unwrap_or(0);
        let children = records_from_value(children);
        let exercise_distribution = exercise_distribution(&exercises);

        Ok(Some(DashboardStats {
            total_users: count(&users),
            total_child_users: children.len(),
            total_exercises: exercise_distribution.iter().map(|slice| slice.value).sum(),
            exercise_distribution,
            age_distribution: age_distribution(&children, today),
        }))
    }
}
