//! The record types managed by the back-office

mod child_users;
mod exercises;
mod users;

use serde::Serialize;
use std::fmt;

use crate::entity::EntityConfig;

pub use child_users::child_user_config;
pub use exercises::{animal_exercise_config, color_exercise_config, letter_exercise_config, number_exercise_config};
pub use users::user_config;

/// Identifies one of the managed record types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntityKind {
    Users,
    ChildUsers,
    LetterExercises,
    AnimalExercises,
    NumberExercises,
    ColorExercises,
}

impl EntityKind {
    pub const ALL: [EntityKind; 6] = [
        EntityKind::Users,
        EntityKind::ChildUsers,
        EntityKind::LetterExercises,
        EntityKind::AnimalExercises,
        EntityKind::NumberExercises,
        EntityKind::ColorExercises,
    ];

    /// URL segment under `/entities/`
    pub fn slug(&self) -> &'static str {
        match self {
            EntityKind::Users => "users",
            EntityKind::ChildUsers => "child-users",
            EntityKind::LetterExercises => "letter-exercises",
            EntityKind::AnimalExercises => "animal-exercises",
            EntityKind::NumberExercises => "number-exercises",
            EntityKind::ColorExercises => "color-exercises",
        }
    }

    pub fn from_slug(slug: &str) -> Option<EntityKind> {
        EntityKind::ALL.into_iter().find(|kind| kind.slug() == slug)
    }

    /// Build the configuration of this record type
    pub fn config(&self) -> EntityConfig {
        match self {
            EntityKind::Users => user_config(),
            EntityKind::ChildUsers => child_user_config(),
            EntityKind::LetterExercises => letter_exercise_config(),
            EntityKind::AnimalExercises => animal_exercise_config(),
            EntityKind::NumberExercises => number_exercise_config(),
            EntityKind::ColorExercises => color_exercise_config(),
        }
    }

    /// Group name of exercise kinds in the `GET /exercises` listing
    pub fn exercise_group(&self) -> Option<&'static str> {
        match self {
            EntityKind::LetterExercises => Some("letter"),
            EntityKind::AnimalExercises => Some("animal"),
            EntityKind::NumberExercises => Some("number"),
            EntityKind::ColorExercises => Some("color"),
            EntityKind::Users | EntityKind::ChildUsers => None,
        }
    }

    /// Whether only administrators may manage this kind
    pub fn admin_only(&self) -> bool {
        matches!(self, EntityKind::Users)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::ListSource;

    #[test]
    fn slugs_round_trip() {
        for kind in EntityKind::ALL {
            assert_eq!(EntityKind::from_slug(kind.slug()), Some(kind));
        }
        assert_eq!(EntityKind::from_slug("teachers"), None);
    }

    #[test]
    fn every_config_is_valid() {
        for kind in EntityKind::ALL {
            let config = kind.config();
            config.validate().unwrap_or_else(|e| panic!("{}: {}", kind, e));
        }
    }

    #[test]
    fn exercises_read_from_the_grouped_listing() {
        for kind in EntityKind::ALL {
            let config = kind.config();
            match kind.exercise_group() {
                Some(group) => {
                    assert_eq!(
                        config.list_source,
                        ListSource::Grouped {
                            path: "exercises".to_string(),
                            group: group.to_string()
                        }
                    );
                    assert_eq!(config.api_endpoint, format!("exercises/{}", group));
                }
                None => assert_eq!(config.list_source, ListSource::Endpoint),
            }
        }
    }
}
