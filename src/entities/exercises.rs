//! Exercise configurations
//!
//! All four exercise kinds share one shape. They are listed through the grouped
//! `GET /exercises` response and written through `exercises/<kind>`.

use crate::entity::{Column, EntityConfig};
use crate::images::ImageCategory;
use crate::schema::{FieldSchema, SelectOption};

const NUMERIC: &str = "^[0-9]+$";

fn difficulty() -> FieldSchema {
    FieldSchema::select(
        "difficulty",
        "Difficulty",
        vec![
            SelectOption::new("easy", "Easy"),
            SelectOption::new("medium", "Medium"),
            SelectOption::new("hard", "Hard"),
        ],
    )
    .required()
}

fn exercise_fields(thumbnails: ImageCategory) -> Vec<FieldSchema> {
    vec![
        FieldSchema::text("user", "User ID")
            .placeholder("User ID (optional)")
            .readonly(),
        FieldSchema::text("title", "Title")
            .required()
            .placeholder("Exercise title")
            .min(3)
            .max(100),
        FieldSchema::textarea("description", "Description")
            .required()
            .placeholder("Exercise description")
            .min(10)
            .max(500),
        FieldSchema::text("durationMinutes", "Duration (minutes)")
            .required()
            .placeholder("10")
            .pattern(NUMERIC),
        FieldSchema::text("mainColor", "Main Color").required().placeholder("#FF5733"),
        FieldSchema::image("thumbnailUrl", "Thumbnail URL", thumbnails)
            .required()
            .placeholder("https://example.com/image.jpg"),
        FieldSchema::text("xp", "XP Points").required().placeholder("100").pattern(NUMERIC),
        difficulty(),
    ]
}

fn bookkeeping_fields() -> Vec<FieldSchema> {
    vec![
        FieldSchema::text("id", "Exercise ID").readonly().placeholder("Auto-generated"),
        FieldSchema::text("createdAt", "Created At").readonly(),
        FieldSchema::text("updatedAt", "Updated At").readonly(),
    ]
}

fn exercise_config(group: &str, display: &str, thumbnails: ImageCategory, extra: Vec<FieldSchema>) -> EntityConfig {
    let mut fields = exercise_fields(thumbnails);
    let extra_columns: Vec<Column> = extra
        .iter()
        .map(|field| Column::new(&field.key, "Type"))
        .collect();
    fields.extend(extra);
    fields.extend(bookkeeping_fields());

    let mut columns = vec![
        Column::new("title", "Title"),
        Column::new("description", "Description"),
        Column::new("durationMinutes", "Duration"),
        Column::new("difficulty", "Difficulty"),
    ];
    columns.extend(extra_columns);
    columns.push(Column::new("xp", "XP"));

    EntityConfig::new(
        &format!("{}Exercise", group),
        &format!("{}Exercises", group),
        &format!("exercises/{}", group),
        &format!("{} Exercise", display),
        &format!("{} Exercises", display),
    )
    .with_fields(fields)
    .with_columns(columns)
    .grouped_under("exercises", group)
}

pub fn letter_exercise_config() -> EntityConfig {
    exercise_config("letter", "Letter", ImageCategory::Letters, Vec::new())
}

pub fn animal_exercise_config() -> EntityConfig {
    exercise_config("animal", "Animal", ImageCategory::Animals, Vec::new())
}

/// Number exercises also pick between regular and hand-drawn digits
pub fn number_exercise_config() -> EntityConfig {
    let image_type = FieldSchema::select(
        "imageType",
        "Image Type",
        vec![SelectOption::new("regular", "Regular"), SelectOption::new("hand", "Hand")],
    )
    .required();
    exercise_config("number", "Number", ImageCategory::Numbers, vec![image_type])
}

pub fn color_exercise_config() -> EntityConfig {
    exercise_config("color", "Color", ImageCategory::Fruits, Vec::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_exercises_have_an_image_type() {
        let config = number_exercise_config();
        let keys: Vec<&str> = config.table_columns.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, vec!["title", "description", "durationMinutes", "difficulty", "imageType", "xp"]);
        assert_eq!(config.field("imageType").map(|f| f.select_options().len()), Some(2));
        assert!(letter_exercise_config().field("imageType").is_none());
    }

    #[test]
    fn thumbnails_pick_from_the_matching_category() {
        let thumbnail = |config: EntityConfig| config.field("thumbnailUrl").and_then(|f| f.image_category());
        assert_eq!(thumbnail(letter_exercise_config()), Some(ImageCategory::Letters));
        assert_eq!(thumbnail(animal_exercise_config()), Some(ImageCategory::Animals));
        assert_eq!(thumbnail(color_exercise_config()), Some(ImageCategory::Fruits));
    }

    #[test]
    fn names_follow_the_group() {
        let config = color_exercise_config();
        assert_eq!(config.name, "colorExercise");
        assert_eq!(config.display_name_plural, "Color Exercises");
        assert_eq!(config.item_path("c1"), "/exercises/color/c1");
    }
}
