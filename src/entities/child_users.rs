use crate::entity::{Column, EntityConfig};
use crate::images::ImageCategory;
use crate::schema::FieldSchema;

/// Child profiles attached to a parent account
pub fn child_user_config() -> EntityConfig {
    EntityConfig::new("childUser", "childUsers", "child-users", "Child User", "Child Users")
        .with_fields(vec![
            FieldSchema::text("parent", "Parent User ID")
                .required()
                .placeholder("Parent user ID")
                .min(1),
            FieldSchema::text("firstName", "First Name")
                .required()
                .placeholder("Child first name")
                .min(2)
                .max(50),
            FieldSchema::text("username", "Username")
                .required()
                .placeholder("Child username")
                .min(2)
                .max(50),
            FieldSchema::date("birthdate", "Birth Date").required(),
            FieldSchema::image("avatarUrl", "Avatar URL", ImageCategory::Avatars).placeholder("Avatar URL"),
            FieldSchema::text("xp", "Experience Points").placeholder("0").readonly(),
            FieldSchema::text("gems", "Gems").placeholder("0").readonly(),
            FieldSchema::text("id", "Child User ID").readonly().placeholder("Auto-generated"),
            FieldSchema::text("createdAt", "Created At").readonly(),
            FieldSchema::text("updatedAt", "Updated At").readonly(),
        ])
        .with_columns(vec![
            Column::new("firstName", "First Name"),
            Column::new("username", "Username"),
            Column::new("parent", "Parent ID"),
            Column::new("birthdate", "Birth Date"),
            Column::new("xp", "XP"),
            Column::new("gems", "Gems"),
        ])
}
