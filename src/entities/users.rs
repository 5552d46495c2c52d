use crate::entity::{Actions, Column, DeleteAction, EntityConfig};
use crate::render::{BoolBadge, DateStyle, LocalDate, OrNotAvailable, ShortId, Tone};
use crate::schema::FieldSchema;

const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$";

fn verified_badge() -> BoolBadge {
    BoolBadge::new("Verified", Tone::Success, "Not Verified", Tone::Danger)
}

fn role_badge() -> BoolBadge {
    BoolBadge::new("Admin", Tone::Warning, "User", Tone::Info)
}

/// Parent accounts
pub fn user_config() -> EntityConfig {
    EntityConfig::new("user", "users", "users", "User", "Users")
        .with_fields(vec![
            FieldSchema::email("email", "Email")
                .required()
                .placeholder("user@example.com")
                .pattern(EMAIL_PATTERN),
            FieldSchema::text("firstName", "First Name")
                .required()
                .placeholder("John")
                .min(2)
                .max(50),
            FieldSchema::text("lastName", "Last Name")
                .required()
                .placeholder("Doe")
                .min(2)
                .max(50),
            FieldSchema::password("password", "Password")
                .placeholder("Password (leave empty to keep current)")
                .min(6),
            FieldSchema::text("googleId", "Google ID")
                .placeholder("Google account ID")
                .readonly(),
            FieldSchema::boolean("isAdmin", "Admin User"),
            FieldSchema::password("adminCreationKey", "Admin Creation Key").placeholder("Required for admin users"),
            FieldSchema::text("username", "Username").placeholder("username").min(3).max(50),
            FieldSchema::date("birthdate", "Birth Date"),
            FieldSchema::boolean("emailVerified", "Email Verified"),
            FieldSchema::text("id", "User ID").readonly().placeholder("Auto-generated"),
            FieldSchema::text("createdAt", "Created At").readonly(),
            FieldSchema::text("updatedAt", "Updated At").readonly(),
        ])
        .with_columns(vec![
            Column::new("id", "ID").with_renderer(ShortId { len: 8 }),
            Column::new("googleId", "Google ID").with_renderer(OrNotAvailable),
            Column::new("email", "Email"),
            Column::new("username", "Username"),
            Column::new("emailVerified", "Status").with_renderer(verified_badge()),
            Column::new("isAdmin", "Role").with_renderer(role_badge()),
        ])
        .with_detail_fields(vec![
            Column::new("id", "ID"),
            Column::new("googleId", "Google ID").with_renderer(OrNotAvailable),
            Column::new("email", "Email"),
            Column::new("username", "Username"),
            Column::new("birthdate", "Birthdate").with_renderer(LocalDate(DateStyle::Date)),
            Column::new("emailVerified", "Email Verification").with_renderer(verified_badge()),
            Column::new("isAdmin", "Role").with_renderer(role_badge()),
            Column::new("createdAt", "Created At").with_renderer(LocalDate(DateStyle::DateTime)),
            Column::new("updatedAt", "Updated At").with_renderer(LocalDate(DateStyle::DateTime)),
        ])
        .with_actions(Actions {
            // Admins only, and never their own account
            delete: DeleteAction::when(|record, identity| match identity {
                Some(identity) => identity.is_admin && record.id().as_deref() != Some(identity.id.as_str()),
                None => false,
            }),
            ..Actions::default()
        })
        .with_admin_create_endpoint("users/admin")
}
