use anyhow::{bail, Context};
use chrono::Local;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use entity_admin::auth::FileTokenStore;
use entity_admin::config::ClientOptions;
use entity_admin::entities::EntityKind;
use entity_admin::form::SubmitOutcome;
use entity_admin::page::{EntityPage, Level};
use entity_admin::routes::{Resolution, Route};
use entity_admin::AdminClient;

#[derive(Parser, Debug)]
#[clap(name = "entity-admin", version)]
#[clap(about = "Back-office client for users, child users and exercises", long_about = None)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,

    /// Base URL of the API. Overrides ADMIN_API_URL.
    #[clap(long)]
    api_url: Option<String>,

    /// File the session token is kept in
    #[clap(long, env = "ADMIN_SESSION_FILE", default_value = ".entity-admin-session.json")]
    session_file: PathBuf,

    /// Output debug logs to stderr
    #[clap(long)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Log in and store the session token
    Login {
        email: String,
        #[clap(long, env = "ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// Show the logged-in identity
    Whoami,
    /// List the records of an entity (users, child-users, letter-exercises, ...)
    List { entity: String },
    /// Show one record
    Show { entity: String, id: String },
    /// Create a record from key=value assignments
    Create {
        entity: String,
        #[clap(long = "set", value_parser = parse_assignment)]
        set: Vec<(String, String)>,
    },
    /// Update a record from key=value assignments
    Edit {
        entity: String,
        id: String,
        #[clap(long = "set", value_parser = parse_assignment)]
        set: Vec<(String, String)>,
    },
    /// Delete a record
    Delete {
        entity: String,
        id: String,
        /// Confirm the deletion
        #[clap(long)]
        yes: bool,
    },
    /// Show entity cards and, for admins, statistics
    Dashboard,
    /// Print the form of an entity as JSON
    Form { entity: String, id: Option<String> },
}

fn parse_assignment(value: &str) -> Result<(String, String), String> {
    value
        .split_once('=')
        .map(|(key, value)| (key.trim().to_string(), value.to_string()))
        .ok_or_else(|| format!("expected key=value, got '{}'", value))
}

fn entity_kind(slug: &str) -> anyhow::Result<EntityKind> {
    EntityKind::from_slug(slug).with_context(|| {
        let known: Vec<&str> = EntityKind::ALL.iter().map(|kind| kind.slug()).collect();
        format!("unknown entity '{}', expected one of: {}", slug, known.join(", "))
    })
}

/// Apply the route guard of `kind` before touching its page
fn open_page(admin: &AdminClient, kind: EntityKind) -> anyhow::Result<EntityPage> {
    match admin.open(Route::Entity(kind)) {
        Resolution::Render(_) => Ok(admin.page(kind)),
        Resolution::Redirect { to: Route::Login, .. } => bail!("Not logged in; run `entity-admin login` first"),
        Resolution::Redirect { .. } => bail!("Admin access required for {}", kind),
        Resolution::Loading => bail!("Session is still loading"),
    }
}

fn print_notifications(page: &mut EntityPage) {
    for notification in page.take_notifications() {
        let marker = match notification.level {
            Level::Success => "ok",
            Level::Error => "error",
        };
        match notification.description {
            Some(description) => println!("[{}] {}: {}", marker, notification.title, description),
            None => println!("[{}] {}", marker, notification.title),
        }
    }
}

async fn submit(page: &mut EntityPage, set: &[(String, String)]) -> anyhow::Result<()> {
    let form = page.form_mut().context("no form is open")?;
    for (key, value) in set {
        form.set_input(key, value)?;
    }

    let outcome = page.submit_panel().await?;
    print_notifications(page);
    match outcome {
        SubmitOutcome::Submitted => Ok(()),
        SubmitOutcome::Invalid { field, message } => bail!("{}: {}", field, message),
        SubmitOutcome::Failed { message } => bail!(message),
        SubmitOutcome::Busy => bail!("a submit is already in flight"),
    }
}

async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let default_level = if cli.debug { "entity_admin=debug" } else { "entity_admin=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with_writer(std::io::stderr)
        .init();

    let mut options = ClientOptions::from_env()?;
    if let Some(url) = &cli.api_url {
        options = options.with_api_url(url);
    }

    let store = Arc::new(FileTokenStore::new(&cli.session_file));
    let admin = AdminClient::with_token_store(options, store)?;

    // Logging in starts a fresh session; everything else restores the stored one
    if !matches!(cli.command, Commands::Login { .. }) {
        admin.auth().init().await?;
    }

    match cli.command {
        Commands::Login { email, password } => {
            let identity = admin.auth().login(&email, &password).await?;
            println!("Logged in as {}{}", identity.email, if identity.is_admin { " (admin)" } else { "" });
        }
        Commands::Logout => {
            admin.auth().logout().await?;
            println!("Logged out");
        }
        Commands::Whoami => match (admin.auth().identity(), admin.auth().user()) {
            (Some(identity), user) => {
                let name = user.map(|user| user.display_name()).unwrap_or_else(|| identity.email.clone());
                println!("{} <{}>", name, identity.email);
                println!("id: {}", identity.id);
                println!("role: {}", if identity.is_admin { "Admin" } else { "User" });
            }
            (None, _) => bail!("Not logged in"),
        },
        Commands::List { entity } => {
            let mut page = open_page(&admin, entity_kind(&entity)?)?;
            let loaded = page.load().await.map(|_| ());
            print_notifications(&mut page);
            loaded?;

            let table = page.table();
            println!("{} ({})", table.title, table.caption);
            if let Some(message) = &table.empty_message {
                println!("{}", message);
                return Ok(());
            }
            println!("KEY\t{}", table.headers.join("\t"));
            for row in &table.rows {
                let cells: Vec<&str> = row.cells.iter().map(|cell| cell.as_str()).collect();
                println!("{}\t{}", row.key, cells.join("\t"));
            }
        }
        Commands::Show { entity, id } => {
            let mut page = open_page(&admin, entity_kind(&entity)?)?;
            page.load().await?;
            let view = page.open_view(&id)?;
            println!("{}", view.title);
            for entry in &view.entries {
                println!("{}: {}", entry.label, entry.value);
            }
        }
        Commands::Create { entity, set } => {
            let mut page = open_page(&admin, entity_kind(&entity)?)?;
            page.open_create()?;
            submit(&mut page, &set).await?;
        }
        Commands::Edit { entity, id, set } => {
            let mut page = open_page(&admin, entity_kind(&entity)?)?;
            page.load().await?;
            page.open_edit(&id)?;
            submit(&mut page, &set).await?;
        }
        Commands::Delete { entity, id, yes } => {
            let mut page = open_page(&admin, entity_kind(&entity)?)?;
            page.load().await?;
            let confirmation = page.request_delete(&id)?;
            if !yes {
                bail!("{} {} Pass --yes to delete {}.", confirmation.title, confirmation.description, id);
            }
            let deleted = page.confirm_delete().await;
            print_notifications(&mut page);
            deleted?;
        }
        Commands::Dashboard => {
            let dashboard = admin.dashboard();
            println!("{}", dashboard.greeting());
            for card in dashboard.cards() {
                let badge = if card.admin_only { " [Admin Only]" } else { "" };
                println!("{} {}{} - {} ({})", card.icon, card.title, badge, card.description, card.path);
            }

            if let Some(stats) = dashboard.stats(Local::now().date_naive()).await? {
                println!();
                println!("Total Users: {}", stats.total_users);
                println!("Child Users: {}", stats.total_child_users);
                println!("Total Exercises: {}", stats.total_exercises);
                for (title, slices, empty) in [
                    ("Exercise Distribution", &stats.exercise_distribution, "No exercise data available"),
                    ("Children Age Distribution", &stats.age_distribution, "No child user data available"),
                ] {
                    println!("{}:", title);
                    if slices.is_empty() {
                        println!("  {}", empty);
                    }
                    for slice in slices {
                        println!("  {}: {}", slice.name, slice.value);
                    }
                }
            }
        }
        Commands::Form { entity, id } => {
            let mut page = open_page(&admin, entity_kind(&entity)?)?;
            let form = match id {
                Some(id) => {
                    page.load().await?;
                    page.open_edit(&id)?
                }
                None => page.open_create()?,
            };
            println!("{}", form.title());
            println!("{}", serde_json::to_string_pretty(&form.widgets())?);
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
