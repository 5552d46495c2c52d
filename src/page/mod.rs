//! Entity page controller
//!
//! [`EntityPage`] drives one entity screen: it loads the list through the
//! query cache, opens create/edit/view panels, asks for confirmation before a
//! delete and reports every outcome as a [`Notification`].

mod notification;

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::api::ApiClient;
use crate::auth::AuthProvider;
use crate::entity::{records_from_value, EntityConfig, Record};
use crate::error::Error;
use crate::form::{EntityForm, FormMode, SubmitHandler, SubmitOutcome};
use crate::query::QueryCache;
use crate::render::{DeleteConfirmation, DetailView, TableView};

pub use notification::*;

/// The side panel of an entity page
#[derive(Debug, Clone)]
pub enum Panel {
    Closed,
    Create(EntityForm),
    Edit(EntityForm),
    View(DetailView),
}

/// Writes submitted forms to the entity's endpoints
#[derive(Debug, Clone)]
pub struct EntityWriter {
    api: ApiClient,
    config: Arc<EntityConfig>,
}

impl EntityWriter {
    pub fn new(api: ApiClient, config: Arc<EntityConfig>) -> Self {
        Self { api, config }
    }
}

#[async_trait]
impl SubmitHandler for EntityWriter {
    async fn submit(&self, mode: &FormMode, payload: Map<String, Value>) -> Result<(), Error> {
        match mode {
            FormMode::Create => {
                let path = self.config.create_path(&payload);
                self.api.post::<Value, _>(&path, Some(&payload)).await?;
            }
            FormMode::Edit { key } => {
                let path = self.config.item_path(key);
                self.api.patch::<Value, _>(&path, Some(&payload)).await?;
            }
        }
        Ok(())
    }
}

/// Read the list of `config`'s records as a JSON array
pub async fn fetch_records(api: &ApiClient, config: &EntityConfig) -> Result<Value, Error> {
    let data = api
        .get::<Value>(&config.list_path())
        .await?
        .into_data()
        .unwrap_or(Value::Null);
    let records = config.extract_records(data);
    Ok(Value::Array(records.into_iter().map(Record::into_value).collect()))
}

/// Controller of one entity screen
#[derive(Debug)]
pub struct EntityPage {
    config: Arc<EntityConfig>,
    api: ApiClient,
    auth: AuthProvider,
    cache: QueryCache,
    records: Vec<Record>,
    loaded: bool,
    panel: Panel,
    pending_delete: Option<DeleteConfirmation>,
    notifications: Vec<Notification>,
}

impl EntityPage {
    pub fn new(config: EntityConfig, api: ApiClient, auth: AuthProvider, cache: QueryCache) -> Self {
        Self {
            config: Arc::new(config),
            api,
            auth,
            cache,
            records: Vec::new(),
            loaded: false,
            panel: Panel::Closed,
            pending_delete: None,
            notifications: Vec::new(),
        }
    }

    pub fn config(&self) -> &EntityConfig {
        &self.config
    }

    /// Load the records, from the cache when it is fresh
    pub async fn load(&mut self) -> Result<&[Record], Error> {
        let api = self.api.clone();
        let config = self.config.clone();
        let result = self
            .cache
            .fetch(self.config.cache_key(), || {
                let api = api.clone();
                let config = config.clone();
                async move { fetch_records(&api, &config).await }
            })
            .await;

        match result {
            Ok(data) => {
                self.records = records_from_value(data);
                self.loaded = true;
                debug!(entity = %self.config.name, count = self.records.len(), "records loaded");
                Ok(&self.records)
            }
            Err(e) if e.is_unauthorized() => {
                debug!(entity = %self.config.name, "load rejected, session cleared");
                Err(e)
            }
            Err(e) => {
                warn!(entity = %self.config.name, error = %e, "failed to load records");
                self.notify(
                    Notification::error(
                        format!("Failed to load {}", self.config.display_name_plural.to_lowercase()),
                        e.user_message(),
                    )
                    .with_action(NotificationAction::Retry),
                );
                Err(e)
            }
        }
    }

    /// Invalidate the cached list and load it again
    pub async fn refresh(&mut self) -> Result<&[Record], Error> {
        self.cache.invalidate(self.config.cache_key()).await;
        self.load().await
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Shown while the first load is in flight
    pub fn loading_message(&self) -> String {
        format!("Loading {}...", self.config.display_name_plural.to_lowercase())
    }

    /// The table as seen by the current identity
    pub fn table(&self) -> TableView {
        let identity = self.auth.identity();
        TableView::build(&self.config, &self.records, identity.as_ref())
    }

    /// The loaded record with primary key `key`
    pub fn record(&self, key: &str) -> Result<&Record, Error> {
        self.records
            .iter()
            .find(|record| self.config.record_key(record).as_deref() == Some(key))
            .ok_or_else(|| Error::not_found(format!("{} {}", self.config.name, key)))
    }

    pub fn panel(&self) -> &Panel {
        &self.panel
    }

    /// The open create or edit form
    pub fn form_mut(&mut self) -> Option<&mut EntityForm> {
        match &mut self.panel {
            Panel::Create(form) | Panel::Edit(form) => Some(form),
            _ => None,
        }
    }

    pub fn open_create(&mut self) -> Result<&mut EntityForm, Error> {
        if !self.config.actions.create {
            return Err(Error::general(format!("{} cannot be created", self.config.display_name_plural)));
        }
        self.panel = Panel::Create(EntityForm::new(&self.config, None)?);
        self.form_mut().ok_or_else(|| Error::general("form did not open"))
    }

    pub fn open_edit(&mut self, key: &str) -> Result<&mut EntityForm, Error> {
        if !self.config.actions.edit {
            return Err(Error::general(format!("{} cannot be edited", self.config.display_name_plural)));
        }
        let form = EntityForm::new(&self.config, Some(self.record(key)?))?;
        self.panel = Panel::Edit(form);
        self.form_mut().ok_or_else(|| Error::general("form did not open"))
    }

    pub fn open_view(&mut self, key: &str) -> Result<&DetailView, Error> {
        if !self.config.actions.view {
            return Err(Error::general(format!("{} cannot be viewed", self.config.display_name_plural)));
        }
        self.panel = Panel::View(DetailView::build(&self.config, self.record(key)?));
        match &self.panel {
            Panel::View(view) => Ok(view),
            _ => Err(Error::general("detail view did not open")),
        }
    }

    pub fn close_panel(&mut self) {
        self.panel = Panel::Closed;
    }

    /// Submit the open form; on success the panel closes and the list reloads
    pub async fn submit_panel(&mut self) -> Result<SubmitOutcome, Error> {
        let writer = EntityWriter::new(self.api.clone(), self.config.clone());
        let form = self
            .form_mut()
            .ok_or_else(|| Error::general("No form is open"))?;
        let is_edit = form.is_edit();
        let outcome = form.submit(&writer).await;

        let display = self.config.display_name.clone();
        let (done, verb) = if is_edit {
            ("updated", "update")
        } else {
            ("created", "create")
        };

        match &outcome {
            SubmitOutcome::Submitted => {
                info!(entity = %self.config.name, action = verb, "record saved");
                self.cache.invalidate_all(self.config.invalidation_keys()).await;
                self.panel = Panel::Closed;
                self.notify(
                    Notification::success(format!("{} {} successfully", display, done))
                        .with_description(format!("{} has been {}.", display, done)),
                );
                self.reload_after_write().await;
            }
            SubmitOutcome::Failed { message } => {
                self.notify(Notification::error(
                    format!("Failed to {} {}", verb, display.to_lowercase()),
                    message.clone(),
                ));
            }
            SubmitOutcome::Invalid { .. } | SubmitOutcome::Busy => {}
        }

        Ok(outcome)
    }

    /// Ask for confirmation before deleting the record keyed `key`
    pub fn request_delete(&mut self, key: &str) -> Result<&DeleteConfirmation, Error> {
        let identity = self.auth.identity();
        let record = self.record(key)?;
        if !self.config.can_delete(record, identity.as_ref()) {
            return Err(Error::general(format!(
                "This {} cannot be deleted",
                self.config.display_name.to_lowercase()
            )));
        }

        let confirmation = DeleteConfirmation::new(&self.config, key);
        Ok(&*self.pending_delete.insert(confirmation))
    }

    pub fn pending_delete(&self) -> Option<&DeleteConfirmation> {
        self.pending_delete.as_ref()
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Issue the confirmed delete. On failure the confirmation stays pending so
    /// it can be retried.
    pub async fn confirm_delete(&mut self) -> Result<(), Error> {
        let key = self
            .pending_delete
            .as_ref()
            .map(|pending| pending.key.clone())
            .ok_or_else(|| Error::general("No delete is pending"))?;

        let display = self.config.display_name.clone();
        let result = self
            .api
            .delete::<Value, Value>(&self.config.item_path(&key), None)
            .await;

        match result {
            Ok(_) => {
                info!(entity = %self.config.name, key = %key, "record deleted");
                self.pending_delete = None;
                self.cache.invalidate_all(self.config.invalidation_keys()).await;
                self.notify(Notification::success(format!("{} deleted successfully", display)));
                self.reload_after_write().await;
                Ok(())
            }
            Err(e) => {
                self.notify(
                    Notification::error(format!("Failed to delete {}", display.to_lowercase()), e.user_message())
                        .with_action(NotificationAction::Retry),
                );
                Err(e)
            }
        }
    }

    async fn reload_after_write(&mut self) {
        if let Err(e) = self.load().await {
            debug!(error = %e, "reload after write failed");
        }
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    /// Remove and return every pending notification
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    pub fn dismiss(&mut self, index: usize) {
        if index < self.notifications.len() {
            self.notifications.remove(index);
        }
    }

    fn notify(&mut self, notification: Notification) {
        self.notifications.push(notification);
    }
}
