//! Application State
//!
//! Central application state management for terp.

use crossterm::event::KeyCode;
use serde_json::Value;
use std::ops::Range;
use terp::config::Config;
use terp::data::{display_field, DataAccess, DocList, DocState, Entity};
use terp::erp::{format_erp_error, AuthMethod, ListQuery, ResourceId};
use terp::form::CustomerForm;
use terp::notification::{NotificationManager, OperationType};

// =========================================================================
// Configuration Constants
// =========================================================================

/// Default viewport height (will be updated during render based on terminal size)
const DEFAULT_VIEWPORT_HEIGHT: usize = 20;

/// Rows kept visible above/below the cursor while scrolling
const SCROLL_MARGIN: usize = 2;

/// Application modes
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Mode {
    Normal,        // Viewing list
    Create,        // New customer form
    Help,          // ? help popup
    Confirm,       // Delete confirmation dialog
    Warning,       // Blocking message (OK only)
    Describe,      // Viewing JSON of a single document
    Notifications, // Notifications history panel
}

/// Delete that waits for confirmation
#[derive(Debug, Clone)]
pub struct PendingDelete {
    pub target: ResourceId,
    pub selected_yes: bool,
}

/// Network work scheduled by a key press, run after the next frame is drawn
#[derive(Debug, Clone, PartialEq)]
pub enum Task {
    LoadList,
    RefreshList,
    LoadDoc(String),
    RefreshDoc(String),
    CreateCustomer,
    Delete(ResourceId),
}

/// Main application state
pub struct App {
    // Data access
    pub data: DataAccess,
    pub user: Option<String>,
    pub auth_method: AuthMethod,

    // Current entity and its list snapshot
    pub entity: Entity,
    pub list: DocList,
    pub filtered_items: Vec<Value>,

    // Navigation state
    pub selected: usize,
    pub mode: Mode,
    pub filter_text: String,
    pub filter_active: bool,

    // Creation form
    pub form: CustomerForm,
    pub creating: bool,

    // Describe view
    pub describe: DocState,
    pub describe_name: Option<String>,
    pub describe_scroll: usize,

    // Dialogs
    pub pending_delete: Option<PendingDelete>,
    pub warning_message: Option<String>,
    warning_return_mode: Mode,

    // Persistent configuration
    pub config: Config,
    pub persist_config: bool,

    // Key press tracking
    pub last_key_press: Option<(KeyCode, std::time::Instant)>,

    // Read-only mode
    pub readonly: bool,

    // Notifications
    pub notification_manager: NotificationManager,
    pub notifications_selected: usize,

    // Virtual scrolling
    pub viewport_height: usize,
    pub scroll_offset: usize,

    pending_task: Option<Task>,
}

impl App {
    /// Create App from pre-initialized components
    pub fn from_initialized(
        data: DataAccess,
        entity: Entity,
        config: Config,
        user: Option<String>,
        readonly: bool,
    ) -> Self {
        let auth_method = data.client().auth_method();
        let notification_manager = config.notifications.manager();
        let mut app = Self {
            data,
            user,
            auth_method,
            entity,
            list: DocList::default(),
            filtered_items: Vec::new(),
            selected: 0,
            mode: Mode::Normal,
            filter_text: String::new(),
            filter_active: false,
            form: CustomerForm::new(),
            creating: false,
            describe: DocState::default(),
            describe_name: None,
            describe_scroll: 0,
            pending_delete: None,
            warning_message: None,
            warning_return_mode: Mode::Normal,
            config,
            persist_config: true,
            last_key_press: None,
            readonly,
            notification_manager,
            notifications_selected: 0,
            viewport_height: DEFAULT_VIEWPORT_HEIGHT,
            scroll_offset: 0,
            pending_task: None,
        };
        app.sync_list();
        app
    }

    // =========================================================================
    // Scheduled work
    // =========================================================================

    pub fn schedule(&mut self, task: Task) {
        self.pending_task = Some(task);
    }

    pub fn take_pending_task(&mut self) -> Option<Task> {
        self.pending_task.take()
    }

    pub async fn run_task(&mut self, task: Task) {
        match task {
            Task::LoadList => self.load_current().await,
            Task::RefreshList => self.refresh_current().await,
            Task::LoadDoc(name) => {
                self.describe = self.data.load_doc(self.entity.doctype(), Some(&name)).await;
            },
            Task::RefreshDoc(name) => {
                self.describe = self.data.refresh_doc(self.entity.doctype(), Some(&name)).await;
            },
            Task::CreateCustomer => self.create_customer().await,
            Task::Delete(target) => self.delete_document(&target).await,
        }
        // The session may have been dropped or replaced by another process
        self.auth_method = self.data.client().auth_method();
    }

    // =========================================================================
    // Lists
    // =========================================================================

    pub fn current_query(&self) -> ListQuery {
        self.entity.query(None)
    }

    /// Pick up the cached state of the current list without fetching
    pub fn sync_list(&mut self) {
        self.list = self.data.doc_list(&self.current_query());
        self.apply_filter();
    }

    pub async fn load_current(&mut self) {
        let query = self.current_query();
        self.list = self.data.load_list(&query).await;
        self.after_list_update();
    }

    pub async fn refresh_current(&mut self) {
        let query = self.current_query();
        self.list = self.data.refresh_list(&query).await;
        self.after_list_update();
    }

    fn after_list_update(&mut self) {
        if let Some(err) = &self.list.is_error {
            tracing::warn!("Failed to load {}: {}", self.entity.doctype(), err);
        } else {
            tracing::debug!("Loaded {} {}", self.list.records.len(), self.entity.doctype());
        }
        let prev_selected = self.selected;
        self.apply_filter();
        self.selected = if prev_selected < self.filtered_items.len() {
            prev_selected
        } else {
            0
        };
    }

    pub fn switch_entity(&mut self, entity: Entity) {
        if entity == self.entity {
            return;
        }
        self.entity = entity;
        self.selected = 0;
        self.scroll_offset = 0;
        self.filter_text.clear();
        self.filter_active = false;
        self.sync_list();
        if self.persist_config {
            if let Err(e) = self.config.set_last_entity(entity) {
                tracing::warn!("Failed to save config: {}", e);
            }
        } else {
            self.config.last_entity = Some(entity.key().to_string());
        }
        self.schedule(Task::LoadList);
    }

    // =========================================================================
    // Filtering
    // =========================================================================

    pub fn apply_filter(&mut self) {
        let filter = self.filter_text.to_lowercase();

        if filter.is_empty() {
            self.filtered_items = self.list.records.clone();
        } else {
            let columns = self.entity.columns();
            self.filtered_items = self
                .list
                .records
                .iter()
                .filter(|item| {
                    columns
                        .iter()
                        .any(|col| display_field(item, col.field).to_lowercase().contains(&filter))
                })
                .cloned()
                .collect();
        }

        if self.selected >= self.filtered_items.len() {
            self.selected = self.filtered_items.len().saturating_sub(1);
        }
        self.scroll_offset = 0;
    }

    pub fn clear_filter(&mut self) {
        self.filter_text.clear();
        self.filter_active = false;
        self.apply_filter();
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    pub fn selected_item(&self) -> Option<&Value> {
        self.filtered_items.get(self.selected)
    }

    pub fn selected_name(&self) -> Option<String> {
        self.selected_item()
            .and_then(|item| item.get("name"))
            .and_then(|v| v.as_str())
            .map(String::from)
    }

    pub fn describe_json(&self) -> Option<String> {
        self.describe
            .record
            .as_ref()
            .map(|record| serde_json::to_string_pretty(record).unwrap_or_default())
    }

    pub fn describe_line_count(&self) -> usize {
        self.describe_json().map(|s| s.lines().count()).unwrap_or(0)
    }

    pub fn next(&mut self) {
        match self.mode {
            Mode::Notifications => {
                let len = self.notification_manager.notifications.len();
                if len > 0 {
                    self.notifications_selected = (self.notifications_selected + 1).min(len - 1);
                }
            },
            Mode::Describe => {
                let max = self.describe_line_count().saturating_sub(1);
                self.describe_scroll = (self.describe_scroll + 1).min(max);
            },
            _ => {
                if !self.filtered_items.is_empty() {
                    self.selected = (self.selected + 1).min(self.filtered_items.len() - 1);
                }
            },
        }
    }

    pub fn previous(&mut self) {
        match self.mode {
            Mode::Notifications => {
                self.notifications_selected = self.notifications_selected.saturating_sub(1);
            },
            Mode::Describe => {
                self.describe_scroll = self.describe_scroll.saturating_sub(1);
            },
            _ => {
                self.selected = self.selected.saturating_sub(1);
            },
        }
    }

    pub fn go_to_top(&mut self) {
        match self.mode {
            Mode::Describe => self.describe_scroll = 0,
            _ => self.selected = 0,
        }
    }

    pub fn go_to_bottom(&mut self) {
        match self.mode {
            Mode::Describe => {
                self.describe_scroll = self.describe_line_count().saturating_sub(1);
            },
            _ => {
                self.selected = self.filtered_items.len().saturating_sub(1);
            },
        }
    }

    pub fn page_down(&mut self, page_size: usize) {
        if !self.filtered_items.is_empty() {
            self.selected = (self.selected + page_size).min(self.filtered_items.len() - 1);
        }
    }

    pub fn page_up(&mut self, page_size: usize) {
        self.selected = self.selected.saturating_sub(page_size);
    }

    // =========================================================================
    // Modes
    // =========================================================================

    pub fn enter_help_mode(&mut self) {
        self.mode = Mode::Help;
    }

    pub fn enter_notifications_mode(&mut self) {
        self.notifications_selected = 0;
        self.mode = Mode::Notifications;
    }

    pub fn enter_describe_mode(&mut self) {
        let Some(name) = self.selected_name() else {
            return;
        };
        self.describe = self.data.doc(self.entity.doctype(), Some(&name));
        self.describe_name = Some(name.clone());
        self.describe_scroll = 0;
        self.mode = Mode::Describe;
        self.schedule(Task::LoadDoc(name));
    }

    pub fn refresh_describe(&mut self) {
        if let Some(name) = self.describe_name.clone() {
            self.schedule(Task::RefreshDoc(name));
        }
    }

    pub fn enter_create_mode(&mut self) {
        if self.readonly {
            self.show_warning("Read-only mode: creating documents is disabled");
            return;
        }
        if self.entity != Entity::Customers {
            self.show_warning("The creation form is only available for customers");
            return;
        }
        self.mode = Mode::Create;
    }

    pub fn show_warning(&mut self, message: &str) {
        if self.mode != Mode::Warning {
            self.warning_return_mode = self.mode;
        }
        self.warning_message = Some(message.to_string());
        self.mode = Mode::Warning;
    }

    pub fn dismiss_warning(&mut self) {
        self.warning_message = None;
        self.mode = self.warning_return_mode;
        self.warning_return_mode = Mode::Normal;
    }

    pub fn exit_mode(&mut self) {
        self.mode = Mode::Normal;
        self.pending_delete = None;
        self.describe_name = None;
    }

    // =========================================================================
    // Creation
    // =========================================================================

    /// Validate the form and schedule the create request
    pub fn submit_form(&mut self) {
        if self.creating {
            return;
        }
        if let Err(msg) = self.form.validate() {
            self.show_warning(&msg);
            return;
        }
        self.creating = true;
        self.schedule(Task::CreateCustomer);
    }

    async fn create_customer(&mut self) {
        let document = self.form.to_document();
        let doctype = Entity::Customers.doctype();
        let notif_id = self.notification_manager.create_notification(
            OperationType::Create,
            doctype,
            &document.customer_name,
        );

        match self.data.client().create_doc(doctype, &document).await {
            Ok(created) => {
                let name = created.get("name").and_then(|v| v.as_str());
                tracing::info!("Created customer {:?}", name);
                self.notification_manager.mark_success(notif_id, name);
                self.form.reset();
                self.mode = Mode::Normal;
                self.refresh_current().await;
            },
            Err(e) => {
                tracing::error!("Error creating customer: {}", e);
                let msg = format_erp_error(&e);
                self.notification_manager.mark_error(notif_id, msg.clone());
                self.show_warning(&format!("Failed to create customer: {}", msg));
            },
        }

        self.creating = false;
    }

    // =========================================================================
    // Deletion
    // =========================================================================

    pub fn request_delete(&mut self) {
        if self.readonly {
            self.show_warning("Read-only mode: deleting documents is disabled");
            return;
        }
        let Some(name) = self.selected_name() else {
            return;
        };
        self.pending_delete = Some(PendingDelete {
            target: ResourceId::new(self.entity.doctype(), &name),
            selected_yes: false,
        });
        self.mode = Mode::Confirm;
    }

    pub fn confirm_delete(&mut self) {
        let Some(pending) = self.pending_delete.take() else {
            return;
        };
        self.mode = Mode::Normal;
        self.schedule(Task::Delete(pending.target));
    }

    async fn delete_document(&mut self, target: &ResourceId) {
        let (doctype, name) = (target.doctype.as_str(), target.name.as_str());
        let notif_id = self
            .notification_manager
            .create_notification(OperationType::Delete, doctype, name);

        match self.data.client().delete_doc(doctype, name).await {
            Ok(_) => {
                self.notification_manager.mark_success(notif_id, None);
                self.data.invalidate_doctype(doctype);
                self.refresh_current().await;
            },
            Err(e) => {
                tracing::error!("Error deleting {} {}: {}", doctype, name, e);
                let msg = format_erp_error(&e);
                self.notification_manager.mark_error(notif_id, msg.clone());
                self.show_warning(&format!("Failed to delete {}: {}", name, msg));
            },
        }
    }

    // =========================================================================
    // Virtual scrolling
    // =========================================================================

    pub fn update_viewport(&mut self, height: usize) {
        self.viewport_height = height.max(1);
    }

    pub fn ensure_visible(&mut self) {
        if self.filtered_items.is_empty() {
            self.scroll_offset = 0;
            return;
        }

        if self.selected < self.scroll_offset + SCROLL_MARGIN {
            self.scroll_offset = self.selected.saturating_sub(SCROLL_MARGIN);
        }

        let bottom_threshold = self.viewport_height.saturating_sub(SCROLL_MARGIN);
        if self.selected >= self.scroll_offset + bottom_threshold {
            self.scroll_offset = self
                .selected
                .saturating_sub(self.viewport_height.saturating_sub(SCROLL_MARGIN + 1));
        }

        let max_offset = self.filtered_items.len().saturating_sub(self.viewport_height);
        self.scroll_offset = self.scroll_offset.min(max_offset);
    }

    pub fn visible_range(&self) -> Range<usize> {
        let start = self.scroll_offset.min(self.filtered_items.len());
        let end = (self.scroll_offset + self.viewport_height).min(self.filtered_items.len());
        start..end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;
    use terp::erp::{ConnectionConfig, ErpClient, MemoryCredentialStore};
    use terp::notification::NotificationStatus;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_app(records: usize) -> App {
        test_app_at("http://127.0.0.1:9", records)
    }

    fn test_app_at(endpoint: &str, records: usize) -> App {
        let client = ErpClient::new(
            ConnectionConfig::new(endpoint),
            Arc::new(MemoryCredentialStore::new()),
        )
        .unwrap();
        let mut app = App::from_initialized(
            DataAccess::new(client),
            Entity::Customers,
            Config::default(),
            None,
            false,
        );
        app.persist_config = false;
        app.list.records = (0..records)
            .map(|i| json!({"name": format!("CUST-{:03}", i), "customer_name": format!("Customer {}", i)}))
            .collect();
        app.list.is_loading = false;
        app.apply_filter();
        app
    }

    #[test]
    fn test_visible_range_basic() {
        let mut app = test_app(100);
        app.update_viewport(10);
        assert_eq!(app.visible_range(), 0..10);
    }

    #[test]
    fn test_visible_range_at_end() {
        let mut app = test_app(25);
        app.update_viewport(10);
        app.scroll_offset = 20;
        assert_eq!(app.visible_range(), 20..25);
    }

    #[test]
    fn test_ensure_visible_follows_cursor() {
        let mut app = test_app(100);
        app.update_viewport(10);
        app.selected = 50;
        app.ensure_visible();
        assert!(app.visible_range().contains(&50));

        app.go_to_top();
        app.ensure_visible();
        assert_eq!(app.scroll_offset, 0);
    }

    #[test]
    fn test_filter_matches_columns() {
        let mut app = test_app(20);
        app.filter_text = "customer 1".to_string();
        app.apply_filter();
        // "Customer 1" and "Customer 10".."Customer 19"
        assert_eq!(app.filtered_items.len(), 11);

        app.clear_filter();
        assert_eq!(app.filtered_items.len(), 20);
    }

    #[test]
    fn test_navigation_is_clamped() {
        let mut app = test_app(3);
        app.previous();
        assert_eq!(app.selected, 0);
        app.next();
        app.next();
        app.next();
        assert_eq!(app.selected, 2);
        app.page_up(10);
        assert_eq!(app.selected, 0);
        app.page_down(10);
        assert_eq!(app.selected, 2);
    }

    #[test]
    fn test_create_requires_customers_and_write_mode() {
        let mut app = test_app(0);
        app.readonly = true;
        app.enter_create_mode();
        assert_eq!(app.mode, Mode::Warning);
        app.dismiss_warning();
        assert_eq!(app.mode, Mode::Normal);

        app.readonly = false;
        app.entity = Entity::Items;
        app.enter_create_mode();
        assert_eq!(app.mode, Mode::Warning);
        app.dismiss_warning();

        app.entity = Entity::Customers;
        app.enter_create_mode();
        assert_eq!(app.mode, Mode::Create);
    }

    #[test]
    fn test_submit_blank_form_warns_and_returns_to_form() {
        let mut app = test_app(0);
        app.enter_create_mode();
        app.submit_form();
        assert_eq!(app.mode, Mode::Warning);
        assert!(!app.creating);
        assert!(app.take_pending_task().is_none());

        app.dismiss_warning();
        assert_eq!(app.mode, Mode::Create);
    }

    #[test]
    fn test_submit_schedules_single_create() {
        let mut app = test_app(0);
        app.enter_create_mode();
        app.form.push_char('A');
        app.submit_form();
        assert!(app.creating);

        // A second submit while creating is ignored
        app.submit_form();
        assert_eq!(app.take_pending_task(), Some(Task::CreateCustomer));
        assert_eq!(app.take_pending_task(), None);
    }

    #[tokio::test]
    async fn test_failed_create_reenables_form() {
        let mut app = test_app(0);
        app.enter_create_mode();
        app.form.push_char('A');
        app.submit_form();

        let task = app.take_pending_task().unwrap();
        app.run_task(task).await;

        assert!(!app.creating);
        assert_eq!(app.mode, Mode::Warning);
        assert!(app
            .warning_message
            .as_deref()
            .unwrap_or_default()
            .starts_with("Failed to create customer"));
        // Form content survives the failure
        assert_eq!(app.form.customer_name, "A");

        app.dismiss_warning();
        assert_eq!(app.mode, Mode::Create);
    }

    #[tokio::test]
    async fn test_successful_create_resets_form_and_refreshes() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/resource/Customer"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"name": "CUST-00042", "customer_name": "Acme"}
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/resource/Customer"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{"name": "CUST-00042", "customer_name": "Acme"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut app = test_app_at(&server.uri(), 0);
        app.enter_create_mode();
        for c in "Acme".chars() {
            app.form.push_char(c);
        }
        app.submit_form();

        let task = app.take_pending_task().unwrap();
        app.run_task(task).await;

        assert!(!app.creating);
        assert_eq!(app.mode, Mode::Normal);
        assert_eq!(app.form, CustomerForm::default());
        assert_eq!(app.list.records.len(), 1);
        assert_eq!(app.list.records[0]["name"], "CUST-00042");

        let notif = app.notification_manager.notifications.front().unwrap();
        assert_eq!(notif.status, NotificationStatus::Success);
        assert_eq!(notif.document, "CUST-00042");
    }

    #[test]
    fn test_delete_flow_schedules_task() {
        let mut app = test_app(2);
        app.selected = 1;
        app.request_delete();
        assert_eq!(app.mode, Mode::Confirm);

        app.confirm_delete();
        assert_eq!(app.mode, Mode::Normal);
        assert_eq!(
            app.take_pending_task(),
            Some(Task::Delete(ResourceId::new("Customer", "CUST-001")))
        );
    }
}
