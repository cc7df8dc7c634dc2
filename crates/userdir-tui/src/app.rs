//! Application state management for userdir.
//!
//! This module contains the `App` struct that owns the user cache and all UI
//! state: selection, the add/edit form, confirmations and the status line.

use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info};

use userdir_core::{
    CacheEvent, Config, HttpDirectoryClient, MutationKind, MutationStatus, QueryStatus, User,
    UserCache, UserDraft, UserId,
};

// ============================================================================
// Constants
// ============================================================================

/// Maximum length for the name field.
const MAX_NAME_LENGTH: usize = 64;

/// Maximum length for the email field.
const MAX_EMAIL_LENGTH: usize = 128;

/// Number of items to scroll on page up/down.
pub const PAGE_SCROLL_SIZE: usize = 10;

// ============================================================================
// UI State Types
// ============================================================================

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    AddingUser,
    EditingUser(UserId),
    ConfirmingDelete(UserId),
    ShowingHelp,
    ConfirmingQuit,
    Quitting,
}

/// Which form field has focus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    Email,
}

impl FormField {
    pub fn toggle(&self) -> Self {
        match self {
            FormField::Name => FormField::Email,
            FormField::Email => FormField::Name,
        }
    }
}

/// Contents of the add/edit form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserForm {
    pub name: String,
    pub email: String,
    pub focus: FormField,
}

impl Default for UserForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            focus: FormField::Name,
        }
    }
}

impl UserForm {
    fn from_user(user: &User) -> Self {
        Self {
            name: user.name.clone(),
            email: user.email.clone(),
            focus: FormField::Name,
        }
    }

    pub fn push_char(&mut self, c: char) {
        match self.focus {
            FormField::Name => {
                if can_add_name_char(self.name.chars().count(), c) {
                    self.name.push(c);
                }
            }
            FormField::Email => {
                if can_add_email_char(self.email.chars().count(), c) {
                    self.email.push(c);
                }
            }
        }
    }

    pub fn pop_char(&mut self) {
        match self.focus {
            FormField::Name => self.name.pop(),
            FormField::Email => self.email.pop(),
        };
    }

    fn to_draft(&self) -> UserDraft {
        UserDraft::new(self.name.trim(), self.email.trim())
    }
}

// ============================================================================
// Main Application Struct
// ============================================================================

/// Main application state container
pub struct App {
    /// Collection URL the cache talks to
    pub base_url: String,
    pub cache: UserCache,

    pub state: AppState,
    pub selection: usize,
    pub form: UserForm,
    pub status_message: Option<String>,
}

impl App {
    /// Create a new application instance
    pub fn new(config: Config) -> Result<Self> {
        let base_url = config.base_url();
        debug!(%base_url, "Directory configured");

        let client = HttpDirectoryClient::new(base_url.as_str(), config.request_timeout())?;
        let cache = UserCache::new(Arc::new(client), config.cache_options());

        Ok(Self {
            base_url,
            cache,
            state: AppState::Normal,
            selection: 0,
            form: UserForm::default(),
            status_message: None,
        })
    }

    // =========================================================================
    // Data
    // =========================================================================

    /// Issue the initial list read
    pub fn start(&mut self) {
        info!("Fetching user list");
        self.cache.fetch();
    }

    /// Refetch the list on request
    pub fn refresh(&mut self) {
        self.cache.fetch();
        self.status_message = Some("Refreshing users...".to_string());
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.cache.status(), QueryStatus::Ready)
    }

    pub fn users(&self) -> &[User] {
        self.cache.users()
    }

    pub fn selected_user(&self) -> Option<&User> {
        self.users().get(self.selection)
    }

    /// Check for completed background requests and process results
    pub fn check_background_tasks(&mut self) {
        for event in self.cache.process_completions() {
            self.process_cache_event(event);
        }
        self.clamp_selection();
    }

    fn process_cache_event(&mut self, event: CacheEvent) {
        match event {
            CacheEvent::Loaded { count } => {
                self.status_message = Some(format!("Loaded {} users", count));
            }
            CacheEvent::LoadFailed { initial: true, .. } => {
                // The list panel shows the failure notice
                self.status_message = None;
            }
            CacheEvent::LoadFailed { initial: false, .. } => {
                self.status_message = Some("Refresh failed; showing cached users".to_string());
            }
            CacheEvent::Settled { kind, status, reply, .. } => {
                self.status_message = Some(settled_message(kind, status, reply.as_ref()));
            }
        }
    }

    // =========================================================================
    // Selection
    // =========================================================================

    fn clamp_selection(&mut self) {
        let len = self.users().len();
        if len == 0 {
            self.selection = 0;
        } else if self.selection >= len {
            self.selection = len - 1;
        }
    }

    pub fn select_next(&mut self, step: usize) {
        let len = self.users().len();
        if len > 0 {
            self.selection = (self.selection + step).min(len - 1);
        }
    }

    pub fn select_prev(&mut self, step: usize) {
        self.selection = self.selection.saturating_sub(step);
    }

    pub fn select_first(&mut self) {
        self.selection = 0;
    }

    pub fn select_last(&mut self) {
        self.selection = self.users().len().saturating_sub(1);
    }

    // =========================================================================
    // Forms and confirmations
    // =========================================================================

    pub fn open_add_form(&mut self) {
        if !self.is_ready() {
            return;
        }
        self.form = UserForm::default();
        self.state = AppState::AddingUser;
    }

    pub fn open_edit_form(&mut self) {
        if !self.is_ready() {
            return;
        }
        if let Some(user) = self.selected_user().cloned() {
            self.form = UserForm::from_user(&user);
            self.state = AppState::EditingUser(user.id);
        }
    }

    pub fn cancel_form(&mut self) {
        self.form = UserForm::default();
        self.state = AppState::Normal;
    }

    /// Submit the add/edit form as a mutation
    pub fn submit_form(&mut self) {
        match self.state {
            AppState::AddingUser => {
                let draft = self.form.to_draft();
                self.cache.create(draft);
                self.form = UserForm::default();
                self.state = AppState::Normal;
                self.select_last();
            }
            AppState::EditingUser(id) => {
                let draft = self.form.to_draft();
                if draft.name.is_empty() {
                    self.status_message = Some("Name is required; edit discarded".to_string());
                } else {
                    self.cache.update(User::from_draft(id, draft));
                }
                self.form = UserForm::default();
                self.state = AppState::Normal;
            }
            _ => {}
        }
    }

    pub fn request_delete(&mut self) {
        if !self.is_ready() {
            return;
        }
        if let Some(id) = self.selected_user().map(|u| u.id) {
            self.state = AppState::ConfirmingDelete(id);
        }
    }

    pub fn confirm_delete(&mut self) {
        if let AppState::ConfirmingDelete(id) = self.state {
            self.cache.delete(id);
            self.clamp_selection();
        }
        self.state = AppState::Normal;
    }
}

/// One-line status for a settled mutation.
fn settled_message(kind: MutationKind, status: MutationStatus, reply: Option<&User>) -> String {
    match (status, kind, reply) {
        (MutationStatus::RolledBack, kind, _) => {
            format!("Could not {} user; change reverted", kind.verb())
        }
        (_, MutationKind::Create, Some(server)) => {
            format!("Created {} (server id {})", server.name, server.id)
        }
        (_, MutationKind::Create, None) => "User created".to_string(),
        (_, MutationKind::Update, _) => "User updated".to_string(),
        (_, MutationKind::Delete, _) => "User deleted".to_string(),
    }
}

// ============================================================================
// Input validation helpers
// ============================================================================

/// Check if a character is valid for input (no control characters)
fn is_valid_input_char(c: char) -> bool {
    !c.is_control()
}

/// Check if a name character should be accepted
pub fn can_add_name_char(current_len: usize, c: char) -> bool {
    current_len < MAX_NAME_LENGTH && is_valid_input_char(c)
}

/// Check if an email character should be accepted
pub fn can_add_email_char(current_len: usize, c: char) -> bool {
    current_len < MAX_EMAIL_LENGTH && is_valid_input_char(c)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn test_app() -> App {
        let config = Config {
            base_url: Some("http://127.0.0.1:9/users".to_string()),
            ..Default::default()
        };
        App::new(config).expect("Failed to build test app")
    }

    // -------------------------------------------------------------------------
    // Input Validation Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_can_add_name_char() {
        assert!(can_add_name_char(0, 'a'));
        assert!(can_add_name_char(63, 'z'));
        assert!(!can_add_name_char(64, 'a'));
        assert!(!can_add_name_char(0, '\n'));
        assert!(!can_add_name_char(0, '\t'));
    }

    #[test]
    fn test_can_add_email_char() {
        assert!(can_add_email_char(0, '@'));
        assert!(can_add_email_char(127, '.'));
        assert!(!can_add_email_char(128, 'a'));
        assert!(!can_add_email_char(0, '\x00'));
    }

    // -------------------------------------------------------------------------
    // Form Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_form_typing_follows_focus() {
        let mut form = UserForm::default();
        for c in "Ann".chars() {
            form.push_char(c);
        }
        form.focus = form.focus.toggle();
        for c in "a@x.com".chars() {
            form.push_char(c);
        }
        form.pop_char();

        assert_eq!(form.name, "Ann");
        assert_eq!(form.email, "a@x.co");
    }

    #[test]
    fn test_form_draft_is_trimmed() {
        let form = UserForm {
            name: "  Ann ".to_string(),
            email: " a@x.com".to_string(),
            focus: FormField::Name,
        };
        assert_eq!(form.to_draft(), UserDraft::new("Ann", "a@x.com"));
    }

    #[test]
    fn test_form_field_toggle() {
        assert_eq!(FormField::Name.toggle(), FormField::Email);
        assert_eq!(FormField::Email.toggle(), FormField::Name);
    }

    // -------------------------------------------------------------------------
    // Status Message Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_settled_message() {
        let server = User {
            id: UserId::Assigned(11),
            name: "B".to_string(),
            email: "b@x.com".to_string(),
        };
        assert_eq!(
            settled_message(MutationKind::Create, MutationStatus::Applied, Some(&server)),
            "Created B (server id 11)"
        );
        assert_eq!(
            settled_message(MutationKind::Delete, MutationStatus::RolledBack, None),
            "Could not delete user; change reverted"
        );
        assert_eq!(
            settled_message(MutationKind::Update, MutationStatus::Applied, Some(&server)),
            "User updated"
        );
    }

    // -------------------------------------------------------------------------
    // State Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_forms_stay_closed_until_list_is_ready() {
        let mut app = test_app();
        app.open_add_form();
        assert_eq!(app.state, AppState::Normal);
        app.request_delete();
        assert_eq!(app.state, AppState::Normal);
    }

    // -------------------------------------------------------------------------
    // Submit Tests (the cache spawns requests, so these need a runtime)
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_blank_edit_is_discarded() {
        let mut app = test_app();
        app.state = AppState::EditingUser(UserId::Assigned(1));
        app.form = UserForm {
            name: "   ".to_string(),
            email: "a@x.com".to_string(),
            focus: FormField::Name,
        };

        app.submit_form();

        assert_eq!(app.cache.pending_count(), 0);
        assert_eq!(
            app.status_message.as_deref(),
            Some("Name is required; edit discarded")
        );
        assert_eq!(app.state, AppState::Normal);
        assert_eq!(app.form, UserForm::default());
    }

    #[tokio::test]
    async fn test_edit_with_name_sends_full_record() {
        let mut app = test_app();
        app.state = AppState::EditingUser(UserId::Assigned(1));
        app.form = UserForm {
            name: "Z".to_string(),
            email: "a@x.com".to_string(),
            focus: FormField::Name,
        };

        app.submit_form();

        assert_eq!(app.cache.pending_count(), 1);
        assert_eq!(app.state, AppState::Normal);
    }

    #[tokio::test]
    async fn test_add_submit_clears_form_and_selects_new_row() {
        let mut app = test_app();
        app.state = AppState::AddingUser;
        for c in "Bo".chars() {
            app.form.push_char(c);
        }
        app.form.focus = FormField::Email;
        for c in "b@x.com".chars() {
            app.form.push_char(c);
        }

        app.submit_form();

        assert_eq!(app.state, AppState::Normal);
        assert_eq!(app.form, UserForm::default());
        assert_eq!(app.cache.pending_count(), 1);

        let users = app.users();
        assert_eq!(users.len(), 1);
        assert!(users[0].id.is_placeholder());
        assert_eq!(users[0].name, "Bo");
        assert_eq!(users[0].email, "b@x.com");
        assert_eq!(app.selection, 0);
        assert_eq!(app.selected_user().map(|u| u.id), Some(users[0].id));
    }

    #[tokio::test]
    async fn test_confirm_delete_sends_delete() {
        let mut app = test_app();
        app.state = AppState::ConfirmingDelete(UserId::Assigned(1));

        app.confirm_delete();

        assert_eq!(app.cache.pending_count(), 1);
        assert_eq!(app.state, AppState::Normal);
    }

    #[test]
    fn test_selection_bounds_on_empty_list() {
        let mut app = test_app();
        app.select_next(PAGE_SCROLL_SIZE);
        assert_eq!(app.selection, 0);
        app.select_last();
        assert_eq!(app.selection, 0);
        app.select_prev(1);
        assert_eq!(app.selection, 0);
        assert!(app.selected_user().is_none());
    }
}
