use std::sync::Arc;

use chrono::Utc;
use log::{debug, warn};
use thiserror::Error;
use uuid::Uuid;

use crate::document::{
    AuditLogEntry, CollaborativeNote, DashboardCard, Document, PermissionLevel,
    PersistedDocument, SharedNotes, ThemeSettings, User, reconcile,
};
use crate::seed::SEED_DOCUMENT;
use crate::sheet::CellValue;
use crate::storage::Storage;
use crate::sync::{BusSubscription, ChangeBus};

/// Errors surfaced by the store.
///
/// Permission failures are locally recoverable and carry enough context for
/// the caller to explain the refusal. Reference-integrity misses (unknown
/// sheet/user/card/note ids, out-of-bounds cells) are deliberately NOT
/// errors: delete/update-style calls treat them as silent no-ops.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no active session")]
    NotLoggedIn,

    #[error("permission denied: requires {required:?}, user has {actual:?}")]
    PermissionDenied {
        required: PermissionLevel,
        actual: PermissionLevel,
    },

    #[error("customizer capability required")]
    CustomizerRequired,

    #[error("only the note author or an admin may delete a note")]
    NotNoteAuthor,

    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// A dashboard card submitted for creation; the store assigns the id.
#[derive(Clone, Debug)]
pub struct CardDraft {
    pub title: String,
    pub path: String,
    pub icon: String,
    pub desc: String,
    pub admin_only: bool,
}

/// The application store: the in-memory document, the active session and
/// every named mutation.
///
/// One instance per tab. All mutations are synchronous read-modify-write
/// operations that append exactly one audit entry (newest first) and persist
/// the whole document before returning. Permission checks are enforced here
/// at the API boundary rather than trusted to the caller.
pub struct Store {
    document: Document,
    storage: Arc<dyn Storage>,
    session_storage: Arc<dyn Storage>,
    current_user: Option<User>,
    bus: Option<(Arc<ChangeBus>, BusSubscription)>,
}

impl Store {
    /// Open the store over a durable document record and a session-scoped
    /// record.
    ///
    /// Loads the persisted document if one exists and reconciles it against
    /// the compiled-in seed catalogs (new seed sheets/cards merged in,
    /// passwords re-derived from the seed). A missing record yields the seed
    /// document; a malformed one is discarded with a warning and also yields
    /// the seed document — never a fatal error. Any user found in the
    /// session record is restored as the active session.
    ///
    /// # Errors
    /// * Propagates storage read failures
    pub fn open(
        storage: Arc<dyn Storage>,
        session_storage: Arc<dyn Storage>,
    ) -> Result<Self, StoreError> {
        let document = match storage.read()? {
            None => SEED_DOCUMENT.clone(),
            Some(raw) => match serde_json::from_str::<PersistedDocument>(&raw) {
                Ok(persisted) => reconcile(persisted, &SEED_DOCUMENT),
                Err(err) => {
                    warn!("discarding malformed persisted document: {}", err);
                    SEED_DOCUMENT.clone()
                }
            },
        };

        let current_user = match session_storage.read()? {
            Some(raw) => serde_json::from_str(&raw).ok(),
            None => None,
        };

        Ok(Store {
            document,
            storage,
            session_storage,
            current_user,
            bus: None,
        })
    }

    /// Join a change bus so this store announces its writes to other tabs
    /// and can pick up theirs via [`Store::sync_external_changes`].
    pub fn attach_bus(&mut self, bus: Arc<ChangeBus>) {
        let subscription = bus.subscribe();
        self.bus = Some((bus, subscription));
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn current_user(&self) -> Option<&User> {
        self.current_user.as_ref()
    }

    // ---- Session ----------------------------------------------------------

    /// Authenticate against the current document by exact username and
    /// password match.
    ///
    /// On success the user becomes the active session, is written to the
    /// session-scoped store, and a login entry is appended to the audit log.
    /// On failure nothing changes and no audit entry is written.
    ///
    /// # Returns
    /// * `Ok(true)` on success, `Ok(false)` on bad credentials
    ///
    /// # Errors
    /// * Only storage/serialization failures while persisting
    pub fn login(&mut self, username: &str, password: &str) -> Result<bool, StoreError> {
        let user = self
            .document
            .users
            .iter()
            .find(|u| u.username == username && u.password.as_deref() == Some(password))
            .cloned();

        match user {
            Some(user) => {
                self.session_storage.write(&serde_json::to_string(&user)?)?;
                let actor = user.username.clone();
                self.current_user = Some(user);
                self.commit(
                    &actor,
                    "تسجيل الدخول",
                    format!("المستخدم {} قام بتسجيل الدخول.", username),
                )?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// End the active session. Appends an audit entry referencing the
    /// previously active user, then clears the session record. Silent no-op
    /// when nobody is logged in.
    pub fn logout(&mut self) -> Result<(), StoreError> {
        if let Some(user) = self.current_user.take() {
            self.commit(
                &user.username,
                "تسجيل الخروج",
                format!("المستخدم {} قام بتسجيل الخروج.", user.username),
            )?;
            self.session_storage.clear()?;
        }
        Ok(())
    }

    // ---- Permission evaluator ---------------------------------------------

    /// True iff a session is active and the user's level is ranked at or
    /// above `required` in `read_only < data_entry < editor < admin`.
    pub fn has_permission(&self, required: PermissionLevel) -> bool {
        self.current_user
            .as_ref()
            .is_some_and(|u| u.permissions.satisfies(required))
    }

    /// True iff the active user carries the customizer capability. This is
    /// orthogonal to the permission hierarchy and not implied by admin.
    pub fn is_customizer(&self) -> bool {
        self.current_user.as_ref().is_some_and(|u| u.customizer)
    }

    fn require(&self, required: PermissionLevel) -> Result<User, StoreError> {
        let user = self.current_user.as_ref().ok_or(StoreError::NotLoggedIn)?;
        if user.permissions.satisfies(required) {
            Ok(user.clone())
        } else {
            Err(StoreError::PermissionDenied {
                required,
                actual: user.permissions,
            })
        }
    }

    fn require_customizer(&self) -> Result<User, StoreError> {
        let user = self.current_user.as_ref().ok_or(StoreError::NotLoggedIn)?;
        if user.customizer {
            Ok(user.clone())
        } else {
            Err(StoreError::CustomizerRequired)
        }
    }

    // ---- Sheets ------------------------------------------------------------

    /// Replace one cell's value. Requires `data_entry`.
    ///
    /// Unknown sheet ids and out-of-bounds coordinates are silent no-ops
    /// with no audit entry. The audit detail resolves the sheet title,
    /// falling back to the raw id.
    pub fn update_cell(
        &mut self,
        sheet_id: &str,
        row_index: usize,
        cell_index: usize,
        value: &str,
    ) -> Result<(), StoreError> {
        let actor = self.require(PermissionLevel::DataEntry)?;

        let title = self
            .document
            .sheet(sheet_id)
            .map(|s| s.title.clone())
            .unwrap_or_else(|| sheet_id.to_string());

        let Some(sheet) = self.document.sheet_mut(sheet_id) else {
            debug!("update_cell: unknown sheet id {:?}", sheet_id);
            return Ok(());
        };
        if !sheet.set_cell(row_index, cell_index, CellValue::from(value)) {
            debug!(
                "update_cell: [{}, {}] out of bounds for sheet {:?}",
                row_index, cell_index, sheet_id
            );
            return Ok(());
        }

        self.commit(
            &actor.username,
            "تحديث خلية",
            format!(
                "قام بتحديث الخلية [{}, {}] في شيت \"{}\" إلى القيمة \"{}\".",
                row_index + 1,
                cell_index + 1,
                title,
                value
            ),
        )
    }

    /// Append a column to a sheet: one new header plus a blank cell on every
    /// existing row. Requires `editor`. Unknown sheet ids are a silent no-op.
    pub fn add_column(&mut self, sheet_id: &str, column_name: &str) -> Result<(), StoreError> {
        let actor = self.require(PermissionLevel::Editor)?;

        let Some(sheet) = self.document.sheet_mut(sheet_id) else {
            debug!("add_column: unknown sheet id {:?}", sheet_id);
            return Ok(());
        };
        sheet.add_column(column_name);
        let title = sheet.title.clone();

        self.commit(
            &actor.username,
            "إضافة خانة",
            format!(
                "قام بإضافة خانة جديدة باسم \"{}\" في شيت \"{}\".",
                column_name, title
            ),
        )
    }

    // ---- Users (admin) ------------------------------------------------------

    /// Requires `admin`.
    pub fn add_user(&mut self, user: User) -> Result<(), StoreError> {
        let actor = self.require(PermissionLevel::Admin)?;
        let username = user.username.clone();
        self.document.users.push(user);
        self.commit(
            &actor.username,
            "إضافة مستخدم",
            format!("تم إضافة المستخدم الجديد {}", username),
        )
    }

    /// Replace an id-matched user record. Requires `admin`.
    ///
    /// `updated.password == None` is the explicit "unchanged" sentinel: the
    /// stored password is kept rather than lost. Unknown ids are a silent
    /// no-op.
    pub fn update_user(&mut self, mut updated: User) -> Result<(), StoreError> {
        let actor = self.require(PermissionLevel::Admin)?;

        let Some(existing) = self.document.users.iter_mut().find(|u| u.id == updated.id) else {
            debug!("update_user: unknown user id {:?}", updated.id);
            return Ok(());
        };
        if updated.password.is_none() {
            updated.password = existing.password.clone();
        }
        let username = updated.username.clone();
        *existing = updated;

        self.commit(
            &actor.username,
            "تحديث مستخدم",
            format!("تم تحديث بيانات المستخدم {}", username),
        )
    }

    /// Remove an id-matched user. Requires `admin`. Unknown ids are a silent
    /// no-op with no audit entry.
    pub fn delete_user(&mut self, user_id: &str) -> Result<(), StoreError> {
        let actor = self.require(PermissionLevel::Admin)?;

        let Some(user) = self.document.user_by_id(user_id).cloned() else {
            debug!("delete_user: unknown user id {:?}", user_id);
            return Ok(());
        };
        self.document.users.retain(|u| u.id != user_id);

        self.commit(
            &actor.username,
            "حذف مستخدم",
            format!("تم حذف المستخدم {}", user.username),
        )
    }

    // ---- Dashboard cards (customizer) ---------------------------------------

    /// Add a card with a freshly generated id. Requires the customizer
    /// capability. Returns the new card's id.
    pub fn add_card(&mut self, draft: CardDraft) -> Result<String, StoreError> {
        let actor = self.require_customizer()?;

        let card = DashboardCard {
            id: format!("card-{}", Uuid::new_v4()),
            title: draft.title,
            path: draft.path,
            icon: draft.icon,
            desc: draft.desc,
            admin_only: draft.admin_only,
        };
        let id = card.id.clone();
        let title = card.title.clone();
        self.document.dashboard_cards.push(card);

        self.commit(
            &actor.username,
            "إضافة بطاقة",
            format!("أضاف بطاقة \"{}\" إلى لوحة التحكم.", title),
        )?;
        Ok(id)
    }

    /// Replace an id-matched card. Requires the customizer capability.
    /// Unknown ids are a silent no-op.
    pub fn update_card(&mut self, updated: DashboardCard) -> Result<(), StoreError> {
        let actor = self.require_customizer()?;

        let Some(existing) = self
            .document
            .dashboard_cards
            .iter_mut()
            .find(|c| c.id == updated.id)
        else {
            debug!("update_card: unknown card id {:?}", updated.id);
            return Ok(());
        };
        let title = updated.title.clone();
        *existing = updated;

        self.commit(
            &actor.username,
            "تحديث بطاقة",
            format!("حدّث بطاقة \"{}\" في لوحة التحكم.", title),
        )
    }

    /// Remove an id-matched card. Requires the customizer capability.
    /// Unknown ids are a silent no-op with no audit entry.
    pub fn delete_card(&mut self, card_id: &str) -> Result<(), StoreError> {
        let actor = self.require_customizer()?;

        let Some(card) = self
            .document
            .dashboard_cards
            .iter()
            .find(|c| c.id == card_id)
            .cloned()
        else {
            debug!("delete_card: unknown card id {:?}", card_id);
            return Ok(());
        };
        self.document.dashboard_cards.retain(|c| c.id != card_id);

        self.commit(
            &actor.username,
            "حذف بطاقة",
            format!("حذف بطاقة \"{}\" من لوحة التحكم.", card.title),
        )
    }

    // ---- Theme and notes -----------------------------------------------------

    /// Replace the theme singleton. Requires the customizer capability.
    pub fn update_theme(&mut self, settings: ThemeSettings) -> Result<(), StoreError> {
        let actor = self.require_customizer()?;
        self.document.theme_settings = settings;
        self.commit(
            &actor.username,
            "تحديث المظهر",
            "قام بتغيير إعدادات مظهر الواجهة.".to_string(),
        )
    }

    /// Replace the shared-notes singleton. Requires the customizer capability.
    pub fn update_shared_notes(&mut self, notes: SharedNotes) -> Result<(), StoreError> {
        let actor = self.require_customizer()?;
        self.document.shared_notes = notes;
        self.commit(
            &actor.username,
            "تحديث الملاحظات",
            "قام بتحديث الملاحظات المشتركة.".to_string(),
        )
    }

    /// Post a note stamped with the acting user's id/name and the current
    /// UTC time, prepended newest-first. Any authenticated user may post.
    /// Returns the new note's id.
    pub fn add_collaborative_note(&mut self, content: &str) -> Result<String, StoreError> {
        let actor = self
            .current_user
            .clone()
            .ok_or(StoreError::NotLoggedIn)?;

        let note = CollaborativeNote {
            id: format!("note-{}", Uuid::new_v4()),
            content: content.to_string(),
            author_id: actor.id.clone(),
            author_name: actor.username.clone(),
            timestamp: Utc::now().to_rfc3339(),
        };
        let id = note.id.clone();
        self.document.collaborative_notes.insert(0, note);

        self.commit(
            &actor.username,
            "إضافة ملاحظة فريق",
            format!("أضاف ملاحظة: \"{}\"", content),
        )?;
        Ok(id)
    }

    /// Remove a note by id. Allowed for the note's author and for any
    /// admin-level user; anyone else gets [`StoreError::NotNoteAuthor`].
    /// Unknown ids are a silent no-op with no audit entry.
    pub fn delete_collaborative_note(&mut self, note_id: &str) -> Result<(), StoreError> {
        let actor = self
            .current_user
            .clone()
            .ok_or(StoreError::NotLoggedIn)?;

        let Some(note) = self
            .document
            .collaborative_notes
            .iter()
            .find(|n| n.id == note_id)
            .cloned()
        else {
            debug!("delete_collaborative_note: unknown note id {:?}", note_id);
            return Ok(());
        };
        if note.author_id != actor.id && !actor.permissions.satisfies(PermissionLevel::Admin) {
            return Err(StoreError::NotNoteAuthor);
        }
        self.document.collaborative_notes.retain(|n| n.id != note_id);

        self.commit(
            &actor.username,
            "حذف ملاحظة فريق",
            format!("حذف ملاحظة: \"{}\"", note.content),
        )
    }

    // ---- Cross-tab sync --------------------------------------------------------

    /// Apply the newest document announced by another tab, if any.
    ///
    /// Blunt full replace: the freshly parsed payload becomes the in-memory
    /// document wholesale — no merge, no conflict resolution, no password
    /// re-derivation. Last writer across tabs wins; local in-flight edits
    /// that were never saved are clobbered. That matches the original
    /// behavior and is an accepted limitation, not a bug.
    ///
    /// # Returns
    /// * `true` when a remote document was applied
    pub fn sync_external_changes(&mut self) -> bool {
        let Some((_, subscription)) = &self.bus else {
            return false;
        };
        let Some(payload) = subscription.latest() else {
            return false;
        };

        match serde_json::from_str::<PersistedDocument>(&payload) {
            Ok(persisted) => {
                self.document = persisted.into_document(&SEED_DOCUMENT);
                true
            }
            Err(err) => {
                warn!("ignoring unparseable cross-tab payload: {}", err);
                false
            }
        }
    }

    // ---- Persistence -------------------------------------------------------------

    /// Append one audit entry (newest first) and persist the full document.
    fn commit(&mut self, actor: &str, action: &str, details: String) -> Result<(), StoreError> {
        let entry = AuditLogEntry {
            id: format!("log-{}", Uuid::new_v4()),
            timestamp: Utc::now().to_rfc3339(),
            user: actor.to_string(),
            action: action.to_string(),
            details,
        };
        self.document.audit_log.insert(0, entry);
        self.save()
    }

    /// Serialize the whole document — passwords stripped — and write it in
    /// one storage operation, then announce the write on the bus.
    fn save(&self) -> Result<(), StoreError> {
        let payload = serde_json::to_string_pretty(&self.document.sanitized())?;
        self.storage.write(&payload)?;
        if let Some((bus, subscription)) = &self.bus {
            bus.publish(subscription.id(), &payload);
        }
        Ok(())
    }
}
