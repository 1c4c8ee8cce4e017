use serde::{Deserialize, Serialize};

use crate::sheet::Sheet;

/// Ranked capability gating which mutations a user may request.
///
/// The variants are declared in rank order, so the derived `Ord` gives the
/// fixed hierarchy `read_only < data_entry < editor < admin`.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum PermissionLevel {
    ReadOnly,
    DataEntry,
    Editor,
    Admin,
}

impl PermissionLevel {
    /// True iff this level is ranked at or above `required`.
    pub fn satisfies(self, required: PermissionLevel) -> bool {
        self >= required
    }
}

/// A registered dashboard user.
///
/// Passwords are optional because they are stripped before every durable
/// write; only the compiled-in seed catalog carries them, and they are
/// re-attached on load. The `customizer` flag is a capability orthogonal to
/// the permission hierarchy: it gates theme, shared-notes and dashboard-card
/// editing, and is not implied by `Admin`.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub permissions: PermissionLevel,
    #[serde(default)]
    pub customizer: bool,
}

/// One entry of the append-only, newest-first audit trail.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct AuditLogEntry {
    pub id: String,
    /// RFC 3339 timestamp.
    pub timestamp: String,
    /// Username of the acting user.
    pub user: String,
    pub action: String,
    pub details: String,
}

/// A navigation card on the main dashboard. `path` is either an internal
/// route or an external URL.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardCard {
    pub id: String,
    pub title: String,
    pub path: String,
    /// Name of the icon rendered by the UI layer.
    pub icon: String,
    pub desc: String,
    #[serde(default)]
    pub admin_only: bool,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ThemeSettings {
    pub background_color: String,
    pub background_image: String,
}

/// Singleton notes block shown on the dashboard, editable only with the
/// customizer capability.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct SharedNotes {
    pub title: String,
    pub content: String,
}

/// A note any authenticated user can post; deletable by its author or by an
/// admin-level user.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CollaborativeNote {
    pub id: String,
    pub content: String,
    pub author_id: String,
    pub author_name: String,
    /// RFC 3339 timestamp.
    pub timestamp: String,
}

/// The full application aggregate. One instance per tab, persisted as a
/// single JSON record.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub users: Vec<User>,
    pub sheets: Vec<Sheet>,
    pub audit_log: Vec<AuditLogEntry>,
    pub dashboard_cards: Vec<DashboardCard>,
    pub theme_settings: ThemeSettings,
    pub shared_notes: SharedNotes,
    pub collaborative_notes: Vec<CollaborativeNote>,
}

impl Document {
    pub fn sheet(&self, sheet_id: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.id == sheet_id)
    }

    pub fn sheet_mut(&mut self, sheet_id: &str) -> Option<&mut Sheet> {
        self.sheets.iter_mut().find(|s| s.id == sheet_id)
    }

    pub fn user_by_id(&self, user_id: &str) -> Option<&User> {
        self.users.iter().find(|u| u.id == user_id)
    }

    /// A copy with every password removed, suitable for durable storage.
    /// Passwords live only in the seed catalog and must never be persisted.
    pub fn sanitized(&self) -> Document {
        let mut doc = self.clone();
        for user in &mut doc.users {
            user.password = None;
        }
        doc
    }
}

/// Tolerant deserialization shape for documents coming back from storage.
/// Older documents may predate the card list, the singletons or the note
/// lists, so those fields are optional here and filled from the seed.
#[derive(Clone, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PersistedDocument {
    pub users: Vec<User>,
    pub sheets: Vec<Sheet>,
    #[serde(default)]
    pub audit_log: Vec<AuditLogEntry>,
    #[serde(default)]
    pub dashboard_cards: Vec<DashboardCard>,
    #[serde(default)]
    pub theme_settings: Option<ThemeSettings>,
    #[serde(default)]
    pub shared_notes: Option<SharedNotes>,
    #[serde(default)]
    pub collaborative_notes: Vec<CollaborativeNote>,
}

impl PersistedDocument {
    /// Structural conversion only: missing singletons fall back to the seed.
    /// No sheet/card merging and no password re-derivation happens here;
    /// that is `reconcile`'s job. Cross-tab sync uses this directly because
    /// a remote write is replayed verbatim, not re-merged.
    pub fn into_document(self, seed: &Document) -> Document {
        Document {
            users: self.users,
            sheets: self.sheets,
            audit_log: self.audit_log,
            dashboard_cards: self.dashboard_cards,
            theme_settings: self
                .theme_settings
                .unwrap_or_else(|| seed.theme_settings.clone()),
            shared_notes: self
                .shared_notes
                .unwrap_or_else(|| seed.shared_notes.clone()),
            collaborative_notes: self.collaborative_notes,
        }
    }
}

/// Merge a persisted document against the compiled-in seed catalogs.
///
/// Applied on every startup when persisted data exists:
/// - seed sheets whose id is absent from the persisted list are appended;
/// - seed cards whose id is absent are inserted immediately before the first
///   `adminOnly` card if one exists, otherwise appended;
/// - every persisted user's password is overwritten from the seed entry with
///   the same id (storage is never trusted for credentials);
/// - missing singletons and lists default to the seed values.
///
/// Pure over its inputs; running it twice over its own saved output is a
/// fixed point.
pub fn reconcile(persisted: PersistedDocument, seed: &Document) -> Document {
    let mut doc = persisted.into_document(seed);

    for seed_sheet in &seed.sheets {
        if !doc.sheets.iter().any(|s| s.id == seed_sheet.id) {
            doc.sheets.push(seed_sheet.clone());
        }
    }

    let missing_cards: Vec<DashboardCard> = seed
        .dashboard_cards
        .iter()
        .filter(|seed_card| !doc.dashboard_cards.iter().any(|c| c.id == seed_card.id))
        .cloned()
        .collect();
    if !missing_cards.is_empty() {
        match doc.dashboard_cards.iter().position(|c| c.admin_only) {
            Some(admin_index) => {
                doc.dashboard_cards
                    .splice(admin_index..admin_index, missing_cards);
            }
            None => doc.dashboard_cards.extend(missing_cards),
        }
    }

    for user in &mut doc.users {
        user.password = seed
            .users
            .iter()
            .find(|seed_user| seed_user.id == user.id)
            .and_then(|seed_user| seed_user.password.clone());
    }

    doc
}
