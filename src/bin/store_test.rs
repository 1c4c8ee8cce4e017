use std::sync::Arc;

use prp_dashboard::document::{PermissionLevel, SharedNotes, ThemeSettings, User};
use prp_dashboard::storage::{FileStorage, MemoryStorage, Storage};
use prp_dashboard::store::{CardDraft, Store, StoreError};

fn fresh_store() -> (Store, Arc<MemoryStorage>) {
    let storage = Arc::new(MemoryStorage::new());
    let store = Store::open(storage.clone(), Arc::new(MemoryStorage::new())).unwrap();
    (store, storage)
}

fn test_login_logout() {
    println!("\n====== Testing login/logout ======");
    let (mut store, _) = fresh_store();

    assert!(!store.login("admin", "wrong-password").unwrap());
    assert!(store.current_user().is_none());
    assert!(store.document().audit_log.is_empty());
    println!("✓ Failed login: no session, no audit entry, no state change");

    assert!(!store.login("nobody", "admin").unwrap());
    println!("✓ Unknown username rejected");

    assert!(store.login("admin", "admin").unwrap());
    assert_eq!(store.current_user().unwrap().username, "admin");
    assert_eq!(store.document().audit_log.len(), 1);
    assert_eq!(store.document().audit_log[0].action, "تسجيل الدخول");
    println!("✓ Successful login sets the session and logs one entry");

    store.logout().unwrap();
    assert!(store.current_user().is_none());
    assert_eq!(store.document().audit_log.len(), 2);
    assert_eq!(store.document().audit_log[0].action, "تسجيل الخروج");
    assert_eq!(store.document().audit_log[0].user, "admin");
    println!("✓ Logout clears the session and references the previous user");

    let before = store.document().audit_log.len();
    store.logout().unwrap();
    assert_eq!(store.document().audit_log.len(), before);
    println!("✓ Logout while logged out is a silent no-op");
}

fn test_session_restore() {
    println!("\n====== Testing session persistence ======");
    let storage = Arc::new(MemoryStorage::new());
    let session: Arc<MemoryStorage> = Arc::new(MemoryStorage::new());

    let mut store = Store::open(storage.clone(), session.clone()).unwrap();
    assert!(store.login("Saja.122", "saja155").unwrap());
    drop(store);

    // Same browsing session: the user survives a reload.
    let store = Store::open(storage.clone(), session.clone()).unwrap();
    assert_eq!(store.current_user().unwrap().username, "Saja.122");
    assert!(store.is_customizer());
    println!("✓ Active user restored from the session record");

    // New browsing session: a fresh session store starts logged out.
    let store = Store::open(storage, Arc::new(MemoryStorage::new())).unwrap();
    assert!(store.current_user().is_none());
    println!("✓ A new browsing session starts logged out");
}

fn test_permission_enforcement() {
    println!("\n====== Testing API-boundary permission checks ======");
    let (mut store, _) = fresh_store();

    assert!(matches!(
        store.update_cell("cleanliness", 0, 0, "x"),
        Err(StoreError::NotLoggedIn)
    ));
    println!("✓ Mutations without a session fail with NotLoggedIn");

    assert!(store.login("Ahmad.122", "ahmad217").unwrap());

    // data_entry may edit cells but not add columns or manage users.
    store.update_cell("cleanliness", 0, 0, "تم").unwrap();
    match store.add_column("cleanliness", "اسم الموظف") {
        Err(StoreError::PermissionDenied { required, actual }) => {
            assert_eq!(required, PermissionLevel::Editor);
            assert_eq!(actual, PermissionLevel::DataEntry);
        }
        other => panic!("expected PermissionDenied, got {:?}", other.err()),
    }
    assert!(matches!(
        store.delete_user("user-3"),
        Err(StoreError::PermissionDenied { .. })
    ));
    println!("✓ data_entry: cell edits allowed, columns and user CRUD denied");

    // Admin without the customizer flag cannot touch cards/theme/notes.
    store.logout().unwrap();
    assert!(store.login("admin", "admin").unwrap());
    assert!(matches!(
        store.update_theme(ThemeSettings {
            background_color: "#fff".into(),
            background_image: String::new(),
        }),
        Err(StoreError::CustomizerRequired)
    ));
    assert!(matches!(
        store.add_card(CardDraft {
            title: "t".into(),
            path: "/x".into(),
            icon: "SheetIcon".into(),
            desc: String::new(),
            admin_only: false,
        }),
        Err(StoreError::CustomizerRequired)
    ));
    println!("✓ admin without the capability is refused customization");

    // The customizer can.
    store.logout().unwrap();
    assert!(store.login("Saja.122", "saja155").unwrap());
    store
        .update_shared_notes(SharedNotes {
            title: "مهام".into(),
            content: "جرد المخزن".into(),
        })
        .unwrap();
    let id = store
        .add_card(CardDraft {
            title: "تقارير".into(),
            path: "https://example.com/reports".into(),
            icon: "DashboardIcon".into(),
            desc: "روابط خارجية".into(),
            admin_only: false,
        })
        .unwrap();
    assert!(store.document().dashboard_cards.iter().any(|c| c.id == id));
    store.delete_card(&id).unwrap();
    println!("✓ Customizer may edit notes and cards");
}

fn test_forgiving_no_ops() {
    println!("\n====== Testing forgiving no-ops ======");
    let (mut store, _) = fresh_store();
    assert!(store.login("admin", "admin").unwrap());
    let baseline = store.document().audit_log.len();

    store.update_cell("no-such-sheet", 0, 0, "x").unwrap();
    store.update_cell("cleanliness", 999, 0, "x").unwrap();
    store.update_cell("cleanliness", 0, 999, "x").unwrap();
    store.delete_user("no-such-user").unwrap();
    store
        .update_user(User {
            id: "no-such-user".into(),
            username: "ghost".into(),
            password: None,
            permissions: PermissionLevel::ReadOnly,
            customizer: false,
        })
        .unwrap();
    store.delete_collaborative_note("no-such-note").unwrap();

    assert_eq!(store.document().audit_log.len(), baseline);
    println!("✓ Unknown ids and out-of-bounds cells: no mutation, no audit entry");
}

fn test_user_crud_and_password_sentinel() {
    println!("\n====== Testing user CRUD ======");
    let (mut store, _) = fresh_store();
    assert!(store.login("admin", "admin").unwrap());

    store
        .add_user(User {
            id: "user-5".into(),
            username: "Lina.122".into(),
            password: Some("lina999".into()),
            permissions: PermissionLevel::Editor,
            customizer: false,
        })
        .unwrap();
    assert!(store.document().user_by_id("user-5").is_some());
    assert_eq!(store.document().audit_log[0].action, "إضافة مستخدم");
    println!("✓ add_user inserts and audits");

    // password: None is the explicit "unchanged" sentinel.
    store
        .update_user(User {
            id: "user-5".into(),
            username: "Lina.122".into(),
            password: None,
            permissions: PermissionLevel::Admin,
            customizer: false,
        })
        .unwrap();
    let updated = store.document().user_by_id("user-5").unwrap();
    assert_eq!(updated.permissions, PermissionLevel::Admin);
    assert_eq!(updated.password.as_deref(), Some("lina999"));
    println!("✓ update_user with password: None keeps the stored password");

    store
        .update_user(User {
            id: "user-5".into(),
            username: "Lina.122".into(),
            password: Some("brand-new".into()),
            permissions: PermissionLevel::Admin,
            customizer: false,
        })
        .unwrap();
    assert_eq!(
        store.document().user_by_id("user-5").unwrap().password.as_deref(),
        Some("brand-new")
    );
    println!("✓ update_user with a new password replaces it");

    store.delete_user("user-5").unwrap();
    assert!(store.document().user_by_id("user-5").is_none());
    assert_eq!(store.document().audit_log[0].action, "حذف مستخدم");
    println!("✓ delete_user removes and audits");
}

fn test_collaborative_note_authorization() {
    println!("\n====== Testing collaborative note deletion rights ======");
    let (mut store, _) = fresh_store();

    assert!(store.login("Ahmad.122", "ahmad217").unwrap());
    let note_id = store.add_collaborative_note("الثلاجة الثانية تحتاج صيانة").unwrap();
    let note = &store.document().collaborative_notes[0];
    assert_eq!(note.id, note_id);
    assert_eq!(note.author_name, "Ahmad.122");
    println!("✓ Note stamped with the acting user, prepended newest-first");
    store.logout().unwrap();

    // Another non-admin is refused.
    assert!(store.login("khaled.122", "khaled.256").unwrap());
    assert!(matches!(
        store.delete_collaborative_note(&note_id),
        Err(StoreError::NotNoteAuthor)
    ));
    assert_eq!(store.document().collaborative_notes.len(), 1);
    println!("✓ A non-author non-admin cannot delete the note");
    store.logout().unwrap();

    // An admin can.
    assert!(store.login("admin", "admin").unwrap());
    store.delete_collaborative_note(&note_id).unwrap();
    assert!(store.document().collaborative_notes.is_empty());
    assert_eq!(store.document().audit_log[0].action, "حذف ملاحظة فريق");
    println!("✓ Admin may delete any note");
    store.logout().unwrap();

    // The author can delete their own.
    assert!(store.login("Ahmad.122", "ahmad217").unwrap());
    let second = store.add_collaborative_note("تم تغيير الفلاتر").unwrap();
    store.delete_collaborative_note(&second).unwrap();
    assert!(store.document().collaborative_notes.is_empty());
    println!("✓ Author may delete their own note");
}

fn test_password_non_persistence() {
    println!("\n====== Testing password non-persistence ======");
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("appdata.json");
    let storage = Arc::new(FileStorage::new(&path).unwrap());

    let mut store = Store::open(storage.clone(), Arc::new(MemoryStorage::new())).unwrap();
    assert!(store.login("admin", "admin").unwrap());
    store.update_cell("orders", 0, 0, "برجر لحم").unwrap();
    drop(store);

    let raw = storage.read().unwrap().expect("document persisted");
    assert!(!raw.contains("\"password\""), "no password field on disk");
    assert!(!raw.contains("saja155") && !raw.contains("ahmad217"));
    println!("✓ The persisted document carries no password for any user");

    // Reload: every password equals the seed's for that user id.
    let store = Store::open(storage, Arc::new(MemoryStorage::new())).unwrap();
    for user in &store.document().users {
        let seed_password = prp_dashboard::seed::seed_users()
            .into_iter()
            .find(|u| u.id == user.id)
            .and_then(|u| u.password);
        assert_eq!(user.password, seed_password);
    }
    println!("✓ Reload re-derives every password from the seed catalog");
}

fn test_audit_ordering() {
    println!("\n====== Testing audit log ordering ======");
    let (mut store, _) = fresh_store();
    assert!(store.login("Saja.122", "saja155").unwrap());

    let mut expected_len = 1; // login entry
    store.update_cell("expiry", 1, 0, "حليب").unwrap();
    expected_len += 1;
    store.add_column("expiry", "الكمية").unwrap();
    expected_len += 1;
    store
        .update_theme(ThemeSettings {
            background_color: "#111827".into(),
            background_image: String::new(),
        })
        .unwrap();
    expected_len += 1;

    let log = &store.document().audit_log;
    assert_eq!(log.len(), expected_len);
    let actions: Vec<&str> = log.iter().map(|e| e.action.as_str()).collect();
    assert_eq!(
        actions,
        vec!["تحديث المظهر", "إضافة خانة", "تحديث خلية", "تسجيل الدخول"]
    );
    println!("✓ Exactly one entry per mutation, newest first");

    for pair in log.windows(2) {
        assert!(pair[0].timestamp >= pair[1].timestamp);
    }
    println!("✓ Timestamps are reverse-chronological");
}

fn main() {
    test_login_logout();
    test_session_restore();
    test_permission_enforcement();
    test_forgiving_no_ops();
    test_user_crud_and_password_sentinel();
    test_collaborative_note_authorization();
    test_password_non_persistence();
    test_audit_ordering();
    println!("\nAll store tests passed!");
}
