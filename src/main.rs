use std::env;
use std::sync::Arc;

use prp_dashboard::document::PermissionLevel;
use prp_dashboard::storage::{FileStorage, MemoryStorage};
use prp_dashboard::store::Store;

const DATA_FILE: &str = "database/appdata.json";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!("usage: {} <username> <password>", args[0]);
        std::process::exit(2);
    }

    let storage = Arc::new(FileStorage::new(DATA_FILE)?);
    let session = Arc::new(MemoryStorage::new());
    let mut store = Store::open(storage, session)?;

    if !store.login(&args[1], &args[2])? {
        eprintln!("invalid username or password");
        std::process::exit(1);
    }

    let user = store.current_user().cloned().expect("just logged in");
    println!("مرحباً، {} ({:?})", user.username, user.permissions);

    println!("\nDashboard cards:");
    for card in &store.document().dashboard_cards {
        if card.admin_only && !store.has_permission(PermissionLevel::Admin) {
            continue;
        }
        println!("  [{}] {} -> {}", card.id, card.title, card.path);
    }

    println!("\nSheets:");
    for sheet in &store.document().sheets {
        println!(
            "  [{}] {} — {} columns, {} rows",
            sheet.id,
            sheet.title,
            sheet.headers.len(),
            sheet.rows.len()
        );
    }

    println!("\nLatest audit entries:");
    for entry in store.document().audit_log.iter().take(5) {
        println!("  {} {} — {}", entry.timestamp, entry.action, entry.details);
    }

    store.logout()?;
    Ok(())
}
