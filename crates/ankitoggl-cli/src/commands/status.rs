//! Status subcommand: inspect the sync ledger.

use ankitoggl_core::{Config, SyncKey, SyncLedger, SyncRecord};

/// Run the status command.
pub fn run(all: bool) -> Result<(), Box<dyn std::error::Error>> {
    let ledger = SyncLedger::open_default()?;

    if all {
        if ledger.is_empty() {
            println!("No syncs recorded.");
            return Ok(());
        }
        let mut entries: Vec<_> = ledger.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        for (key, record) in entries {
            println!("{key}");
            print_record(record);
        }
        return Ok(());
    }

    let config = Config::load()?;
    let timezone = config.resolve_timezone()?;
    let key = SyncKey::for_spec(timezone.now().date_naive(), &config.entry_spec());
    match ledger.get_synced_entry(&key) {
        Some(record) => {
            println!("{}", key.storage_key());
            print_record(record);
        }
        None => println!("No sync recorded for today ({}).", key.target_date),
    }
    Ok(())
}

fn print_record(record: &SyncRecord) {
    println!(
        "  action    = {}",
        record
            .action
            .map(|a| a.as_str())
            .unwrap_or("unknown")
    );
    println!(
        "  duration  = {}s",
        record.duration_seconds.unwrap_or(0)
    );
    match record.toggl_id {
        Some(id) => println!("  toggl_id  = {id}"),
        None => println!("  toggl_id  = none"),
    }
    println!("  synced_at = {}", record.synced_at);
}
