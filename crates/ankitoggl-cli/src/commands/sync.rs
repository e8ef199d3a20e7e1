//! Sync subcommand: run one sync attempt against the configured Toggl
//! workspace.

use std::path::PathBuf;

use ankitoggl_core::{sync_review_time_to_toggl, AnkiCollection, Config, SyncOutcome, Timezone};

/// Run the sync command.
pub fn run(
    collection: Option<PathBuf>,
    timezone: Option<String>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    config.validate()?;

    let timezone = match timezone {
        Some(name) => Some(Timezone::new(&name)?),
        None => None,
    };

    let collection_path =
        collection.unwrap_or_else(|| PathBuf::from(&config.collection_path));
    if collection_path.as_os_str().is_empty() {
        return Err(
            "no collection path configured; set collection_path or pass --collection".into(),
        );
    }

    // An unopenable collection is a skip, not a failure: Anki may simply not
    // have created it yet on this machine.
    let col = match AnkiCollection::open(&collection_path) {
        Ok(col) => col,
        Err(e) => {
            print_skipped(&format!("cannot open collection: {e}"), json);
            return Ok(());
        }
    };

    let spec = config.entry_spec();
    match sync_review_time_to_toggl(&col, &config.api_token, &spec, timezone) {
        Ok(SyncOutcome::Synced(response)) => {
            if json {
                let entry_id = response.json().and_then(|v| v["id"].as_i64());
                println!(
                    "{}",
                    serde_json::json!({
                        "outcome": "synced",
                        "status": response.status,
                        "entry_id": entry_id,
                    })
                );
            } else {
                println!("Synced review time to Toggl (HTTP {})", response.status);
            }
            Ok(())
        }
        Ok(SyncOutcome::Skipped { reason }) => {
            print_skipped(&reason, json);
            Ok(())
        }
        Err(e) => Err(format!(
            "sync failed (HTTP {}): {}",
            e.status_code(),
            e.response_text()
        )
        .into()),
    }
}

fn print_skipped(reason: &str, json: bool) {
    if json {
        println!(
            "{}",
            serde_json::json!({"outcome": "skipped", "reason": reason})
        );
    } else {
        println!("Sync skipped: {reason}");
    }
}
