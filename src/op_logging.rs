//! Debug operation logging.
//!
//! When `debug_logging` is enabled in the engine config, every mutating
//! engine operation is appended as a JSONL line to
//! `~/.taskforest/engine-ops.jsonl`. This allows reconstructing what edits
//! a document received without instrumenting the caller.

use crate::config::EngineConfig;
use crate::partition::PartitionKey;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

/// Log file name within the data directory.
pub const OPERATIONS_FILE: &str = "engine-ops.jsonl";

/// Log an engine operation if debug logging is enabled.
///
/// Errors are silently ignored — logging must never break an edit.
pub fn log_operation(partition: &PartitionKey, operation: &str, node_id: Option<&str>) {
    let Some(dir) = crate::paths::data_dir() else {
        return;
    };
    log_operation_in(&dir, partition, operation, node_id);
}

/// Log an engine operation in a specific base directory (for testing).
pub fn log_operation_in(
    base_dir: &Path,
    partition: &PartitionKey,
    operation: &str,
    node_id: Option<&str>,
) {
    // Load config — if it fails, skip logging
    let Ok(Some(config)) = EngineConfig::load_from(base_dir) else {
        return;
    };
    if !config.debug_logging {
        return;
    }

    write_entry(base_dir, partition, operation, node_id);
}

fn write_entry(base_dir: &Path, partition: &PartitionKey, operation: &str, node_id: Option<&str>) {
    let entry = serde_json::json!({
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "partition": partition.to_string(),
        "operation": operation,
        "node_id": node_id,
    });

    let Ok(mut file) = OpenOptions::new()
        .create(true)
        .append(true)
        .open(base_dir.join(OPERATIONS_FILE))
    else {
        return;
    };
    let _ = writeln!(file, "{entry}");
}
