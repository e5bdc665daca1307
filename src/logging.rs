//! Logging utilities for trajmap.
//!
//! Structured `tracing` helpers shared by the plotting operations and the
//! command-line binary.

use std::time::Instant;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Initialize the tracing subscriber with the given log level.
///
/// `RUST_LOG` wins over the configured level when it is set.
pub fn init_tracing(log_level: &str) {
    let filter = match std::env::var("RUST_LOG") {
        Ok(val) => val,
        Err(_) => log_level.to_string(),
    };

    // A subscriber may already be installed (tests, embedding applications)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .try_init();
}

/// Log a start message for a significant operation
pub fn log_operation_start(operation: &str, details: Option<&str>) {
    if let Some(details) = details {
        info!(
            operation = operation,
            details = details,
            "Starting operation"
        );
    } else {
        info!(operation = operation, "Starting operation");
    }
}

/// Log the completion of a significant operation
pub fn log_operation_end(operation: &str, start_time: Instant, success: bool) {
    let duration_ms = start_time.elapsed().as_secs_f64() * 1000.0;

    if success {
        info!(
            operation = operation,
            duration_ms = duration_ms,
            "Operation completed successfully"
        );
    } else {
        warn!(
            operation = operation,
            duration_ms = duration_ms,
            "Operation completed with warnings"
        );
    }
}

/// Run `f`, logging its duration under a fresh render id
pub fn log_timed_operation<F, R>(operation: &str, f: F) -> R
where
    F: FnOnce() -> R,
{
    let start = Instant::now();
    let render_id = generate_render_id();

    debug!(
        operation = operation,
        render_id = %render_id,
        "Starting operation"
    );

    let result = f();

    info!(
        operation = operation,
        render_id = %render_id,
        duration_ms = start.elapsed().as_secs_f64() * 1000.0,
        "Operation completed"
    );

    result
}

/// Log a summary of a loaded scene document
pub fn log_scene_stats(file_path: &str, layer_count: usize, layer_kinds: &[&str], has_colorbar: bool) {
    info!(
        operation = "scene_load",
        file_path = file_path,
        layer_count = layer_count,
        layers = %layer_kinds.join(", "),
        colorbar = has_colorbar,
        "Scene loaded successfully"
    );
}

/// Log an error with context
pub fn log_error(error: &crate::error::TrajmapError, context: &str) {
    error!(
        error = %error,
        context = context,
        error_type = std::any::type_name_of_val(error),
        "Error occurred"
    );
}

/// Generate a unique render ID
pub fn generate_render_id() -> String {
    Uuid::new_v4().to_string()
}
