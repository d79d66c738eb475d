//! Health check command.

use serde::Serialize;
use tabled::Tabled;

use docvault_core::error::AppError;

use super::Runtime;
use crate::output::{self, OutputFormat};

/// Component health row
#[derive(Debug, Serialize, Tabled)]
struct HealthRow {
    /// Component name
    component: String,
    /// Whether it responded
    healthy: bool,
}

/// Execute the health command
pub async fn execute(runtime: &Runtime, format: OutputFormat) -> Result<(), AppError> {
    let mut rows = vec![HealthRow {
        component: "database".to_string(),
        healthy: runtime.db.health_check().await.unwrap_or(false),
    }];

    let mut backends: Vec<(String, bool)> =
        runtime.vault.storage.health_check_all().await.into_iter().collect();
    backends.sort();
    rows.extend(backends.into_iter().map(|(backend, healthy)| HealthRow {
        component: format!("storage:{backend}"),
        healthy,
    }));

    let unhealthy = rows.iter().filter(|r| !r.healthy).count();
    output::print_list(&rows, format);
    if unhealthy > 0 {
        output::print_warning(&format!("{unhealthy} component(s) unhealthy"));
    }
    Ok(())
}
