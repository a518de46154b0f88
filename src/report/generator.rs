//! CSV and JSON report generation.
//!
//! This module renders merged inventory collections as text. It only reads
//! the tagged records it is given and has no knowledge of how they were
//! gathered.

use crate::models::{AppDetail, ServiceInstanceDetail};
use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

const APP_DETAIL_HEADER: &[&str] = &[
    "foundation",
    "organization",
    "space",
    "application id",
    "application name",
    "buildpack",
    "buildpack version",
    "image",
    "stack",
    "running instances",
    "total instances",
    "memory used (in bytes)",
    "disk used (in bytes)",
    "urls",
    "last pushed",
    "last event",
    "last event actor",
    "last event time",
    "requested state",
];

const SERVICE_INSTANCE_DETAIL_HEADER: &[&str] = &[
    "foundation",
    "organization",
    "space",
    "service instance id",
    "name",
    "service",
    "description",
    "plan",
    "type",
    "bound applications",
    "last operation",
    "last updated",
    "dashboard url",
    "requested state",
];

/// Generate the application inventory CSV.
pub fn generate_app_detail_csv(apps: &[AppDetail]) -> String {
    let mut csv = String::new();
    push_row(&mut csv, APP_DETAIL_HEADER.iter().map(|h| h.to_string()));

    for app in apps {
        push_row(
            &mut csv,
            [
                app.foundation.clone(),
                app.organization.clone(),
                app.space.clone(),
                app.app_id.clone(),
                app.app_name.clone(),
                app.buildpack.clone(),
                app.buildpack_version.clone(),
                app.image.clone(),
                app.stack.clone(),
                app.running_instances.to_string(),
                app.total_instances.to_string(),
                app.memory_used.to_string(),
                app.disk_used.to_string(),
                app.urls.join(","),
                format_timestamp(app.last_pushed),
                app.last_event.clone(),
                app.last_event_actor.clone(),
                format_timestamp(app.last_event_time),
                app.requested_state.clone(),
            ],
        );
    }

    csv
}

/// Generate the service instance inventory CSV.
pub fn generate_service_instance_detail_csv(instances: &[ServiceInstanceDetail]) -> String {
    let mut csv = String::new();
    push_row(
        &mut csv,
        SERVICE_INSTANCE_DETAIL_HEADER.iter().map(|h| h.to_string()),
    );

    for si in instances {
        push_row(
            &mut csv,
            [
                si.foundation.clone(),
                si.organization.clone(),
                si.space.clone(),
                si.service_instance_id.clone(),
                si.name.clone(),
                si.service.clone(),
                si.description.clone(),
                si.plan.clone(),
                si.kind.clone(),
                si.applications.join(","),
                si.last_operation.clone(),
                format_timestamp(si.last_updated),
                si.dashboard_url.clone(),
                si.requested_state.clone(),
            ],
        );
    }

    csv
}

/// Generate a pretty-printed JSON report.
pub fn generate_json_report<T: Serialize>(report: &T) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Write a rendered report to a file.
pub fn write_report(content: &str, path: &Path) -> Result<()> {
    let mut file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    file.write_all(content.as_bytes())
        .with_context(|| format!("Failed to write report to {}", path.display()))?;

    Ok(())
}

fn push_row(csv: &mut String, fields: impl IntoIterator<Item = String>) {
    let row: Vec<String> = fields.into_iter().map(|f| escape_csv(&f)).collect();
    csv.push_str(&row.join(","));
    csv.push('\n');
}

fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

fn format_timestamp(ts: Option<DateTime<Utc>>) -> String {
    ts.map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_default()
}
