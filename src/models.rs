//! Data models for foundation inventory snapshots.
//!
//! This module contains the documents exchanged with each foundation's
//! snapshot endpoints and the records they carry. All wire shapes use
//! camelCase keys and tolerate missing fields, so a sparse document
//! still decodes into a usable value.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// A remote foundation contributing inventory data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    /// Foundation name; identity of the source.
    pub name: String,
    /// Base network address, without scheme (e.g. `butler.prod.example.com`).
    pub address: String,
}

impl Source {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.address)
    }
}

/// Stamps the originating foundation onto a record.
pub trait Tag: Sized {
    /// Returns a copy of the record annotated with `foundation`.
    fn tag(self, foundation: &str) -> Self;
}

/// Tags every record of one foundation's contribution.
pub fn tag_all<T: Tag>(records: Vec<T>, foundation: &str) -> Vec<T> {
    records.into_iter().map(|r| r.tag(foundation)).collect()
}

/// A deployed application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppDetail {
    /// Originating foundation (empty until tagged).
    pub foundation: String,
    pub organization: String,
    pub space: String,
    pub app_id: String,
    pub app_name: String,
    pub buildpack: String,
    pub buildpack_version: String,
    /// Docker image, for image-based applications.
    pub image: String,
    pub stack: String,
    pub running_instances: u32,
    pub total_instances: u32,
    /// Memory used, in bytes.
    pub memory_used: u64,
    /// Disk used, in bytes.
    pub disk_used: u64,
    pub urls: Vec<String>,
    pub last_pushed: Option<DateTime<Utc>>,
    pub last_event: String,
    pub last_event_actor: String,
    pub last_event_time: Option<DateTime<Utc>>,
    pub requested_state: String,
}

impl Tag for AppDetail {
    fn tag(self, foundation: &str) -> Self {
        Self {
            foundation: foundation.to_string(),
            ..self
        }
    }
}

/// A provisioned service instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServiceInstanceDetail {
    /// Originating foundation (empty until tagged).
    pub foundation: String,
    pub organization: String,
    pub space: String,
    pub service_instance_id: String,
    pub name: String,
    pub service: String,
    pub description: String,
    pub plan: String,
    /// Instance type (managed, user-provided, ...).
    #[serde(rename = "type")]
    pub kind: String,
    /// Names of applications bound to this instance.
    pub applications: Vec<String>,
    pub last_operation: String,
    pub last_updated: Option<DateTime<Utc>>,
    pub dashboard_url: String,
    pub requested_state: String,
}

impl Tag for ServiceInstanceDetail {
    fn tag(self, foundation: &str) -> Self {
        Self {
            foundation: foundation.to_string(),
            ..self
        }
    }
}

/// A binding between an application and a service instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppRelationship {
    /// Originating foundation (empty until tagged).
    pub foundation: String,
    pub organization: String,
    pub space: String,
    pub app_id: String,
    pub app_name: String,
    pub service_instance_id: String,
    pub service_name: String,
    pub service_plan: String,
    pub service_type: String,
}

impl Tag for AppRelationship {
    fn tag(self, foundation: &str) -> Self {
        Self {
            foundation: foundation.to_string(),
            ..self
        }
    }
}

/// Full inventory document.
///
/// Served per foundation at `/snapshot/detail`; also the shape of the
/// merged cross-foundation detail report. `Default` is the empty document
/// substituted for an unreachable foundation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SnapshotDetail {
    pub applications: Vec<AppDetail>,
    pub service_instances: Vec<ServiceInstanceDetail>,
    pub application_relationships: Vec<AppRelationship>,
    pub user_accounts: BTreeSet<String>,
    pub service_accounts: BTreeSet<String>,
}

impl SnapshotDetail {
    /// True when every collection is empty.
    pub fn is_empty(&self) -> bool {
        self.applications.is_empty()
            && self.service_instances.is_empty()
            && self.application_relationships.is_empty()
            && self.user_accounts.is_empty()
            && self.service_accounts.is_empty()
    }
}

/// Counts-only inventory document, served at `/snapshot/summary`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SnapshotSummary {
    pub application_counts: ApplicationCounts,
    pub service_instance_counts: ServiceInstanceCounts,
}

/// Application tallies for one foundation, or summed across foundations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApplicationCounts {
    pub by_buildpack: BTreeMap<String, u64>,
    pub by_stack: BTreeMap<String, u64>,
    /// Keyed by state label: running, stopped, crashed, ...
    pub by_status: BTreeMap<String, u64>,
    pub total_applications: u64,
    pub total_running_application_instances: u64,
    pub total_stopped_application_instances: u64,
    pub total_crashed_application_instances: u64,
    pub total_application_instances: u64,
}

/// Service instance tallies for one foundation, or summed across foundations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServiceInstanceCounts {
    pub by_service: BTreeMap<String, u64>,
    pub by_service_and_plan: BTreeMap<String, u64>,
    pub total_service_instances: u64,
}
