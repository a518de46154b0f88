//! Cross-foundation snapshot assembly.
//!
//! [`SnapshotClient`] queries every registered foundation concurrently,
//! tags each record with the foundation it came from, and merges the
//! per-foundation contributions into single collections and reports.
//! Foundations that time out or fail contribute empty results; none of the
//! operations here can fail.

use crate::aggregation::{aggregate, fan_out, merge_all, Counts, Merge};
use crate::config::Config;
use crate::gateway::{Gateway, HttpTransport, SnapshotTransport};
use crate::models::{
    tag_all, AppDetail, AppRelationship, ApplicationCounts, ServiceInstanceCounts,
    ServiceInstanceDetail, SnapshotDetail, SnapshotSummary, Source,
};
use crate::report;
use anyhow::{Context, Result};
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Aggregates snapshots from a fixed set of foundations.
#[derive(Debug)]
pub struct SnapshotClient<T = HttpTransport> {
    gateway: Gateway<T>,
    sources: Vec<Source>,
    concurrency: usize,
}

impl SnapshotClient<HttpTransport> {
    /// Build a client speaking HTTPS to the foundations in `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let transport = HttpTransport::new(config.timeout(), config.client.ssl_validation_skipped)
            .context("Failed to create HTTP client")?;

        info!(
            foundations = config.foundations.len(),
            timeout_secs = config.client.timeout_seconds,
            "Initialized snapshot client"
        );

        Ok(Self::new(
            Gateway::new(transport, config.timeout()),
            config.sources(),
            config.general.concurrency,
        ))
    }
}

impl<T: SnapshotTransport> SnapshotClient<T> {
    pub fn new(gateway: Gateway<T>, sources: Vec<Source>, concurrency: usize) -> Self {
        Self {
            gateway,
            sources,
            concurrency,
        }
    }

    /// The registered foundations, in query order.
    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    /// Fetch every foundation's detail snapshot and merge the selected part.
    async fn gather_detail<C, S>(&self, what: &str, select: S) -> C
    where
        C: Merge,
        S: Fn(&Source, SnapshotDetail) -> C,
    {
        let select = &select;
        let parts = fan_out(&self.sources, self.concurrency, move |source| async move {
            let detail = self.gateway.fetch_detail(&source.address).await;
            select(source, detail)
        })
        .await;

        let merged = merge_all(parts);
        debug!(
            foundations = self.sources.len(),
            merged = merged.size(),
            "Assembled {}",
            what
        );
        merged
    }

    /// Fetch every foundation's summary snapshot and sum the selected tally.
    async fn gather_counts<C, S>(&self, what: &str, select: S) -> C
    where
        C: Counts,
        S: Fn(SnapshotSummary) -> C,
    {
        let select = &select;
        let parts = fan_out(&self.sources, self.concurrency, move |source| async move {
            select(self.gateway.fetch_summary(&source.address).await)
        })
        .await;

        debug!(foundations = parts.len(), "Aggregating {}", what);
        aggregate(parts)
    }

    /// All applications, tagged with their foundation.
    pub async fn assemble_application_detail(&self) -> Vec<AppDetail> {
        self.gather_detail("application detail", |source, detail| {
            tag_all(detail.applications, &source.name)
        })
        .await
    }

    /// All service instances, tagged with their foundation.
    pub async fn assemble_service_instance_detail(&self) -> Vec<ServiceInstanceDetail> {
        self.gather_detail("service instance detail", |source, detail| {
            tag_all(detail.service_instances, &source.name)
        })
        .await
    }

    /// All application/service bindings, tagged with their foundation.
    pub async fn assemble_application_relationships(&self) -> Vec<AppRelationship> {
        self.gather_detail("application relationships", |source, detail| {
            tag_all(detail.application_relationships, &source.name)
        })
        .await
    }

    /// Union of user accounts across foundations.
    pub async fn assemble_user_accounts(&self) -> BTreeSet<String> {
        self.gather_detail("user accounts", |_, detail| detail.user_accounts)
            .await
    }

    /// Union of service accounts across foundations.
    pub async fn assemble_service_accounts(&self) -> BTreeSet<String> {
        self.gather_detail("service accounts", |_, detail| detail.service_accounts)
            .await
    }

    /// Application counts summed across foundations.
    pub async fn assemble_application_counts(&self) -> ApplicationCounts {
        self.gather_counts("application counts", |summary| summary.application_counts)
            .await
    }

    /// Service instance counts summed across foundations.
    pub async fn assemble_service_instance_counts(&self) -> ServiceInstanceCounts {
        self.gather_counts("service instance counts", |summary| {
            summary.service_instance_counts
        })
        .await
    }

    /// Merged detail snapshot across all foundations.
    pub async fn assemble_snapshot_detail(&self) -> SnapshotDetail {
        let (
            applications,
            service_instances,
            application_relationships,
            user_accounts,
            service_accounts,
        ) = tokio::join!(
            self.assemble_application_detail(),
            self.assemble_service_instance_detail(),
            self.assemble_application_relationships(),
            self.assemble_user_accounts(),
            self.assemble_service_accounts(),
        );

        SnapshotDetail {
            applications,
            service_instances,
            application_relationships,
            user_accounts,
            service_accounts,
        }
    }

    /// Summed summary snapshot across all foundations.
    pub async fn assemble_snapshot_summary(&self) -> SnapshotSummary {
        let (application_counts, service_instance_counts) = tokio::join!(
            self.assemble_application_counts(),
            self.assemble_service_instance_counts(),
        );

        SnapshotSummary {
            application_counts,
            service_instance_counts,
        }
    }

    /// Application inventory across all foundations, rendered as CSV.
    pub async fn assemble_csv_ai_report(&self) -> String {
        report::generate_app_detail_csv(&self.assemble_application_detail().await)
    }

    /// Service instance inventory across all foundations, rendered as CSV.
    pub async fn assemble_csv_si_report(&self) -> String {
        report::generate_service_instance_detail_csv(
            &self.assemble_service_instance_detail().await,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StubTransport;
    use std::time::Duration;

    const PROD_DETAIL: &str = "https://prod.example.com/snapshot/detail";
    const PROD_SUMMARY: &str = "https://prod.example.com/snapshot/summary";
    const STAGE_DETAIL: &str = "https://stage.example.com/snapshot/detail";
    const STAGE_SUMMARY: &str = "https://stage.example.com/snapshot/summary";

    const PROD_DETAIL_BODY: &str = r#"{
        "applications": [
            {"appId": "a-1", "appName": "billing", "organization": "payments"},
            {"appId": "a-2", "appName": "ledger", "organization": "payments"},
            {"appId": "a-3", "appName": "gateway", "organization": "edge"}
        ],
        "serviceInstances": [
            {"serviceInstanceId": "s-1", "name": "ledger-db", "service": "p.mysql", "applications": ["ledger"]}
        ],
        "applicationRelationships": [
            {"appId": "a-2", "appName": "ledger", "serviceInstanceId": "s-1", "serviceName": "ledger-db"}
        ],
        "userAccounts": ["alice", "bob"],
        "serviceAccounts": ["ci-bot"]
    }"#;

    const STAGE_DETAIL_BODY: &str = r#"{
        "applications": [
            {"appId": "b-1", "appName": "billing", "organization": "payments"}
        ],
        "serviceInstances": [
            {"serviceInstanceId": "t-1", "name": "cache", "service": "p.redis"}
        ],
        "userAccounts": ["alice", "carol"],
        "serviceAccounts": ["ci-bot", "deployer"]
    }"#;

    fn registry() -> Vec<Source> {
        vec![
            Source::new("prod", "prod.example.com"),
            Source::new("stage", "stage.example.com"),
        ]
    }

    fn client(stub: StubTransport) -> SnapshotClient<StubTransport> {
        SnapshotClient::new(Gateway::new(stub, Duration::from_secs(120)), registry(), 4)
    }

    fn healthy() -> StubTransport {
        StubTransport::new()
            .respond(PROD_DETAIL, PROD_DETAIL_BODY)
            .respond(STAGE_DETAIL, STAGE_DETAIL_BODY)
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_foundation_contributes_nothing() {
        let stub = StubTransport::new()
            .respond(PROD_DETAIL, PROD_DETAIL_BODY)
            .hang(STAGE_DETAIL);

        let apps = client(stub).assemble_application_detail().await;

        assert_eq!(apps.len(), 3);
        assert!(apps.iter().all(|a| a.foundation == "prod"));
    }

    #[tokio::test]
    async fn test_records_are_tagged_with_registered_foundations() {
        let client = client(healthy());
        let names: Vec<&str> = client.sources().iter().map(|s| s.name.as_str()).collect();

        let apps = client.assemble_application_detail().await;
        assert_eq!(apps.len(), 4);
        assert!(apps.iter().all(|a| names.contains(&a.foundation.as_str())));

        let services = client.assemble_service_instance_detail().await;
        assert_eq!(services.len(), 2);
        assert!(services.iter().all(|s| !s.foundation.is_empty()));

        let relationships = client.assemble_application_relationships().await;
        assert_eq!(relationships.len(), 1);
        assert_eq!(relationships[0].foundation, "prod");
    }

    #[tokio::test(start_paused = true)]
    async fn test_concatenation_follows_registry_order() {
        // prod answers last but still comes first.
        let stub = StubTransport::new()
            .respond_after(PROD_DETAIL, PROD_DETAIL_BODY, Duration::from_secs(30))
            .respond(STAGE_DETAIL, STAGE_DETAIL_BODY);

        let apps = client(stub).assemble_application_detail().await;
        let ids: Vec<&str> = apps.iter().map(|a| a.app_id.as_str()).collect();

        assert_eq!(ids, vec!["a-1", "a-2", "a-3", "b-1"]);
    }

    #[tokio::test]
    async fn test_accounts_are_deduplicated() {
        let client = client(healthy());

        let users = client.assemble_user_accounts().await;
        assert_eq!(
            users.into_iter().collect::<Vec<_>>(),
            vec!["alice", "bob", "carol"]
        );

        let service_accounts = client.assemble_service_accounts().await;
        assert_eq!(service_accounts.len(), 2);
    }

    #[tokio::test]
    async fn test_snapshot_detail_composes_all_collections() {
        let detail = client(healthy()).assemble_snapshot_detail().await;

        assert_eq!(detail.applications.len(), 4);
        assert_eq!(detail.service_instances.len(), 2);
        assert_eq!(detail.application_relationships.len(), 1);
        assert_eq!(detail.user_accounts.len(), 3);
        assert_eq!(detail.service_accounts.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_documents_give_empty_detail() {
        let stub = StubTransport::new()
            .respond(PROD_DETAIL, "{}")
            .respond(STAGE_DETAIL, "{}");

        let detail = client(stub).assemble_snapshot_detail().await;
        assert!(detail.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_foundations_down() {
        let stub = StubTransport::new()
            .fail(PROD_DETAIL)
            .hang(STAGE_DETAIL)
            .fail(PROD_SUMMARY)
            .hang(STAGE_SUMMARY);
        let client = client(stub);

        assert!(client.assemble_snapshot_detail().await.is_empty());
        assert_eq!(
            client.assemble_snapshot_summary().await,
            SnapshotSummary::default()
        );
    }

    #[tokio::test]
    async fn test_empty_registry() {
        let client = SnapshotClient::new(
            Gateway::new(StubTransport::new(), Duration::from_secs(1)),
            Vec::new(),
            4,
        );

        assert!(client.assemble_snapshot_detail().await.is_empty());
        assert_eq!(
            client.assemble_snapshot_summary().await,
            SnapshotSummary::default()
        );
    }

    #[tokio::test]
    async fn test_snapshot_summary_sums_counts() {
        let stub = StubTransport::new()
            .respond(
                PROD_SUMMARY,
                r#"{
                    "applicationCounts": {"byStatus": {"running": 5, "stopped": 2}, "totalApplications": 7},
                    "serviceInstanceCounts": {"byService": {"p.mysql": 3}, "totalServiceInstances": 3}
                }"#,
            )
            .respond(
                STAGE_SUMMARY,
                r#"{
                    "applicationCounts": {"byStatus": {"running": 1, "stopped": 0}, "totalApplications": 1},
                    "serviceInstanceCounts": {"byService": {"p.mysql": 1, "p.redis": 1}, "totalServiceInstances": 2}
                }"#,
            );

        let summary = client(stub).assemble_snapshot_summary().await;
        let apps = &summary.application_counts;
        let services = &summary.service_instance_counts;

        assert_eq!(apps.by_status.get("running"), Some(&6));
        assert_eq!(apps.by_status.get("stopped"), Some(&2));
        assert_eq!(apps.total_applications, 8);
        assert_eq!(services.by_service.get("p.mysql"), Some(&4));
        assert_eq!(services.by_service.get("p.redis"), Some(&1));
        assert_eq!(services.total_service_instances, 5);
    }

    #[tokio::test]
    async fn test_failed_summary_counts_as_zero() {
        let stub = StubTransport::new()
            .respond(
                PROD_SUMMARY,
                r#"{"applicationCounts": {"byStatus": {"running": 5}}}"#,
            )
            .fail(STAGE_SUMMARY);

        let counts = client(stub).assemble_application_counts().await;
        assert_eq!(counts.by_status.get("running"), Some(&5));
    }

    #[tokio::test]
    async fn test_each_foundation_is_queried_once_per_aggregation() {
        let client = client(healthy());
        client.assemble_user_accounts().await;
        assert_eq!(client.gateway_calls(), 2);
    }

    #[tokio::test]
    async fn test_csv_reports() {
        let client = client(healthy());

        let apps_csv = client.assemble_csv_ai_report().await;
        assert_eq!(apps_csv.lines().count(), 5);
        assert!(apps_csv.lines().nth(1).unwrap().starts_with("prod,payments,,a-1,billing"));
        assert!(apps_csv.lines().nth(4).unwrap().starts_with("stage,payments,,b-1,billing"));

        let si_csv = client.assemble_csv_si_report().await;
        assert_eq!(si_csv.lines().count(), 3);
        assert!(si_csv.contains("prod,,,s-1,ledger-db,p.mysql"));
        assert!(si_csv.contains("stage,,,t-1,cache,p.redis"));
    }

    impl SnapshotClient<StubTransport> {
        fn gateway_calls(&self) -> usize {
            self.gateway.transport().calls()
        }
    }
}
