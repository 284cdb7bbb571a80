//! Persistent key/value store backed by redb.
//!
//! Three tables partition the data the way the rest of the system thinks
//! about it: endpoint records, probe history, and reserved settings. Values
//! are JSON. History keys carry a fixed-width nanosecond suffix so a range
//! scan returns records in chronological order without a secondary index.
//!
//! redb gives the required discipline for free: one writer at a time,
//! readers concurrent with each other and snapshot-isolated from writes,
//! transactions all-or-nothing.

use crate::config::EndpointConfig;
use crate::core::{Clock, HealthCheckRecord, StoredEndpoint};
use crate::utils::id::generate_id;
use chrono::{DateTime, Utc};
use log::{debug, error, info};
use redb::backends::InMemoryBackend;
use redb::{Database, ReadableTable, TableDefinition};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;

const ENDPOINTS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("endpoints");
const HISTORY_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("history");
const SETTINGS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("settings");

/// History entries older than this are evicted by cleanup passes.
pub const RETENTION: Duration = Duration::from_secs(3 * 24 * 60 * 60);

/// Store error types.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(String),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("endpoint not found: {0}")]
    NotFound(String),
}

fn db_err(e: impl std::fmt::Display) -> StoreError {
    StoreError::Database(e.to_string())
}

/// The durable store. Cheap to share behind an `Arc`.
pub struct Store {
    db: Database,
    clock: Arc<dyn Clock>,
}

impl Store {
    /// Opens (or creates) the database file and ensures all tables exist.
    ///
    /// Failure here is fatal to the process; callers propagate it.
    pub fn open<P: AsRef<Path>>(path: P, clock: Arc<dyn Clock>) -> Result<Self, StoreError> {
        let db = Database::create(path).map_err(db_err)?;
        let store = Self { db, clock };
        store.init_tables()?;
        Ok(store)
    }

    /// Opens a store backed by memory only. Used by tests.
    pub fn in_memory(clock: Arc<dyn Clock>) -> Result<Self, StoreError> {
        let db = Database::builder()
            .create_with_backend(InMemoryBackend::new())
            .map_err(db_err)?;
        let store = Self { db, clock };
        store.init_tables()?;
        Ok(store)
    }

    fn init_tables(&self) -> Result<(), StoreError> {
        let txn = self.db.begin_write().map_err(db_err)?;
        txn.open_table(ENDPOINTS_TABLE).map_err(db_err)?;
        txn.open_table(HISTORY_TABLE).map_err(db_err)?;
        txn.open_table(SETTINGS_TABLE).map_err(db_err)?;
        txn.commit().map_err(db_err)?;
        Ok(())
    }

    // --- Endpoints ---

    /// Upserts an endpoint record.
    ///
    /// Sets `created_at` on first save, always refreshes `updated_at`, and
    /// fills unset probe parameters with their documented defaults. The
    /// record is updated in place so callers observe the filled values.
    pub fn put_endpoint(&self, endpoint: &mut StoredEndpoint) -> Result<(), StoreError> {
        let now = self.clock.now();
        if endpoint.created_at.is_none() {
            endpoint.created_at = Some(now);
        }
        endpoint.updated_at = Some(now);

        if endpoint.method.is_empty() {
            endpoint.method = "GET".to_string();
        }
        if endpoint.timeout.is_zero() {
            endpoint.timeout = Duration::from_secs(10);
        }
        if endpoint.expected_status == 0 {
            endpoint.expected_status = 200;
        }
        if endpoint.failure_threshold == 0 {
            endpoint.failure_threshold = 3;
        }
        if endpoint.success_threshold == 0 {
            endpoint.success_threshold = 2;
        }
        // A zero interval on an SSL-only endpoint is meaningful and kept.
        if endpoint.check_interval.is_zero() && endpoint.monitor_health {
            endpoint.check_interval = Duration::from_secs(30);
        }

        let data = serde_json::to_vec(endpoint)?;
        let txn = self.db.begin_write().map_err(db_err)?;
        {
            let mut table = txn.open_table(ENDPOINTS_TABLE).map_err(db_err)?;
            table
                .insert(endpoint.id.as_str(), data.as_slice())
                .map_err(db_err)?;
        }
        txn.commit().map_err(db_err)?;
        Ok(())
    }

    /// Fetches an endpoint by id.
    pub fn get_endpoint(&self, id: &str) -> Result<StoredEndpoint, StoreError> {
        let txn = self.db.begin_read().map_err(db_err)?;
        let table = txn.open_table(ENDPOINTS_TABLE).map_err(db_err)?;
        match table.get(id).map_err(db_err)? {
            Some(value) => Ok(serde_json::from_slice(value.value())?),
            None => Err(StoreError::NotFound(id.to_string())),
        }
    }

    /// Lists every stored endpoint.
    pub fn list_endpoints(&self) -> Result<Vec<StoredEndpoint>, StoreError> {
        let txn = self.db.begin_read().map_err(db_err)?;
        let table = txn.open_table(ENDPOINTS_TABLE).map_err(db_err)?;

        let mut endpoints = Vec::new();
        for item in table.iter().map_err(db_err)? {
            let (_, value) = item.map_err(db_err)?;
            endpoints.push(serde_json::from_slice(value.value())?);
        }
        Ok(endpoints)
    }

    /// Deletes an endpoint record.
    pub fn delete_endpoint(&self, id: &str) -> Result<(), StoreError> {
        let txn = self.db.begin_write().map_err(db_err)?;
        let removed = {
            let mut table = txn.open_table(ENDPOINTS_TABLE).map_err(db_err)?;
            let existed = table.remove(id).map_err(db_err)?.is_some();
            existed
        };
        txn.commit().map_err(db_err)?;
        if !removed {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }

    // --- History ---

    /// Appends a health check record under a composite, chronologically
    /// ordered key.
    pub fn append_record(&self, record: &HealthCheckRecord) -> Result<(), StoreError> {
        let key = history_key(&record.endpoint_id, record.timestamp);
        let data = serde_json::to_vec(record)?;

        let txn = self.db.begin_write().map_err(db_err)?;
        {
            let mut table = txn.open_table(HISTORY_TABLE).map_err(db_err)?;
            table.insert(key.as_str(), data.as_slice()).map_err(db_err)?;
        }
        txn.commit().map_err(db_err)?;
        Ok(())
    }

    /// Returns history for an endpoint, most recent first. A `limit` of zero
    /// means no cap.
    pub fn list_records(
        &self,
        endpoint_id: &str,
        limit: usize,
    ) -> Result<Vec<HealthCheckRecord>, StoreError> {
        let start = format!("{endpoint_id}:");
        // ';' is the successor of ':', so this bounds the prefix scan.
        let end = format!("{endpoint_id};");

        let txn = self.db.begin_read().map_err(db_err)?;
        let table = txn.open_table(HISTORY_TABLE).map_err(db_err)?;

        let mut records: Vec<HealthCheckRecord> = Vec::new();
        for item in table.range(start.as_str()..end.as_str()).map_err(db_err)? {
            let (_, value) = item.map_err(db_err)?;
            match serde_json::from_slice(value.value()) {
                Ok(record) => records.push(record),
                Err(e) => error!("Skipping undecodable history record: {}", e),
            }
        }

        records.reverse();
        if limit > 0 && records.len() > limit {
            records.truncate(limit);
        }
        Ok(records)
    }

    /// Deletes history entries older than the retention window. Returns the
    /// number of records removed.
    pub fn cleanup(&self, now: DateTime<Utc>) -> Result<usize, StoreError> {
        let cutoff = now - chrono::Duration::from_std(RETENTION).map_err(db_err)?;

        let txn = self.db.begin_write().map_err(db_err)?;
        let deleted = {
            let mut table = txn.open_table(HISTORY_TABLE).map_err(db_err)?;

            let mut stale: Vec<String> = Vec::new();
            for item in table.iter().map_err(db_err)? {
                let (key, value) = item.map_err(db_err)?;
                let record: HealthCheckRecord = match serde_json::from_slice(value.value()) {
                    Ok(r) => r,
                    Err(_) => continue,
                };
                if record.timestamp < cutoff {
                    stale.push(key.value().to_string());
                }
            }

            for key in &stale {
                table.remove(key.as_str()).map_err(db_err)?;
            }
            stale.len()
        };
        txn.commit().map_err(db_err)?;

        if deleted > 0 {
            info!(
                "Cleaned up {} health check records older than {} days",
                deleted,
                RETENTION.as_secs() / 86_400
            );
        }
        Ok(deleted)
    }

    // --- Config import ---

    /// Seeds the store from the config file. Idempotent: endpoints whose id
    /// already exists keep their stored settings and admin flags.
    pub fn import_endpoints(&self, endpoints: &[EndpointConfig]) -> Result<(), StoreError> {
        for ep in endpoints {
            let id = generate_id(&ep.name, &ep.url);
            if self.get_endpoint(&id).is_ok() {
                continue;
            }

            let mut stored = StoredEndpoint {
                id,
                name: ep.name.clone(),
                url: ep.url.clone(),
                method: ep.method.clone(),
                timeout: ep.timeout,
                check_interval: ep.check_interval,
                expected_status: ep.expected_status,
                headers: ep.headers.clone(),
                failure_threshold: ep.failure_threshold,
                success_threshold: ep.success_threshold,
                enabled: true,
                alerts_suppressed: false,
                monitor_health: ep.monitor_health,
                created_at: None,
                updated_at: None,
            };
            self.put_endpoint(&mut stored)?;
            info!("Imported endpoint from config: {}", stored.name);
        }
        Ok(())
    }

    /// Runs a cleanup pass immediately and then hourly until shutdown.
    pub fn spawn_cleanup_task(
        self: &Arc<Self>,
        shutdown_rx: watch::Receiver<()>,
    ) -> JoinHandle<()> {
        let store = Arc::clone(self);
        let mut shutdown_rx = shutdown_rx.clone();
        tokio::spawn(async move {
            let mut timer = tokio::time::interval(Duration::from_secs(60 * 60));
            loop {
                tokio::select! {
                    biased;
                    _ = shutdown_rx.changed() => {
                        break;
                    }
                    _ = timer.tick() => {
                        match store.cleanup(store.clock.now()) {
                            Ok(deleted) => debug!("History cleanup pass removed {} records", deleted),
                            Err(e) => error!("History cleanup failed: {}", e),
                        }
                    }
                }
            }
        })
    }
}

fn history_key(endpoint_id: &str, timestamp: DateTime<Utc>) -> String {
    let nanos = timestamp.timestamp_nanos_opt().unwrap_or_default();
    format!("{endpoint_id}:{nanos:020}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{HealthStatus, SystemClock};

    fn test_store() -> Store {
        Store::in_memory(Arc::new(SystemClock)).unwrap()
    }

    fn record(id: &str, timestamp: DateTime<Utc>, status: HealthStatus) -> HealthCheckRecord {
        HealthCheckRecord {
            endpoint_id: id.to_string(),
            timestamp,
            status,
            response_time: Duration::from_millis(12),
            status_code: Some(200),
            error: String::new(),
        }
    }

    #[test]
    fn endpoint_crud() {
        let store = test_store();
        let mut ep = StoredEndpoint {
            id: "site-https-example-com".into(),
            name: "site".into(),
            url: "https://example.com".into(),
            enabled: true,
            monitor_health: true,
            ..Default::default()
        };
        store.put_endpoint(&mut ep).unwrap();

        // Defaults were filled in.
        assert_eq!(ep.method, "GET");
        assert_eq!(ep.timeout, Duration::from_secs(10));
        assert_eq!(ep.expected_status, 200);
        assert_eq!(ep.failure_threshold, 3);
        assert_eq!(ep.success_threshold, 2);
        assert_eq!(ep.check_interval, Duration::from_secs(30));
        assert!(ep.created_at.is_some());

        let fetched = store.get_endpoint(&ep.id).unwrap();
        assert_eq!(fetched, ep);

        assert_eq!(store.list_endpoints().unwrap().len(), 1);

        store.delete_endpoint(&ep.id).unwrap();
        assert!(matches!(
            store.get_endpoint(&ep.id),
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            store.delete_endpoint(&ep.id),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn created_at_survives_updates() {
        let store = test_store();
        let mut ep = StoredEndpoint {
            id: "a".into(),
            name: "a".into(),
            url: "https://a".into(),
            monitor_health: true,
            ..Default::default()
        };
        store.put_endpoint(&mut ep).unwrap();
        let created = ep.created_at;

        store.put_endpoint(&mut ep).unwrap();
        assert_eq!(ep.created_at, created);
    }

    #[test]
    fn ssl_only_endpoint_keeps_zero_interval() {
        let store = test_store();
        let mut ep = StoredEndpoint {
            id: "cert".into(),
            name: "cert".into(),
            url: "https://cert.example".into(),
            monitor_health: false,
            ..Default::default()
        };
        store.put_endpoint(&mut ep).unwrap();
        assert_eq!(ep.check_interval, Duration::ZERO);
    }

    #[test]
    fn history_is_most_recent_first_and_scoped_to_endpoint() {
        let store = test_store();
        let base = Utc::now();

        for i in 0..5 {
            store
                .append_record(&record(
                    "ep-a",
                    base + chrono::Duration::seconds(i),
                    HealthStatus::Healthy,
                ))
                .unwrap();
        }
        store
            .append_record(&record("ep-ab", base, HealthStatus::Unhealthy))
            .unwrap();

        let records = store.list_records("ep-a", 0).unwrap();
        assert_eq!(records.len(), 5);
        assert!(records.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));

        let limited = store.list_records("ep-a", 2).unwrap();
        assert_eq!(limited.len(), 2);
        assert_eq!(limited[0].timestamp, base + chrono::Duration::seconds(4));

        // "ep-ab" keys must not leak into the "ep-a" prefix scan.
        assert_eq!(store.list_records("ep-ab", 0).unwrap().len(), 1);
    }

    #[test]
    fn cleanup_enforces_three_day_retention() {
        let store = test_store();
        let now = Utc::now();

        store
            .append_record(&record("ep", now - chrono::Duration::days(4), HealthStatus::Healthy))
            .unwrap();
        store
            .append_record(&record("ep", now - chrono::Duration::days(2), HealthStatus::Healthy))
            .unwrap();
        store
            .append_record(&record("ep", now - chrono::Duration::hours(1), HealthStatus::Healthy))
            .unwrap();

        let deleted = store.cleanup(now).unwrap();
        assert_eq!(deleted, 1);

        let remaining = store.list_records("ep", 0).unwrap();
        assert_eq!(remaining.len(), 2);
        assert!(remaining.iter().all(|r| r.timestamp >= now - chrono::Duration::days(3)));

        // A second pass finds nothing to do.
        assert_eq!(store.cleanup(now).unwrap(), 0);
    }

    #[test]
    fn import_is_idempotent_and_preserves_admin_flags() {
        let store = test_store();
        let config_endpoints = vec![EndpointConfig {
            name: "Site".into(),
            url: "https://example.com".into(),
            ..Default::default()
        }];

        store.import_endpoints(&config_endpoints).unwrap();
        let id = generate_id("Site", "https://example.com");
        let mut stored = store.get_endpoint(&id).unwrap();
        assert!(stored.enabled);

        // Disable, then re-import: the stored flags must win.
        stored.enabled = false;
        store.put_endpoint(&mut stored).unwrap();
        store.import_endpoints(&config_endpoints).unwrap();
        assert!(!store.get_endpoint(&id).unwrap().enabled);
        assert_eq!(store.list_endpoints().unwrap().len(), 1);
    }

    #[test]
    fn history_keys_are_fixed_width() {
        let key = history_key("ep", Utc::now());
        let suffix = key.rsplit(':').next().unwrap();
        assert_eq!(suffix.len(), 20);
    }
}
