//! In-memory storage backend.
//!
//! [`MemStorage`] keeps one [`Table`] per entity behind a single
//! [`tokio::sync::RwLock`]. Reads share the lock; every mutation holds the
//! write lock from its relational checks through its audit write, so id
//! assignment, cascades and audit entries are atomic with respect to each
//! other.

pub mod table;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{AlertWrite, Storage, StorageError, UserWrite};
use crate::domain::audit_log::{ALERTS_TABLE, DEVICES_TABLE};
use crate::domain::{
    Alert, AlertPatch, AuditAction, AuditLog, Device, DevicePatch, NewAlert, NewAuditLog,
    NewDevice, NewUser, User,
};

pub use table::Table;

/// Process-local storage; contents are lost on exit.
#[derive(Debug, Default)]
pub struct MemStorage {
    tables: RwLock<Tables>,
}

#[derive(Debug, Default)]
struct Tables {
    users: Table<User>,
    devices: Table<Device>,
    alerts: Table<Alert>,
    audit_logs: Table<AuditLog>,
}

impl Tables {
    fn audit(&mut self, entry: NewAuditLog, now: DateTime<Utc>) -> AuditLog {
        self.audit_logs
            .insert_with(|id| AuditLog::from_new(id, entry, now))
            .clone()
    }

    fn delete_alert(&mut self, id: i64, performed_by: Option<&str>, now: DateTime<Utc>) -> bool {
        if self.alerts.remove(id).is_none() {
            return false;
        }
        self.audit(
            NewAuditLog::new(ALERTS_TABLE, AuditAction::Delete, id).performed_by(performed_by),
            now,
        );
        true
    }

    fn alerts_of(&self, device_id: i64) -> Vec<Alert> {
        let mut alerts: Vec<Alert> = self
            .alerts
            .values()
            .filter(|a| a.device_id == device_id)
            .cloned()
            .collect();
        alerts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        alerts
    }
}

impl MemStorage {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for MemStorage {
    async fn get_user(&self, id: i64) -> Result<Option<User>, StorageError> {
        Ok(self.tables.read().await.users.get(id).cloned())
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, StorageError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn create_user(&self, user: NewUser) -> Result<UserWrite, StorageError> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.username == user.username) {
            return Ok(UserWrite::UsernameTaken(user.username));
        }
        let created = tables
            .users
            .insert_with(|id| User {
                id,
                username: user.username,
                password_hash: user.password_hash,
            })
            .clone();
        Ok(UserWrite::Created(created))
    }

    async fn list_devices(&self) -> Result<Vec<Device>, StorageError> {
        let tables = self.tables.read().await;
        let mut devices: Vec<Device> = tables.devices.values().cloned().collect();
        devices.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(devices)
    }

    async fn get_device(&self, id: i64) -> Result<Option<Device>, StorageError> {
        Ok(self.tables.read().await.devices.get(id).cloned())
    }

    async fn create_device(
        &self,
        device: NewDevice,
        performed_by: Option<&str>,
    ) -> Result<Device, StorageError> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let created = tables
            .devices
            .insert_with(|id| Device::from_new(id, device, now))
            .clone();
        tables.audit(
            NewAuditLog::new(DEVICES_TABLE, AuditAction::Create, created.id)
                .performed_by(performed_by),
            now,
        );
        Ok(created)
    }

    async fn update_device(
        &self,
        id: i64,
        patch: DevicePatch,
        performed_by: Option<&str>,
    ) -> Result<Option<Device>, StorageError> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let Some(device) = tables.devices.get_mut(id) else {
            return Ok(None);
        };
        device.apply(patch, now);
        let updated = device.clone();
        tables.audit(
            NewAuditLog::new(DEVICES_TABLE, AuditAction::Update, id).performed_by(performed_by),
            now,
        );
        Ok(Some(updated))
    }

    async fn delete_device(
        &self,
        id: i64,
        performed_by: Option<&str>,
    ) -> Result<bool, StorageError> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        if !tables.devices.contains(id) {
            return Ok(false);
        }
        for alert in tables.alerts_of(id) {
            tables.delete_alert(alert.id, performed_by, now);
        }
        tables.devices.remove(id);
        tables.audit(
            NewAuditLog::new(DEVICES_TABLE, AuditAction::Delete, id).performed_by(performed_by),
            now,
        );
        Ok(true)
    }

    async fn list_alerts(&self) -> Result<Vec<Alert>, StorageError> {
        let tables = self.tables.read().await;
        let mut alerts: Vec<Alert> = tables.alerts.values().cloned().collect();
        alerts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(alerts)
    }

    async fn list_alerts_by_device(&self, device_id: i64) -> Result<Vec<Alert>, StorageError> {
        Ok(self.tables.read().await.alerts_of(device_id))
    }

    async fn get_alert(&self, id: i64) -> Result<Option<Alert>, StorageError> {
        Ok(self.tables.read().await.alerts.get(id).cloned())
    }

    async fn create_alert(
        &self,
        alert: NewAlert,
        performed_by: Option<&str>,
    ) -> Result<AlertWrite, StorageError> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        if !tables.devices.contains(alert.device_id) {
            return Ok(AlertWrite::DeviceNotFound(alert.device_id));
        }
        let created = tables
            .alerts
            .insert_with(|id| Alert::from_new(id, alert, now))
            .clone();
        tables.audit(
            NewAuditLog::new(ALERTS_TABLE, AuditAction::Create, created.id)
                .performed_by(performed_by),
            now,
        );
        Ok(AlertWrite::Saved(created))
    }

    async fn update_alert(
        &self,
        id: i64,
        patch: AlertPatch,
        performed_by: Option<&str>,
    ) -> Result<Option<AlertWrite>, StorageError> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let Some(current_device) = tables.alerts.get(id).map(|a| a.device_id) else {
            return Ok(None);
        };
        if let Some(target) = patch.device_change(current_device)
            && !tables.devices.contains(target)
        {
            return Ok(Some(AlertWrite::DeviceNotFound(target)));
        }
        let Some(alert) = tables.alerts.get_mut(id) else {
            return Ok(None);
        };
        alert.apply(patch);
        let updated = alert.clone();
        tables.audit(
            NewAuditLog::new(ALERTS_TABLE, AuditAction::Update, id).performed_by(performed_by),
            now,
        );
        Ok(Some(AlertWrite::Saved(updated)))
    }

    async fn delete_alert(
        &self,
        id: i64,
        performed_by: Option<&str>,
    ) -> Result<bool, StorageError> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        Ok(tables.delete_alert(id, performed_by, now))
    }

    async fn list_audit_logs(&self) -> Result<Vec<AuditLog>, StorageError> {
        Ok(self.tables.read().await.audit_logs.values().cloned().collect())
    }

    async fn record_audit(&self, entry: NewAuditLog) -> Result<AuditLog, StorageError> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        Ok(tables.audit(entry, now))
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::{AlertType, DeviceStatus};

    fn rack_device() -> NewDevice {
        NewDevice {
            name: "A".to_string(),
            os: "Linux".to_string(),
            status: DeviceStatus::Online,
            location: "Rack1".to_string(),
        }
    }

    fn disk_alert(device_id: i64) -> NewAlert {
        NewAlert {
            device_id,
            alert_type: AlertType::Warning,
            message: "disk low".to_string(),
        }
    }

    async fn create_device(store: &MemStorage) -> Device {
        let Ok(device) = store.create_device(rack_device(), None).await else {
            panic!("device creation failed");
        };
        device
    }

    async fn create_alert(store: &MemStorage, device_id: i64) -> Alert {
        let Ok(AlertWrite::Saved(alert)) = store.create_alert(disk_alert(device_id), None).await
        else {
            panic!("alert creation failed");
        };
        alert
    }

    async fn audit_len(store: &MemStorage) -> usize {
        store.list_audit_logs().await.map(|l| l.len()).unwrap_or_default()
    }

    async fn last_audit(store: &MemStorage) -> AuditLog {
        let Ok(logs) = store.list_audit_logs().await else {
            panic!("audit listing failed");
        };
        let Some(last) = logs.last() else {
            panic!("audit log is empty");
        };
        last.clone()
    }

    #[tokio::test]
    async fn created_device_is_retrievable_and_listed() {
        let store = MemStorage::new();
        let device = create_device(&store).await;

        assert_eq!(device.id, 1);
        assert_eq!(device.created_at, device.updated_at);

        let fetched = store.get_device(device.id).await;
        assert!(matches!(fetched, Ok(Some(ref d)) if *d == device));

        let listed = store.list_devices().await.unwrap_or_default();
        assert!(listed.contains(&device));
    }

    #[tokio::test]
    async fn devices_are_listed_newest_first() {
        let store = MemStorage::new();
        for _ in 0..3 {
            create_device(&store).await;
        }
        let ids: Vec<i64> = store
            .list_devices()
            .await
            .unwrap_or_default()
            .iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(ids, [3, 2, 1]);
    }

    #[tokio::test]
    async fn unknown_ids_are_absent_not_faults() {
        let store = MemStorage::new();

        assert!(matches!(store.get_device(42).await, Ok(None)));
        assert!(matches!(
            store.update_device(42, DevicePatch::default(), None).await,
            Ok(None)
        ));
        assert!(matches!(store.delete_device(42, None).await, Ok(false)));

        assert!(matches!(store.get_alert(42).await, Ok(None)));
        assert!(matches!(
            store.update_alert(42, AlertPatch::default(), None).await,
            Ok(None)
        ));
        assert!(matches!(store.delete_alert(42, None).await, Ok(false)));

        assert_eq!(audit_len(&store).await, 0);
    }

    #[tokio::test]
    async fn alert_for_missing_device_is_rejected_without_side_effects() {
        let store = MemStorage::new();

        let result = store.create_alert(disk_alert(999), None).await;
        assert!(matches!(result, Ok(AlertWrite::DeviceNotFound(999))));

        assert!(store.list_alerts().await.unwrap_or_default().is_empty());
        assert_eq!(audit_len(&store).await, 0);
    }

    #[tokio::test]
    async fn each_mutation_appends_one_matching_audit_entry() {
        let store = MemStorage::new();

        let device = create_device(&store).await;
        assert_eq!(audit_len(&store).await, 1);
        let entry = last_audit(&store).await;
        assert_eq!(
            (entry.table_name.as_str(), entry.action, entry.record_id),
            ("devices", AuditAction::Create, device.id)
        );

        let patch = DevicePatch {
            status: Some(DeviceStatus::Offline),
            ..DevicePatch::default()
        };
        let _ = store.update_device(device.id, patch, Some("ops")).await;
        assert_eq!(audit_len(&store).await, 2);
        let entry = last_audit(&store).await;
        assert_eq!(entry.action, AuditAction::Update);
        assert_eq!(entry.performed_by, "ops");

        let alert = create_alert(&store, device.id).await;
        assert_eq!(audit_len(&store).await, 3);
        let entry = last_audit(&store).await;
        assert_eq!(
            (entry.table_name.as_str(), entry.action, entry.record_id),
            ("alerts", AuditAction::Create, alert.id)
        );

        let patch = AlertPatch {
            message: Some("disk almost full".to_string()),
            ..AlertPatch::default()
        };
        let _ = store.update_alert(alert.id, patch, None).await;
        assert_eq!(audit_len(&store).await, 4);
        assert_eq!(last_audit(&store).await.action, AuditAction::Update);

        assert!(matches!(store.delete_alert(alert.id, None).await, Ok(true)));
        assert_eq!(audit_len(&store).await, 5);
        let entry = last_audit(&store).await;
        assert_eq!(
            (entry.table_name.as_str(), entry.action, entry.record_id),
            ("alerts", AuditAction::Delete, alert.id)
        );
        assert_eq!(entry.performed_by, "system");
    }

    #[tokio::test]
    async fn update_preserves_untouched_fields() {
        let store = MemStorage::new();
        let device = create_device(&store).await;

        let patch = DevicePatch {
            location: Some("Rack2".to_string()),
            ..DevicePatch::default()
        };
        let Ok(Some(updated)) = store.update_device(device.id, patch, None).await else {
            panic!("update failed");
        };

        assert_eq!(updated.location, "Rack2");
        assert_eq!(updated.name, device.name);
        assert_eq!(updated.os, device.os);
        assert_eq!(updated.status, device.status);
        assert_eq!(updated.created_at, device.created_at);
        assert!(updated.updated_at >= device.updated_at);
    }

    #[tokio::test]
    async fn device_delete_cascades_to_alerts() {
        let store = MemStorage::new();
        let device = create_device(&store).await;
        let other = create_device(&store).await;
        let mut cascaded = Vec::new();
        for _ in 0..3 {
            cascaded.push(create_alert(&store, device.id).await.id);
        }
        let survivor = create_alert(&store, other.id).await;
        let before = audit_len(&store).await;

        assert!(matches!(store.delete_device(device.id, None).await, Ok(true)));

        assert!(
            store
                .list_alerts_by_device(device.id)
                .await
                .unwrap_or_default()
                .is_empty()
        );
        for id in &cascaded {
            assert!(matches!(store.get_alert(*id).await, Ok(None)));
        }
        assert!(matches!(store.get_alert(survivor.id).await, Ok(Some(_))));

        let logs = store.list_audit_logs().await.unwrap_or_default();
        let written: Vec<&AuditLog> = logs.iter().skip(before).collect();
        let alert_deletes: Vec<i64> = written
            .iter()
            .filter(|e| e.table_name == "alerts" && e.action == AuditAction::Delete)
            .map(|e| e.record_id)
            .collect();
        assert_eq!(alert_deletes.len(), cascaded.len());
        for id in &cascaded {
            assert!(alert_deletes.contains(id));
        }

        // The device's own entry comes after its alerts.
        let Some(last) = written.last() else {
            panic!("no audit entries written");
        };
        assert_eq!(
            (last.table_name.as_str(), last.action, last.record_id),
            ("devices", AuditAction::Delete, device.id)
        );
        assert_eq!(written.len(), cascaded.len() + 1);
    }

    #[tokio::test]
    async fn device_alert_scenario() {
        let store = MemStorage::new();
        let device = create_device(&store).await;
        assert_eq!(device.id, 1);

        let alert = create_alert(&store, device.id).await;
        assert_eq!(alert.id, 1);
        let entry = last_audit(&store).await;
        assert_eq!(
            (entry.table_name.as_str(), entry.action, entry.record_id),
            ("alerts", AuditAction::Create, 1)
        );
        let before_delete = audit_len(&store).await;

        assert!(matches!(store.delete_device(1, None).await, Ok(true)));
        assert!(matches!(store.get_alert(1).await, Ok(None)));

        let logs = store.list_audit_logs().await.unwrap_or_default();
        let cascade: Vec<(&str, AuditAction, i64)> = logs
            .iter()
            .skip(before_delete)
            .map(|e| (e.table_name.as_str(), e.action, e.record_id))
            .collect();
        assert_eq!(
            cascade,
            [
                ("alerts", AuditAction::Delete, 1),
                ("devices", AuditAction::Delete, 1)
            ]
        );
    }

    #[tokio::test]
    async fn moving_alert_to_missing_device_is_rejected() {
        let store = MemStorage::new();
        let device = create_device(&store).await;
        let alert = create_alert(&store, device.id).await;
        let before = audit_len(&store).await;

        let patch = AlertPatch {
            device_id: Some(77),
            message: Some("moved".to_string()),
            ..AlertPatch::default()
        };
        let result = store.update_alert(alert.id, patch, None).await;
        assert!(matches!(result, Ok(Some(AlertWrite::DeviceNotFound(77)))));

        assert!(matches!(store.get_alert(alert.id).await, Ok(Some(ref a)) if *a == alert));
        assert_eq!(audit_len(&store).await, before);
    }

    #[tokio::test]
    async fn moving_alert_to_existing_device_succeeds() {
        let store = MemStorage::new();
        let first = create_device(&store).await;
        let second = create_device(&store).await;
        let alert = create_alert(&store, first.id).await;

        let patch = AlertPatch {
            device_id: Some(second.id),
            ..AlertPatch::default()
        };
        let Ok(Some(AlertWrite::Saved(moved))) = store.update_alert(alert.id, patch, None).await
        else {
            panic!("move failed");
        };
        assert_eq!(moved.device_id, second.id);
        assert_eq!(moved.created_at, alert.created_at);

        assert!(
            store
                .list_alerts_by_device(first.id)
                .await
                .unwrap_or_default()
                .is_empty()
        );
        assert_eq!(
            store
                .list_alerts_by_device(second.id)
                .await
                .unwrap_or_default()
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn alerts_by_device_are_filtered_and_newest_first() {
        let store = MemStorage::new();
        let a = create_device(&store).await;
        let b = create_device(&store).await;
        let first = create_alert(&store, a.id).await;
        create_alert(&store, b.id).await;
        let third = create_alert(&store, a.id).await;

        let ids: Vec<i64> = store
            .list_alerts_by_device(a.id)
            .await
            .unwrap_or_default()
            .iter()
            .map(|al| al.id)
            .collect();
        assert_eq!(ids, [third.id, first.id]);
    }

    #[tokio::test]
    async fn usernames_are_unique() {
        let store = MemStorage::new();
        let new_user = NewUser {
            username: "admin".to_string(),
            password_hash: "hash".to_string(),
        };

        let Ok(UserWrite::Created(user)) = store.create_user(new_user.clone()).await else {
            panic!("first registration failed");
        };
        assert!(matches!(
            store.create_user(new_user).await,
            Ok(UserWrite::UsernameTaken(ref name)) if name == "admin"
        ));

        assert!(matches!(store.get_user(user.id).await, Ok(Some(ref u)) if *u == user));
        assert!(matches!(
            store.get_user_by_username("admin").await,
            Ok(Some(ref u)) if u.id == user.id
        ));
        assert!(matches!(store.get_user_by_username("root").await, Ok(None)));
        // Users are not audited.
        assert_eq!(audit_len(&store).await, 0);
    }

    #[tokio::test]
    async fn record_audit_appends_without_touching_entities() {
        let store = MemStorage::new();
        let entry = NewAuditLog::new("devices", AuditAction::Delete, 12);

        let Ok(logged) = store.record_audit(entry).await else {
            panic!("record failed");
        };
        assert_eq!(logged.id, 1);
        assert_eq!(logged.performed_by, "system");
        assert_eq!(audit_len(&store).await, 1);
        assert!(store.list_devices().await.unwrap_or_default().is_empty());
    }

    #[tokio::test]
    async fn concurrent_creates_get_distinct_ids() {
        let store = Arc::new(MemStorage::new());
        let mut handles = Vec::new();
        for _ in 0..16 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.create_device(rack_device(), None).await.map(|d| d.id)
            }));
        }
        let mut ids = Vec::new();
        for handle in handles {
            if let Ok(Ok(id)) = handle.await {
                ids.push(id);
            }
        }
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 16);
        assert_eq!(audit_len(&store).await, 16);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn created_at_follows_id_order_under_contention() {
        let store = Arc::new(MemStorage::new());
        let Ok(device) = store.create_device(rack_device(), None).await else {
            panic!("device creation failed");
        };
        let mut handles = Vec::new();
        for _ in 0..32 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.create_alert(disk_alert(device.id), None).await
            }));
        }
        for handle in handles {
            let Ok(Ok(AlertWrite::Saved(_))) = handle.await else {
                panic!("concurrent alert creation failed");
            };
        }
        let Ok(mut alerts) = store.list_alerts().await else {
            panic!("alert listing failed");
        };
        assert_eq!(alerts.len(), 32);
        alerts.sort_by_key(|a| a.id);
        for pair in alerts.windows(2) {
            let [older, newer] = pair else {
                panic!("window of two");
            };
            assert!(older.created_at <= newer.created_at, "{older:?} vs {newer:?}");
        }
    }
}
