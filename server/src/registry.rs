use std::collections::HashMap;
use std::net::IpAddr;

use chrono::{DateTime, Duration, Utc};
use log::info;
use rollcall_common::api::clients::{ClientPage, ClientRecord, ClientStatus, WorkStatus};
use rollcall_common::api::tasks::{
    Assignment, CreateTaskRequest, CreateTaskResult, FailureReport, ProgressReport, TaskPage,
    TaskStatus, TaskSummary,
};
use rollcall_common::api::total_pages;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub(crate) enum RegistryError {
    #[error("not enough available clients: need {needed}, have {available}")]
    NotEnoughClients { needed: u32, available: u32 },

    #[error("client_count must be positive")]
    EmptyTask,

    #[error("assignment {0} not found")]
    UnknownAssignment(i64),
}

#[derive(Debug, Clone)]
struct TaskEntry {
    id: i64,
    target: String,
    total_duration_secs: u64,
    status: TaskStatus,
    client_count: u32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct AssignmentEntry {
    id: i64,
    task_id: i64,
    client_id: String,
    target: String,
    total_duration_secs: u64,
    elapsed_secs: u64,
    status: TaskStatus,
    last_report: Option<DateTime<Utc>>,
    failure: Option<String>,
}

impl AssignmentEntry {
    fn to_wire(&self) -> Assignment {
        Assignment {
            id: self.id,
            task_id: self.task_id,
            client_id: self.client_id.clone(),
            target: self.target.clone(),
            total_duration_secs: self.total_duration_secs,
            elapsed_secs: self.elapsed_secs,
            progress: percent(self.elapsed_secs, self.total_duration_secs),
            status: self.status,
            last_report: self.last_report,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct RegistryStats {
    pub clients: usize,
    pub online: usize,
    pub busy: usize,
    pub tasks: usize,
    pub open_assignments: usize,
}

/// All server-side state: the client roster plus the task ledger. Callers
/// supply `now`; nothing in here reads the clock.
#[derive(Debug, Default)]
pub(crate) struct Registry {
    clients: HashMap<String, ClientRecord>,
    tasks: Vec<TaskEntry>,
    assignments: Vec<AssignmentEntry>,
    next_client_id: i64,
    next_task_id: i64,
    next_assignment_id: i64,
}

impl Registry {
    /// Upsert a client on heartbeat: refresh liveness and source address,
    /// register unknown ids with the next numeric id.
    pub(crate) fn heartbeat(&mut self, client_id: &str, ip: IpAddr, now: DateTime<Utc>) {
        match self.clients.get_mut(client_id) {
            Some(rec) => {
                rec.last_heartbeat = now;
                rec.ip_address = ip.to_string();
                rec.status = ClientStatus::Online;
            }
            None => {
                self.next_client_id += 1;
                info!("registering client {client_id} ({ip})");
                self.clients.insert(
                    client_id.to_string(),
                    ClientRecord {
                        id: self.next_client_id,
                        client_id: client_id.to_string(),
                        ip_address: ip.to_string(),
                        last_heartbeat: now,
                        status: ClientStatus::Online,
                        task_status: WorkStatus::Idle,
                        created_at: now,
                    },
                );
            }
        }
    }

    /// Mark online clients offline once their heartbeat is older than
    /// `timeout`. Returns how many flipped.
    pub(crate) fn sweep_offline(&mut self, timeout: Duration, now: DateTime<Utc>) -> usize {
        let mut marked = 0;
        for rec in self.clients.values_mut() {
            if rec.status == ClientStatus::Online && now - rec.last_heartbeat > timeout {
                rec.status = ClientStatus::Offline;
                marked += 1;
            }
        }
        marked
    }

    pub(crate) fn page_clients(&self, page: u32, page_size: u32) -> ClientPage {
        let page = page.max(1);
        let page_size = page_size.max(1);

        let mut items: Vec<ClientRecord> = self.clients.values().cloned().collect();
        items.sort_by(|a, b| b.last_heartbeat.cmp(&a.last_heartbeat));

        let total = items.len() as u64;
        let start = ((page - 1) as usize).saturating_mul(page_size as usize);
        let items = items
            .into_iter()
            .skip(start)
            .take(page_size as usize)
            .collect();

        ClientPage {
            items,
            total,
            page,
            page_size,
            total_pages: total_pages(total, page_size),
        }
    }

    pub(crate) fn get_client(&self, client_id: &str) -> Option<ClientRecord> {
        self.clients.get(client_id).cloned()
    }

    /// Drop every record currently flagged offline. The count covers this
    /// call only; the final state never holds offline records.
    pub(crate) fn remove_offline(&mut self) -> u64 {
        let before = self.clients.len();
        self.clients
            .retain(|_, rec| rec.status != ClientStatus::Offline);
        (before - self.clients.len()) as u64
    }

    /// Split a task evenly across `client_count` online, idle clients and
    /// mark them busy. Picks clients in registration order.
    pub(crate) fn create_task(
        &mut self,
        req: &CreateTaskRequest,
        now: DateTime<Utc>,
    ) -> Result<CreateTaskResult, RegistryError> {
        if req.client_count == 0 {
            return Err(RegistryError::EmptyTask);
        }

        let mut available: Vec<(i64, String)> = self
            .clients
            .values()
            .filter(|c| c.status == ClientStatus::Online && c.task_status == WorkStatus::Idle)
            .map(|c| (c.id, c.client_id.clone()))
            .collect();
        available.sort_by_key(|(id, _)| *id);

        if (available.len() as u32) < req.client_count {
            return Err(RegistryError::NotEnoughClients {
                needed: req.client_count,
                available: available.len() as u32,
            });
        }

        let duration_per_client = req.total_duration_secs / req.client_count as u64;

        self.next_task_id += 1;
        let task_id = self.next_task_id;
        self.tasks.push(TaskEntry {
            id: task_id,
            target: req.target.clone(),
            total_duration_secs: req.total_duration_secs,
            status: TaskStatus::Pending,
            client_count: req.client_count,
            created_at: now,
            updated_at: now,
        });

        for (_, client_id) in available.into_iter().take(req.client_count as usize) {
            if let Some(rec) = self.clients.get_mut(&client_id) {
                rec.task_status = WorkStatus::Busy;
            }

            self.next_assignment_id += 1;
            self.assignments.push(AssignmentEntry {
                id: self.next_assignment_id,
                task_id,
                client_id,
                target: req.target.clone(),
                total_duration_secs: duration_per_client,
                elapsed_secs: 0,
                status: TaskStatus::Pending,
                last_report: None,
                failure: None,
            });
        }

        info!(
            "task {task_id} created: {}s across {} clients",
            req.total_duration_secs, req.client_count
        );

        Ok(CreateTaskResult {
            task_id,
            client_count: req.client_count,
            duration_per_client_secs: duration_per_client,
        })
    }

    /// A client's next open assignment, if any. Pending flips to running on
    /// first poll; the parent task starts with its first polled slice.
    pub(crate) fn poll_assignment(
        &mut self,
        client_id: &str,
        now: DateTime<Utc>,
    ) -> Option<Assignment> {
        let idx = self.assignments.iter().position(|a| {
            a.client_id == client_id
                && matches!(a.status, TaskStatus::Pending | TaskStatus::Running)
        })?;

        let (task_id, was_pending) = {
            let entry = &mut self.assignments[idx];
            let was_pending = entry.status == TaskStatus::Pending;
            if was_pending {
                entry.status = TaskStatus::Running;
            }
            (entry.task_id, was_pending)
        };

        if was_pending {
            if let Some(task) = self.tasks.iter_mut().find(|t| t.id == task_id) {
                if task.status == TaskStatus::Pending {
                    task.status = TaskStatus::Running;
                    task.updated_at = now;
                }
            }
        }

        Some(self.assignments[idx].to_wire())
    }

    /// Record elapsed progress; a slice at or over its duration completes,
    /// frees its client, and completes the task once every slice is done.
    pub(crate) fn report_progress(
        &mut self,
        report: &ProgressReport,
        now: DateTime<Utc>,
    ) -> Result<(), RegistryError> {
        let idx = self
            .assignments
            .iter()
            .position(|a| a.id == report.assignment_id)
            .ok_or(RegistryError::UnknownAssignment(report.assignment_id))?;

        let (task_id, client_id, completed) = {
            let entry = &mut self.assignments[idx];
            entry.elapsed_secs = report.elapsed_secs;
            entry.last_report = Some(now);
            let completed = entry.elapsed_secs >= entry.total_duration_secs;
            if completed {
                entry.status = TaskStatus::Completed;
            }
            (entry.task_id, entry.client_id.clone(), completed)
        };

        if completed {
            self.release_client(&client_id);
        }
        self.refresh_task(task_id, now);

        Ok(())
    }

    /// Mark a slice failed and free its client. The parent task keeps
    /// running: other slices may still finish.
    pub(crate) fn report_failure(
        &mut self,
        report: &FailureReport,
        now: DateTime<Utc>,
    ) -> Result<(), RegistryError> {
        let idx = self
            .assignments
            .iter()
            .position(|a| a.id == report.assignment_id)
            .ok_or(RegistryError::UnknownAssignment(report.assignment_id))?;

        let (task_id, client_id) = {
            let entry = &mut self.assignments[idx];
            entry.status = TaskStatus::Failed;
            entry.last_report = Some(now);
            entry.failure = Some(match &report.detail {
                Some(detail) => format!("{}: {}", report.error_message, detail),
                None => report.error_message.clone(),
            });
            (entry.task_id, entry.client_id.clone())
        };

        log::warn!(
            "assignment {} on {} failed: {}",
            report.assignment_id,
            client_id,
            report.error_message
        );

        self.release_client(&client_id);
        self.refresh_task(task_id, now);

        Ok(())
    }

    pub(crate) fn page_tasks(
        &self,
        page: u32,
        page_size: u32,
        status: Option<TaskStatus>,
    ) -> TaskPage {
        let page = page.max(1);
        let page_size = page_size.max(1);

        let mut tasks: Vec<&TaskEntry> = self
            .tasks
            .iter()
            .filter(|t| status.is_none_or(|s| t.status == s))
            .collect();
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = tasks.len() as u64;
        let start = ((page - 1) as usize).saturating_mul(page_size as usize);
        let items = tasks
            .into_iter()
            .skip(start)
            .take(page_size as usize)
            .map(|t| self.summarize(t))
            .collect();

        TaskPage {
            items,
            total,
            page,
            page_size,
            total_pages: total_pages(total, page_size),
        }
    }

    pub(crate) fn stats(&self) -> RegistryStats {
        RegistryStats {
            clients: self.clients.len(),
            online: self
                .clients
                .values()
                .filter(|c| c.status == ClientStatus::Online)
                .count(),
            busy: self
                .clients
                .values()
                .filter(|c| c.task_status == WorkStatus::Busy)
                .count(),
            tasks: self.tasks.len(),
            open_assignments: self
                .assignments
                .iter()
                .filter(|a| matches!(a.status, TaskStatus::Pending | TaskStatus::Running))
                .count(),
        }
    }

    fn summarize(&self, task: &TaskEntry) -> TaskSummary {
        let assignments: Vec<Assignment> = self
            .assignments
            .iter()
            .filter(|a| a.task_id == task.id)
            .map(AssignmentEntry::to_wire)
            .collect();
        let elapsed_secs: u64 = assignments.iter().map(|a| a.elapsed_secs).sum();

        TaskSummary {
            id: task.id,
            target: task.target.clone(),
            total_duration_secs: task.total_duration_secs,
            elapsed_secs,
            progress: percent(elapsed_secs, task.total_duration_secs),
            status: task.status,
            client_count: task.client_count,
            created_at: task.created_at,
            updated_at: task.updated_at,
            assignments,
        }
    }

    fn release_client(&mut self, client_id: &str) {
        if let Some(rec) = self.clients.get_mut(client_id) {
            rec.task_status = WorkStatus::Idle;
        }
    }

    fn refresh_task(&mut self, task_id: i64, now: DateTime<Utc>) {
        let all_done = self
            .assignments
            .iter()
            .filter(|a| a.task_id == task_id)
            .all(|a| a.status == TaskStatus::Completed);

        if let Some(task) = self.tasks.iter_mut().find(|t| t.id == task_id) {
            task.updated_at = now;
            if all_done && task.status != TaskStatus::Completed {
                task.status = TaskStatus::Completed;
                info!("task {task_id} completed");
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn backdate_heartbeat(&mut self, client_id: &str, at: DateTime<Utc>) {
        if let Some(rec) = self.clients.get_mut(client_id) {
            rec.last_heartbeat = at;
        }
    }
}

fn percent(elapsed: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        (elapsed as f64 / total as f64) * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    fn ip() -> IpAddr {
        "192.0.2.1".parse().unwrap()
    }

    fn registry_with(clients: &[(&str, i64)]) -> Registry {
        let mut registry = Registry::default();
        for (client_id, seen_at) in clients {
            registry.heartbeat(client_id, ip(), at(*seen_at));
        }
        registry
    }

    #[test]
    fn test_heartbeat_registers_then_updates() {
        let mut registry = Registry::default();
        registry.heartbeat("a", ip(), at(0));
        registry.heartbeat("b", ip(), at(5));
        registry.heartbeat("a", "198.51.100.9".parse().unwrap(), at(10));

        let a = registry.get_client("a").unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(a.ip_address, "198.51.100.9");
        assert_eq!(a.last_heartbeat, at(10));
        assert_eq!(a.created_at, at(0));
        assert_eq!(a.status, ClientStatus::Online);

        assert_eq!(registry.get_client("b").unwrap().id, 2);
    }

    #[test]
    fn test_sweep_marks_only_stale_online() {
        let mut registry = registry_with(&[("stale", 0), ("fresh", 100)]);

        let marked = registry.sweep_offline(Duration::seconds(60), at(130));
        assert_eq!(marked, 1);
        assert_eq!(
            registry.get_client("stale").unwrap().status,
            ClientStatus::Offline
        );
        assert_eq!(
            registry.get_client("fresh").unwrap().status,
            ClientStatus::Online
        );

        // Already-offline clients do not count again.
        assert_eq!(registry.sweep_offline(Duration::seconds(60), at(131)), 0);
    }

    #[test]
    fn test_sweep_revives_nothing_at_boundary() {
        let mut registry = registry_with(&[("edge", 0)]);
        // Exactly at the timeout is still fresh; strictly older is not.
        assert_eq!(registry.sweep_offline(Duration::seconds(60), at(60)), 0);
        assert_eq!(registry.sweep_offline(Duration::seconds(60), at(61)), 1);
    }

    #[test]
    fn test_page_clients_order_and_bounds() {
        let registry = registry_with(&[("a", 10), ("b", 30), ("c", 20)]);

        let page = registry.page_clients(1, 2);
        assert_eq!(page.total, 3);
        assert_eq!(page.total_pages, 2);
        let ids: Vec<&str> = page.items.iter().map(|c| c.client_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c"]);

        let page = registry.page_clients(2, 2);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].client_id, "a");

        assert!(registry.page_clients(99, 2).items.is_empty());
    }

    #[test]
    fn test_page_clients_clamps_zero_params() {
        let registry = registry_with(&[("a", 10)]);
        let page = registry.page_clients(0, 0);
        assert_eq!(page.page, 1);
        assert_eq!(page.page_size, 1);
        assert_eq!(page.items.len(), 1);
    }

    #[test]
    fn test_remove_offline_counts_then_zero() {
        let mut registry = registry_with(&[("a", 0), ("b", 0), ("c", 100)]);
        registry.sweep_offline(Duration::seconds(60), at(120));

        assert_eq!(registry.remove_offline(), 2);
        assert_eq!(registry.page_clients(1, 10).total, 1);

        // Second pass with no new stragglers deletes nothing.
        assert_eq!(registry.remove_offline(), 0);
    }

    fn task(target: &str, duration: u64, count: u32) -> CreateTaskRequest {
        CreateTaskRequest {
            target: target.to_string(),
            total_duration_secs: duration,
            client_count: count,
        }
    }

    #[test]
    fn test_create_task_splits_and_marks_busy() {
        let mut registry = registry_with(&[("a", 0), ("b", 0), ("c", 0)]);

        let result = registry.create_task(&task("t", 600, 2), at(1)).unwrap();
        assert_eq!(result.task_id, 1);
        assert_eq!(result.duration_per_client_secs, 300);

        // Picks in registration order: a and b busy, c untouched.
        assert_eq!(
            registry.get_client("a").unwrap().task_status,
            WorkStatus::Busy
        );
        assert_eq!(
            registry.get_client("b").unwrap().task_status,
            WorkStatus::Busy
        );
        assert_eq!(
            registry.get_client("c").unwrap().task_status,
            WorkStatus::Idle
        );
    }

    #[test]
    fn test_create_task_needs_online_idle_clients() {
        let mut registry = registry_with(&[("a", 0), ("b", 100)]);
        registry.sweep_offline(Duration::seconds(60), at(120));

        let err = registry.create_task(&task("t", 600, 2), at(121)).unwrap_err();
        assert_eq!(
            err,
            RegistryError::NotEnoughClients {
                needed: 2,
                available: 1
            }
        );

        registry.create_task(&task("t", 600, 1), at(122)).unwrap();
        let err = registry.create_task(&task("t", 600, 1), at(123)).unwrap_err();
        assert_eq!(
            err,
            RegistryError::NotEnoughClients {
                needed: 1,
                available: 0
            }
        );
    }

    #[test]
    fn test_create_task_rejects_zero_clients() {
        let mut registry = registry_with(&[("a", 0)]);
        assert_eq!(
            registry.create_task(&task("t", 600, 0), at(1)).unwrap_err(),
            RegistryError::EmptyTask
        );
    }

    #[test]
    fn test_poll_assignment_starts_slice_and_task() {
        let mut registry = registry_with(&[("a", 0)]);
        registry.create_task(&task("t", 300, 1), at(1)).unwrap();

        assert!(registry.poll_assignment("unknown", at(2)).is_none());

        let assignment = registry.poll_assignment("a", at(2)).unwrap();
        assert_eq!(assignment.status, TaskStatus::Running);
        assert_eq!(assignment.total_duration_secs, 300);

        let page = registry.page_tasks(1, 10, None);
        assert_eq!(page.items[0].status, TaskStatus::Running);

        // Subsequent polls return the same open slice.
        let again = registry.poll_assignment("a", at(3)).unwrap();
        assert_eq!(again.id, assignment.id);
    }

    #[test]
    fn test_progress_completes_slice_and_task() {
        let mut registry = registry_with(&[("a", 0), ("b", 0)]);
        registry.create_task(&task("t", 600, 2), at(1)).unwrap();
        let first = registry.poll_assignment("a", at(2)).unwrap();
        let second = registry.poll_assignment("b", at(2)).unwrap();

        registry
            .report_progress(
                &ProgressReport {
                    assignment_id: first.id,
                    elapsed_secs: 150,
                },
                at(3),
            )
            .unwrap();

        let summary = &registry.page_tasks(1, 10, None).items[0];
        assert_eq!(summary.elapsed_secs, 150);
        assert_eq!(summary.progress, 25.0);
        assert_eq!(summary.status, TaskStatus::Running);

        registry
            .report_progress(
                &ProgressReport {
                    assignment_id: first.id,
                    elapsed_secs: 300,
                },
                at(4),
            )
            .unwrap();

        // First slice done: its client is free again, the task is not.
        assert_eq!(
            registry.get_client("a").unwrap().task_status,
            WorkStatus::Idle
        );
        assert_eq!(
            registry.page_tasks(1, 10, None).items[0].status,
            TaskStatus::Running
        );

        registry
            .report_progress(
                &ProgressReport {
                    assignment_id: second.id,
                    elapsed_secs: 300,
                },
                at(5),
            )
            .unwrap();

        let summary = &registry.page_tasks(1, 10, None).items[0];
        assert_eq!(summary.status, TaskStatus::Completed);
        assert_eq!(summary.progress, 100.0);
    }

    #[test]
    fn test_progress_unknown_assignment() {
        let mut registry = Registry::default();
        let err = registry
            .report_progress(
                &ProgressReport {
                    assignment_id: 42,
                    elapsed_secs: 1,
                },
                at(0),
            )
            .unwrap_err();
        assert_eq!(err, RegistryError::UnknownAssignment(42));
    }

    #[test]
    fn test_failure_frees_client_without_completing_task() {
        let mut registry = registry_with(&[("a", 0)]);
        registry.create_task(&task("t", 300, 1), at(1)).unwrap();
        let assignment = registry.poll_assignment("a", at(2)).unwrap();

        registry
            .report_failure(
                &FailureReport {
                    assignment_id: assignment.id,
                    error_message: "target unreachable".to_string(),
                    detail: Some("connect timed out".to_string()),
                },
                at(3),
            )
            .unwrap();

        assert_eq!(
            registry.get_client("a").unwrap().task_status,
            WorkStatus::Idle
        );
        let summary = &registry.page_tasks(1, 10, None).items[0];
        assert_eq!(summary.status, TaskStatus::Running);
        assert_eq!(summary.assignments[0].status, TaskStatus::Failed);

        // A failed slice leaves no open assignment behind.
        assert!(registry.poll_assignment("a", at(4)).is_none());
    }

    #[test]
    fn test_page_tasks_filters_by_status() {
        let mut registry = registry_with(&[("a", 0), ("b", 0)]);
        registry.create_task(&task("t1", 300, 1), at(1)).unwrap();
        registry.create_task(&task("t2", 300, 1), at(2)).unwrap();
        let assignment = registry.poll_assignment("a", at(3)).unwrap();
        registry
            .report_progress(
                &ProgressReport {
                    assignment_id: assignment.id,
                    elapsed_secs: 300,
                },
                at(4),
            )
            .unwrap();

        let completed = registry.page_tasks(1, 10, Some(TaskStatus::Completed));
        assert_eq!(completed.total, 1);
        assert_eq!(completed.items[0].target, "t1");

        let pending = registry.page_tasks(1, 10, Some(TaskStatus::Pending));
        assert_eq!(pending.total, 1);
        assert_eq!(pending.items[0].target, "t2");

        // Newest first when unfiltered.
        let all = registry.page_tasks(1, 10, None);
        assert_eq!(all.items[0].target, "t2");
    }
}
