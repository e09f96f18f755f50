use reqwest::Method;
use rollcall_common::api::StatusAck;
use rollcall_common::api::tasks::{
    Assignment, CreateTaskRequest, CreateTaskResult, FailureReport, ListTasksParams,
    ProgressReport, TaskPage,
};

use crate::ControlClient;
use crate::error::ApiError;

impl ControlClient {
    /// Create a task split evenly across currently available clients. Fails
    /// with an api error when fewer than `client_count` clients are online
    /// and idle.
    pub async fn create_task(&self, req: &CreateTaskRequest) -> Result<CreateTaskResult, ApiError> {
        let request = self.request(Method::POST, "tasks")?.json(req);
        self.execute(request).await
    }

    pub async fn list_tasks(&self, params: ListTasksParams) -> Result<TaskPage, ApiError> {
        let request = self.request(Method::GET, "tasks")?.query(&params);
        self.execute(request).await
    }

    /// Fetch the next assignment for a client, if any. A pending assignment
    /// flips to running on first poll.
    pub async fn poll_assignment(&self, client_id: &str) -> Result<Option<Assignment>, ApiError> {
        let request = self.request(Method::GET, &format!("tasks/client/{client_id}"))?;
        self.execute_optional(request).await
    }

    pub async fn report_progress(&self, report: &ProgressReport) -> Result<StatusAck, ApiError> {
        let request = self.request(Method::POST, "tasks/progress")?.json(report);
        self.execute(request).await
    }

    pub async fn report_failure(&self, report: &FailureReport) -> Result<StatusAck, ApiError> {
        let request = self.request(Method::POST, "tasks/error")?.json(report);
        self.execute(request).await
    }
}
