//! Typed client for the rollcall control server.
//!
//! Every call is a stateless request/response exchange with no caching or
//! retrying. Concurrent calls may resolve in any order; failures surface
//! through [`ApiError`].

mod clients;
mod error;
mod heartbeat;
mod tasks;
mod transport;

pub use error::ApiError;
pub use transport::ControlClient;

pub use rollcall_common::api::StatusAck;
pub use rollcall_common::api::clients::{
    ClientPage, ClientRecord, ClientStatus, ListClientsParams, RemoveOfflineResult, WorkStatus,
};
pub use rollcall_common::api::tasks::{
    Assignment, CreateTaskRequest, CreateTaskResult, FailureReport, ListTasksParams,
    ProgressReport, TaskPage, TaskStatus, TaskSummary,
};
