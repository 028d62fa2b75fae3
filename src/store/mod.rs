//! Record store abstraction. The workflow treats persistence as a
//! transactional key-value store keyed by leave id, with optimistic
//! versioning: every write must name the version it read, and a stale
//! version loses with `Conflict` instead of overwriting.

pub mod memory;
pub mod mysql;

use async_trait::async_trait;
use derive_more::Display;
use uuid::Uuid;

use crate::model::leave_request::{LeaveRequest, LeaveStatus};

#[derive(Debug, Display)]
pub enum StoreError {
    #[display(fmt = "record not found")]
    NotFound,
    #[display(fmt = "version conflict")]
    Conflict,
    #[display(fmt = "store backend error: {}", _0)]
    Backend(String),
}

impl std::error::Error for StoreError {}

/// A record together with the version it was read at; the version is what
/// `compare_and_set` checks against.
#[derive(Debug, Clone)]
pub struct VersionedLeave {
    pub version: u64,
    pub record: LeaveRequest,
}

/// Listing filter, page numbers are 1-based.
#[derive(Debug, Clone, Default)]
pub struct LeaveQuery {
    pub employee_id: Option<String>,
    pub status: Option<LeaveStatus>,
    pub page: u64,
    pub per_page: u64,
}

#[async_trait]
pub trait LeaveStore: Send + Sync {
    /// Insert a brand-new record at version 1. Fails on id collision.
    async fn insert(&self, record: &LeaveRequest) -> Result<(), StoreError>;

    async fn get(&self, id: Uuid) -> Result<VersionedLeave, StoreError>;

    /// Atomic conditional update: succeeds only if the stored version still
    /// equals `expected_version`, returning the new version.
    async fn compare_and_set(
        &self,
        id: Uuid,
        expected_version: u64,
        record: &LeaveRequest,
    ) -> Result<u64, StoreError>;

    /// Filtered page of records, newest first, plus the unpaginated total.
    async fn list(&self, query: &LeaveQuery) -> Result<(Vec<LeaveRequest>, i64), StoreError>;

    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;
}
