//! Repository traits for the regions domain.
//!
//! Every method takes the connection to run against, so callers choose
//! between the pooled connection and a transaction.

use async_trait::async_trait;
use sea_orm::ConnectionTrait;

use super::error::DomainError;
use super::model::{Tehsil, TehsilRef, TehsilWrite};

/// Storage access for tehsils.
#[async_trait]
pub trait TehsilRepository: Send + Sync {
    /// Upsert: inserts when `tehsil.id` is `None`, updates otherwise.
    async fn save<C: ConnectionTrait>(&self, conn: &C, tehsil: TehsilWrite)
    -> Result<(), DomainError>;

    async fn find_all<C: ConnectionTrait>(&self, conn: &C) -> Result<Vec<Tehsil>, DomainError>;

    async fn find_by_id<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: i32,
    ) -> Result<Option<Tehsil>, DomainError>;

    /// No-op when the row does not exist.
    async fn delete_by_id<C: ConnectionTrait>(&self, conn: &C, id: i32) -> Result<(), DomainError>;

    /// One page of the grid query. `sort_json` and `filter_json` are the raw
    /// grid descriptors; malformed descriptors degrade to unsorted and
    /// unfiltered respectively.
    async fn find_page<C: ConnectionTrait>(
        &self,
        conn: &C,
        page: u64,
        size: u64,
        sort_json: &str,
        filter_json: &str,
        global: Option<&str>,
    ) -> Result<Vec<Tehsil>, DomainError>;

    /// Total row count, ignoring any grid filters.
    async fn count_all<C: ConnectionTrait>(&self, conn: &C) -> Result<u64, DomainError>;

    async fn find_id_name_pairs<C: ConnectionTrait>(
        &self,
        conn: &C,
    ) -> Result<Vec<TehsilRef>, DomainError>;

    async fn find_id_name_pairs_by_districts<C: ConnectionTrait>(
        &self,
        conn: &C,
        district_ids: &[i32],
    ) -> Result<Vec<TehsilRef>, DomainError>;
}

/// The slice of hospital storage the regions domain needs.
#[async_trait]
pub trait HospitalRepository: Send + Sync {
    async fn count_by_tehsil_id<C: ConnectionTrait>(
        &self,
        conn: &C,
        tehsil_id: i32,
    ) -> Result<u64, DomainError>;
}

/// The slice of user storage the regions domain needs.
#[async_trait]
pub trait UsersRepository: Send + Sync {
    async fn count_by_tehsil_id<C: ConnectionTrait>(
        &self,
        conn: &C,
        tehsil_id: i32,
    ) -> Result<u64, DomainError>;
}
