use std::sync::Arc;

use grid_query::PageData;
use sea_orm::DatabaseConnection;
use tracing::{debug, info, instrument};

use super::error::DomainError;
use super::model::{Tehsil, TehsilRef, TehsilWrite};
use super::repos::{HospitalRepository, TehsilRepository, UsersRepository};

/// Application service for the tehsil entity.
///
/// Thin orchestration over the repositories: CRUD passes through, the
/// association check fans out to hospital and user counts, and the grid
/// query pairs a filtered page with the unfiltered total.
pub struct TehsilService<R, H, U> {
    db: DatabaseConnection,
    tehsils: Arc<R>,
    hospitals: Arc<H>,
    users: Arc<U>,
}

impl<R, H, U> TehsilService<R, H, U>
where
    R: TehsilRepository,
    H: HospitalRepository,
    U: UsersRepository,
{
    pub fn new(db: DatabaseConnection, tehsils: Arc<R>, hospitals: Arc<H>, users: Arc<U>) -> Self {
        Self {
            db,
            tehsils,
            hospitals,
            users,
        }
    }

    #[instrument(skip(self, tehsil))]
    pub async fn add_tehsil(&self, tehsil: TehsilWrite) -> Result<(), DomainError> {
        info!(name = %tehsil.name, "creating tehsil");
        self.tehsils.save(&self.db, tehsil).await
    }

    /// Same upsert path as [`Self::add_tehsil`]; the payload's id picks the row.
    #[instrument(skip(self, tehsil))]
    pub async fn update_tehsil(&self, tehsil: TehsilWrite) -> Result<(), DomainError> {
        info!(id = ?tehsil.id, "updating tehsil");
        self.tehsils.save(&self.db, tehsil).await
    }

    pub async fn get_tehsils(&self) -> Result<Vec<Tehsil>, DomainError> {
        self.tehsils.find_all(&self.db).await
    }

    pub async fn get_tehsil_by_id(&self, id: i32) -> Result<Option<Tehsil>, DomainError> {
        self.tehsils.find_by_id(&self.db, id).await
    }

    pub async fn get_tehsil_id_and_name(&self) -> Result<Vec<TehsilRef>, DomainError> {
        self.tehsils.find_id_name_pairs(&self.db).await
    }

    pub async fn get_tehsil_id_and_name_by_district_ids(
        &self,
        district_ids: &[i32],
    ) -> Result<Vec<TehsilRef>, DomainError> {
        self.tehsils
            .find_id_name_pairs_by_districts(&self.db, district_ids)
            .await
    }

    #[instrument(skip(self))]
    pub async fn delete_tehsil(&self, id: i32) -> Result<(), DomainError> {
        info!("deleting tehsil");
        self.tehsils.delete_by_id(&self.db, id).await
    }

    /// Whether any hospital or user still references the tehsil. Callers
    /// check this before deleting.
    #[instrument(skip(self))]
    pub async fn is_tehsil_associated(&self, id: i32) -> Result<bool, DomainError> {
        let hospitals = self.hospitals.count_by_tehsil_id(&self.db, id).await?;
        let users = self.users.count_by_tehsil_id(&self.db, id).await?;
        Ok(hospitals > 0 || users > 0)
    }

    /// One grid page plus the total row count.
    ///
    /// `start` is a row offset and is translated to a page index by integer
    /// division, so callers are expected to pass multiples of `size`. The
    /// total deliberately ignores the filters: the grid uses it to size the
    /// pager across the whole table.
    #[instrument(skip(self, filters, sorting, global_filter))]
    pub async fn get_table_data(
        &self,
        start: u64,
        size: u64,
        filters: &str,
        sorting: &str,
        global_filter: Option<&str>,
    ) -> Result<PageData<Tehsil>, DomainError> {
        let page = start / size;
        debug!(page, size, "loading tehsil grid page");
        let items = self
            .tehsils
            .find_page(&self.db, page, size, sorting, filters, global_filter)
            .await?;
        let total_count = self.tehsils.count_all(&self.db).await?;
        Ok(PageData { items, total_count })
    }
}
