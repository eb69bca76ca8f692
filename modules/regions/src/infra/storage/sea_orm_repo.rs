//! SeaORM-backed repositories for the regions domain.

use async_trait::async_trait;
use chrono::Utc;
use grid_query::{GridSchema, GridSelectExt, parse_sort, translate};
use sea_orm::{
    ActiveValue, ColumnTrait, ConnectionTrait, EntityTrait, JoinType, PaginatorTrait, QueryFilter,
    QuerySelect, RelationTrait, Select,
};
use tracing::debug;

use super::entity::{district, hospital, tehsil, users};
use crate::domain::error::DomainError;
use crate::domain::model::{Tehsil, TehsilRef, TehsilWrite};
use crate::domain::repos::{HospitalRepository, TehsilRepository, UsersRepository};

pub struct SeaOrmTehsilRepository;

/// Grid field registry for the tehsil table.
///
/// The district table is marked as provided: the base select already left
/// joins it for the `district_name` projection, so predicates on
/// `district.name` must not join it again.
fn grid_schema() -> GridSchema<tehsil::Entity> {
    GridSchema::new()
        .column("id", tehsil::Column::Id)
        .column("name", tehsil::Column::Name)
        .column("districtId", tehsil::Column::DistrictId)
        .column("createdOn", tehsil::Column::CreatedOn)
        .column("updatedOn", tehsil::Column::UpdatedOn)
        .provided_relation("district", "district")
        .searchable("name")
        .searchable("district.name")
        .global_numeric("id")
        .global_timestamp("createdOn")
        .global_timestamp("updatedOn")
}

/// Base read select: tehsil columns plus the joined district name.
fn with_district() -> Select<tehsil::Entity> {
    tehsil::Entity::find()
        .join(JoinType::LeftJoin, tehsil::Relation::District.def())
        .select_only()
        .columns([
            tehsil::Column::Id,
            tehsil::Column::Name,
            tehsil::Column::DistrictId,
            tehsil::Column::CreatedOn,
            tehsil::Column::UpdatedOn,
        ])
        .column_as(district::Column::Name, "district_name")
}

#[async_trait]
impl TehsilRepository for SeaOrmTehsilRepository {
    async fn save<C: ConnectionTrait>(
        &self,
        conn: &C,
        tehsil: TehsilWrite,
    ) -> Result<(), DomainError> {
        use sea_orm::ActiveModelTrait;

        let now = Utc::now();
        let model = tehsil::ActiveModel {
            id: tehsil.id.map_or(ActiveValue::NotSet, ActiveValue::Set),
            name: ActiveValue::Set(tehsil.name),
            district_id: ActiveValue::Set(tehsil.district_id),
            // set once on insert, untouched afterwards
            created_on: if tehsil.id.is_none() {
                ActiveValue::Set(now)
            } else {
                ActiveValue::NotSet
            },
            updated_on: ActiveValue::Set(now),
        };
        model.save(conn).await?;
        Ok(())
    }

    async fn find_all<C: ConnectionTrait>(&self, conn: &C) -> Result<Vec<Tehsil>, DomainError> {
        Ok(with_district().into_model::<Tehsil>().all(conn).await?)
    }

    async fn find_by_id<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: i32,
    ) -> Result<Option<Tehsil>, DomainError> {
        Ok(with_district()
            .filter(tehsil::Column::Id.eq(id))
            .into_model::<Tehsil>()
            .one(conn)
            .await?)
    }

    async fn delete_by_id<C: ConnectionTrait>(&self, conn: &C, id: i32) -> Result<(), DomainError> {
        let res = tehsil::Entity::delete_by_id(id).exec(conn).await?;
        debug!(id, rows = res.rows_affected, "deleted tehsil");
        Ok(())
    }

    async fn find_page<C: ConnectionTrait>(
        &self,
        conn: &C,
        page: u64,
        size: u64,
        sort_json: &str,
        filter_json: &str,
        global: Option<&str>,
    ) -> Result<Vec<Tehsil>, DomainError> {
        let schema = grid_schema();
        let grid = translate(filter_json, global, &schema)?;
        Ok(with_district()
            .apply_grid(grid, parse_sort(sort_json).as_ref(), &schema)?
            .into_model::<Tehsil>()
            .paginate(conn, size)
            .fetch_page(page)
            .await?)
    }

    async fn count_all<C: ConnectionTrait>(&self, conn: &C) -> Result<u64, DomainError> {
        Ok(tehsil::Entity::find().count(conn).await?)
    }

    async fn find_id_name_pairs<C: ConnectionTrait>(
        &self,
        conn: &C,
    ) -> Result<Vec<TehsilRef>, DomainError> {
        let rows: Vec<(i32, String)> = tehsil::Entity::find()
            .select_only()
            .columns([tehsil::Column::Id, tehsil::Column::Name])
            .into_tuple()
            .all(conn)
            .await?;
        Ok(rows
            .into_iter()
            .map(|(id, name)| TehsilRef { id, name })
            .collect())
    }

    async fn find_id_name_pairs_by_districts<C: ConnectionTrait>(
        &self,
        conn: &C,
        district_ids: &[i32],
    ) -> Result<Vec<TehsilRef>, DomainError> {
        let rows: Vec<(i32, String)> = tehsil::Entity::find()
            .filter(tehsil::Column::DistrictId.is_in(district_ids.iter().copied()))
            .select_only()
            .columns([tehsil::Column::Id, tehsil::Column::Name])
            .into_tuple()
            .all(conn)
            .await?;
        Ok(rows
            .into_iter()
            .map(|(id, name)| TehsilRef { id, name })
            .collect())
    }
}

pub struct SeaOrmHospitalRepository;

#[async_trait]
impl HospitalRepository for SeaOrmHospitalRepository {
    async fn count_by_tehsil_id<C: ConnectionTrait>(
        &self,
        conn: &C,
        tehsil_id: i32,
    ) -> Result<u64, DomainError> {
        Ok(hospital::Entity::find()
            .filter(hospital::Column::TehsilId.eq(tehsil_id))
            .count(conn)
            .await?)
    }
}

pub struct SeaOrmUsersRepository;

#[async_trait]
impl UsersRepository for SeaOrmUsersRepository {
    async fn count_by_tehsil_id<C: ConnectionTrait>(
        &self,
        conn: &C,
        tehsil_id: i32,
    ) -> Result<u64, DomainError> {
        Ok(users::Entity::find()
            .filter(users::Column::TehsilId.eq(tehsil_id))
            .count(conn)
            .await?)
    }
}
