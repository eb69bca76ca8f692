use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(District::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(District::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(District::Name).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Tehsil::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Tehsil::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Tehsil::Name).string().not_null())
                    .col(ColumnDef::new(Tehsil::DistrictId).integer().not_null())
                    .col(
                        ColumnDef::new(Tehsil::CreatedOn)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Tehsil::UpdatedOn)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tehsil_district")
                            .from(Tehsil::Table, Tehsil::DistrictId)
                            .to(District::Table, District::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Hospital::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Hospital::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Hospital::Name).string().not_null())
                    .col(ColumnDef::new(Hospital::TehsilId).integer())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_hospital_tehsil")
                            .from(Hospital::Table, Hospital::TehsilId)
                            .to(Tehsil::Table, Tehsil::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Name).string().not_null())
                    .col(ColumnDef::new(Users::TehsilId).integer())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_users_tehsil")
                            .from(Users::Table, Users::TehsilId)
                            .to(Tehsil::Table, Tehsil::Id),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Hospital::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tehsil::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(District::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum District {
    Table,
    Id,
    Name,
}

#[derive(DeriveIden)]
enum Tehsil {
    Table,
    Id,
    Name,
    DistrictId,
    CreatedOn,
    UpdatedOn,
}

#[derive(DeriveIden)]
enum Hospital {
    Table,
    Id,
    Name,
    TehsilId,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Name,
    TehsilId,
}
