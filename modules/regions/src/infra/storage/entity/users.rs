use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub tehsil_id: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::tehsil::Entity",
        from = "Column::TehsilId",
        to = "super::tehsil::Column::Id"
    )]
    Tehsil,
}

impl Related<super::tehsil::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tehsil.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
