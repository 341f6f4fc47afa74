use sea_orm::entity::prelude::*;

/// Shared pool of people; the profession flag separates cast from directors.
#[derive(Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum Profession {
    #[sea_orm(string_value = "actor")]
    Actor,
    #[sea_orm(string_value = "director")]
    Director,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "actors")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub age: i32,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub image: String,
    pub profession: Profession,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::movie_credit::Entity")]
    MovieCredits,
}

impl Related<super::movie_credit::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MovieCredits.def()
    }
}

impl Related<super::movie::Entity> for Entity {
    fn to() -> RelationDef {
        super::movie_credit::Relation::Movie.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::movie_credit::Relation::Actor.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
