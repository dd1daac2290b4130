use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "facilities")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub facility_name: String,

    pub business_type: Option<String>,

    pub address: Option<String>,

    pub phone: Option<String>,

    pub business_hours: Option<String>,

    pub closed_days: Option<String>,

    pub official_site_url: Option<String>,

    /// Google Business Profile URL
    pub gbp_url: Option<String>,

    pub additional_info: Option<String>,

    /// Lowercased name and address, matched by the list search filter.
    pub search_key: String,

    pub created_by: Option<i32>,

    pub updated_by: Option<i32>,

    pub created_at: String,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::keywords::Entity")]
    Keywords,
}

impl Related<super::keywords::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Keywords.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
