use chrono::{DateTime, Utc};
use sea_orm::{entity::prelude::*, DatabaseConnection, Set};
use serde::{Deserialize, Serialize};

use crate::errors;
use crate::item;
use crate::user;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "bookings")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub item_id: i64,
    pub booker_id: i64,
    pub start_date: DateTimeWithTimeZone,
    pub end_date: DateTimeWithTimeZone,
    pub status: String,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Item,
    Booker,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Item => Entity::belongs_to(item::Entity)
                .from(Column::ItemId)
                .to(item::Column::Id)
                .into(),
            Relation::Booker => Entity::belongs_to(user::Entity)
                .from(Column::BookerId)
                .to(user::Column::Id)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub async fn create(
    db: &DatabaseConnection,
    item_id: i64,
    booker_id: i64,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    status: &str,
) -> Result<Model, errors::ModelError> {
    if start >= end {
        return Err(errors::ModelError::Validation("start must precede end".into()));
    }
    let am = ActiveModel {
        item_id: Set(item_id),
        booker_id: Set(booker_id),
        start_date: Set(start.into()),
        end_date: Set(end.into()),
        status: Set(status.to_string()),
        ..Default::default()
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

pub async fn find_by_id(db: &DatabaseConnection, id: i64) -> Result<Option<Model>, errors::ModelError> {
    Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}

pub async fn set_status(db: &DatabaseConnection, id: i64, status: &str) -> Result<Model, errors::ModelError> {
    let mut found: ActiveModel = Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))?
        .ok_or_else(|| errors::ModelError::Validation("booking not found".into()))?
        .into();
    found.status = Set(status.to_string());
    found
        .update(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}
