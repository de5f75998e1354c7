//! Mirror entry repository for database operations.

use anyhow::Result;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ActiveValue, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};

use crate::entities::mirror_entry;
use crate::utils::datetime;

/// Repository for mirror cache rows.
pub struct MirrorRepository;

impl MirrorRepository {
    /// Get the entry stored under `key`.
    pub async fn get<C>(conn: &C, key: &str) -> Result<Option<mirror_entry::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(mirror_entry::Entity::find()
            .filter(mirror_entry::Column::Key.eq(key))
            .one(conn)
            .await?)
    }

    /// Insert or overwrite the value stored under `key`.
    pub async fn upsert<C>(conn: &C, key: &str, value: &str) -> Result<()>
    where
        C: ConnectionTrait,
    {
        let entry = mirror_entry::ActiveModel {
            key: ActiveValue::Set(key.to_string()),
            value: ActiveValue::Set(value.to_string()),
            updated_at: ActiveValue::Set(datetime::now_timestamp()),
        };

        mirror_entry::Entity::insert(entry)
            .on_conflict(
                OnConflict::column(mirror_entry::Column::Key)
                    .update_columns([mirror_entry::Column::Value, mirror_entry::Column::UpdatedAt])
                    .to_owned(),
            )
            .exec(conn)
            .await?;
        Ok(())
    }
}
