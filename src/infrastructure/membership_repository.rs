use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};

use crate::{
    domain::{
        error::RepositoryError,
        models::{membership::Membership, user::UserId},
        repositories::membership_repository::MembershipRepository,
    },
    infrastructure::{entity::memberships, user_repository::map_db_err},
};

pub struct PostgresMembershipRepository {
    db: DatabaseConnection,
}

impl PostgresMembershipRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MembershipRepository for PostgresMembershipRepository {
    async fn find_by_user(&self, user_id: &UserId) -> Result<Vec<Membership>, RepositoryError> {
        let rows = memberships::Entity::find()
            .filter(memberships::Column::UserId.eq(*user_id.as_uuid()))
            .order_by_asc(memberships::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(rows
            .into_iter()
            .map(|row| {
                Membership::reconstruct(
                    row.id,
                    UserId::from_uuid(row.user_id),
                    row.created_at.with_timezone(&Utc),
                )
            })
            .collect())
    }
}
