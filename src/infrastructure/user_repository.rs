use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, SqlErr,
};
use uuid::Uuid;

use crate::{
    domain::{
        error::RepositoryError,
        models::{
            password::PasswordDigest,
            user::{UnsavedUser, User, UserId},
        },
        repositories::user_repository::UserRepository,
    },
    infrastructure::entity::users,
};

pub struct PostgresUserRepository {
    db: DatabaseConnection,
}

impl PostgresUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

pub(crate) fn map_db_err(e: DbErr) -> RepositoryError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => RepositoryError::Conflict(detail),
        _ => RepositoryError::DatabaseError(e.to_string()),
    }
}

fn to_domain(model: users::Model) -> User {
    User::reconstruct(
        UserId::from_uuid(model.id),
        model.first_name,
        model.last_name,
        model.email,
        model.github_username,
        PasswordDigest::new(model.password_digest),
        model.created_at.with_timezone(&Utc),
        model.updated_at.with_timezone(&Utc),
    )
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_github_username(
        &self,
        github_username: &str,
    ) -> Result<Option<User>, RepositoryError> {
        let user = users::Entity::find()
            .filter(users::Column::GithubUsername.eq(github_username))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(user.map(to_domain))
    }

    async fn insert(&self, user: UnsavedUser) -> Result<User, RepositoryError> {
        let now = Utc::now().fixed_offset();
        let user_model = users::ActiveModel {
            id: Set(Uuid::new_v4()),
            first_name: Set(user.first_name),
            last_name: Set(user.last_name),
            email: Set(user.email),
            github_username: Set(user.github_username),
            password_digest: Set(user.password_digest.into_string()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = user_model.insert(&self.db).await.map_err(map_db_err)?;

        Ok(to_domain(model))
    }
}
