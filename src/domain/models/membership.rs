use chrono::{DateTime, Utc};
use sea_orm::prelude::Uuid;

use crate::domain::models::user::UserId;

/// Child record of a `User`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Membership {
    id: Uuid,
    user_id: UserId,
    created_at: DateTime<Utc>,
}

impl Membership {
    pub fn reconstruct(id: Uuid, user_id: UserId, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id,
            created_at,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
