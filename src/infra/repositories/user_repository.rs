//! User repository implementation.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set, SqlErr,
};
use uuid::Uuid;

use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use crate::domain::{NewUser, User};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by ID
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Find user by email address
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// List every user
    async fn find_all(&self) -> AppResult<Vec<User>>;

    /// Insert a new user, assigning a fresh id.
    ///
    /// Fails with `DuplicateEmail` when the email is already taken.
    async fn create(&self, new_user: NewUser) -> AppResult<User>;

    /// Persist every mutable field of an existing user
    async fn save(&self, user: User) -> AppResult<User>;
}

/// SeaORM backed UserRepository
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// A unique-index violation on insert means another request won the race
/// for the same email.
fn map_insert_error(err: DbErr) -> AppError {
    classify_insert_error(err.sql_err(), err)
}

/// The unique email index is the only constraint an insert can violate.
fn classify_insert_error(kind: Option<SqlErr>, err: DbErr) -> AppError {
    match kind {
        Some(SqlErr::UniqueConstraintViolation(detail)) => {
            tracing::debug!("Unique constraint violated on insert: {}", detail);
            AppError::DuplicateEmail
        }
        _ => AppError::Database(err),
    }
}

fn map_save_error(err: DbErr) -> AppError {
    match err {
        DbErr::RecordNotUpdated => AppError::NotFound,
        other => AppError::Database(other),
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let result = UserEntity::find_by_id(id).one(&self.db).await?;
        Ok(result.map(User::from))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await?;

        Ok(result.map(User::from))
    }

    async fn find_all(&self) -> AppResult<Vec<User>> {
        let models = UserEntity::find()
            .order_by_asc(user::Column::Email)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(User::from).collect())
    }

    async fn create(&self, new_user: NewUser) -> AppResult<User> {
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            full_name: Set(new_user.full_name),
            birth_date: Set(new_user.birth_date),
            email: Set(new_user.email),
            password_hash: Set(new_user.password_hash),
            role: Set(new_user.role.to_string()),
            is_active: Set(true),
        };

        let model = active_model.insert(&self.db).await.map_err(map_insert_error)?;
        Ok(User::from(model))
    }

    async fn save(&self, user: User) -> AppResult<User> {
        let active_model = ActiveModel {
            id: Set(user.id),
            full_name: Set(user.full_name),
            birth_date: Set(user.birth_date),
            email: Set(user.email),
            password_hash: Set(user.password_hash),
            role: Set(user.role.to_string()),
            is_active: Set(user.is_active),
        };

        let model = active_model.update(&self.db).await.map_err(map_save_error)?;

        Ok(User::from(model))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_unique_violation_maps_to_duplicate_email() {
        let err = classify_insert_error(
            Some(SqlErr::UniqueConstraintViolation(
                "duplicate key value violates unique constraint \"idx_users_email\"".to_string(),
            )),
            DbErr::Custom("insert failed".to_string()),
        );

        assert!(matches!(err, AppError::DuplicateEmail));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_other_insert_failures_stay_database_errors() {
        let err = classify_insert_error(
            Some(SqlErr::ForeignKeyConstraintViolation("fk".to_string())),
            DbErr::Custom("insert failed".to_string()),
        );
        assert!(matches!(err, AppError::Database(_)));

        let err = map_insert_error(DbErr::Custom("connection reset".to_string()));
        assert!(matches!(err, AppError::Database(_)));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_missing_row_on_save_is_not_found() {
        assert!(matches!(map_save_error(DbErr::RecordNotUpdated), AppError::NotFound));
        assert!(matches!(
            map_save_error(DbErr::Custom("timeout".to_string())),
            AppError::Database(_)
        ));
    }
}
