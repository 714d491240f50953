use crate::error::ApiError;
use crate::models::{NewPoi, Poi, UpdateUserRequest, User};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use std::sync::{Arc, RwLock};
use thiserror::Error;
use uuid::Uuid;

/// StoreError
///
/// Opaque persistence failure. The underlying cause is logged at the call
/// site; callers surface it as the generic `StoreUnavailable` outcome and
/// never forward backend details to clients.
#[derive(Debug, Error)]
#[error("record store failure")]
pub struct StoreError(#[from] sqlx::Error);

impl From<StoreError> for ApiError {
    fn from(_: StoreError) -> Self {
        ApiError::StoreUnavailable
    }
}

/// Repository Trait
///
/// Defines the abstract contract for all persistence operations: create,
/// point lookup by id, delete by id, and full scan, plus the user records the
/// identity endpoints need. Handlers and the catalog interact with the data
/// layer through this trait without knowing the implementation (Postgres,
/// in-memory, etc.).
///
/// **Send + Sync + async_trait** are required to make the trait object
/// (`Arc<dyn Repository>`) safely shareable across Axum's asynchronous task
/// boundaries.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- POI records ---
    // Persists an already-encrypted record; the store assigns id and timestamps.
    async fn create_poi(&self, new: NewPoi) -> Result<Poi, StoreError>;
    async fn get_poi(&self, id: Uuid) -> Result<Option<Poi>, StoreError>;
    // Full scan in the store's natural order; search and nearby filter in memory.
    async fn all_pois(&self) -> Result<Vec<Poi>, StoreError>;
    async fn pois_by_owner(&self, owner: Uuid) -> Result<Vec<Poi>, StoreError>;
    // Returns false when the record was already gone (e.g., a racing delete).
    async fn delete_poi(&self, id: Uuid) -> Result<bool, StoreError>;

    // --- Users ---
    async fn create_user(&self, user: User) -> Result<User, StoreError>;
    async fn get_user(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn get_user_by_phone(&self, phone: &str) -> Result<Option<User>, StoreError>;
    async fn update_user(
        &self,
        id: Uuid,
        req: UpdateUserRequest,
    ) -> Result<Option<User>, StoreError>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer access across the
/// application state.
pub type RepositoryState = Arc<dyn Repository>;

const POI_COLUMNS: &str =
    "id, name_encrypted, location_encrypted, category, uploaded_by, created_at, updated_at";
const USER_COLUMNS: &str = "id, name, email, phone, password_hash, role, created_at, updated_at";

/// PostgresRepository
///
/// The concrete implementation of the `Repository` trait, backed by the
/// PostgreSQL database (`schema.sql`).
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn create_poi(&self, new: NewPoi) -> Result<Poi, StoreError> {
        let sql = format!(
            "INSERT INTO pois (id, name_encrypted, location_encrypted, category, uploaded_by, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, NOW(), NOW()) RETURNING {POI_COLUMNS}"
        );
        sqlx::query_as::<_, Poi>(&sql)
            .bind(Uuid::new_v4())
            .bind(&new.name_encrypted)
            .bind(&new.location_encrypted)
            .bind(&new.category)
            .bind(new.uploaded_by)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("create_poi error: {:?}", e);
                StoreError::from(e)
            })
    }

    async fn get_poi(&self, id: Uuid) -> Result<Option<Poi>, StoreError> {
        let sql = format!("SELECT {POI_COLUMNS} FROM pois WHERE id = $1");
        sqlx::query_as::<_, Poi>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("get_poi error: {:?}", e);
                StoreError::from(e)
            })
    }

    /// all_pois
    ///
    /// The full-table scan behind keyword and radius search. Deliberately
    /// unindexed and unsorted beyond insertion order: filtering happens after
    /// decryption, which the database cannot do.
    async fn all_pois(&self) -> Result<Vec<Poi>, StoreError> {
        let sql = format!("SELECT {POI_COLUMNS} FROM pois ORDER BY created_at ASC");
        sqlx::query_as::<_, Poi>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("all_pois error: {:?}", e);
                StoreError::from(e)
            })
    }

    async fn pois_by_owner(&self, owner: Uuid) -> Result<Vec<Poi>, StoreError> {
        let sql = format!(
            "SELECT {POI_COLUMNS} FROM pois WHERE uploaded_by = $1 ORDER BY created_at ASC"
        );
        sqlx::query_as::<_, Poi>(&sql)
            .bind(owner)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("pois_by_owner error: {:?}", e);
                StoreError::from(e)
            })
    }

    async fn delete_poi(&self, id: Uuid) -> Result<bool, StoreError> {
        sqlx::query("DELETE FROM pois WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map(|res| res.rows_affected() > 0)
            .map_err(|e| {
                tracing::error!("delete_poi error: {:?}", e);
                StoreError::from(e)
            })
    }

    async fn create_user(&self, user: User) -> Result<User, StoreError> {
        let sql = format!(
            "INSERT INTO users (id, name, email, phone, password_hash, role, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, NOW(), NOW()) RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(user.id)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.phone)
            .bind(&user.password_hash)
            .bind(user.role)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("create_user error: {:?}", e);
                StoreError::from(e)
            })
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("get_user error: {:?}", e);
                StoreError::from(e)
            })
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("get_user_by_email error: {:?}", e);
                StoreError::from(e)
            })
    }

    async fn get_user_by_phone(&self, phone: &str) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE phone = $1");
        sqlx::query_as::<_, User>(&sql)
            .bind(phone)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("get_user_by_phone error: {:?}", e);
                StoreError::from(e)
            })
    }

    /// update_user
    ///
    /// Uses the PostgreSQL `COALESCE` function to handle `Option<T>` fields,
    /// only updating a column when the corresponding field in `req` is `Some`.
    async fn update_user(
        &self,
        id: Uuid,
        req: UpdateUserRequest,
    ) -> Result<Option<User>, StoreError> {
        let sql = format!(
            "UPDATE users \
             SET name = COALESCE($2, name), \
                 email = COALESCE($3, email), \
                 phone = COALESCE($4, phone), \
                 updated_at = NOW() \
             WHERE id = $1 RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(req.name)
            .bind(req.email)
            .bind(req.phone)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("update_user error: {:?}", e);
                StoreError::from(e)
            })
    }
}

/// InMemoryRepository
///
/// A `Repository` implementation over plain vectors, used by the test suite
/// (and handy for local experimentation without a database). Scan order is
/// insertion order, which doubles as the store's natural order.
#[derive(Default)]
pub struct InMemoryRepository {
    users: RwLock<Vec<User>>,
    pois: RwLock<Vec<Poi>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn create_poi(&self, new: NewPoi) -> Result<Poi, StoreError> {
        let now = Utc::now();
        let poi = Poi {
            id: Uuid::new_v4(),
            name_encrypted: new.name_encrypted,
            location_encrypted: new.location_encrypted,
            category: new.category,
            uploaded_by: new.uploaded_by,
            created_at: now,
            updated_at: now,
        };
        self.pois.write().expect("lock poisoned").push(poi.clone());
        Ok(poi)
    }

    async fn get_poi(&self, id: Uuid) -> Result<Option<Poi>, StoreError> {
        Ok(self
            .pois
            .read()
            .expect("lock poisoned")
            .iter()
            .find(|p| p.id == id)
            .cloned())
    }

    async fn all_pois(&self) -> Result<Vec<Poi>, StoreError> {
        Ok(self.pois.read().expect("lock poisoned").clone())
    }

    async fn pois_by_owner(&self, owner: Uuid) -> Result<Vec<Poi>, StoreError> {
        Ok(self
            .pois
            .read()
            .expect("lock poisoned")
            .iter()
            .filter(|p| p.uploaded_by == owner)
            .cloned()
            .collect())
    }

    async fn delete_poi(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut pois = self.pois.write().expect("lock poisoned");
        let before = pois.len();
        pois.retain(|p| p.id != id);
        Ok(pois.len() < before)
    }

    async fn create_user(&self, mut user: User) -> Result<User, StoreError> {
        let now = Utc::now();
        user.created_at = now;
        user.updated_at = now;
        self.users
            .write()
            .expect("lock poisoned")
            .push(user.clone());
        Ok(user)
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .read()
            .expect("lock poisoned")
            .iter()
            .find(|u| u.id == id)
            .cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .read()
            .expect("lock poisoned")
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn get_user_by_phone(&self, phone: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .read()
            .expect("lock poisoned")
            .iter()
            .find(|u| u.phone == phone)
            .cloned())
    }

    async fn update_user(
        &self,
        id: Uuid,
        req: UpdateUserRequest,
    ) -> Result<Option<User>, StoreError> {
        let mut users = self.users.write().expect("lock poisoned");
        let Some(user) = users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        if let Some(name) = req.name {
            user.name = name;
        }
        if let Some(email) = req.email {
            user.email = email;
        }
        if let Some(phone) = req.phone {
            user.phone = phone;
        }
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }
}
