use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::password::{hash_password, verify_password};
use crate::error::ApiResult;

/// Login identity, authoritative for authentication.
///
/// `profile_id` is the back-reference to the owning profile; it is null for
/// the instant between the two creates inside the registration transaction
/// and set exactly once before commit.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Credential {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub reset_token: Option<String>,
    pub reset_token_expires_at: Option<OffsetDateTime>,
    pub profile_id: Option<Uuid>,
    pub created_at: OffsetDateTime,
}

/// Account classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "user_type", rename_all = "lowercase")]
pub enum UserType {
    Candidate,
    Recruiter,
    Admin,
}

/// Business-facing attributes of a user, owned by exactly one credential.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub email: String,
    pub credential_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub user_type: UserType,
    pub gender: String,
    pub created_at: OffsetDateTime,
}

/// Profile attributes supplied at registration, stored verbatim.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProfile {
    pub first_name: String,
    pub last_name: String,
    pub user_type: UserType,
    pub gender: String,
}

impl Credential {
    pub async fn find_by_email(db: &PgPool, email: &str) -> ApiResult<Option<Credential>> {
        let credential = sqlx::query_as::<_, Credential>(
            r#"
            SELECT id, email, password_hash, reset_token, reset_token_expires_at,
                   profile_id, created_at
            FROM credentials
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(credential)
    }

    pub async fn find_by_email_tx(
        tx: &mut Transaction<'_, Postgres>,
        email: &str,
    ) -> ApiResult<Option<Credential>> {
        let credential = sqlx::query_as::<_, Credential>(
            r#"
            SELECT id, email, password_hash, reset_token, reset_token_expires_at,
                   profile_id, created_at
            FROM credentials
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&mut **tx)
        .await?;
        Ok(credential)
    }

    /// Create a credential inside a registration transaction. The password
    /// is hashed here; plaintext never reaches the table.
    pub async fn create_tx(
        tx: &mut Transaction<'_, Postgres>,
        email: &str,
        password: &str,
    ) -> ApiResult<Credential> {
        let password_hash = hash_password(password)?;
        let credential = sqlx::query_as::<_, Credential>(
            r#"
            INSERT INTO credentials (email, password_hash)
            VALUES ($1, $2)
            RETURNING id, email, password_hash, reset_token, reset_token_expires_at,
                      profile_id, created_at
            "#,
        )
        .bind(email)
        .bind(&password_hash)
        .fetch_one(&mut **tx)
        .await?;
        Ok(credential)
    }

    /// Store the back-reference to the freshly created profile.
    pub async fn link_profile_tx(
        tx: &mut Transaction<'_, Postgres>,
        credential_id: Uuid,
        profile_id: Uuid,
    ) -> ApiResult<()> {
        sqlx::query("UPDATE credentials SET profile_id = $2 WHERE id = $1")
            .bind(credential_id)
            .bind(profile_id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    pub async fn set_reset_token(db: &PgPool, credential_id: Uuid, code: &str) -> ApiResult<()> {
        sqlx::query("UPDATE credentials SET reset_token = $2 WHERE id = $1")
            .bind(credential_id)
            .bind(code)
            .execute(db)
            .await?;
        Ok(())
    }

    /// Overwrite the password and clear any outstanding reset code.
    pub async fn update_password(
        db: &PgPool,
        credential_id: Uuid,
        new_password: &str,
    ) -> ApiResult<()> {
        let password_hash = hash_password(new_password)?;
        sqlx::query(
            "UPDATE credentials
             SET password_hash = $2, reset_token = NULL, reset_token_expires_at = NULL
             WHERE id = $1",
        )
        .bind(credential_id)
        .bind(&password_hash)
        .execute(db)
        .await?;
        Ok(())
    }

    pub fn verify_password(&self, plain: &str) -> anyhow::Result<bool> {
        verify_password(plain, &self.password_hash)
    }
}

impl Profile {
    pub async fn find_by_email(db: &PgPool, email: &str) -> ApiResult<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>(
            "SELECT id, email, credential_id, first_name, last_name, user_type, gender, created_at
             FROM profiles WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(profile)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> ApiResult<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>(
            "SELECT id, email, credential_id, first_name, last_name, user_type, gender, created_at
             FROM profiles WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(profile)
    }

    /// Create a profile owned by `credential_id` inside the registration
    /// transaction. Fields land exactly as supplied.
    pub async fn create_tx(
        tx: &mut Transaction<'_, Postgres>,
        email: &str,
        credential_id: Uuid,
        fields: &NewProfile,
    ) -> ApiResult<Profile> {
        let profile = sqlx::query_as::<_, Profile>(
            "INSERT INTO profiles (email, credential_id, first_name, last_name, user_type, gender)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING id, email, credential_id, first_name, last_name, user_type, gender, created_at",
        )
        .bind(email)
        .bind(credential_id)
        .bind(&fields.first_name)
        .bind(&fields.last_name)
        .bind(fields.user_type)
        .bind(&fields.gender)
        .fetch_one(&mut **tx)
        .await?;
        Ok(profile)
    }
}
