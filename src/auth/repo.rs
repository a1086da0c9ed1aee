use anyhow::Context;
use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::repo_types::{Account, AccountRow, NewAccount, PasswordResetToken};
use crate::store::PgStore;

#[async_trait]
pub trait AccountRepo: Send + Sync {
    async fn find_account_by_email(&self, email: &str) -> anyhow::Result<Option<Account>>;

    async fn find_account_by_id(&self, id: Uuid) -> anyhow::Result<Option<Account>>;

    /// Insert a new account. Returns `None` when the email is already taken.
    async fn insert_account(&self, new: NewAccount) -> anyhow::Result<Option<Account>>;

    async fn admin_exists(&self) -> anyhow::Result<bool>;

    async fn count_accounts(&self) -> anyhow::Result<i64>;
}

#[async_trait]
pub trait ResetTokenRepo: Send + Sync {
    async fn insert_reset_token(&self, token: &PasswordResetToken) -> anyhow::Result<()>;

    /// Most recently created unused, unexpired token matching `token`.
    async fn find_redeemable_token(
        &self,
        token: &str,
        now: OffsetDateTime,
    ) -> anyhow::Result<Option<PasswordResetToken>>;

    /// Mark the token used and store the new password hash, atomically.
    /// Returns `false` if the token was not redeemable.
    async fn redeem_reset_token(
        &self,
        token: &str,
        new_password_hash: &str,
        now: OffsetDateTime,
    ) -> anyhow::Result<bool>;
}

#[async_trait]
impl AccountRepo for PgStore {
    async fn find_account_by_email(&self, email: &str) -> anyhow::Result<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT id, name, email, role, password_hash, created_at
            FROM accounts
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .context("find account by email")?;
        row.map(Account::try_from).transpose()
    }

    async fn find_account_by_id(&self, id: Uuid) -> anyhow::Result<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT id, name, email, role, password_hash, created_at
            FROM accounts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("find account by id")?;
        row.map(Account::try_from).transpose()
    }

    async fn insert_account(&self, new: NewAccount) -> anyhow::Result<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            INSERT INTO accounts (id, name, email, role, password_hash)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (email) DO NOTHING
            RETURNING id, name, email, role, password_hash, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&new.name)
        .bind(&new.email)
        .bind(new.role.as_str())
        .bind(&new.password_hash)
        .fetch_optional(&self.pool)
        .await
        .context("insert account")?;
        row.map(Account::try_from).transpose()
    }

    async fn admin_exists(&self) -> anyhow::Result<bool> {
        let exists: bool =
            sqlx::query_scalar(r#"SELECT EXISTS (SELECT 1 FROM accounts WHERE role = 'admin')"#)
                .fetch_one(&self.pool)
                .await
                .context("check admin exists")?;
        Ok(exists)
    }

    async fn count_accounts(&self) -> anyhow::Result<i64> {
        let n: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM accounts"#)
            .fetch_one(&self.pool)
            .await
            .context("count accounts")?;
        Ok(n)
    }
}

#[async_trait]
impl ResetTokenRepo for PgStore {
    async fn insert_reset_token(&self, token: &PasswordResetToken) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO password_reset_tokens (id, account_id, email, token, expires_at, used, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(token.id)
        .bind(token.account_id)
        .bind(&token.email)
        .bind(&token.token)
        .bind(token.expires_at)
        .bind(token.used)
        .bind(token.created_at)
        .execute(&self.pool)
        .await
        .context("insert reset token")?;
        Ok(())
    }

    async fn find_redeemable_token(
        &self,
        token: &str,
        now: OffsetDateTime,
    ) -> anyhow::Result<Option<PasswordResetToken>> {
        let row = sqlx::query_as::<_, PasswordResetToken>(
            r#"
            SELECT id, account_id, email, token, expires_at, used, created_at
              FROM password_reset_tokens
             WHERE token = $1 AND used = FALSE AND expires_at > $2
             ORDER BY created_at DESC
             LIMIT 1
            "#,
        )
        .bind(token)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .context("find reset token")?;
        Ok(row)
    }

    async fn redeem_reset_token(
        &self,
        token: &str,
        new_password_hash: &str,
        now: OffsetDateTime,
    ) -> anyhow::Result<bool> {
        let mut tx = self.pool.begin().await.context("begin tx")?;

        // Row lock on the token serializes concurrent redemptions; the loser
        // re-evaluates `used = FALSE` and matches nothing.
        let account_id: Option<Uuid> = sqlx::query_scalar(
            r#"
            UPDATE password_reset_tokens
               SET used = TRUE
             WHERE token = $1 AND used = FALSE AND expires_at > $2
            RETURNING account_id
            "#,
        )
        .bind(token)
        .bind(now)
        .fetch_optional(&mut *tx)
        .await
        .context("consume reset token")?;

        let Some(account_id) = account_id else {
            tx.rollback().await.context("rollback tx")?;
            return Ok(false);
        };

        let updated = sqlx::query(r#"UPDATE accounts SET password_hash = $1 WHERE id = $2"#)
            .bind(new_password_hash)
            .bind(account_id)
            .execute(&mut *tx)
            .await
            .context("update password hash")?;
        anyhow::ensure!(
            updated.rows_affected() == 1,
            "reset token references missing account {account_id}"
        );

        tx.commit().await.context("commit tx")?;
        Ok(true)
    }
}
