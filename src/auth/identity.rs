// src/auth/identity.rs
use rusqlite::{params, Connection, OptionalExtension, Transaction};

use crate::auth::sessions::{create_session, load_user_from_session, revoke_session};
use crate::auth::token::{hash_token, new_id, new_session_token};
use crate::auth::User;
use crate::errors::ServerError;

/// Sign-in links are valid for 15 minutes.
pub const SIGN_IN_LINK_TTL_SECS: i64 = 15 * 60;
pub const SIGN_IN_PATH: &str = "/auth/magic";

#[derive(Debug, Clone)]
pub struct SignInRequest<'a> {
    pub display_name: &'a str,
    pub email: &'a str,
    pub photo_url: Option<&'a str>,
}

#[derive(Debug, Clone)]
pub struct IssuedSignInLink {
    pub email: String,
    /// Raw token (never store this in DB).
    pub token: String,
    pub expires_at: i64,
    /// Relative URL like "/auth/magic?token=..."
    pub link: String,
}

#[derive(Debug, Clone)]
pub struct SignedIn {
    pub user: User,
    /// Raw session token (never store this in DB).
    pub session_token: String,
}

#[derive(Debug)]
struct PendingProfile {
    email: String,
    display_name: String,
    photo_url: Option<String>,
}

/// Email-link identity provider. Users are keyed by email and get a stable
/// random uid the first time a link for that email is redeemed. Nothing
/// about a user changes and no session exists until the emailed link comes
/// back.
pub struct IdentityProvider;

impl IdentityProvider {
    /// Trim + lowercase, minimal sanity check.
    pub fn normalize_email(email: &str) -> Result<String, ServerError> {
        let e = email.trim().to_lowercase();
        if e.is_empty() || !e.contains('@') || e.starts_with('@') || e.ends_with('@') {
            return Err(ServerError::BadRequest("invalid email".into()));
        }
        Ok(e)
    }

    /// Store a single-use link carrying the requested profile. The caller
    /// mails `link` to `email`.
    pub fn request_link(
        conn: &Connection,
        req: &SignInRequest<'_>,
        now: i64,
    ) -> Result<IssuedSignInLink, ServerError> {
        let email = Self::normalize_email(req.email)?;
        let display_name = req.display_name.trim();
        if display_name.is_empty() {
            return Err(ServerError::BadRequest("display name is required".into()));
        }
        let photo_url = req
            .photo_url
            .map(str::trim)
            .filter(|url| !url.is_empty());

        let token = new_session_token();
        let token_hash = hash_token(&token);
        let expires_at = now + SIGN_IN_LINK_TTL_SECS;

        conn.execute(
            r#"
            insert into sign_in_links (email, display_name, photo_url, token_hash, created_at, expires_at)
            values (?, ?, ?, ?, ?, ?)
            "#,
            params![email, display_name, photo_url, token_hash.as_slice(), now, expires_at],
        )
        .map_err(|e| ServerError::DbError(format!("insert sign-in link failed: {e}")))?;

        Ok(IssuedSignInLink {
            email,
            link: format!("{SIGN_IN_PATH}?token={token}"),
            token,
            expires_at,
        })
    }

    /// Redeem a sign-in link: consume it, apply its profile to the user
    /// (creating them on first use) and open a session. All or nothing.
    pub fn redeem(conn: &mut Connection, token: &str, now: i64) -> Result<SignedIn, ServerError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(ServerError::BadRequest("missing token".into()));
        }

        let tx = conn
            .transaction()
            .map_err(|e| ServerError::DbError(format!("begin tx failed: {e}")))?;

        let Some(profile) = consume_link(&tx, &hash_token(token), now)? else {
            tx.rollback().ok();
            return Err(ServerError::Unauthorized("invalid or expired link".into()));
        };

        let id = upsert_user(&tx, &profile, now)?;
        let session_token = create_session(&tx, &id, now)?;

        tx.commit()
            .map_err(|e| ServerError::DbError(format!("commit tx failed: {e}")))?;

        Ok(SignedIn {
            user: User {
                id,
                display_name: profile.display_name,
                photo_url: profile.photo_url,
                email: profile.email,
            },
            session_token,
        })
    }

    pub fn sign_out(conn: &Connection, session_token: &str, now: i64) -> Result<(), ServerError> {
        if !revoke_session(conn, session_token, now)? {
            tracing::debug!("sign-out for unknown or already revoked session");
        }
        Ok(())
    }

    pub fn current_user(
        conn: &Connection,
        session_token: &str,
        now: i64,
    ) -> Result<Option<User>, ServerError> {
        load_user_from_session(conn, session_token, now)
    }
}

fn consume_link(
    tx: &Transaction<'_>,
    token_hash: &[u8],
    now: i64,
) -> Result<Option<PendingProfile>, ServerError> {
    let row = tx
        .query_row(
            "select id, email, display_name, photo_url, expires_at, used_at
             from sign_in_links
             where token_hash = ?",
            params![token_hash],
            |r| {
                Ok((
                    r.get::<_, i64>(0)?,
                    PendingProfile {
                        email: r.get(1)?,
                        display_name: r.get(2)?,
                        photo_url: r.get(3)?,
                    },
                    r.get::<_, i64>(4)?,
                    r.get::<_, Option<i64>>(5)?,
                ))
            },
        )
        .optional()
        .map_err(|e| ServerError::DbError(format!("select sign-in link failed: {e}")))?;

    let Some((id, profile, expires_at, used_at)) = row else {
        return Ok(None);
    };
    if used_at.is_some() || expires_at <= now {
        return Ok(None);
    }

    // Guard used_at IS NULL so only one redeemer wins.
    let updated = tx
        .execute(
            "update sign_in_links set used_at = ? where id = ? and used_at is null",
            params![now, id],
        )
        .map_err(|e| ServerError::DbError(format!("update sign-in link used_at failed: {e}")))?;

    Ok((updated == 1).then_some(profile))
}

fn upsert_user(tx: &Transaction<'_>, profile: &PendingProfile, now: i64) -> Result<String, ServerError> {
    let existing: Option<String> = tx
        .query_row(
            "select id from users where email = ?",
            params![profile.email],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| ServerError::DbError(format!("select user failed: {e}")))?;

    match existing {
        Some(id) => {
            tx.execute(
                "update users set display_name = ?, photo_url = ?, last_login_at = ? where id = ?",
                params![profile.display_name, profile.photo_url, now, id],
            )
            .map_err(|e| ServerError::DbError(format!("update user failed: {e}")))?;
            Ok(id)
        }
        None => {
            let id = new_id();
            tx.execute(
                r#"
                insert into users (id, email, display_name, photo_url, created_at, last_login_at)
                values (?, ?, ?, ?, ?, ?)
                "#,
                params![id, profile.email, profile.display_name, profile.photo_url, now, now],
            )
            .map_err(|e| ServerError::DbError(format!("insert user failed: {e}")))?;
            tracing::info!(user_id = %id, "new user registered");
            Ok(id)
        }
    }
}
