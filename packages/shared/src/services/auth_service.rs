use async_trait::async_trait;
use chrono::Duration;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::auth::clock::Clock;
use crate::auth::signing_key::SigningKey;
use crate::auth::tokens::{
    decode_access_token, encode_access_token, generate_refresh_token, TokenError,
};
use crate::models::auth::responses::{RefreshTokenRecord, TokenClaims, TokenPair};
use crate::models::member::MemberRole;
use crate::repositories::errors::session_cache_errors::SessionCacheError;
use crate::repositories::member_repository::MemberRepository;
use crate::repositories::session_cache::SessionCache;
use crate::services::errors::auth_service_errors::AuthServiceError;

#[cfg(test)]
use mockall::automock;

pub fn refresh_token_key(token: &str) -> String {
    format!("refresh_token:{}", token)
}

/// Hash of a member's live refresh tokens: field = token, value = expiry (unix seconds).
pub fn member_sessions_key(email: &str) -> String {
    format!("member_sessions:{}", email)
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait AuthServiceTrait: Send + Sync {
    async fn issue(&self, email: &str, role: MemberRole) -> Result<TokenPair, AuthServiceError>;
    fn validate(&self, access_token: &str) -> Result<TokenClaims, TokenError>;
    /// Trades a refresh token for a new pair. The presented token is consumed.
    async fn rotate(&self, refresh_token: &str) -> Result<TokenPair, AuthServiceError>;
    /// Idempotent; unknown tokens are ignored.
    async fn revoke(&self, refresh_token: &str) -> Result<(), AuthServiceError>;
    /// Revokes every session of the member and returns how many were listed.
    async fn revoke_all(&self, email: &str) -> Result<usize, AuthServiceError>;
}

#[derive(Debug, Clone, Copy)]
pub struct TokenLifetimes {
    pub access_token: Duration,
    pub refresh_token: Duration,
}

impl Default for TokenLifetimes {
    fn default() -> Self {
        TokenLifetimes {
            access_token: Duration::minutes(60),
            refresh_token: Duration::days(14),
        }
    }
}

pub struct AuthService {
    cache: Arc<dyn SessionCache + Send + Sync>,
    members: Arc<dyn MemberRepository + Send + Sync>,
    signing_key: Arc<SigningKey>,
    clock: Arc<dyn Clock>,
    lifetimes: TokenLifetimes,
}

impl AuthService {
    pub fn new(
        cache: Arc<dyn SessionCache + Send + Sync>,
        members: Arc<dyn MemberRepository + Send + Sync>,
        signing_key: Arc<SigningKey>,
        clock: Arc<dyn Clock>,
        lifetimes: TokenLifetimes,
    ) -> Self {
        AuthService {
            cache,
            members,
            signing_key,
            clock,
            lifetimes,
        }
    }

    fn refresh_ttl_seconds(&self) -> u64 {
        self.lifetimes.refresh_token.num_seconds().max(1) as u64
    }
}

#[async_trait]
impl AuthServiceTrait for AuthService {
    async fn issue(&self, email: &str, role: MemberRole) -> Result<TokenPair, AuthServiceError> {
        let now = self.clock.now();
        let claims = TokenClaims {
            sub: email.to_string(),
            auth: role,
            iat: now.timestamp(),
            exp: (now + self.lifetimes.access_token).timestamp(),
        };
        let access_token = encode_access_token(&self.signing_key, &claims)
            .map_err(|e| AuthServiceError::JwtError(e.to_string()))?;

        let refresh_token = generate_refresh_token();
        let refresh_expires_at = now + self.lifetimes.refresh_token;
        self.members
            .store_refresh_token(email, &refresh_token, refresh_expires_at)
            .await?;

        let record = RefreshTokenRecord {
            email: email.to_string(),
            role,
            expires_at: refresh_expires_at,
        };
        let payload = serde_json::to_string(&record)
            .map_err(|e| SessionCacheError::Serialization(e.to_string()))?;
        let ttl = self.refresh_ttl_seconds();
        self.cache
            .set_with_ttl(&refresh_token_key(&refresh_token), &payload, ttl)
            .await?;

        let sessions = member_sessions_key(email);
        self.cache
            .hash_set_all(
                &sessions,
                &[(
                    refresh_token.clone(),
                    refresh_expires_at.timestamp().to_string(),
                )],
            )
            .await?;
        self.cache.expire(&sessions, ttl).await?;

        info!("Issued token pair for member: {}", email);
        Ok(TokenPair {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.lifetimes.access_token.num_seconds(),
            refresh_token_expires_at: refresh_expires_at,
        })
    }

    fn validate(&self, access_token: &str) -> Result<TokenClaims, TokenError> {
        decode_access_token(&self.signing_key, access_token, self.clock.now())
    }

    async fn rotate(&self, refresh_token: &str) -> Result<TokenPair, AuthServiceError> {
        let token = refresh_token.trim();
        if token.is_empty() {
            return Err(AuthServiceError::InvalidRefresh);
        }

        let Some(payload) = self.cache.take(&refresh_token_key(token)).await? else {
            warn!("Rejected unknown or already used refresh token");
            return Err(AuthServiceError::InvalidRefresh);
        };
        let record: RefreshTokenRecord = serde_json::from_str(&payload).map_err(|e| {
            error!("Consumed refresh token with an unreadable record: {}", e);
            SessionCacheError::Serialization(e.to_string())
        })?;
        self.cache
            .hash_delete(&member_sessions_key(&record.email), token)
            .await
            .map_err(|e| {
                error!(
                    "Refresh token for {} consumed but session index not updated: {}",
                    record.email, e
                );
                e
            })?;

        if record.is_expired(self.clock.now()) {
            warn!("Rejected expired refresh token for member: {}", record.email);
            return Err(AuthServiceError::InvalidRefresh);
        }

        info!("Rotating refresh token for member: {}", record.email);
        self.issue(&record.email, record.role).await.map_err(|e| {
            error!(
                "Refresh token for {} consumed but no new pair issued: {}",
                record.email, e
            );
            e
        })
    }

    async fn revoke(&self, refresh_token: &str) -> Result<(), AuthServiceError> {
        let token = refresh_token.trim();
        if token.is_empty() {
            return Ok(());
        }

        let Some(payload) = self.cache.take(&refresh_token_key(token)).await? else {
            return Ok(());
        };
        match serde_json::from_str::<RefreshTokenRecord>(&payload) {
            Ok(record) => {
                self.cache
                    .hash_delete(&member_sessions_key(&record.email), token)
                    .await?;
                self.members.clear_refresh_token(&record.email, token).await?;
                info!("Revoked refresh token for member: {}", record.email);
            }
            Err(e) => warn!("Dropped unreadable refresh token record: {}", e),
        }
        Ok(())
    }

    async fn revoke_all(&self, email: &str) -> Result<usize, AuthServiceError> {
        let sessions_key = member_sessions_key(email);
        let sessions = self.cache.hash_get_all(&sessions_key).await?;
        for token in sessions.keys() {
            self.cache.delete(&refresh_token_key(token)).await?;
            self.members.clear_refresh_token(email, token).await?;
        }
        self.cache.delete(&sessions_key).await?;

        info!("Revoked {} session(s) for member: {}", sessions.len(), email);
        Ok(sessions.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::member::NewMember;
    use crate::repositories::session_cache::MockSessionCache;
    use crate::testing::{InMemorySessionCache, InMemoryStore, TestClock};

    struct Fixture {
        clock: Arc<TestClock>,
        store: Arc<InMemoryStore>,
        cache: Arc<InMemorySessionCache>,
        service: AuthService,
    }

    fn signing_key() -> Arc<SigningKey> {
        Arc::new(SigningKey::from_bytes(&[42u8; 32]).unwrap())
    }

    async fn fixture() -> Fixture {
        let clock = Arc::new(TestClock::fixed());
        let store = Arc::new(InMemoryStore::new());
        let cache = Arc::new(InMemorySessionCache::new(clock.clone()));
        store
            .create_member(&NewMember::new("a@b.com", "alice", None))
            .await
            .unwrap();

        let service = AuthService::new(
            cache.clone(),
            store.clone(),
            signing_key(),
            clock.clone(),
            TokenLifetimes::default(),
        );
        Fixture {
            clock,
            store,
            cache,
            service,
        }
    }

    #[tokio::test]
    async fn test_issue_then_validate_returns_identity_and_role() {
        let f = fixture().await;
        let pair = f.service.issue("a@b.com", MemberRole::User).await.unwrap();

        let claims = f.service.validate(&pair.access_token).unwrap();
        assert_eq!(claims.sub, "a@b.com");
        assert_eq!(claims.auth, MemberRole::User);
        assert_eq!(pair.token_type, "Bearer");
        assert_eq!(pair.expires_in, 3600);
        assert_eq!(pair.refresh_token_expires_at, f.clock.now() + Duration::days(14));
    }

    #[tokio::test]
    async fn test_access_token_expires_after_sixty_minutes() {
        let f = fixture().await;
        let pair = f.service.issue("a@b.com", MemberRole::User).await.unwrap();
        assert!(f.service.validate(&pair.access_token).is_ok());

        f.clock.advance(Duration::minutes(59));
        assert!(f.service.validate(&pair.access_token).is_ok());

        f.clock.advance(Duration::minutes(1) + Duration::seconds(1));
        assert_eq!(
            f.service.validate(&pair.access_token),
            Err(TokenError::Expired)
        );
    }

    #[tokio::test]
    async fn test_issue_persists_record_index_and_mirror() {
        let f = fixture().await;
        let pair = f.service.issue("a@b.com", MemberRole::Admin).await.unwrap();

        let payload = f
            .cache
            .get(&refresh_token_key(&pair.refresh_token))
            .await
            .unwrap()
            .unwrap();
        let record: RefreshTokenRecord = serde_json::from_str(&payload).unwrap();
        assert_eq!(record.email, "a@b.com");
        assert_eq!(record.role, MemberRole::Admin);
        assert_eq!(
            f.cache.ttl_seconds(&refresh_token_key(&pair.refresh_token)),
            Some(14 * 24 * 3600)
        );

        let sessions = f.cache.hash_get_all(&member_sessions_key("a@b.com")).await.unwrap();
        assert!(sessions.contains_key(&pair.refresh_token));

        let member = f.store.get_member_by_email("a@b.com").await.unwrap();
        assert_eq!(member.refresh_token.as_deref(), Some(pair.refresh_token.as_str()));
        assert_eq!(member.refresh_token_expiry, Some(pair.refresh_token_expires_at));
    }

    #[tokio::test]
    async fn test_issue_for_unknown_member_fails() {
        let f = fixture().await;
        let result = f.service.issue("ghost@b.com", MemberRole::User).await;
        assert!(matches!(result, Err(AuthServiceError::UnknownMember)));
    }

    #[tokio::test]
    async fn test_rotation_is_single_use() {
        let f = fixture().await;
        let pair = f.service.issue("a@b.com", MemberRole::User).await.unwrap();

        let rotated = f.service.rotate(&pair.refresh_token).await.unwrap();
        assert_ne!(rotated.refresh_token, pair.refresh_token);
        assert_eq!(
            f.service.validate(&rotated.access_token).unwrap().sub,
            "a@b.com"
        );

        let reused = f.service.rotate(&pair.refresh_token).await;
        assert!(matches!(reused, Err(AuthServiceError::InvalidRefresh)));
        assert!(f.service.rotate(&rotated.refresh_token).await.is_ok());
    }

    #[tokio::test]
    async fn test_rotate_after_revoke_is_invalid() {
        let f = fixture().await;
        let pair = f.service.issue("a@b.com", MemberRole::User).await.unwrap();

        f.service.revoke(&pair.refresh_token).await.unwrap();

        let result = f.service.rotate(&pair.refresh_token).await;
        assert!(matches!(result, Err(AuthServiceError::InvalidRefresh)));
        let member = f.store.get_member_by_email("a@b.com").await.unwrap();
        assert!(member.refresh_token.is_none());
    }

    #[tokio::test]
    async fn test_revoke_is_idempotent() {
        let f = fixture().await;
        let pair = f.service.issue("a@b.com", MemberRole::User).await.unwrap();

        assert!(f.service.revoke(&pair.refresh_token).await.is_ok());
        assert!(f.service.revoke(&pair.refresh_token).await.is_ok());
        assert!(f.service.revoke("never-issued").await.is_ok());
        assert!(f.service.revoke("").await.is_ok());
    }

    #[tokio::test]
    async fn test_revoking_an_older_token_keeps_the_newer_mirror() {
        let f = fixture().await;
        let older = f.service.issue("a@b.com", MemberRole::User).await.unwrap();
        let newer = f.service.issue("a@b.com", MemberRole::User).await.unwrap();

        f.service.revoke(&older.refresh_token).await.unwrap();

        let member = f.store.get_member_by_email("a@b.com").await.unwrap();
        assert_eq!(member.refresh_token.as_deref(), Some(newer.refresh_token.as_str()));
    }

    #[tokio::test]
    async fn test_expired_refresh_token_cannot_rotate() {
        let f = fixture().await;
        let pair = f.service.issue("a@b.com", MemberRole::User).await.unwrap();

        f.clock.advance(Duration::days(14));
        let result = f.service.rotate(&pair.refresh_token).await;
        assert!(matches!(result, Err(AuthServiceError::InvalidRefresh)));
    }

    #[tokio::test]
    async fn test_blank_refresh_token_is_invalid() {
        let f = fixture().await;
        let result = f.service.rotate("   ").await;
        assert!(matches!(result, Err(AuthServiceError::InvalidRefresh)));
    }

    #[tokio::test]
    async fn test_revoke_all_ends_every_session() {
        let f = fixture().await;
        let first = f.service.issue("a@b.com", MemberRole::User).await.unwrap();
        let second = f.service.issue("a@b.com", MemberRole::User).await.unwrap();

        assert_eq!(f.service.revoke_all("a@b.com").await.unwrap(), 2);

        for token in [&first.refresh_token, &second.refresh_token] {
            let result = f.service.rotate(token).await;
            assert!(matches!(result, Err(AuthServiceError::InvalidRefresh)));
        }
        assert!(!f.cache.contains_key(&member_sessions_key("a@b.com")));
        assert_eq!(f.service.revoke_all("a@b.com").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_failed_reissue_after_take_surfaces_the_error() {
        let f = fixture().await;
        let record = RefreshTokenRecord {
            email: "a@b.com".to_string(),
            role: MemberRole::User,
            expires_at: f.clock.now() + Duration::days(1),
        };
        let payload = serde_json::to_string(&record).unwrap();
        let mut cache = MockSessionCache::new();
        cache
            .expect_take()
            .times(1)
            .returning(move |_| Ok(Some(payload.clone())));
        cache.expect_hash_delete().times(1).returning(|_, _| Ok(()));
        cache
            .expect_set_with_ttl()
            .returning(|_, _, _| Err(SessionCacheError::Redis("OOM".to_string())));

        let service = AuthService::new(
            Arc::new(cache),
            f.store.clone(),
            signing_key(),
            f.clock.clone(),
            TokenLifetimes::default(),
        );

        let result = service.rotate("consumed-token").await;
        assert!(matches!(result, Err(AuthServiceError::CacheError(_))));
    }

    #[tokio::test]
    async fn test_cache_failure_surfaces_on_rotate() {
        let f = fixture().await;
        let mut cache = MockSessionCache::new();
        cache
            .expect_take()
            .returning(|_| Err(SessionCacheError::Redis("connection refused".to_string())));

        let service = AuthService::new(
            Arc::new(cache),
            f.store.clone(),
            signing_key(),
            f.clock.clone(),
            TokenLifetimes::default(),
        );

        let result = service.rotate("some-token").await;
        assert!(matches!(result, Err(AuthServiceError::CacheError(_))));
    }
}
