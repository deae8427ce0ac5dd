use std::sync::Arc;
use tracing::info;

use crate::auth::password::{hash_password, verify_password};
use crate::models::auth::responses::TokenPair;
use crate::models::member::{Member, NewMember};
use crate::repositories::errors::member_repository_errors::MemberRepositoryError;
use crate::repositories::member_repository::MemberRepository;
use crate::services::auth_service::AuthServiceTrait;
use crate::services::errors::member_service_errors::MemberServiceError;

const MIN_PASSWORD_LENGTH: usize = 8;

pub struct MemberService {
    repository: Arc<dyn MemberRepository + Send + Sync>,
    auth_service: Arc<dyn AuthServiceTrait + Send + Sync>,
}

fn repository_error(err: MemberRepositoryError) -> MemberServiceError {
    match err {
        MemberRepositoryError::NotFound => MemberServiceError::MemberNotFound,
        MemberRepositoryError::AlreadyExists => MemberServiceError::MemberAlreadyExists,
        MemberRepositoryError::InUse => MemberServiceError::MemberInUse,
        MemberRepositoryError::Database(msg) => MemberServiceError::RepositoryError(msg),
    }
}

impl MemberService {
    pub fn new(
        repository: Arc<dyn MemberRepository + Send + Sync>,
        auth_service: Arc<dyn AuthServiceTrait + Send + Sync>,
    ) -> Self {
        MemberService {
            repository,
            auth_service,
        }
    }

    pub async fn sign_up(
        &self,
        email: &str,
        username: &str,
        password: &str,
    ) -> Result<Member, MemberServiceError> {
        let email = email.trim();
        let username = username.trim();
        if email.is_empty() || username.is_empty() || password.is_empty() {
            return Err(MemberServiceError::ValidationError(
                "Email, username, or password cannot be empty".to_string(),
            ));
        }
        if !email.contains('@') {
            return Err(MemberServiceError::ValidationError(
                "Email is not a valid address".to_string(),
            ));
        }
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(MemberServiceError::ValidationError(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            )));
        }
        if self
            .repository
            .email_exists(email)
            .await
            .map_err(repository_error)?
        {
            return Err(MemberServiceError::MemberAlreadyExists);
        }

        let password_hash = hash_password(password).map_err(MemberServiceError::PasswordHash)?;
        let member = self
            .repository
            .create_member(&NewMember::new(email, username, Some(password_hash)))
            .await
            .map_err(repository_error)?;

        info!("Member signed up: {}", member.email);
        Ok(member)
    }

    /// Checks the password. Unknown emails and accounts without a password
    /// fail the same way a wrong password does.
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Member, MemberServiceError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(MemberServiceError::ValidationError(
                "Email or password cannot be empty".to_string(),
            ));
        }

        let member = match self.repository.get_member_by_email(email.trim()).await {
            Ok(member) => member,
            Err(MemberRepositoryError::NotFound) => {
                return Err(MemberServiceError::InvalidCredentials)
            }
            Err(err) => return Err(repository_error(err)),
        };
        let Some(hash) = member.password_hash.as_deref() else {
            return Err(MemberServiceError::InvalidCredentials);
        };
        if !verify_password(password, hash).map_err(MemberServiceError::PasswordHash)? {
            return Err(MemberServiceError::InvalidCredentials);
        }
        Ok(member)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<TokenPair, MemberServiceError> {
        let member = self.authenticate(email, password).await?;
        let pair = self.auth_service.issue(&member.email, member.role).await?;
        Ok(pair)
    }

    pub async fn get_member_by_email(&self, email: &str) -> Result<Member, MemberServiceError> {
        if email.is_empty() {
            return Err(MemberServiceError::ValidationError(
                "Email cannot be empty".to_string(),
            ));
        }
        self.repository
            .get_member_by_email(email)
            .await
            .map_err(repository_error)
    }

    /// Deletes the member, then ends every session it had.
    ///
    /// A rejected delete (the member still owns meetings) leaves the sessions live.
    pub async fn sign_out(&self, email: &str) -> Result<(), MemberServiceError> {
        let member = self.get_member_by_email(email).await?;
        self.repository
            .delete_member(member.id)
            .await
            .map_err(repository_error)?;
        let revoked = self.auth_service.revoke_all(&member.email).await?;

        info!(
            "Member signed out: {} ({} session(s) revoked)",
            member.email, revoked
        );
        Ok(())
    }
}
