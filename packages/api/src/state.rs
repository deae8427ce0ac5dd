use std::sync::Arc;

use shared::auth::clock::Clock;
use shared::auth::signing_key::SigningKey;
use shared::repositories::meeting_repository::MeetingRepository;
use shared::repositories::member_repository::MemberRepository;
use shared::repositories::session_cache::SessionCache;
use shared::services::auth_service::{AuthService, AuthServiceTrait, TokenLifetimes};
use shared::services::meeting_service::MeetingService;
use shared::services::member_service::MemberService;

#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthServiceTrait + Send + Sync>,
    pub member_service: Arc<MemberService>,
    pub meeting_service: Arc<MeetingService>,
}

impl AppState {
    pub fn new(
        members: Arc<dyn MemberRepository + Send + Sync>,
        meetings: Arc<dyn MeetingRepository + Send + Sync>,
        cache: Arc<dyn SessionCache + Send + Sync>,
        signing_key: Arc<SigningKey>,
        clock: Arc<dyn Clock>,
        lifetimes: TokenLifetimes,
    ) -> Self {
        let auth_service: Arc<dyn AuthServiceTrait + Send + Sync> = Arc::new(AuthService::new(
            cache,
            members.clone(),
            signing_key,
            clock,
            lifetimes,
        ));
        let member_service = Arc::new(MemberService::new(members.clone(), auth_service.clone()));
        let meeting_service = Arc::new(MeetingService::new(meetings, members));

        AppState {
            auth_service,
            member_service,
            meeting_service,
        }
    }
}
