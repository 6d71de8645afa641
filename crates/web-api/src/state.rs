use std::sync::Arc;

use application::{
    ApplicationService, ApplicationServiceDependencies, AuthService, AuthServiceDependencies,
    ChannelHub, Clock, EmployerRepository, JobApplicationRepository, JobRepository, JobService,
    JobServiceDependencies, PasswordHasher, PresenceRegistry, TokenService,
};

/// 组装服务所需的全部适配器
pub struct AppDependencies {
    pub employer_repository: Arc<dyn EmployerRepository>,
    pub job_repository: Arc<dyn JobRepository>,
    pub application_repository: Arc<dyn JobApplicationRepository>,
    pub password_hasher: Arc<dyn PasswordHasher>,
    pub token_service: Arc<dyn TokenService>,
    pub clock: Arc<dyn Clock>,
    pub presence: Arc<dyn PresenceRegistry>,
    pub channel_hub: Arc<ChannelHub>,
}

#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub job_service: Arc<JobService>,
    pub application_service: Arc<ApplicationService>,
    pub presence: Arc<dyn PresenceRegistry>,
    pub channel_hub: Arc<ChannelHub>,
}

impl AppState {
    pub fn new(deps: AppDependencies) -> Self {
        let auth_service = AuthService::new(AuthServiceDependencies {
            employer_repository: deps.employer_repository,
            password_hasher: deps.password_hasher,
            token_service: deps.token_service,
            clock: deps.clock.clone(),
        });

        let job_service = JobService::new(JobServiceDependencies {
            job_repository: deps.job_repository.clone(),
            application_repository: deps.application_repository.clone(),
            clock: deps.clock.clone(),
        });

        // 连接中心同时充当通知派发器
        let application_service = ApplicationService::new(ApplicationServiceDependencies {
            job_repository: deps.job_repository,
            application_repository: deps.application_repository,
            presence: deps.presence.clone(),
            dispatcher: deps.channel_hub.clone(),
            clock: deps.clock,
        });

        Self {
            auth_service: Arc::new(auth_service),
            job_service: Arc::new(job_service),
            application_service: Arc::new(application_service),
            presence: deps.presence,
            channel_hub: deps.channel_hub,
        }
    }
}
