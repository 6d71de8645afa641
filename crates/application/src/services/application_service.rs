use std::sync::Arc;

use domain::{ApplicationId, CandidateEmail, CandidateName, EmployerId, JobApplication, JobId};

use crate::{
    clock::Clock,
    error::{ApplicationError, ValidationErrors},
    notifier::{NotificationDispatcher, NotificationEvent},
    presence::PresenceRegistry,
    repository::{JobApplicationRepository, JobRepository},
};

#[derive(Debug, Clone)]
pub struct SubmitApplicationRequest {
    pub job_id: String,
    pub candidate_name: String,
    pub candidate_email: String,
}

pub struct ApplicationServiceDependencies {
    pub job_repository: Arc<dyn JobRepository>,
    pub application_repository: Arc<dyn JobApplicationRepository>,
    pub presence: Arc<dyn PresenceRegistry>,
    pub dispatcher: Arc<dyn NotificationDispatcher>,
    pub clock: Arc<dyn Clock>,
}

/// 求职申请提交流程：校验 → 解析职位 → 持久化 → 通知雇主
pub struct ApplicationService {
    deps: ApplicationServiceDependencies,
}

impl ApplicationService {
    pub fn new(deps: ApplicationServiceDependencies) -> Self {
        Self { deps }
    }

    /// 提交申请。
    ///
    /// 校验和职位查找失败会同步返回；存储失败不重试；
    /// 通知在后台任务中进行，失败只记录日志，不影响返回结果。
    /// 同一候选人可以对同一职位重复投递。
    pub async fn submit_application(
        &self,
        request: SubmitApplicationRequest,
    ) -> Result<JobApplication, ApplicationError> {
        let mut errors = ValidationErrors::new();
        let job_id = errors.check(JobId::parse(&request.job_id));
        let candidate_name = errors.check(CandidateName::parse(request.candidate_name));
        let candidate_email = errors.check(CandidateEmail::parse(request.candidate_email));
        let (Some(job_id), Some(candidate_name), Some(candidate_email)) =
            (job_id, candidate_name, candidate_email)
        else {
            return Err(ApplicationError::Validation(errors));
        };

        // 读取与插入之间不加锁，职位在此期间被删除时申请仍会写入
        let owner = self
            .deps
            .job_repository
            .find_owner(job_id)
            .await?
            .ok_or(ApplicationError::not_found("job"))?;

        let application = JobApplication::submit(
            ApplicationId::generate(),
            owner.job_id,
            candidate_name,
            candidate_email,
            self.deps.clock.now(),
        );
        let stored = self
            .deps
            .application_repository
            .create(application)
            .await
            .map_err(|err| {
                tracing::error!(job_id = %job_id, error = %err, "failed to persist application");
                ApplicationError::Repository(err)
            })?;

        tracing::info!(
            application_id = %stored.id,
            job_id = %stored.job_id,
            employer_id = %owner.employer_id,
            "收到新的求职申请"
        );

        self.notify_employer(owner.employer_id, NotificationEvent::new_application(&stored));
        Ok(stored)
    }

    fn notify_employer(&self, employer_id: EmployerId, event: NotificationEvent) {
        let presence = Arc::clone(&self.deps.presence);
        let dispatcher = Arc::clone(&self.deps.dispatcher);
        tokio::spawn(async move {
            deliver(presence, dispatcher, employer_id, event).await;
        });
    }
}

async fn deliver(
    presence: Arc<dyn PresenceRegistry>,
    dispatcher: Arc<dyn NotificationDispatcher>,
    employer_id: EmployerId,
    event: NotificationEvent,
) {
    let channel_id = match presence.lookup(employer_id).await {
        Ok(Some(channel_id)) => channel_id,
        Ok(None) => {
            tracing::debug!(employer_id = %employer_id, "雇主不在线，跳过通知");
            return;
        }
        Err(err) => {
            tracing::warn!(employer_id = %employer_id, error = %err, "presence lookup failed");
            return;
        }
    };

    if let Err(err) = dispatcher.dispatch(channel_id, event).await {
        tracing::warn!(
            employer_id = %employer_id,
            channel_id = %channel_id,
            error = %err,
            "failed to deliver application notification"
        );
    }
}
