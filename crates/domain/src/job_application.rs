use crate::value_objects::{ApplicationId, CandidateEmail, CandidateName, JobId, Timestamp};

/// 候选人对某个职位的一次投递。创建后不再修改，姓名与邮箱按提交原样保存。
///
/// `job_id` 只在创建时校验存在性，存储层不做外键约束。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobApplication {
    pub id: ApplicationId,
    pub job_id: JobId,
    pub candidate_name: CandidateName,
    pub candidate_email: CandidateEmail,
    pub application_date: Timestamp,
}

impl JobApplication {
    pub fn submit(
        id: ApplicationId,
        job_id: JobId,
        candidate_name: CandidateName,
        candidate_email: CandidateEmail,
        now: Timestamp,
    ) -> Self {
        Self {
            id,
            job_id,
            candidate_name,
            candidate_email,
            application_date: now,
        }
    }
}
