use serde::{Deserialize, Serialize};

use crate::errors::DomainError;
use crate::value_objects::{EmployerId, JobId, Timestamp};

/// 薪资范围。min 与 max 必填，不强制 min <= max。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryRange {
    pub min: i64,
    pub max: i64,
}

impl SalaryRange {
    pub fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub id: JobId,
    pub title: String,
    pub description: String,
    pub location: String,
    pub salary_range: SalaryRange,
    pub employer_id: EmployerId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// 职位的部分更新，None 表示保持原值。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub salary_range: Option<SalaryRange>,
}

impl Job {
    pub const TITLE_MAX_LEN: usize = 200;
    pub const LOCATION_MAX_LEN: usize = 200;
    pub const DESCRIPTION_MAX_LEN: usize = 10_000;

    pub fn post(
        id: JobId,
        employer_id: EmployerId,
        title: impl Into<String>,
        description: impl Into<String>,
        location: impl Into<String>,
        salary_range: SalaryRange,
        now: Timestamp,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            id,
            title: Self::validate_title(title.into())?,
            description: Self::validate_description(description.into())?,
            location: Self::validate_location(location.into())?,
            salary_range,
            employer_id,
            created_at: now,
            updated_at: now,
        })
    }

    /// 应用部分更新。任一字段非法时整个更新被拒绝，原值不变。
    pub fn apply(&mut self, patch: JobPatch, now: Timestamp) -> Result<(), DomainError> {
        let title = patch.title.map(Self::validate_title).transpose()?;
        let description = patch
            .description
            .map(Self::validate_description)
            .transpose()?;
        let location = patch.location.map(Self::validate_location).transpose()?;

        if let Some(title) = title {
            self.title = title;
        }
        if let Some(description) = description {
            self.description = description;
        }
        if let Some(location) = location {
            self.location = location;
        }
        if let Some(salary_range) = patch.salary_range {
            self.salary_range = salary_range;
        }
        self.updated_at = now;
        Ok(())
    }

    pub fn validate_title(title: String) -> Result<String, DomainError> {
        Self::validate_text("title", title, Self::TITLE_MAX_LEN)
    }

    pub fn validate_description(description: String) -> Result<String, DomainError> {
        Self::validate_text("description", description, Self::DESCRIPTION_MAX_LEN)
    }

    pub fn validate_location(location: String) -> Result<String, DomainError> {
        Self::validate_text("location", location, Self::LOCATION_MAX_LEN)
    }

    fn validate_text(field: &str, value: String, max_len: usize) -> Result<String, DomainError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(DomainError::invalid_argument(field, "cannot be empty"));
        }
        if trimmed.chars().count() > max_len {
            return Err(DomainError::invalid_argument(field, "too long"));
        }
        Ok(trimmed.to_owned())
    }
}
