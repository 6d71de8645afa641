use crate::value_objects::{EmailAddress, EmployerId, PasswordHash, PersonName, Timestamp};

/// 雇主账户。注册后不可变更。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Employer {
    pub id: EmployerId,
    pub name: PersonName,
    pub email: EmailAddress,
    pub password: PasswordHash,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Employer {
    pub fn register(
        id: EmployerId,
        name: PersonName,
        email: EmailAddress,
        password: PasswordHash,
        now: Timestamp,
    ) -> Self {
        Self {
            id,
            name,
            email,
            password,
            created_at: now,
            updated_at: now,
        }
    }
}
