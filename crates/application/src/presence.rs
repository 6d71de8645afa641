use std::collections::HashMap;
use std::fmt;

use domain::EmployerId;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::ApplicationError;

/// 单条实时连接的标识，每个 WebSocket 连接生成一个。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(pub Uuid);

impl ChannelId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 雇主在线状态登记表
///
/// 只是提示性的在线信息，不是安全边界：任何连接都可以声明任意雇主身份。
/// 每个雇主只保留最后一次登记的连接。
#[async_trait::async_trait]
pub trait PresenceRegistry: Send + Sync {
    /// 绑定雇主与连接，覆盖该雇主之前的连接
    async fn register(
        &self,
        employer_id: EmployerId,
        channel_id: ChannelId,
    ) -> Result<(), ApplicationError>;

    /// 连接断开时移除它持有的绑定
    async fn unregister(&self, channel_id: ChannelId) -> Result<(), ApplicationError>;

    async fn lookup(&self, employer_id: EmployerId) -> Result<Option<ChannelId>, ApplicationError>;
}

#[derive(Default)]
struct Bindings {
    by_employer: HashMap<EmployerId, ChannelId>,
    by_channel: HashMap<ChannelId, EmployerId>,
}

/// 进程内实现。进程重启后状态全部丢失，多实例部署之间不共享。
#[derive(Default)]
pub struct InMemoryPresenceRegistry {
    bindings: RwLock<Bindings>,
}

impl InMemoryPresenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.bindings.read().await.by_employer.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait::async_trait]
impl PresenceRegistry for InMemoryPresenceRegistry {
    async fn register(
        &self,
        employer_id: EmployerId,
        channel_id: ChannelId,
    ) -> Result<(), ApplicationError> {
        let mut guard = self.bindings.write().await;

        // 同一连接改登记为其他雇主时，先解除旧绑定
        if let Some(previous_employer) = guard.by_channel.insert(channel_id, employer_id) {
            if previous_employer != employer_id
                && guard.by_employer.get(&previous_employer) == Some(&channel_id)
            {
                guard.by_employer.remove(&previous_employer);
            }
        }

        if let Some(replaced) = guard.by_employer.insert(employer_id, channel_id) {
            if replaced != channel_id {
                guard.by_channel.remove(&replaced);
            }
        }

        tracing::info!(employer_id = %employer_id, channel_id = %channel_id, "雇主登记在线");
        Ok(())
    }

    async fn unregister(&self, channel_id: ChannelId) -> Result<(), ApplicationError> {
        let mut guard = self.bindings.write().await;
        if let Some(employer_id) = guard.by_channel.remove(&channel_id) {
            if guard.by_employer.get(&employer_id) == Some(&channel_id) {
                guard.by_employer.remove(&employer_id);
            }
            tracing::info!(employer_id = %employer_id, channel_id = %channel_id, "雇主下线");
        }
        Ok(())
    }

    async fn lookup(&self, employer_id: EmployerId) -> Result<Option<ChannelId>, ApplicationError> {
        let guard = self.bindings.read().await;
        Ok(guard.by_employer.get(&employer_id).copied())
    }
}
