//! 实时通知
//!
//! 通知是尽力而为的：没有排队、重试或送达保证。

use std::collections::HashMap;

use async_trait::async_trait;
use domain::JobApplication;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

use crate::presence::ChannelId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateInfo {
    pub candidate_name: String,
    pub candidate_email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewApplicationNotice {
    pub job_id: Uuid,
    pub candidate: CandidateInfo,
}

/// 推送给客户端的事件，序列化为 `{"event": ..., "data": ...}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum NotificationEvent {
    NewApplication(NewApplicationNotice),
}

impl NotificationEvent {
    pub fn new_application(application: &JobApplication) -> Self {
        Self::NewApplication(NewApplicationNotice {
            job_id: application.job_id.into(),
            candidate: CandidateInfo {
                candidate_name: application.candidate_name.as_str().to_owned(),
                candidate_email: application.candidate_email.as_str().to_owned(),
            },
        })
    }
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("channel {0} is not attached")]
    UnknownChannel(ChannelId),
    #[error("channel {0} is closed")]
    ChannelClosed(ChannelId),
}

#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    async fn dispatch(
        &self,
        channel_id: ChannelId,
        event: NotificationEvent,
    ) -> Result<(), DispatchError>;
}

/// 管理所有存活连接的发送端
#[derive(Default)]
pub struct ChannelHub {
    senders: RwLock<HashMap<ChannelId, mpsc::UnboundedSender<NotificationEvent>>>,
}

impl ChannelHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// 为新连接登记发送端，返回连接写任务读取的接收端
    pub async fn attach(&self, channel_id: ChannelId) -> mpsc::UnboundedReceiver<NotificationEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.senders.write().await.insert(channel_id, tx);
        rx
    }

    pub async fn detach(&self, channel_id: ChannelId) {
        self.senders.write().await.remove(&channel_id);
    }

    pub async fn connection_count(&self) -> usize {
        self.senders.read().await.len()
    }
}

#[async_trait]
impl NotificationDispatcher for ChannelHub {
    async fn dispatch(
        &self,
        channel_id: ChannelId,
        event: NotificationEvent,
    ) -> Result<(), DispatchError> {
        let sender = self
            .senders
            .read()
            .await
            .get(&channel_id)
            .cloned()
            .ok_or(DispatchError::UnknownChannel(channel_id))?;

        sender
            .send(event)
            .map_err(|_| DispatchError::ChannelClosed(channel_id))
    }
}
