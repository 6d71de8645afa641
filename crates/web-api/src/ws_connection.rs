use axum::extract::ws::{Message as WsMessage, WebSocket};
use domain::EmployerId;
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;

use application::ChannelId;

use crate::state::AppState;

/// 客户端发来的事件，格式与推送事件相同：`{"event": ..., "data": ...}`
#[derive(Debug, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
enum ClientEvent {
    Register(RegisterPayload),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterPayload {
    employer_id: String,
}

/// WebSocket 连接管理器
///
/// 每个连接对应一个 [`ChannelId`]：
/// - 建立时在连接中心登记发送端
/// - 收到 `register` 事件后把雇主绑定到本连接
/// - 断开时同时清理连接中心与在线表
pub struct WebSocketConnection {
    state: AppState,
    channel_id: ChannelId,
}

impl WebSocketConnection {
    pub fn new(state: AppState) -> Self {
        let channel_id = ChannelId::generate();
        tracing::info!(channel_id = %channel_id, "WebSocket 连接已建立");
        Self { state, channel_id }
    }

    pub async fn run(self, socket: WebSocket) {
        let mut notifications = self.state.channel_hub.attach(self.channel_id).await;
        let (mut sender, mut incoming) = socket.split();

        // 写操作统一经由发送任务，接收任务只投递命令
        let (cmd_tx, mut cmd_rx) = mpsc::channel::<WsCommand>(32);

        let mut send_task = tokio::spawn(async move {
            loop {
                let message = tokio::select! {
                    Some(cmd) = cmd_rx.recv() => match cmd {
                        WsCommand::SendPong(data) => WsMessage::Pong(data.into()),
                    },
                    Some(event) = notifications.recv() => match serde_json::to_string(&event) {
                        Ok(json) => WsMessage::Text(json.into()),
                        Err(err) => {
                            tracing::warn!(error = %err, "failed to serialize websocket payload");
                            continue;
                        }
                    },
                    else => break,
                };
                if sender.send(message).await.is_err() {
                    tracing::warn!("Failed to write to websocket");
                    break;
                }
            }
            tracing::debug!("WebSocket发送任务结束");
        });

        let mut recv_task = {
            let state = self.state.clone();
            let channel_id = self.channel_id;
            tokio::spawn(async move {
                while let Some(Ok(message)) = incoming.next().await {
                    if Self::handle_incoming(message, &state, channel_id, &cmd_tx)
                        .await
                        .is_err()
                    {
                        break;
                    }
                }
                tracing::debug!("WebSocket接收任务结束");
            })
        };

        tokio::select! {
            _ = &mut send_task => recv_task.abort(),
            _ = &mut recv_task => send_task.abort(),
        }

        self.cleanup().await;
    }

    async fn handle_incoming(
        message: WsMessage,
        state: &AppState,
        channel_id: ChannelId,
        cmd_tx: &mpsc::Sender<WsCommand>,
    ) -> Result<(), ()> {
        match message {
            WsMessage::Close(_) => {
                tracing::info!(channel_id = %channel_id, "WebSocket收到关闭消息");
                return Err(());
            }
            WsMessage::Ping(data) => {
                if cmd_tx.send(WsCommand::SendPong(data.to_vec())).await.is_err() {
                    tracing::warn!("Failed to send pong command");
                    return Err(());
                }
            }
            WsMessage::Pong(_) => {
                tracing::debug!("收到pong消息");
            }
            WsMessage::Text(text) => {
                Self::handle_client_event(text.as_str(), state, channel_id).await;
            }
            WsMessage::Binary(_) => {
                tracing::debug!(channel_id = %channel_id, "忽略二进制消息");
            }
        }
        Ok(())
    }

    /// 无法识别的事件与非法雇主 id 只记录日志，连接保持
    async fn handle_client_event(text: &str, state: &AppState, channel_id: ChannelId) {
        let event = match serde_json::from_str::<ClientEvent>(text) {
            Ok(event) => event,
            Err(err) => {
                tracing::warn!(channel_id = %channel_id, error = %err, "unrecognized client event");
                return;
            }
        };

        match event {
            ClientEvent::Register(payload) => {
                let employer_id = match EmployerId::parse(&payload.employer_id) {
                    Ok(id) => id,
                    Err(err) => {
                        tracing::warn!(channel_id = %channel_id, error = %err, "register rejected");
                        return;
                    }
                };
                if let Err(err) = state.presence.register(employer_id, channel_id).await {
                    tracing::error!(
                        channel_id = %channel_id,
                        employer_id = %employer_id,
                        error = %err,
                        "Failed to register presence"
                    );
                }
            }
        }
    }

    async fn cleanup(&self) {
        self.state.channel_hub.detach(self.channel_id).await;
        if let Err(err) = self.state.presence.unregister(self.channel_id).await {
            tracing::error!(channel_id = %self.channel_id, error = %err, "Failed to cleanup presence");
        }
        tracing::info!(channel_id = %self.channel_id, "WebSocket连接已断开，在线状态已清理");
    }
}

/// 发送任务的写命令
#[derive(Debug)]
enum WsCommand {
    SendPong(Vec<u8>),
}
