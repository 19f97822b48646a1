//! Telegram notification service
//!
//! Events are handed to an unbounded channel consumed by a single worker
//! task, keeping delivery off the transactional path. `notify` never fails;
//! delivery errors are logged and dropped.

use tokio::sync::mpsc;

use crate::config::TelegramConfig;

#[derive(Clone)]
pub struct Notifier {
    tx: mpsc::UnboundedSender<String>,
}

impl Notifier {
    /// Spawn the delivery worker and return a handle for producers
    pub fn spawn(config: TelegramConfig) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(deliver_loop(rx, config));
        Self { tx }
    }

    /// Queue a message for delivery, best-effort
    pub fn notify(&self, message: impl Into<String>) {
        let message = message.into();
        if self.tx.send(message).is_err() {
            tracing::warn!("Notification worker is gone, dropping message");
        }
    }
}

async fn deliver_loop(mut rx: mpsc::UnboundedReceiver<String>, config: TelegramConfig) {
    let (bot_token, chat_id) = match (config.bot_token, config.chat_id) {
        (Some(token), Some(chat)) => (token, chat),
        _ => {
            tracing::info!("Telegram is not configured, notifications will be dropped");
            while rx.recv().await.is_some() {}
            return;
        }
    };

    let client = reqwest::Client::new();
    let url = format!("https://api.telegram.org/bot{}/sendMessage", bot_token);

    while let Some(message) = rx.recv().await {
        if let Err(e) = send_message(&client, &url, &chat_id, &message).await {
            tracing::warn!("Failed to deliver Telegram notification: {}", e);
        }
    }
}

async fn send_message(
    client: &reqwest::Client,
    url: &str,
    chat_id: &str,
    text: &str,
) -> Result<(), reqwest::Error> {
    client
        .post(url)
        .json(&serde_json::json!({
            "chat_id": chat_id,
            "text": text,
        }))
        .send()
        .await?
        .error_for_status()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notify_is_infallible_when_worker_is_gone() {
        tokio_test::block_on(async {
            let (tx, rx) = mpsc::unbounded_channel();
            let notifier = Notifier { tx };
            drop(rx);
            // Must not panic or error, only log
            notifier.notify("borrowing created");
        });
    }

    #[tokio::test]
    async fn unconfigured_worker_drains_messages() {
        let notifier = Notifier::spawn(TelegramConfig {
            bot_token: None,
            chat_id: None,
        });
        notifier.notify("first");
        notifier.notify("second");
        // Worker keeps receiving; sender side stays healthy
        tokio::task::yield_now().await;
        notifier.notify("third");
    }
}
