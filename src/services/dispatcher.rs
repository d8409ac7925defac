// src/services/dispatcher.rs
//
// Efeitos colaterais best-effort (auditoria, notificações, contador do prestador).
// Os motores enfileiram depois do commit; um worker separado grava. Falhas
// ficam no log e nunca voltam para quem chamou.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

use crate::{
    db::Store,
    models::events::{Notification, SystemEvent},
};

#[derive(Debug)]
pub enum SideEffect {
    Audit(SystemEvent),
    Notify(Notification),
    CompletedJob { trader_id: Uuid },
    // Responde quando tudo que veio antes já foi processado
    Flush(oneshot::Sender<()>),
}

#[derive(Clone)]
pub struct EventDispatcher {
    tx: mpsc::UnboundedSender<SideEffect>,
}

impl EventDispatcher {
    pub fn spawn(store: Arc<dyn Store>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<SideEffect>();

        tokio::spawn(async move {
            while let Some(effect) = rx.recv().await {
                run(store.as_ref(), effect).await;
            }
            tracing::debug!("Side-effect dispatcher stopped");
        });

        Self { tx }
    }

    pub fn audit(&self, event: SystemEvent) {
        self.send(SideEffect::Audit(event));
    }

    pub fn notify(&self, notification: Notification) {
        self.send(SideEffect::Notify(notification));
    }

    pub fn completed_job(&self, trader_id: Uuid) {
        self.send(SideEffect::CompletedJob { trader_id });
    }

    /// Aguarda o worker drenar a fila até este ponto.
    pub async fn flush(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        self.send(SideEffect::Flush(done_tx));
        let _ = done_rx.await;
    }

    fn send(&self, effect: SideEffect) {
        if let Err(e) = self.tx.send(effect) {
            tracing::warn!("Side-effect dropped, dispatcher is gone: {:?}", e.0);
        }
    }
}

async fn run(store: &dyn Store, effect: SideEffect) {
    match effect {
        SideEffect::Audit(event) => {
            if let Err(e) = store.insert_system_event(&event).await {
                tracing::warn!(
                    event_type = %event.event_type,
                    entity_id = %event.entity_id,
                    "Failed to record audit event: {}", e
                );
            }
        }
        SideEffect::Notify(notification) => {
            if let Err(e) = store.insert_notification(&notification).await {
                tracing::warn!(user_id = %notification.user_id, "Failed to store notification: {}", e);
            }
        }
        SideEffect::CompletedJob { trader_id } => {
            if let Err(e) = store.increment_completed_jobs(trader_id).await {
                tracing::warn!(%trader_id, "Failed to bump completed-job counter: {}", e);
            }
        }
        SideEffect::Flush(done) => {
            let _ = done.send(());
        }
    }
}
