use std::sync::Arc;

use crate::clients::directory::Directory;
use crate::clients::engine::DurableEngine;
use crate::clients::mailer::Mailer;

pub mod decision;
pub mod identity;
pub mod notify;
pub mod orchestrator;
pub mod store;
pub mod submit;
pub mod validate;

#[cfg(test)]
pub mod testkit;

use decision::DecisionResolver;
use notify::{NotificationHandler, NotifierSettings};
use orchestrator::Orchestrator;
use store::RecordStore;
use submit::SubmissionGuard;

/// The wired-up approval saga: one instance per process, built in `main`
/// from injected collaborator handles and shared with the HTTP layer.
pub struct SagaContext {
    pub guard: SubmissionGuard,
    pub resolver: DecisionResolver,
    pub notifier: NotificationHandler,
    pub store: Arc<dyn RecordStore>,
}

impl SagaContext {
    pub fn new(
        store: Arc<dyn RecordStore>,
        engine: Arc<dyn DurableEngine>,
        directory: Arc<dyn Directory>,
        mailer: Arc<dyn Mailer>,
        settings: NotifierSettings,
    ) -> Self {
        let orchestrator = Arc::new(Orchestrator::new(engine));
        Self {
            guard: SubmissionGuard::new(store.clone(), orchestrator.clone()),
            resolver: DecisionResolver::new(store.clone(), orchestrator),
            notifier: NotificationHandler::new(store.clone(), directory, mailer, settings),
            store,
        }
    }
}
