//! Annotation session
//!
//! Async orchestration around the controller: fetching the project
//! definitions and the document, loading them into engine state, and
//! submitting the mutated document back. All engine mutation stays
//! synchronous; the only suspension points are the store calls.
//!
//! Overlapping refreshes are guarded by a generation counter: every refresh
//! takes a new generation and a completion only installs its result while its
//! generation is still current, so a slow first response can never clobber a
//! newer one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use thiserror::Error;

use crate::notify::{Notifier, Severity};
use crate::registry::LabelDefinitionRegistry;
use crate::schema::SchemaError;
use crate::transport::{DocumentStore, NetworkError};

use super::AnnotationController;

/// A session-level failure. Network failures have already been reported to
/// the notifier when this surfaces; nothing is retried automatically.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("No document loaded")]
    NotLoaded,
}

/// One user's annotation session over one document.
pub struct AnnotationSession {
    store: Arc<dyn DocumentStore>,
    notifier: Arc<dyn Notifier>,
    generation: AtomicU64,
    controller: Mutex<Option<AnnotationController>>,
}

impl AnnotationSession {
    pub fn new(store: Arc<dyn DocumentStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            store,
            notifier,
            generation: AtomicU64::new(0),
            controller: Mutex::new(None),
        }
    }

    /// Fetch definitions and document, then load the controller.
    ///
    /// Returns `Ok(true)` when this refresh installed its result and
    /// `Ok(false)` when a newer refresh overtook it and the response was
    /// discarded. Fetch and load failures are reported to the notifier once
    /// and returned.
    pub async fn refresh(&self) -> Result<bool, SessionError> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let definitions = match self.store.fetch_definitions().await {
            Ok(payload) => payload,
            Err(err) => {
                self.notifier.notify(
                    Severity::Error,
                    &format!("Failed to fetch label definitions: {err}"),
                );
                return Err(err.into());
            }
        };

        let document = match self.store.fetch_document().await {
            Ok(payload) => payload,
            Err(err) => {
                self.notifier
                    .notify(Severity::Error, &format!("Failed to fetch document: {err}"));
                return Err(err.into());
            }
        };

        let registry = LabelDefinitionRegistry::from_payload(definitions)?;
        let controller = AnnotationController::load(registry, document)?;

        if self.generation.load(Ordering::SeqCst) != generation {
            tracing::debug!(generation, "Discarding stale document fetch");
            return Ok(false);
        }

        *self.lock() = Some(controller);
        tracing::info!(generation, "Session refreshed");
        Ok(true)
    }

    /// Whether a document is currently loaded.
    pub fn is_loaded(&self) -> bool {
        self.lock().is_some()
    }

    /// Run a closure against the loaded controller.
    ///
    /// All mutation happens synchronously inside the closure; the session
    /// never holds the lock across a suspension point.
    pub fn with_controller<R>(
        &self,
        f: impl FnOnce(&mut AnnotationController) -> R,
    ) -> Result<R, SessionError> {
        let mut guard = self.lock();
        let controller = guard.as_mut().ok_or(SessionError::NotLoaded)?;
        Ok(f(controller))
    }

    /// Serialize the current state and submit it as one full update.
    ///
    /// A transport failure is reported to the notifier once; retrying is a
    /// new manual action. The in-memory state is untouched either way.
    pub async fn submit(&self) -> Result<(), SessionError> {
        let payload = {
            let guard = self.lock();
            let controller = guard.as_ref().ok_or(SessionError::NotLoaded)?;
            controller.serialize()
        };

        match self.store.submit(&payload).await {
            Ok(()) => {
                self.notifier.notify(Severity::Info, "Labels submitted");
                Ok(())
            }
            Err(err) => {
                self.notifier
                    .notify(Severity::Error, &format!("Failed to submit labels: {err}"));
                Err(err.into())
            }
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<AnnotationController>> {
        self.controller.lock().expect("session lock")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::{LabelDefinition, LabelKind, LabelScope};
    use crate::notify::CollectingNotifier;
    use crate::schema::{
        DefinitionsPayload, DocumentData, DocumentPayload, LabelStatus, PageData,
    };
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::time::Duration;

    fn definitions() -> DefinitionsPayload {
        DefinitionsPayload {
            label_definitions: vec![LabelDefinition {
                name: "term".to_string(),
                color: "#ff0000".to_string(),
                kind: LabelKind::Text,
                scope: LabelScope::Block,
            }],
        }
    }

    fn document(page: u32) -> DocumentPayload {
        DocumentPayload {
            data: DocumentData {
                label_status: LabelStatus::Open,
                labels: vec![],
                pages: vec![PageData {
                    page,
                    label_status: LabelStatus::Open,
                    labels: vec![],
                    blocks: vec![],
                }],
            },
        }
    }

    /// Store serving queued document responses, each with an optional delay.
    struct QueuedStore {
        documents: Mutex<VecDeque<(Option<Duration>, DocumentPayload)>>,
        fail_submit: bool,
        submitted: Mutex<Vec<DocumentPayload>>,
    }

    impl QueuedStore {
        fn new(documents: Vec<(Option<Duration>, DocumentPayload)>) -> Self {
            Self {
                documents: Mutex::new(documents.into()),
                fail_submit: false,
                submitted: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl DocumentStore for QueuedStore {
        async fn fetch_document(&self) -> Result<DocumentPayload, NetworkError> {
            let (delay, payload) = self
                .documents
                .lock()
                .unwrap()
                .pop_front()
                .ok_or(NetworkError::Status {
                    status: 404,
                    body: "no more documents".to_string(),
                })?;
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            Ok(payload)
        }

        async fn fetch_definitions(&self) -> Result<DefinitionsPayload, NetworkError> {
            Ok(definitions())
        }

        async fn submit(&self, document: &DocumentPayload) -> Result<(), NetworkError> {
            if self.fail_submit {
                return Err(NetworkError::Status {
                    status: 500,
                    body: "boom".to_string(),
                });
            }
            self.submitted.lock().unwrap().push(document.clone());
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_refresh_loads_controller() {
        let store = Arc::new(QueuedStore::new(vec![(None, document(1))]));
        let session = AnnotationSession::new(store, Arc::new(CollectingNotifier::new()));

        assert!(!session.is_loaded());
        assert!(session.refresh().await.unwrap());
        assert!(session.is_loaded());

        let pages = session
            .with_controller(|c| c.serialize().data.pages.len())
            .unwrap();
        assert_eq!(pages, 1);
    }

    #[tokio::test]
    async fn test_stale_refresh_is_discarded() {
        let store = Arc::new(QueuedStore::new(vec![
            (Some(Duration::from_millis(80)), document(1)),
            (None, document(2)),
        ]));
        let notifier = Arc::new(CollectingNotifier::new());
        let session = Arc::new(AnnotationSession::new(store, notifier));

        let slow = {
            let session = Arc::clone(&session);
            tokio::spawn(async move { session.refresh().await })
        };
        // Let the slow refresh claim its generation before overtaking it.
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(session.refresh().await.unwrap());

        // The earlier fetch resolves later and must not win.
        let installed = slow.await.unwrap().unwrap();
        assert!(!installed);
        let page = session
            .with_controller(|c| c.serialize().data.pages[0].page)
            .unwrap();
        assert_eq!(page, 2);
    }

    #[tokio::test]
    async fn test_fetch_failure_notifies_once() {
        let store = Arc::new(QueuedStore::new(vec![]));
        let notifier = Arc::new(CollectingNotifier::new());
        let session = AnnotationSession::new(store, Arc::clone(&notifier) as Arc<dyn Notifier>);

        let err = session.refresh().await.unwrap_err();
        assert!(matches!(err, SessionError::Network(_)));

        let messages = notifier.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].0, Severity::Error);
        assert!(messages[0].1.contains("fetch document"));
    }

    #[tokio::test]
    async fn test_submit_round_trips_payload() {
        let store = Arc::new(QueuedStore::new(vec![(None, document(3))]));
        let session = AnnotationSession::new(
            Arc::clone(&store) as Arc<dyn DocumentStore>,
            Arc::new(CollectingNotifier::new()),
        );

        session.refresh().await.unwrap();
        session.submit().await.unwrap();

        let submitted = store.submitted.lock().unwrap();
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0], document(3));
    }

    #[tokio::test]
    async fn test_submit_failure_is_reported_not_retried() {
        let mut inner = QueuedStore::new(vec![(None, document(1))]);
        inner.fail_submit = true;
        let store = Arc::new(inner);
        let notifier = Arc::new(CollectingNotifier::new());
        let session = AnnotationSession::new(
            Arc::clone(&store) as Arc<dyn DocumentStore>,
            Arc::clone(&notifier) as Arc<dyn Notifier>,
        );

        session.refresh().await.unwrap();
        assert!(session.submit().await.is_err());

        let errors: Vec<_> = notifier
            .messages()
            .into_iter()
            .filter(|(severity, _)| *severity == Severity::Error)
            .collect();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].1.contains("submit"));

        // The session stays usable after the failure.
        assert!(session.is_loaded());
    }

    #[tokio::test]
    async fn test_submit_without_document_fails() {
        let store = Arc::new(QueuedStore::new(vec![]));
        let session = AnnotationSession::new(store, Arc::new(CollectingNotifier::new()));
        assert!(matches!(
            session.submit().await,
            Err(SessionError::NotLoaded)
        ));
    }
}
