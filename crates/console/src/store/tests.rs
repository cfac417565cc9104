#![allow(clippy::unwrap_used)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use portfolio_core::{Certification, CertificationId, CertificationInput, FormPayload};
use tokio::sync::oneshot;

use super::*;
use crate::api::Listing;

fn cert(id: &str, name: &str) -> Certification {
    Certification {
        id: CertificationId::new(id),
        course_name: name.to_string(),
        mode: "Online".to_string(),
        provider: "Coursera".to_string(),
        duration: "6 weeks".to_string(),
        completion_date: "2024-01-01".to_string(),
        key_learnings: vec![],
        certificate: None,
        certificate_id: None,
    }
}

fn input(name: &str) -> CertificationInput {
    CertificationInput {
        course_name: name.to_string(),
        provider: "Coursera".to_string(),
        completion_date: "2024-01-01".to_string(),
        ..CertificationInput::default()
    }
}

fn unauthorized() -> ApiError {
    ApiError::Unauthorized {
        status: 401,
        message: "No token provided".to_string(),
    }
}

fn server_error() -> ApiError {
    ApiError::Server {
        status: 500,
        message: "Database unavailable".to_string(),
    }
}

/// In-memory certification backend with scripted failures and gates.
#[derive(Default)]
struct FakeCertifications {
    records: Mutex<Vec<Certification>>,
    failure: Mutex<Option<ApiError>>,
    gates: Mutex<VecDeque<oneshot::Receiver<()>>>,
    calls: AtomicUsize,
    next_id: AtomicUsize,
    reused_id: Mutex<Option<String>>,
}

impl FakeCertifications {
    fn with(records: Vec<Certification>) -> Self {
        Self {
            records: Mutex::new(records),
            ..Self::default()
        }
    }

    fn fail_next(&self, err: ApiError) {
        *self.failure.lock().unwrap() = Some(err);
    }

    /// Hold the next call until the returned sender fires.
    fn gate_next(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().push_back(rx);
        tx
    }

    /// Answer the next create with `id` instead of a fresh one.
    fn create_with_id(&self, id: &str) {
        *self.reused_id.lock().unwrap() = Some(id.to_string());
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn enter(&self) -> Result<(), ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.gates.lock().unwrap().pop_front();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        let failure = self.failure.lock().unwrap().take();
        failure.map_or(Ok(()), Err)
    }
}

impl Resource for FakeCertifications {
    type Entity = Certification;
    type Input = CertificationInput;
    type Query = ();

    fn validate(&self, input: &CertificationInput) -> Result<(), ApiError> {
        input.validate().map_err(ApiError::from)
    }

    async fn list(&self, _query: &()) -> Result<Listing<Certification>, ApiError> {
        self.enter().await?;
        Ok(Listing::unpaged(self.records.lock().unwrap().clone()))
    }

    async fn create(&self, input: &CertificationInput) -> Result<Certification, ApiError> {
        self.enter().await?;
        let id = self.reused_id.lock().unwrap().take().unwrap_or_else(|| {
            let n = self.next_id.fetch_add(1, Ordering::SeqCst);
            format!("new-{n}")
        });
        let created = cert(&id, &input.course_name);
        self.records.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn update(
        &self,
        id: &CertificationId,
        input: &CertificationInput,
    ) -> Result<Certification, ApiError> {
        self.enter().await?;
        Ok(cert(id.as_str(), &input.course_name))
    }

    async fn delete(&self, id: &CertificationId) -> Result<(), ApiError> {
        self.enter().await?;
        self.records.lock().unwrap().retain(|record| &record.id != id);
        Ok(())
    }
}

impl DetailResource for FakeCertifications {
    async fn fetch(&self, id: &CertificationId) -> Result<Certification, ApiError> {
        self.enter().await?;
        let records = self.records.lock().unwrap();
        records
            .iter()
            .find(|record| &record.id == id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound("Certification not found".to_string()))
    }
}

impl BulkDeleteResource for FakeCertifications {
    async fn delete_many(&self, ids: &[CertificationId]) -> Result<(), ApiError> {
        self.enter().await?;
        self.records
            .lock()
            .unwrap()
            .retain(|record| !ids.contains(&record.id));
        Ok(())
    }
}

fn ids(store: &EntityStore<FakeCertifications>) -> Vec<String> {
    store
        .items()
        .iter()
        .map(|item| item.id.to_string())
        .collect()
}

async fn loaded(records: Vec<Certification>) -> EntityStore<FakeCertifications> {
    let store = EntityStore::new(FakeCertifications::with(records));
    store.fetch_all(&()).await.unwrap();
    store
}

#[tokio::test]
async fn test_fetch_all_replaces_items() {
    let store = loaded(vec![cert("a", "Rust"), cert("b", "Go")]).await;

    let state = store.snapshot();
    assert_eq!(ids(&store), ["a", "b"]);
    assert!(!state.list_loading);
    assert!(state.error.is_none());
    assert!(state.pagination.is_none());
}

#[tokio::test]
async fn test_fetch_all_raises_list_loading_while_in_flight() {
    let store = Arc::new(EntityStore::new(FakeCertifications::with(vec![cert(
        "a", "Rust",
    )])));
    let gate = store.resource().gate_next();

    let task = tokio::spawn({
        let store = Arc::clone(&store);
        async move { store.fetch_all(&()).await }
    });
    tokio::task::yield_now().await;

    let during = store.snapshot();
    assert!(during.list_loading);
    assert!(!during.operation_loading);

    gate.send(()).unwrap();
    task.await.unwrap().unwrap();
    assert!(!store.snapshot().list_loading);
    assert_eq!(ids(&store), ["a"]);
}

#[tokio::test]
async fn test_unauthorized_fetch_clears_cached_list() {
    let store = loaded(vec![cert("a", "Rust")]).await;
    store.resource().fail_next(unauthorized());

    let err = store.fetch_all(&()).await.unwrap_err();

    assert!(err.is_unauthorized());
    let state = store.snapshot();
    assert!(state.items.is_empty());
    assert_eq!(state.error.unwrap().message(), "No token provided");
    assert!(!state.list_loading);
}

#[tokio::test]
async fn test_other_fetch_failures_keep_stale_list() {
    let store = loaded(vec![cert("a", "Rust")]).await;
    store.resource().fail_next(server_error());

    store.fetch_all(&()).await.unwrap_err();

    assert_eq!(ids(&store), ["a"]);
    assert_eq!(store.error(), Some(server_error()));
}

#[tokio::test]
async fn test_create_prepends_returned_record() {
    let store = loaded(vec![cert("a", "Rust")]).await;

    let created = store.create(&input("Kubernetes")).await.unwrap();

    assert_eq!(created.course_name, "Kubernetes");
    assert_eq!(ids(&store), ["new-0", "a"]);
    assert!(!store.snapshot().operation_loading);
}

#[tokio::test]
async fn test_create_with_cached_id_replaces_stale_copy() {
    let store = loaded(vec![cert("a", "Rust"), cert("b", "Go")]).await;
    store.resource().create_with_id("b");

    store.create(&input("Go, again")).await.unwrap();

    let items = store.items();
    assert_eq!(ids(&store), ["b", "a"]);
    assert_eq!(items[0].course_name, "Go, again");
}

#[tokio::test]
async fn test_create_rejects_invalid_input_without_request() {
    let store = loaded(vec![cert("a", "Rust")]).await;
    let calls_before = store.resource().calls();

    let err = store.create(&input("")).await.unwrap_err();

    assert!(matches!(err, ApiError::Validation(_)));
    assert_eq!(store.resource().calls(), calls_before);
    assert_eq!(store.error(), Some(err));
    assert_eq!(ids(&store), ["a"]);
}

#[tokio::test]
async fn test_create_failure_keeps_list() {
    let store = loaded(vec![cert("a", "Rust")]).await;
    store.resource().fail_next(server_error());

    store.create(&input("Kubernetes")).await.unwrap_err();

    let state = store.snapshot();
    assert_eq!(state.items.len(), 1);
    assert!(!state.operation_loading);
    assert_eq!(state.error, Some(server_error()));
}

#[tokio::test]
async fn test_update_replaces_in_place() {
    let store = loaded(vec![cert("a", "X"), cert("b", "Other")]).await;

    store.update(&"a".into(), &input("Y")).await.unwrap();

    let items = store.items();
    assert_eq!(ids(&store), ["a", "b"]);
    assert_eq!(items[0].course_name, "Y");
    assert_eq!(items[1].course_name, "Other");
}

#[tokio::test]
async fn test_update_of_uncached_record_leaves_list() {
    let store = loaded(vec![cert("a", "X")]).await;

    let updated = store.update(&"zzz".into(), &input("Y")).await.unwrap();

    assert_eq!(updated.id.as_str(), "zzz");
    assert_eq!(ids(&store), ["a"]);
    assert_eq!(store.items()[0].course_name, "X");
}

#[tokio::test]
async fn test_update_failure_keeps_original_record() {
    let store = loaded(vec![cert("a", "X")]).await;
    store.resource().fail_next(ApiError::NotFound("Certification not found".into()));

    store.update(&"a".into(), &input("Y")).await.unwrap_err();

    assert_eq!(store.items()[0].course_name, "X");
    assert_eq!(store.error().unwrap().message(), "Certification not found");
}

#[tokio::test]
async fn test_delete_filters_record() {
    let store = loaded(vec![cert("p1", "One"), cert("p2", "Two")]).await;

    store.delete(&"p1".into()).await.unwrap();

    assert_eq!(ids(&store), ["p2"]);
}

#[tokio::test]
async fn test_delete_of_uncached_id_is_noop() {
    let store = loaded(vec![cert("p1", "One"), cert("p2", "Two")]).await;
    let mut rx = store.subscribe();

    store.delete(&"p9".into()).await.unwrap();

    let state = rx.borrow_and_update().clone();
    assert_eq!(ids(&store), ["p1", "p2"]);
    assert!(!state.operation_loading);
    assert!(state.error.is_none());
    assert_eq!(store.resource().calls(), 2);
}

#[tokio::test]
async fn test_delete_failure_keeps_list() {
    let store = loaded(vec![cert("p1", "One"), cert("p2", "Two")]).await;
    store.resource().fail_next(server_error());

    store.delete(&"p1".into()).await.unwrap_err();

    assert_eq!(ids(&store), ["p1", "p2"]);
}

#[tokio::test]
async fn test_new_operation_resets_previous_error() {
    let store = loaded(vec![cert("a", "Rust")]).await;
    store.resource().fail_next(server_error());
    store.delete(&"a".into()).await.unwrap_err();
    assert!(store.error().is_some());

    store.fetch_all(&()).await.unwrap();

    assert!(store.error().is_none());
}

#[tokio::test]
async fn test_clear_error_touches_only_error() {
    let store = loaded(vec![cert("a", "Rust")]).await;
    store.resource().fail_next(server_error());
    store.fetch_all(&()).await.unwrap_err();
    let mut rx = store.subscribe();

    store.clear_error();

    assert!(rx.has_changed().unwrap());
    let state = rx.borrow_and_update().clone();
    assert!(state.error.is_none());
    assert_eq!(state.items.len(), 1);

    store.clear_error();
    assert!(!rx.has_changed().unwrap());
}

#[tokio::test(flavor = "current_thread")]
async fn test_clear_error_keeps_operation_in_flight() {
    let store = Arc::new(loaded(vec![cert("a", "Rust"), cert("b", "Go")]).await);
    let gate = store.resource().gate_next();

    let pending = tokio::spawn({
        let store = Arc::clone(&store);
        async move { store.delete(&"a".into()).await }
    });
    tokio::task::yield_now().await;

    store.resource().fail_next(server_error());
    store.update(&"b".into(), &input("Go")).await.unwrap_err();
    assert_eq!(store.error(), Some(server_error()));

    store.clear_error();

    let state = store.snapshot();
    assert!(state.error.is_none());
    assert!(state.operation_loading);
    assert_eq!(state.items.len(), 2);

    gate.send(()).unwrap();
    pending.await.unwrap().unwrap();
    let state = store.snapshot();
    assert!(!state.operation_loading);
    assert_eq!(ids(&store), ["b"]);
}

#[tokio::test(flavor = "current_thread")]
async fn test_concurrent_updates_apply_in_completion_order() {
    let store = Arc::new(loaded(vec![cert("a", "Original")]).await);
    let first_gate = store.resource().gate_next();
    let second_gate = store.resource().gate_next();

    let first = tokio::spawn({
        let store = Arc::clone(&store);
        async move { store.update(&"a".into(), &input("First")).await }
    });
    tokio::task::yield_now().await;
    let second = tokio::spawn({
        let store = Arc::clone(&store);
        async move { store.update(&"a".into(), &input("Second")).await }
    });
    tokio::task::yield_now().await;
    assert!(store.snapshot().operation_loading);

    second_gate.send(()).unwrap();
    second.await.unwrap().unwrap();
    assert_eq!(store.items()[0].course_name, "Second");
    assert!(store.snapshot().operation_loading);

    first_gate.send(()).unwrap();
    first.await.unwrap().unwrap();
    let state = store.snapshot();
    assert_eq!(state.items[0].course_name, "First");
    assert!(!state.operation_loading);
}

#[tokio::test]
async fn test_subscribers_observe_committed_list() {
    let store = EntityStore::new(FakeCertifications::with(vec![cert("a", "Rust")]));
    let mut rx = store.subscribe();

    store.fetch_all(&()).await.unwrap();

    assert!(rx.has_changed().unwrap());
    let state = rx.borrow_and_update();
    assert_eq!(state.items.len(), 1);
    assert!(!state.list_loading);
}

#[tokio::test]
async fn test_fetch_one_selects_and_refreshes_cached_copy() {
    let store = loaded(vec![cert("a", "Rust")]).await;
    store.resource().records.lock().unwrap()[0].course_name = "Rust 2024".to_string();

    let fetched = store.fetch_one(&"a".into()).await.unwrap();

    let state = store.snapshot();
    assert_eq!(state.selected, Some(fetched));
    assert_eq!(state.items[0].course_name, "Rust 2024");
}

#[tokio::test]
async fn test_fetch_one_not_found_keeps_selection() {
    let store = loaded(vec![cert("a", "Rust")]).await;
    store.fetch_one(&"a".into()).await.unwrap();

    let err = store.fetch_one(&"missing".into()).await.unwrap_err();

    assert!(matches!(err, ApiError::NotFound(_)));
    assert_eq!(store.snapshot().selected.unwrap().id.as_str(), "a");
}

#[tokio::test]
async fn test_delete_clears_matching_selection() {
    let store = loaded(vec![cert("a", "Rust"), cert("b", "Go")]).await;
    store.fetch_one(&"a".into()).await.unwrap();

    store.delete(&"a".into()).await.unwrap();

    assert!(store.snapshot().selected.is_none());
}

#[tokio::test]
async fn test_delete_many_removes_each_cached_record() {
    let store = loaded(vec![cert("a", "A"), cert("b", "B"), cert("c", "C")]).await;

    let removed = store
        .delete_many(&[
            CertificationId::from("a"),
            CertificationId::from("c"),
            CertificationId::from("zzz"),
        ])
        .await
        .unwrap();

    assert_eq!(removed, 2);
    assert_eq!(ids(&store), ["b"]);
}

#[tokio::test]
async fn test_delete_many_with_no_ids_makes_no_request() {
    let store = loaded(vec![cert("a", "A")]).await;
    let calls_before = store.resource().calls();

    assert_eq!(store.delete_many(&[]).await.unwrap(), 0);
    assert_eq!(store.resource().calls(), calls_before);
}
