//! List controller behavior against a scripted transport.

use serde_json::{Value, json};
use viewkit_engine::{
    ListController, PagingMode, ScriptedTransport, TransportCall, TransportError, ViewError,
};
use viewkit_model::{CurrentUser, Query, QueryKind, ResolvedKey, ViewConfig, record};

fn posts(count: usize) -> Vec<Value> {
    (1..=count)
        .map(|n| {
            json!({
                "postId": n,
                "title": format!("post {n}"),
                "writerId": if n % 2 == 0 { "kim" } else { "lee" },
                "createdAt": format!("2024-01-{:02}T09:00:00", (n % 28) + 1),
            })
        })
        .collect()
}

fn config(page_size: usize) -> ViewConfig {
    let mut config = ViewConfig::default();
    config.paging.page_size = page_size;
    config
}

fn server_view(page_size: usize) -> ListController<ScriptedTransport> {
    ListController::new(
        ScriptedTransport::new(),
        "posts",
        &config(page_size),
        PagingMode::ServerPaged,
    )
    .with_user(CurrentUser::new("root", true))
}

fn client_view(page_size: usize) -> ListController<ScriptedTransport> {
    ListController::new(
        ScriptedTransport::new(),
        "posts",
        &config(page_size),
        PagingMode::ClientFiltered,
    )
    .with_user(CurrentUser::new("root", true))
}

fn outage() -> TransportError {
    TransportError::Status {
        resource: "posts".into(),
        status: 503,
        message: "unavailable".into(),
    }
}

#[tokio::test]
async fn server_mode_applies_spring_page_metadata() {
    let mut view = server_view(10);
    view.transport().push_ok(json!({
        "content": posts(10),
        "totalElements": 25,
        "totalPages": 3,
        "number": 0,
        "size": 10,
    }));
    view.load().await.unwrap();

    assert_eq!(view.state().total(), 25);
    assert_eq!(view.state().page_count(), 3);
    let rows = view.rows();
    assert_eq!(rows.len(), 10);
    assert_eq!(rows[0].key, ResolvedKey::Numeric(1.into()));
    assert_eq!(rows[0].identity.as_str(), "1");
    assert!(rows[0].can_mutate);
}

#[tokio::test]
async fn server_mode_sends_query_params() {
    let mut view = server_view(10);
    view.transport().push_ok(json!({"content": [], "totalElements": 0}));
    view.search(Query::keyword(QueryKind::Author, " kim "))
        .await
        .unwrap();

    let calls = view.transport().calls();
    let TransportCall::Get { resource, params } = &calls[0] else {
        panic!("expected a get, got {calls:?}");
    };
    assert_eq!(resource, "posts");
    assert_eq!(
        params,
        &vec![
            ("page".to_string(), "0".to_string()),
            ("size".to_string(), "10".to_string()),
            ("qType".to_string(), "author".to_string()),
            ("q".to_string(), "kim".to_string()),
        ]
    );
    assert_eq!(view.query().keyword, " kim ");
}

#[tokio::test]
async fn transport_failure_leaves_state_untouched() {
    let mut view = server_view(10);
    view.transport()
        .push_ok(json!({"content": posts(10), "totalElements": 25}));
    view.load().await.unwrap();
    let before_state = view.state().clone();
    let before_rows = view.rows();

    view.transport().push(Err(outage()));
    let err = view.next().await.unwrap_err();
    assert!(matches!(
        err,
        ViewError::Transport(TransportError::Status { status: 503, .. })
    ));
    assert_eq!(view.state(), &before_state);
    assert_eq!(view.rows(), before_rows);

    view.transport().push(Err(outage()));
    assert!(
        view.search(Query::keyword(QueryKind::All, "x"))
            .await
            .is_err()
    );
    assert_eq!(view.query(), &Query::default());
    assert_eq!(view.state(), &before_state);
}

#[tokio::test]
async fn unaddressable_rows_are_refused_before_the_transport() {
    let mut view = server_view(10);
    view.transport()
        .push_ok(json!([{"title": "no key"}, {"postId": 2, "title": "keyed"}]));
    view.load().await.unwrap();
    let rows = view.rows();
    assert!(rows[0].identity.is_synthetic());
    assert!(!rows[0].can_mutate);

    let calls_before = view.transport().calls().len();
    let err = view.delete(&rows[0].identity).await.unwrap_err();
    assert!(matches!(err, ViewError::UnaddressableRecord { .. }));
    let err = view
        .update(&rows[0].identity, &record!({"title": "x"}))
        .await
        .unwrap_err();
    assert!(matches!(err, ViewError::UnaddressableRecord { .. }));
    assert_eq!(view.transport().calls().len(), calls_before);
}

#[tokio::test]
async fn delete_sends_resolved_key_and_clamps_pagination() {
    let mut view = client_view(10);
    view.transport().push_ok(json!(posts(21)));
    view.load().await.unwrap();
    assert!(view.last().await.unwrap());
    assert_eq!(view.state().page(), 2);
    assert_eq!(view.rows().len(), 1);

    let last = view.rows()[0].identity.clone();
    view.delete(&last).await.unwrap();
    assert_eq!(view.state().total(), 20);
    assert_eq!(view.state().page_count(), 2);
    assert_eq!(view.state().page(), 1);
    assert_eq!(view.rows().len(), 10);

    let calls = view.transport().calls();
    assert_eq!(
        calls.last(),
        Some(&TransportCall::Delete {
            resource: "posts".into(),
            key: ResolvedKey::Numeric(21.into()),
        })
    );
}

#[tokio::test]
async fn client_mode_filters_without_refetching() {
    let mut view = client_view(5);
    view.transport().push_ok(json!({"list": posts(20)}));
    view.load().await.unwrap();
    assert_eq!(view.state().page_count(), 4);
    assert!(view.go_to(3).await.unwrap());

    view.search(Query::keyword(QueryKind::Author, "KIM"))
        .await
        .unwrap();
    assert_eq!(view.state().total(), 10);
    assert_eq!(view.state().page(), 0);
    assert!(
        view.rows()
            .iter()
            .all(|row| row.record.text("writerId") == Some("kim"))
    );

    let calls = view.transport().calls();
    assert_eq!(calls.len(), 1);
    let TransportCall::Get { params, .. } = &calls[0] else {
        panic!("expected a get");
    };
    assert_eq!(params[1], ("size".to_string(), "1000".to_string()));
}

#[tokio::test]
async fn navigation_outside_range_is_a_no_op() {
    let mut view = client_view(10);
    view.transport().push_ok(json!(posts(5)));
    view.load().await.unwrap();
    assert!(!view.prev().await.unwrap());
    assert!(!view.next().await.unwrap());
    assert!(!view.go_to(7).await.unwrap());
    assert_eq!(view.state().page(), 0);
}

#[tokio::test]
async fn non_owners_are_not_permitted() {
    let mut view = ListController::new(
        ScriptedTransport::new(),
        "posts",
        &config(10),
        PagingMode::ServerPaged,
    )
    .with_user(CurrentUser::new("kim", false));
    view.transport().push_ok(json!(posts(2)));
    view.load().await.unwrap();
    let rows = view.rows();
    assert!(!rows[0].can_mutate);
    assert!(rows[1].can_mutate);

    let err = view.delete(&rows[0].identity).await.unwrap_err();
    assert!(matches!(err, ViewError::NotPermitted { .. }));
    view.delete(&rows[1].identity).await.unwrap();
    assert_eq!(view.rows().len(), 1);
}

#[tokio::test]
async fn create_inserts_at_front_and_update_merges() {
    let mut view = server_view(10);
    view.transport()
        .push_ok(json!({"content": posts(2), "totalElements": 2}));
    view.load().await.unwrap();

    view.transport()
        .push_ok(json!({"postId": 99, "title": "fresh", "writerId": "root"}));
    let identity = view.create(record!({"title": "fresh"})).await.unwrap();
    assert_eq!(identity.as_str(), "99");
    assert_eq!(view.rows()[0].identity, identity);
    assert_eq!(view.state().total(), 3);

    view.update(&identity, &record!({"title": "edited"}))
        .await
        .unwrap();
    assert_eq!(view.rows()[0].record.text("title"), Some("edited"));
    assert!(matches!(
        view.transport().calls().last(),
        Some(TransportCall::Update { key: ResolvedKey::Numeric(_), .. })
    ));

    let missing = viewkit_model::RenderIdentity::new("nope");
    assert!(matches!(
        view.delete(&missing).await.unwrap_err(),
        ViewError::UnknownRow { .. }
    ));
}

#[tokio::test]
async fn client_mode_update_drops_rows_leaving_the_query() {
    let mut view = client_view(10);
    view.transport().push_ok(json!(posts(3)));
    view.load().await.unwrap();
    view.search(Query::keyword(QueryKind::Content, "post 2"))
        .await
        .unwrap();
    let rows = view.rows();
    assert_eq!(rows.len(), 1);

    view.update(&rows[0].identity, &record!({"title": "renamed"}))
        .await
        .unwrap();
    assert!(view.rows().is_empty());
    assert_eq!(view.state().total(), 0);

    view.search(Query::default()).await.unwrap();
    let titles: Vec<_> = view
        .rows()
        .iter()
        .filter_map(|row| row.record.scalar_string("title"))
        .collect();
    assert_eq!(titles, vec!["post 1", "renamed", "post 3"]);
}
