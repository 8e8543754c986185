//! Rendering of trees, parameters and row tables.

use std::time::Duration;

use serde_json::json;
use viewkit_cli::render::{
    cell_text, default_columns, page_footer, params_lines, rows_table, tree_lines,
};
use viewkit_cli::source::{FileTransport, snapshot_paging_mode};
use viewkit_engine::{
    ListController, MenuState, PageState, PagingMode, RowView, TreeBuilder, normalize,
};
use viewkit_model::{Query, QueryKind, RenderIdentity, ResolvedKey, ViewConfig, record};

fn menu_forest() -> Vec<viewkit_model::TreeNode> {
    let payload = json!({"list": [
        {"uuid": "m1", "menu_name": "Board", "priority": 2},
        {"uuid": "m2", "menu_name": "Admin", "priority": 1},
        {"uuid": "m3", "menu_name": "Users", "parent_uuid": "m2", "priority": 1},
        {"uuid": "m4", "menu_name": "Roles", "parent_uuid": "m2", "priority": 0},
        {"uuid": "m5", "menu_name": "Notice", "parent_uuid": "m1"},
    ]});
    TreeBuilder::new("uuid", "parent_uuid", "priority").build_forest(normalize(&payload))
}

#[test]
fn tree_is_indented_in_priority_order() {
    let text = tree_lines(&menu_forest(), "uuid", "menu_name", None).join("\n");
    insta::assert_snapshot!(text, @r"
    Admin (m2)
      Roles (m4)
      Users (m3)
    Board (m1)
      Notice (m5)
    ");
}

#[test]
fn clicked_menu_shows_only_its_branch() {
    let forest = menu_forest();
    let mut menu = MenuState::from_forest(&forest, "uuid", Duration::from_millis(150));
    menu.click("m1");
    menu.click("m2");
    let text = tree_lines(&forest, "uuid", "menu_name", Some(&menu)).join("\n");
    insta::assert_snapshot!(text, @r"
    [-] Admin (m2)
      Roles (m4)
      Users (m3)
    [+] Board (m1)
    ");
}

#[test]
fn params_for_keyword_search() {
    let params = Query::keyword(QueryKind::Content, "bus").to_params(1, 20);
    insta::assert_snapshot!(params_lines(&params), @r"
    page=1
    size=20
    qType=content
    q=bus
    ");
}

#[test]
fn footer_reports_visible_range() {
    let mut state = PageState::new(10);
    state.set_total(25);
    state.last();
    assert_eq!(page_footer(&state, 5), "page 3/3 (rows 21-25 of 25)");
    assert_eq!(page_footer(&PageState::new(10), 0), "page 1/1 (no rows of 0)");
}

#[test]
fn table_lists_keys_identities_and_fields() {
    let rows = vec![
        RowView {
            key: ResolvedKey::Numeric(7.into()),
            identity: RenderIdentity::new("7"),
            record: record!({"postId": 7, "title": "Bus schedule"}),
            can_mutate: true,
        },
        RowView {
            key: ResolvedKey::None,
            identity: RenderIdentity::new("tmp-1-1"),
            record: record!({"title": "Draft", "writerId": "kim"}),
            can_mutate: false,
        },
    ];
    let columns = default_columns(&rows);
    assert_eq!(columns, vec!["postId", "title", "writerId"]);

    let rendered = rows_table(&rows, &columns, 1).to_string();
    for expected in ["Bus schedule", "tmp-1-1", "Draft", "kim", "yes", "no"] {
        assert!(rendered.contains(expected), "missing {expected} in\n{rendered}");
    }
}

#[test]
fn long_values_are_cut() {
    let long = "x".repeat(60);
    let text = cell_text(&json!(long));
    assert_eq!(text.chars().count(), 48);
    assert!(text.ends_with("..."));
    assert_eq!(cell_text(&json!(3)), "3");
    assert_eq!(cell_text(&json!(null)), "");
}

#[tokio::test]
async fn file_transport_feeds_the_controller() {
    let path = std::env::temp_dir().join(format!("viewkit-render-{}.json", std::process::id()));
    std::fs::write(
        &path,
        json!({
            "content": [{"postId": 1, "title": "a"}, {"postId": 2, "title": "b"}],
            "totalElements": 12,
        })
        .to_string(),
    )
    .unwrap();

    let mut view = ListController::new(
        FileTransport::new(&path),
        "posts",
        &ViewConfig::default(),
        PagingMode::ServerPaged,
    );
    view.load().await.unwrap();
    assert_eq!(view.state().page_count(), 2);
    assert_eq!(view.rows().len(), 2);

    let identity = view.rows()[0].identity.clone();
    assert!(view.delete(&identity).await.is_err());
    assert_eq!(view.rows().len(), 2);

    std::fs::remove_file(&path).unwrap();
}

#[tokio::test]
async fn keyword_search_over_a_snapshot_narrows_rows() {
    let path = std::env::temp_dir().join(format!("viewkit-search-{}.json", std::process::id()));
    std::fs::write(
        &path,
        json!({
            "content": [
                {"postId": 1, "title": "Bus schedule"},
                {"postId": 2, "title": "Parking"},
                {"postId": 3, "title": "Night bus"},
            ],
            "totalElements": 3,
        })
        .to_string(),
    )
    .unwrap();

    let query = Query::keyword(QueryKind::Content, "bus");
    let mode = snapshot_paging_mode(&query, false);
    assert_eq!(mode, PagingMode::ClientFiltered);
    assert_eq!(
        snapshot_paging_mode(&Query::default(), false),
        PagingMode::ServerPaged
    );

    let mut view = ListController::new(
        FileTransport::new(&path),
        "posts",
        &ViewConfig::default(),
        mode,
    );
    view.load().await.unwrap();
    view.search(query).await.unwrap();

    let titles: Vec<String> = view
        .rows()
        .iter()
        .filter_map(|row| row.record.scalar_string("title"))
        .collect();
    assert_eq!(titles, vec!["Bus schedule", "Night bus"]);
    assert_eq!(view.state().total(), 2);
    assert_eq!(page_footer(view.state(), titles.len()), "page 1/1 (rows 1-2 of 2)");

    std::fs::remove_file(&path).unwrap();
}
