use std::fs;
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::{debug, info, info_span};

use viewkit_cli::logging::redact_value;
use viewkit_cli::render::{default_columns, page_footer, params_lines, rows_table, tree_lines};
use viewkit_cli::source::{FileTransport, read_json, snapshot_paging_mode};
use viewkit_engine::{
    JoinIndex, ListController, MenuState, PageState, TreeBuilder, attach_fields,
    decorate, group_values, normalize,
};
use viewkit_model::{CurrentUser, Record, ViewConfig};

use crate::cli::{JoinArgs, PageArgs, ParamsArgs, TreeArgs};

/// Load `--config`, or the built-in defaults without one.
pub fn load_config(path: Option<&Path>) -> Result<ViewConfig> {
    let Some(path) = path else {
        return Ok(ViewConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("read config {}", path.display()))?;
    let config = ViewConfig::from_toml_str(&text)
        .with_context(|| format!("parse config {}", path.display()))?;
    debug!(path = %path.display(), resources = config.resources.len(), "Loaded configuration");
    Ok(config)
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .context("start async runtime")
}

pub fn run_page(args: &PageArgs, config: &ViewConfig) -> Result<()> {
    let span = info_span!("page", resource = %args.resource);
    let _guard = span.enter();
    let started = Instant::now();

    let mut config = config.clone();
    if let Some(size) = args.size {
        config.paging.page_size = size;
    }
    let query = args.query.to_query();
    let mode = snapshot_paging_mode(&query, args.client);
    debug!(?mode, "Selected paging mode");
    let mut view = ListController::new(
        FileTransport::new(&args.file),
        args.resource.as_str(),
        &config,
        mode,
    );
    if let Some(user) = &args.user {
        view.set_user(Some(CurrentUser::new(user.as_str(), args.admin)));
    }

    runtime()?.block_on(async {
        view.load().await?;
        if query.is_active() {
            view.search(query).await?;
        }
        if args.page > 1 && !view.go_to(args.page - 1).await? {
            info!(page = args.page, pages = view.state().page_count(), "Page out of range");
        }
        Ok::<_, viewkit_engine::ViewError>(())
    })
    .with_context(|| format!("load {}", args.file.display()))?;

    let rows = view.rows();
    let columns = if args.columns.is_empty() {
        default_columns(&rows)
    } else {
        args.columns.clone()
    };
    let first_position = view.state().page() * view.state().page_size() + 1;
    println!("{}", rows_table(&rows, &columns, first_position));
    println!("{}", page_footer(view.state(), rows.len()));
    info!(
        rows = rows.len(),
        elapsed_ms = started.elapsed().as_millis(),
        "Rendered page"
    );
    Ok(())
}

pub fn run_tree(args: &TreeArgs, config: &ViewConfig) -> Result<()> {
    let payload = read_json(&args.file, "tree")
        .with_context(|| format!("read {}", args.file.display()))?;
    let builder = TreeBuilder::from_profile(&config.tree);
    let forest = builder.build_forest(normalize(&payload));
    let label = args.label.as_deref().unwrap_or(&config.tree.label_field);

    let menu = if args.clicks.is_empty() {
        None
    } else {
        let delay = std::time::Duration::from_millis(config.menu.close_delay_ms);
        let mut menu = MenuState::from_forest(&forest, builder.id_field(), delay);
        for id in &args.clicks {
            menu.click(id);
        }
        Some(menu)
    };

    for line in tree_lines(&forest, builder.id_field(), label, menu.as_ref()) {
        println!("{line}");
    }
    Ok(())
}

pub fn run_join(args: &JoinArgs, config: &ViewConfig) -> Result<()> {
    let primary = read_json(&args.primary, "primary")
        .with_context(|| format!("read {}", args.primary.display()))?;
    let secondary = read_json(&args.secondary, "secondary")
        .with_context(|| format!("read {}", args.secondary.display()))?;

    let mut primary = normalize(&primary);
    let mut secondary = normalize(&secondary);
    if let (Some(key), Some(value)) = (&args.group_by, &args.value) {
        let into = args.into.clone().unwrap_or_else(|| format!("{value}s"));
        secondary = group_values(&secondary, key, value, &into);
    }

    let join = &config.join;
    let index = JoinIndex::build(&secondary, &join.candidate_fields);
    let defaults: Vec<(String, Value)> = join
        .defaults
        .iter()
        .map(|(field, value)| (field.clone(), value.clone()))
        .collect();
    let mut attach = attach_fields(&join.attach_fields, &defaults);
    decorate(
        &mut primary,
        &index,
        &join.candidate_fields,
        |record: &mut Record, matched: Option<&Record>| {
            if matched.is_none() {
                let probe = record
                    .first_text(&join.candidate_fields)
                    .map_or("", |(_, value)| value);
                tracing::trace!(value = redact_value(probe), "No secondary match");
            }
            attach(record, matched);
        },
    );

    let values: Vec<Value> = primary.into_iter().map(Record::into_value).collect();
    let text = serde_json::to_string_pretty(&values).context("serialize joined records")?;
    println!("{text}");
    Ok(())
}

pub fn run_params(args: &ParamsArgs, config: &ViewConfig) -> Result<()> {
    let mut state = PageState::new(args.size.unwrap_or(config.paging.page_size))
        .with_page_base(config.paging.first_page);
    // Unknown total: let the requested page through.
    state.set_total(args.page.saturating_mul(state.page_size()));
    state.go_to(args.page.saturating_sub(1));
    let params = args
        .query
        .to_query()
        .to_params(state.server_page(), state.page_size());
    println!("{}", params_lines(&params));
    Ok(())
}

pub fn run_config(config: &ViewConfig) -> Result<()> {
    let text = config.to_toml_string().context("serialize configuration")?;
    print!("{text}");
    Ok(())
}
