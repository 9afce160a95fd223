use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::Html,
    routing::get,
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::AppState;
use crate::config::AppConfig;
use crate::feed::{PageResponse, cards_html, render::escape_into, render_batch};
use crate::store::PostStore;

/// Largest page a client may ask for.
const MAX_PAGE_SIZE: usize = 100;

/// Bound a requested or configured page size to `1..=MAX_PAGE_SIZE`.
fn page_limit(size: usize) -> usize {
    size.clamp(1, MAX_PAGE_SIZE)
}

/// Start the Axum server with the provided configuration.
pub async fn start_server(config: Arc<AppConfig>) -> anyhow::Result<()> {
    let store = if config.feed.seed_demo {
        info!("Seeding demo conversations");
        PostStore::with_demo_data()
    } else {
        PostStore::new()
    };

    let state = AppState {
        store,
        config: Arc::clone(&config),
    };
    let app = router(state);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(
        name: "server.started",
        address = %addr,
        page_size = config.feed.page_size,
        "Server started"
    );

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/group/{group_id}", get(group_page))
        .route("/group/{group_id}/posts", get(group_posts))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// Query string for the posts endpoint. Values are parsed leniently.
#[derive(Debug, Deserialize)]
struct PageQuery {
    #[serde(default)]
    page: Option<String>,
    #[serde(default)]
    limit: Option<String>,
}

impl PageQuery {
    fn page(&self) -> u32 {
        self.page
            .as_deref()
            .and_then(|p| p.trim().parse().ok())
            .unwrap_or(0)
    }

    fn limit(&self, default: usize) -> usize {
        page_limit(
            self.limit
                .as_deref()
                .and_then(|l| l.trim().parse().ok())
                .unwrap_or(default),
        )
    }
}

/// GET /group/{group_id}/posts?page=&limit= - One page of history.
async fn group_posts(
    State(state): State<AppState>,
    Path(group_id): Path<String>,
    Query(query): Query<PageQuery>,
) -> Json<PageResponse> {
    let page = query.page();
    let limit = query.limit(state.config.feed.page_size);
    let response = state.store.page(&group_id, page, limit);

    tracing::debug!(
        group_id = %group_id,
        page,
        limit,
        returned = response.posts.len(),
        more = response.more,
        "Served page"
    );

    Json(response)
}

/// GET /group/{group_id} - Feed page with the newest messages pre-rendered.
async fn group_page(State(state): State<AppState>, Path(group_id): Path<String>) -> Html<String> {
    let limit = page_limit(state.config.feed.page_size);
    let newest = state.store.page(&group_id, 0, limit);
    Html(html_shell(
        &format!("Group {group_id}"),
        &feed_container(&group_id, &newest),
    ))
}

/// The feed container element with the attributes the scroller reads.
///
/// The page carries no script; paging is driven by a `FeedScroller` client
/// such as `feed-browse`.
fn feed_container(group_id: &str, newest: &PageResponse) -> String {
    let mut id = String::new();
    escape_into(&mut id, group_id);
    let has_more = if newest.more { "True" } else { "False" };
    let cards = cards_html(&render_batch(&newest.posts));

    format!(
        r#"<div id="messages-container" class="overflow-auto" style="height: 70vh"
     data-group-id="{id}" data-page="0" data-has-more="{has_more}">
{cards}
</div>"#
    )
}

/// Generate the HTML shell for the application.
fn html_shell(title: &str, content: &str) -> String {
    let mut escaped_title = String::new();
    escape_into(&mut escaped_title, title);

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>{escaped_title}</title>
</head>
<body>
    <main class="container py-4">
        {content}
    </main>
</body>
</html>"#
    )
}
