//! The frontend placeholder: a static storefront page.

use std::sync::Arc;

use axum::{Router, extract::State, response::Html, routing::get};
use tower_http::trace::TraceLayer;

use crate::routes;

#[derive(Clone)]
struct FrontendState {
    page: Arc<String>,
}

/// Builds the frontend router.
///
/// Every path serves the same document, SPA-style, so the listener's
/// default target always has something to answer with.
pub fn frontend_router(api_base_url: String) -> Router {
    let state = FrontendState {
        page: Arc::new(render_page(&api_base_url)),
    };

    Router::new()
        .route(routes::ROOT, get(page_handler))
        .fallback(page_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn page_handler(State(state): State<FrontendState>) -> Html<String> {
    Html((*state.page).clone())
}

fn render_page(api_base_url: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
  <head>
    <meta charset="utf-8">
    <title>Ecommerce storefront placeholder</title>
  </head>
  <body>
    <h1>Ecommerce storefront placeholder</h1>
    <p>Replace this container with the real storefront build.</p>
    <p>API base URL: <code>{api_base_url}</code></p>
  </body>
</html>
"#
    )
}
