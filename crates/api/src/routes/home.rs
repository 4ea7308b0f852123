//! Landing page.

use axum::response::Html;

/// GET / — returns a welcome page.
pub async fn index() -> Html<&'static str> {
    Html("<h1>WELCOME</h1>")
}
