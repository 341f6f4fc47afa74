use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{ConnectInfo, Form, Path, State},
    http::HeaderMap,
    response::{Html, Redirect},
};
use tracing::debug;

use crate::{
    AppState,
    error::{AppError, AppResult},
    models::{ContactForm, RatingForm, ReviewForm},
    templates,
};

pub async fn index(State(state): State<Arc<AppState>>) -> AppResult<Html<String>> {
    let movies = state.catalog.list_published().await?;
    Ok(Html(templates::index_page(&movies, &state.config.media_base_url)))
}

pub async fn movie_detail(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> AppResult<Html<String>> {
    let page = state.catalog.movie_page(&slug).await?.ok_or(AppError::NotFound)?;
    Ok(Html(templates::movie_detail_page(&page, &state.config.media_base_url)))
}

/// The movie comes from the path; a movie id in the body cannot redirect the
/// write. Invalid submissions are discarded and the visitor is sent home
/// either way.
pub async fn add_review(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Form(form): Form<ReviewForm>,
) -> AppResult<Redirect> {
    match form.validate() {
        Ok(new) => {
            state.catalog.add_review(id, new).await?;
        },
        Err(err) => debug!(movie_id = id, error = %err, "invalid review discarded"),
    }

    Ok(Redirect::to("/"))
}

pub async fn add_rating(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Form(form): Form<RatingForm>,
) -> AppResult<Redirect> {
    let ip = forwarded_ip(&headers).unwrap_or_else(|| addr.ip().to_string());

    match form.validate() {
        Ok(new) => {
            state.catalog.add_rating(&ip, new).await?;
        },
        Err(err) => debug!(ip = %ip, error = %err, "invalid rating discarded"),
    }

    Ok(Redirect::to("/"))
}

pub async fn contact_page() -> Html<String> {
    Html(templates::contact_page())
}

pub async fn add_contact(
    State(state): State<Arc<AppState>>,
    Form(form): Form<ContactForm>,
) -> AppResult<Redirect> {
    match form.validate() {
        Ok(new) => state.catalog.add_contact(new).await?,
        Err(err) => debug!(error = %err, "invalid contact message discarded"),
    }

    Ok(Redirect::to("/"))
}

fn forwarded_ip(headers: &HeaderMap) -> Option<String> {
    if let Some(forwarded) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        let first = forwarded.split(',').next().unwrap_or("").trim();
        if !first.is_empty() {
            return Some(first.to_string());
        }
    }

    headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use sea_orm::EntityTrait;
    use tower::ServiceExt;

    use crate::{
        catalog::tests::{insert_movie, test_catalog},
        entities::{contact_message, rating, review},
        test_support::test_app,
    };

    fn form_post(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn index_lists_only_published() {
        let catalog = test_catalog().await;
        insert_movie(&catalog, "Heat", "heat", false).await;
        insert_movie(&catalog, "Secret Cut", "secret-cut", true).await;
        let (_state, app) = test_app(catalog);

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_text(response).await;
        assert!(body.contains("Heat"));
        assert!(!body.contains("Secret Cut"));
    }

    #[tokio::test]
    async fn detail_by_slug() {
        let catalog = test_catalog().await;
        insert_movie(&catalog, "Heat", "heat", false).await;
        let (_state, app) = test_app(catalog);

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/movie/heat").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("Heat"));

        let response = app
            .oneshot(Request::builder().uri("/movie/missing").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn review_binds_to_path_movie() {
        let catalog = test_catalog().await;
        let decoy = insert_movie(&catalog, "Decoy", "decoy", false).await;
        let target = insert_movie(&catalog, "Target", "target", false).await;
        let (state, app) = test_app(catalog);

        // The body claims the decoy movie; the path must win.
        let body =
            format!("name=Ann&email=ann%40example.com&text=Great&movie={decoy}&parent=");
        let response = app.oneshot(form_post(&format!("/review/{target}"), &body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/");

        let rows = review::Entity::find().all(state.catalog.db()).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].movie_id, target);
    }

    #[tokio::test]
    async fn invalid_review_persists_nothing_and_redirects() {
        let catalog = test_catalog().await;
        let movie_id = insert_movie(&catalog, "Heat", "heat", false).await;
        let (state, app) = test_app(catalog);

        let response = app
            .oneshot(form_post(&format!("/review/{movie_id}"), "name=Ann&text=Great"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/");
        assert_eq!(review::Entity::find().all(state.catalog.db()).await.unwrap().len(), 0);
    }

    #[tokio::test]
    async fn contact_message_created_and_redirected() {
        let (state, app) = test_app(test_catalog().await);

        let response = app
            .oneshot(form_post("/contact", "name=Ann&email=ann%40example.com&message=Hello"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/");

        let rows = contact_message::Entity::find().all(state.catalog.db()).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "Ann");
    }

    #[tokio::test]
    async fn invalid_contact_persists_nothing() {
        let (state, app) = test_app(test_catalog().await);

        let response = app.oneshot(form_post("/contact", "name=Ann&message=Hello")).await.unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            contact_message::Entity::find().all(state.catalog.db()).await.unwrap().len(),
            0
        );
    }

    #[tokio::test]
    async fn rating_uses_forwarded_ip_once_per_movie() {
        let catalog = test_catalog().await;
        let movie_id = insert_movie(&catalog, "Heat", "heat", false).await;
        let (state, app) = test_app(catalog);

        for star in ["3", "5"] {
            let response = app
                .clone()
                .oneshot(
                    Request::builder()
                        .method("POST")
                        .uri("/rating")
                        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                        .header("x-forwarded-for", "203.0.113.7")
                        .body(Body::from(format!("movie={movie_id}&star={star}")))
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::SEE_OTHER);
        }

        let rows = rating::Entity::find().all(state.catalog.db()).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].ip, "203.0.113.7");

        let summary = state.catalog.rating_summary(movie_id).await.unwrap();
        assert_eq!(summary.votes, 1);
        assert_eq!(summary.average, Some(5.0));
    }
}
