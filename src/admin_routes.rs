use std::{collections::HashMap, sync::Arc};

use axum::{
    Router,
    extract::{Form, Path, Query, Request, State},
    http::{StatusCode, header},
    middleware::{self, Next},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use tracing::info;

use crate::{
    AppState,
    admin::{self, EntityKind, FieldKind, ListQuery, Screen, SelectSource},
    admin_templates::{self, FilterControl},
    error::{AppError, AppResult},
};

pub fn router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(dashboard))
        .route("/{entity}", get(list))
        .route("/{entity}/new", get(new_form).post(create))
        .route("/movies/bulk", post(bulk))
        .route("/{entity}/{id}", get(edit_form).post(update))
        .route("/{entity}/{id}/delete", post(delete))
        .layer(middleware::from_fn_with_state(state, require_admin))
}

/// Single shared bearer token; an empty token keeps the surface locked.
async fn require_admin(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let expected = format!("Bearer {}", state.config.admin_token);
    let presented =
        request.headers().get(header::AUTHORIZATION).and_then(|value| value.to_str().ok());

    if state.config.admin_token.is_empty() || presented != Some(expected.as_str()) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    next.run(request).await
}

async fn dashboard() -> Html<String> {
    Html(admin_templates::dashboard_page())
}

fn resolve(entity: &str) -> AppResult<&'static Screen> {
    admin::screen_by_slug(entity).ok_or(AppError::NotFound)
}

async fn list(
    State(state): State<Arc<AppState>>,
    Path(entity): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> AppResult<Html<String>> {
    let screen = resolve(&entity)?;
    let db = state.catalog.db();

    let query = ListQuery {
        q: params.get("q").cloned(),
        category: params.get("category").and_then(|v| v.parse().ok()),
        year: params.get("year").and_then(|v| v.parse().ok()),
    };
    let rows = admin::load_rows(db, screen, &query).await?;

    let mut filters = Vec::new();
    if screen.kind == EntityKind::Movies {
        let (categories, years) = admin::movie_filter_options(db).await?;
        filters.push(FilterControl {
            label: "Category",
            param: "category",
            options: categories,
            selected: params.get("category").cloned(),
        });
        filters.push(FilterControl {
            label: "Year",
            param: "year",
            options: years.into_iter().map(|y| (y.clone(), y)).collect(),
            selected: params.get("year").cloned(),
        });
    }

    Ok(Html(admin_templates::list_page(
        screen,
        &rows,
        params.get("q").map(String::as_str),
        &filters,
        params.get("msg").map(String::as_str),
        &state.config.media_base_url,
    )))
}

async fn select_options_for(
    state: &AppState,
    screen: &Screen,
) -> AppResult<HashMap<SelectSource, Vec<(String, String)>>> {
    let mut options = HashMap::new();
    for field in screen.fields {
        if let FieldKind::Select(source) = field.kind {
            if !options.contains_key(&source) {
                options.insert(source, admin::select_options(state.catalog.db(), source).await?);
            }
        }
    }
    Ok(options)
}

async fn new_form(
    State(state): State<Arc<AppState>>,
    Path(entity): Path<String>,
) -> AppResult<Html<String>> {
    let screen = resolve(&entity)?;
    let options = select_options_for(&state, screen).await?;

    Ok(Html(admin_templates::form_page(
        screen,
        None,
        &HashMap::new(),
        &options,
        None,
        None,
        &state.config.media_base_url,
    )))
}

fn submitted_values(screen: &Screen, form: &HashMap<String, String>) -> HashMap<&'static str, String> {
    screen
        .fields
        .iter()
        .map(|field| (field.name, form.get(field.name).cloned().unwrap_or_default()))
        .collect()
}

async fn create(
    State(state): State<Arc<AppState>>,
    Path(entity): Path<String>,
    Form(form): Form<HashMap<String, String>>,
) -> AppResult<Response> {
    let screen = resolve(&entity)?;

    match admin::apply(state.catalog.db(), screen, None, &form).await? {
        Ok(()) => {
            info!(entity = screen.slug, "record created");
            Ok(Redirect::to(&format!("/admin/{}", screen.slug)).into_response())
        },
        Err(err) => {
            let options = select_options_for(&state, screen).await?;
            let values = submitted_values(screen, &form);
            Ok(Html(admin_templates::form_page(
                screen,
                None,
                &values,
                &options,
                Some(&err.to_string()),
                None,
                &state.config.media_base_url,
            ))
            .into_response())
        },
    }
}

async fn edit_form(
    State(state): State<Arc<AppState>>,
    Path((entity, id)): Path<(String, i32)>,
) -> AppResult<Html<String>> {
    let screen = resolve(&entity)?;
    let db = state.catalog.db();

    let values = admin::load_values(db, screen, id).await?;
    let options = select_options_for(&state, screen).await?;
    let inlines = if screen.has_inlines {
        Some(admin::movie_inlines(db, id).await?)
    } else {
        None
    };

    Ok(Html(admin_templates::form_page(
        screen,
        Some(id),
        &values,
        &options,
        None,
        inlines.as_ref(),
        &state.config.media_base_url,
    )))
}

async fn update(
    State(state): State<Arc<AppState>>,
    Path((entity, id)): Path<(String, i32)>,
    Form(form): Form<HashMap<String, String>>,
) -> AppResult<Response> {
    let screen = resolve(&entity)?;
    let db = state.catalog.db();

    match admin::apply(db, screen, Some(id), &form).await? {
        Ok(()) => {
            info!(entity = screen.slug, id, "record updated");
            Ok(Redirect::to(&format!("/admin/{}", screen.slug)).into_response())
        },
        Err(err) => {
            let options = select_options_for(&state, screen).await?;
            let values = submitted_values(screen, &form);
            let inlines = if screen.has_inlines {
                Some(admin::movie_inlines(db, id).await?)
            } else {
                None
            };
            Ok(Html(admin_templates::form_page(
                screen,
                Some(id),
                &values,
                &options,
                Some(&err.to_string()),
                inlines.as_ref(),
                &state.config.media_base_url,
            ))
            .into_response())
        },
    }
}

async fn delete(
    State(state): State<Arc<AppState>>,
    Path((entity, id)): Path<(String, i32)>,
) -> AppResult<Redirect> {
    let screen = resolve(&entity)?;
    admin::delete(state.catalog.db(), screen, id).await?;
    info!(entity = screen.slug, id, "record deleted");

    Ok(Redirect::to(&format!("/admin/{}", screen.slug)))
}

/// Bulk publish/unpublish over the checkbox selection. The redirect carries
/// the affected-count message shown above the list.
async fn bulk(
    State(state): State<Arc<AppState>>,
    Form(form): Form<Vec<(String, String)>>,
) -> AppResult<Redirect> {
    let mut action = None;
    let mut ids = Vec::new();
    for (key, value) in form {
        match key.as_str() {
            "action" => action = Some(value),
            "id" => {
                if let Ok(id) = value.parse() {
                    ids.push(id);
                }
            },
            _ => {},
        }
    }

    let draft = match action.as_deref() {
        Some("publish") => false,
        Some("unpublish") => true,
        _ => return Ok(Redirect::to("/admin/movies")),
    };

    let count = admin::set_draft(state.catalog.db(), &ids, draft).await?;
    info!(count, draft, "bulk draft update");

    let message = admin::update_message(count);
    Ok(Redirect::to(&format!("/admin/movies?msg={}", urlencoding::encode(&message))))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use tower::ServiceExt;

    use crate::{
        catalog::tests::{insert_movie, test_catalog},
        entities::movie,
        test_support::test_app,
    };
    use sea_orm::EntityTrait;

    fn bearer() -> String {
        "Bearer test-admin-token".to_string()
    }

    #[tokio::test]
    async fn admin_requires_token() {
        let (_state, app) = test_app(test_catalog().await);

        let response = app
            .oneshot(Request::builder().uri("/admin/movies").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn admin_rejects_wrong_token() {
        let (_state, app) = test_app(test_catalog().await);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/admin/movies")
                    .header(header::AUTHORIZATION, "Bearer nope")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn admin_lists_with_token() {
        let catalog = test_catalog().await;
        insert_movie(&catalog, "Heat", "heat", false).await;
        let (_state, app) = test_app(catalog);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/admin/movies")
                    .header(header::AUTHORIZATION, bearer())
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn unknown_screen_is_not_found() {
        let (_state, app) = test_app(test_catalog().await);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/admin/widgets")
                    .header(header::AUTHORIZATION, bearer())
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn bulk_publish_redirects_with_plural_message() {
        let catalog = test_catalog().await;
        let a = insert_movie(&catalog, "A", "a", true).await;
        let b = insert_movie(&catalog, "B", "b", true).await;
        let c = insert_movie(&catalog, "C", "c", true).await;
        let (state, app) = test_app(catalog);

        let body = format!("action=publish&id={a}&id={b}&id={c}");
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/admin/movies/bulk")
                    .header(header::AUTHORIZATION, bearer())
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let location = response.headers().get(header::LOCATION).unwrap().to_str().unwrap();
        assert!(location.contains("3%20records%20were%20updated"), "location: {location}");

        let published = state.catalog.list_published().await.unwrap();
        assert_eq!(published.len(), 3);
    }

    #[tokio::test]
    async fn bulk_unpublish_single_reports_singular() {
        let catalog = test_catalog().await;
        let a = insert_movie(&catalog, "A", "a", false).await;
        let (state, app) = test_app(catalog);

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/admin/movies/bulk")
                    .header(header::AUTHORIZATION, bearer())
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from(format!("action=unpublish&id={a}")))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let location = response.headers().get(header::LOCATION).unwrap().to_str().unwrap();
        assert!(location.contains("1%20record%20was%20updated"), "location: {location}");

        let hidden = movie::Entity::find_by_id(a)
            .one(state.catalog.db())
            .await
            .unwrap()
            .unwrap();
        assert!(hidden.draft);
    }

    #[tokio::test]
    async fn create_and_edit_category_via_forms() {
        let (state, app) = test_app(test_catalog().await);

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/admin/categories/new")
                    .header(header::AUTHORIZATION, bearer())
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from("name=Films&description=&url=films"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let created = crate::entities::category::Entity::find()
            .one(state.catalog.db())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(created.name, "Films");

        let response = app
            .oneshot(
                Request::builder()
                    .uri(format!("/admin/categories/{}", created.id))
                    .header(header::AUTHORIZATION, bearer())
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn invalid_admin_form_rerenders_with_error() {
        let (state, app) = test_app(test_catalog().await);

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/admin/categories/new")
                    .header(header::AUTHORIZATION, bearer())
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from("url=films"))
                    .unwrap(),
            )
            .await
            .unwrap();

        // Form errors re-render the page instead of redirecting.
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            crate::entities::category::Entity::find()
                .all(state.catalog.db())
                .await
                .unwrap()
                .len(),
            0
        );
    }
}
