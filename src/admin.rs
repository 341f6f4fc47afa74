//! Statically declared admin screens. Each entity gets one `Screen` entry
//! enumerating its list columns, searchable fields, filters, form fields and
//! inline relations; a generic renderer and a small set of typed loaders
//! consume the registry. The entity set is fixed, so no reflection is needed.

use std::collections::HashMap;

use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

use crate::{
    entities::{
        actor, category, contact_message, genre, movie, movie_credit, movie_genre, movie_shot,
        rating, rating_star, review,
    },
    error::{AppError, AppResult},
    models::{CreditRole, FormError},
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EntityKind {
    Categories,
    Genres,
    Actors,
    Movies,
    MovieCredits,
    MovieGenres,
    MovieShots,
    Reviews,
    Ratings,
    RatingStars,
    ContactMessages,
}

#[derive(Clone, Copy, Debug)]
pub enum FieldKind {
    Text,
    TextArea,
    Number,
    Checkbox,
    Image,
    Select(SelectSource),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum SelectSource {
    Categories,
    Movies,
    Actors,
    Genres,
    Stars,
    Professions,
    Roles,
}

#[derive(Clone, Copy, Debug)]
pub struct FieldDef {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub readonly: bool,
}

const fn field(name: &'static str, label: &'static str, kind: FieldKind) -> FieldDef {
    FieldDef { name, label, kind, required: true, readonly: false }
}

const fn optional(name: &'static str, label: &'static str, kind: FieldKind) -> FieldDef {
    FieldDef { name, label, kind, required: false, readonly: false }
}

const fn readonly(name: &'static str, label: &'static str, kind: FieldKind) -> FieldDef {
    FieldDef { name, label, kind, required: false, readonly: true }
}

#[derive(Clone, Copy, Debug)]
pub struct FilterDef {
    pub param: &'static str,
    pub label: &'static str,
}

#[derive(Clone, Copy, Debug)]
pub struct Screen {
    pub kind: EntityKind,
    pub slug: &'static str,
    pub title: &'static str,
    pub columns: &'static [&'static str],
    pub searchable: bool,
    pub filters: &'static [FilterDef],
    pub fields: &'static [FieldDef],
    pub has_inlines: bool,
    pub has_bulk_actions: bool,
}

pub const SCREENS: &[Screen] = &[
    Screen {
        kind: EntityKind::Categories,
        slug: "categories",
        title: "Categories",
        columns: &["id", "name", "url"],
        searchable: true,
        filters: &[],
        fields: &[
            field("name", "Name", FieldKind::Text),
            optional("description", "Description", FieldKind::TextArea),
            field("url", "Slug", FieldKind::Text),
        ],
        has_inlines: false,
        has_bulk_actions: false,
    },
    Screen {
        kind: EntityKind::Genres,
        slug: "genres",
        title: "Genres",
        columns: &["id", "name", "url"],
        searchable: true,
        filters: &[],
        fields: &[
            field("name", "Name", FieldKind::Text),
            optional("description", "Description", FieldKind::TextArea),
            field("url", "Slug", FieldKind::Text),
        ],
        has_inlines: false,
        has_bulk_actions: false,
    },
    Screen {
        kind: EntityKind::Actors,
        slug: "actors",
        title: "Actors and directors",
        columns: &["id", "name", "age", "image"],
        searchable: true,
        filters: &[],
        fields: &[
            field("name", "Name", FieldKind::Text),
            optional("age", "Age", FieldKind::Number),
            optional("description", "Description", FieldKind::TextArea),
            field("image", "Image", FieldKind::Image),
            field("profession", "Profession", FieldKind::Select(SelectSource::Professions)),
        ],
        has_inlines: false,
        has_bulk_actions: false,
    },
    Screen {
        kind: EntityKind::Movies,
        slug: "movies",
        title: "Movies",
        columns: &["id", "title", "category", "url", "draft"],
        searchable: true,
        filters: &[
            FilterDef { param: "category", label: "Category" },
            FilterDef { param: "year", label: "Year" },
        ],
        fields: &[
            field("title", "Title", FieldKind::Text),
            optional("tagline", "Tagline", FieldKind::Text),
            optional("description", "Description", FieldKind::TextArea),
            field("poster", "Poster", FieldKind::Image),
            field("year", "Year", FieldKind::Number),
            field("world_premiere", "World premiere", FieldKind::Text),
            field("country", "Country", FieldKind::Text),
            optional("budget", "Budget", FieldKind::Number),
            optional("fees_usa", "Fees in USA", FieldKind::Number),
            optional("fees_world", "Fees worldwide", FieldKind::Number),
            optional("category_id", "Category", FieldKind::Select(SelectSource::Categories)),
            field("url", "Slug", FieldKind::Text),
            optional("draft", "Draft", FieldKind::Checkbox),
        ],
        has_inlines: true,
        has_bulk_actions: true,
    },
    Screen {
        kind: EntityKind::MovieCredits,
        slug: "movie-credits",
        title: "Movie credits",
        columns: &["id", "movie", "actor", "role"],
        searchable: false,
        filters: &[],
        fields: &[
            field("movie_id", "Movie", FieldKind::Select(SelectSource::Movies)),
            field("actor_id", "Person", FieldKind::Select(SelectSource::Actors)),
            field("role", "Role", FieldKind::Select(SelectSource::Roles)),
        ],
        has_inlines: false,
        has_bulk_actions: false,
    },
    Screen {
        kind: EntityKind::MovieGenres,
        slug: "movie-genres",
        title: "Movie genres",
        columns: &["id", "movie", "genre"],
        searchable: false,
        filters: &[],
        fields: &[
            field("movie_id", "Movie", FieldKind::Select(SelectSource::Movies)),
            field("genre_id", "Genre", FieldKind::Select(SelectSource::Genres)),
        ],
        has_inlines: false,
        has_bulk_actions: false,
    },
    Screen {
        kind: EntityKind::MovieShots,
        slug: "movie-shots",
        title: "Movie shots",
        columns: &["id", "title", "description", "image"],
        searchable: true,
        filters: &[],
        fields: &[
            field("title", "Title", FieldKind::Text),
            optional("description", "Description", FieldKind::TextArea),
            field("image", "Image", FieldKind::Image),
            field("movie_id", "Movie", FieldKind::Select(SelectSource::Movies)),
        ],
        has_inlines: false,
        has_bulk_actions: false,
    },
    Screen {
        kind: EntityKind::Reviews,
        slug: "reviews",
        title: "Reviews",
        columns: &["id", "email", "parent", "movie"],
        searchable: true,
        filters: &[],
        fields: &[
            readonly("name", "Name", FieldKind::Text),
            readonly("email", "Email", FieldKind::Text),
            field("text", "Text", FieldKind::TextArea),
            optional("parent_id", "Parent review", FieldKind::Number),
            field("movie_id", "Movie", FieldKind::Select(SelectSource::Movies)),
        ],
        has_inlines: false,
        has_bulk_actions: false,
    },
    Screen {
        kind: EntityKind::Ratings,
        slug: "ratings",
        title: "Ratings",
        columns: &["id", "ip", "star"],
        searchable: false,
        filters: &[],
        fields: &[
            field("ip", "IP address", FieldKind::Text),
            field("star_id", "Star", FieldKind::Select(SelectSource::Stars)),
            field("movie_id", "Movie", FieldKind::Select(SelectSource::Movies)),
        ],
        has_inlines: false,
        has_bulk_actions: false,
    },
    Screen {
        kind: EntityKind::RatingStars,
        slug: "rating-stars",
        title: "Rating stars",
        columns: &["id", "value"],
        searchable: false,
        filters: &[],
        fields: &[field("value", "Value", FieldKind::Number)],
        has_inlines: false,
        has_bulk_actions: false,
    },
    Screen {
        kind: EntityKind::ContactMessages,
        slug: "contact-messages",
        title: "Contact messages",
        columns: &["id", "name", "email"],
        searchable: false,
        filters: &[],
        fields: &[
            field("name", "Name", FieldKind::Text),
            field("email", "Email", FieldKind::Text),
            field("message", "Message", FieldKind::TextArea),
        ],
        has_inlines: false,
        has_bulk_actions: false,
    },
];

pub fn screen_by_slug(slug: &str) -> Option<&'static Screen> {
    SCREENS.iter().find(|s| s.slug == slug)
}

/// List-view cell; images stay a presentation concern resolved at render time.
#[derive(Clone, Debug)]
pub enum Cell {
    Text(String),
    Bool(bool),
    Image(String),
}

#[derive(Clone, Debug)]
pub struct AdminRow {
    pub id: i32,
    pub cells: Vec<Cell>,
}

#[derive(Clone, Debug, Default)]
pub struct ListQuery {
    pub q: Option<String>,
    pub category: Option<i32>,
    pub year: Option<i32>,
}

fn text(value: impl ToString) -> Cell {
    Cell::Text(value.to_string())
}

pub async fn load_rows(
    db: &DatabaseConnection,
    screen: &Screen,
    query: &ListQuery,
) -> AppResult<Vec<AdminRow>> {
    let q = query.q.as_deref().map(str::trim).filter(|q| !q.is_empty());

    let rows = match screen.kind {
        EntityKind::Categories => {
            let mut find = category::Entity::find().order_by_asc(category::Column::Id);
            if let Some(q) = q {
                find = find.filter(category::Column::Name.contains(q));
            }
            find.all(db)
                .await?
                .into_iter()
                .map(|c| AdminRow { id: c.id, cells: vec![text(c.id), text(c.name), text(c.url)] })
                .collect()
        },
        EntityKind::Genres => {
            let mut find = genre::Entity::find().order_by_asc(genre::Column::Id);
            if let Some(q) = q {
                find = find.filter(genre::Column::Name.contains(q));
            }
            find.all(db)
                .await?
                .into_iter()
                .map(|g| AdminRow { id: g.id, cells: vec![text(g.id), text(g.name), text(g.url)] })
                .collect()
        },
        EntityKind::Actors => {
            let mut find = actor::Entity::find().order_by_asc(actor::Column::Id);
            if let Some(q) = q {
                find = find.filter(actor::Column::Name.contains(q));
            }
            find.all(db)
                .await?
                .into_iter()
                .map(|a| AdminRow {
                    id: a.id,
                    cells: vec![text(a.id), text(a.name), text(a.age), Cell::Image(a.image)],
                })
                .collect()
        },
        EntityKind::Movies => {
            let mut find = movie::Entity::find()
                .find_also_related(category::Entity)
                .order_by_asc(movie::Column::Id);
            if let Some(q) = q {
                find = find.filter(
                    Condition::any()
                        .add(movie::Column::Title.contains(q))
                        .add(category::Column::Name.contains(q)),
                );
            }
            if let Some(category_id) = query.category {
                find = find.filter(movie::Column::CategoryId.eq(category_id));
            }
            if let Some(year) = query.year {
                find = find.filter(movie::Column::Year.eq(year));
            }
            find.all(db)
                .await?
                .into_iter()
                .map(|(m, c)| AdminRow {
                    id: m.id,
                    cells: vec![
                        text(m.id),
                        text(m.title),
                        text(c.map(|c| c.name).unwrap_or_default()),
                        text(m.url),
                        Cell::Bool(m.draft),
                    ],
                })
                .collect()
        },
        EntityKind::MovieCredits => movie_credit::Entity::find()
            .order_by_asc(movie_credit::Column::Id)
            .all(db)
            .await?
            .into_iter()
            .map(|c| AdminRow {
                id: c.id,
                cells: vec![
                    text(c.id),
                    text(c.movie_id),
                    text(c.actor_id),
                    text(match CreditRole::from_code(c.role) {
                        Some(CreditRole::Cast) => "cast",
                        Some(CreditRole::Crew) => "crew",
                        None => "?",
                    }),
                ],
            })
            .collect(),
        EntityKind::MovieGenres => movie_genre::Entity::find()
            .order_by_asc(movie_genre::Column::Id)
            .all(db)
            .await?
            .into_iter()
            .map(|g| AdminRow {
                id: g.id,
                cells: vec![text(g.id), text(g.movie_id), text(g.genre_id)],
            })
            .collect(),
        EntityKind::MovieShots => {
            let mut find = movie_shot::Entity::find().order_by_asc(movie_shot::Column::Id);
            if let Some(q) = q {
                find = find.filter(movie_shot::Column::Title.contains(q));
            }
            find.all(db)
                .await?
                .into_iter()
                .map(|s| AdminRow {
                    id: s.id,
                    cells: vec![text(s.id), text(s.title), text(s.description), Cell::Image(s.image)],
                })
                .collect()
        },
        EntityKind::Reviews => {
            let mut find = review::Entity::find().order_by_asc(review::Column::Id);
            if let Some(q) = q {
                find = find.filter(review::Column::Email.contains(q));
            }
            find.all(db)
                .await?
                .into_iter()
                .map(|r| AdminRow {
                    id: r.id,
                    cells: vec![
                        text(r.id),
                        text(r.email),
                        text(r.parent_id.map(|p| p.to_string()).unwrap_or_default()),
                        text(r.movie_id),
                    ],
                })
                .collect()
        },
        EntityKind::Ratings => rating::Entity::find()
            .find_also_related(rating_star::Entity)
            .order_by_asc(rating::Column::Id)
            .all(db)
            .await?
            .into_iter()
            .map(|(r, star)| AdminRow {
                id: r.id,
                cells: vec![
                    text(r.id),
                    text(r.ip),
                    text(star.map(|s| s.value.to_string()).unwrap_or_default()),
                ],
            })
            .collect(),
        EntityKind::RatingStars => rating_star::Entity::find()
            .order_by_asc(rating_star::Column::Value)
            .all(db)
            .await?
            .into_iter()
            .map(|s| AdminRow { id: s.id, cells: vec![text(s.id), text(s.value)] })
            .collect(),
        EntityKind::ContactMessages => contact_message::Entity::find()
            .order_by_asc(contact_message::Column::Id)
            .all(db)
            .await?
            .into_iter()
            .map(|m| AdminRow { id: m.id, cells: vec![text(m.id), text(m.name), text(m.email)] })
            .collect(),
    };

    Ok(rows)
}

/// Current field values for the edit form, keyed in `screen.fields` order.
pub async fn load_values(
    db: &DatabaseConnection,
    screen: &Screen,
    id: i32,
) -> AppResult<HashMap<&'static str, String>> {
    let mut values = HashMap::new();

    match screen.kind {
        EntityKind::Categories => {
            let c = category::Entity::find_by_id(id).one(db).await?.ok_or(AppError::NotFound)?;
            values.insert("name", c.name);
            values.insert("description", c.description);
            values.insert("url", c.url);
        },
        EntityKind::Genres => {
            let g = genre::Entity::find_by_id(id).one(db).await?.ok_or(AppError::NotFound)?;
            values.insert("name", g.name);
            values.insert("description", g.description);
            values.insert("url", g.url);
        },
        EntityKind::Actors => {
            let a = actor::Entity::find_by_id(id).one(db).await?.ok_or(AppError::NotFound)?;
            values.insert("name", a.name);
            values.insert("age", a.age.to_string());
            values.insert("description", a.description);
            values.insert("image", a.image);
            values.insert(
                "profession",
                match a.profession {
                    actor::Profession::Actor => "actor".to_string(),
                    actor::Profession::Director => "director".to_string(),
                },
            );
        },
        EntityKind::Movies => {
            let m = movie::Entity::find_by_id(id).one(db).await?.ok_or(AppError::NotFound)?;
            values.insert("title", m.title);
            values.insert("tagline", m.tagline);
            values.insert("description", m.description);
            values.insert("poster", m.poster);
            values.insert("year", m.year.to_string());
            values.insert("world_premiere", m.world_premiere);
            values.insert("country", m.country);
            values.insert("budget", m.budget.to_string());
            values.insert("fees_usa", m.fees_usa.to_string());
            values.insert("fees_world", m.fees_world.to_string());
            values.insert(
                "category_id",
                m.category_id.map(|c| c.to_string()).unwrap_or_default(),
            );
            values.insert("url", m.url);
            values.insert("draft", if m.draft { "on".to_string() } else { String::new() });
        },
        EntityKind::MovieCredits => {
            let c =
                movie_credit::Entity::find_by_id(id).one(db).await?.ok_or(AppError::NotFound)?;
            values.insert("movie_id", c.movie_id.to_string());
            values.insert("actor_id", c.actor_id.to_string());
            values.insert("role", c.role.to_string());
        },
        EntityKind::MovieGenres => {
            let g = movie_genre::Entity::find_by_id(id).one(db).await?.ok_or(AppError::NotFound)?;
            values.insert("movie_id", g.movie_id.to_string());
            values.insert("genre_id", g.genre_id.to_string());
        },
        EntityKind::MovieShots => {
            let s = movie_shot::Entity::find_by_id(id).one(db).await?.ok_or(AppError::NotFound)?;
            values.insert("title", s.title);
            values.insert("description", s.description);
            values.insert("image", s.image);
            values.insert("movie_id", s.movie_id.to_string());
        },
        EntityKind::Reviews => {
            let r = review::Entity::find_by_id(id).one(db).await?.ok_or(AppError::NotFound)?;
            values.insert("name", r.name);
            values.insert("email", r.email);
            values.insert("text", r.text);
            values.insert("parent_id", r.parent_id.map(|p| p.to_string()).unwrap_or_default());
            values.insert("movie_id", r.movie_id.to_string());
        },
        EntityKind::Ratings => {
            let r = rating::Entity::find_by_id(id).one(db).await?.ok_or(AppError::NotFound)?;
            values.insert("ip", r.ip);
            values.insert("star_id", r.star_id.to_string());
            values.insert("movie_id", r.movie_id.to_string());
        },
        EntityKind::RatingStars => {
            let s = rating_star::Entity::find_by_id(id).one(db).await?.ok_or(AppError::NotFound)?;
            values.insert("value", s.value.to_string());
        },
        EntityKind::ContactMessages => {
            let m =
                contact_message::Entity::find_by_id(id).one(db).await?.ok_or(AppError::NotFound)?;
            values.insert("name", m.name);
            values.insert("email", m.email);
            values.insert("message", m.message);
        },
    }

    Ok(values)
}

fn req_text(form: &HashMap<String, String>, name: &'static str) -> Result<String, FormError> {
    let value = form.get(name).map(|s| s.trim().to_string()).unwrap_or_default();
    if value.is_empty() { Err(FormError::Missing(name)) } else { Ok(value) }
}

fn opt_text(form: &HashMap<String, String>, name: &str) -> String {
    form.get(name).map(|s| s.trim().to_string()).unwrap_or_default()
}

fn req_i32(form: &HashMap<String, String>, name: &'static str) -> Result<i32, FormError> {
    req_text(form, name)?.parse().map_err(|_| FormError::BadNumber(name))
}

fn opt_i32(
    form: &HashMap<String, String>,
    name: &'static str,
) -> Result<Option<i32>, FormError> {
    let value = opt_text(form, name);
    if value.is_empty() {
        return Ok(None);
    }
    value.parse().map(Some).map_err(|_| FormError::BadNumber(name))
}

fn opt_i64(form: &HashMap<String, String>, name: &'static str) -> Result<i64, FormError> {
    let value = opt_text(form, name);
    if value.is_empty() {
        return Ok(0);
    }
    value.parse().map_err(|_| FormError::BadNumber(name))
}

fn checkbox(form: &HashMap<String, String>, name: &str) -> bool {
    form.get(name).is_some_and(|v| !v.is_empty())
}

async fn ensure_unique_slug<E, C>(
    db: &DatabaseConnection,
    _entity: E,
    url_col: C,
    id_col: C,
    url: &str,
    id: Option<i32>,
) -> AppResult<Result<(), FormError>>
where
    E: EntityTrait,
    C: ColumnTrait,
{
    let mut find = E::find().filter(url_col.eq(url));
    if let Some(id) = id {
        find = find.filter(id_col.ne(id));
    }
    if find.one(db).await?.is_some() {
        return Ok(Err(FormError::Duplicate("url")));
    }
    Ok(Ok(()))
}

/// Creates (`id = None`) or updates one record from a submitted admin form.
/// The outer error is infrastructure; the inner one re-renders the form.
pub async fn apply(
    db: &DatabaseConnection,
    screen: &Screen,
    id: Option<i32>,
    form: &HashMap<String, String>,
) -> AppResult<Result<(), FormError>> {
    macro_rules! try_form {
        ($expr:expr) => {
            match $expr {
                Ok(value) => value,
                Err(err) => return Ok(Err(err)),
            }
        };
    }

    match screen.kind {
        EntityKind::Categories => {
            let url = try_form!(req_text(form, "url"));
            try_form!(
                ensure_unique_slug(
                    db,
                    category::Entity,
                    category::Column::Url,
                    category::Column::Id,
                    &url,
                    id,
                )
                .await?
            );
            let model = category::ActiveModel {
                id: id.map(Set).unwrap_or_default(),
                name: Set(try_form!(req_text(form, "name"))),
                description: Set(opt_text(form, "description")),
                url: Set(url),
            };
            save(db, model, id).await?;
        },
        EntityKind::Genres => {
            let url = try_form!(req_text(form, "url"));
            try_form!(
                ensure_unique_slug(
                    db,
                    genre::Entity,
                    genre::Column::Url,
                    genre::Column::Id,
                    &url,
                    id,
                )
                .await?
            );
            let model = genre::ActiveModel {
                id: id.map(Set).unwrap_or_default(),
                name: Set(try_form!(req_text(form, "name"))),
                description: Set(opt_text(form, "description")),
                url: Set(url),
            };
            save(db, model, id).await?;
        },
        EntityKind::Actors => {
            let profession = match opt_text(form, "profession").as_str() {
                "director" => actor::Profession::Director,
                _ => actor::Profession::Actor,
            };
            let model = actor::ActiveModel {
                id: id.map(Set).unwrap_or_default(),
                name: Set(try_form!(req_text(form, "name"))),
                age: Set(try_form!(opt_i32(form, "age")).unwrap_or(0)),
                description: Set(opt_text(form, "description")),
                image: Set(try_form!(req_text(form, "image"))),
                profession: Set(profession),
            };
            save(db, model, id).await?;
        },
        EntityKind::Movies => {
            let url = try_form!(req_text(form, "url"));
            try_form!(
                ensure_unique_slug(
                    db,
                    movie::Entity,
                    movie::Column::Url,
                    movie::Column::Id,
                    &url,
                    id,
                )
                .await?
            );
            let model = movie::ActiveModel {
                id: id.map(Set).unwrap_or_default(),
                title: Set(try_form!(req_text(form, "title"))),
                tagline: Set(opt_text(form, "tagline")),
                description: Set(opt_text(form, "description")),
                poster: Set(try_form!(req_text(form, "poster"))),
                year: Set(try_form!(req_i32(form, "year"))),
                world_premiere: Set(try_form!(req_text(form, "world_premiere"))),
                country: Set(try_form!(req_text(form, "country"))),
                budget: Set(try_form!(opt_i64(form, "budget"))),
                fees_usa: Set(try_form!(opt_i64(form, "fees_usa"))),
                fees_world: Set(try_form!(opt_i64(form, "fees_world"))),
                category_id: Set(try_form!(opt_i32(form, "category_id"))),
                url: Set(url),
                draft: Set(checkbox(form, "draft")),
            };
            save(db, model, id).await?;
        },
        EntityKind::MovieCredits => {
            let model = movie_credit::ActiveModel {
                id: id.map(Set).unwrap_or_default(),
                movie_id: Set(try_form!(req_i32(form, "movie_id"))),
                actor_id: Set(try_form!(req_i32(form, "actor_id"))),
                role: Set(try_form!(req_i32(form, "role"))),
            };
            save(db, model, id).await?;
        },
        EntityKind::MovieGenres => {
            let model = movie_genre::ActiveModel {
                id: id.map(Set).unwrap_or_default(),
                movie_id: Set(try_form!(req_i32(form, "movie_id"))),
                genre_id: Set(try_form!(req_i32(form, "genre_id"))),
            };
            save(db, model, id).await?;
        },
        EntityKind::MovieShots => {
            let model = movie_shot::ActiveModel {
                id: id.map(Set).unwrap_or_default(),
                title: Set(try_form!(req_text(form, "title"))),
                description: Set(opt_text(form, "description")),
                image: Set(try_form!(req_text(form, "image"))),
                movie_id: Set(try_form!(req_i32(form, "movie_id"))),
            };
            save(db, model, id).await?;
        },
        EntityKind::Reviews => {
            // name and email are read-only in the admin; keep what the
            // visitor submitted.
            let existing = match id {
                Some(id) => {
                    review::Entity::find_by_id(id).one(db).await?.ok_or(AppError::NotFound)?
                },
                None => review::Model {
                    id: 0,
                    name: String::new(),
                    email: String::new(),
                    text: String::new(),
                    parent_id: None,
                    movie_id: 0,
                    created_at: jiff::Timestamp::now().as_second(),
                },
            };
            let model = review::ActiveModel {
                id: id.map(Set).unwrap_or_default(),
                name: Set(existing.name),
                email: Set(existing.email),
                text: Set(try_form!(req_text(form, "text"))),
                parent_id: Set(try_form!(opt_i32(form, "parent_id"))),
                movie_id: Set(try_form!(req_i32(form, "movie_id"))),
                created_at: Set(existing.created_at),
            };
            save(db, model, id).await?;
        },
        EntityKind::Ratings => {
            let model = rating::ActiveModel {
                id: id.map(Set).unwrap_or_default(),
                ip: Set(try_form!(req_text(form, "ip"))),
                star_id: Set(try_form!(req_i32(form, "star_id"))),
                movie_id: Set(try_form!(req_i32(form, "movie_id"))),
            };
            save(db, model, id).await?;
        },
        EntityKind::RatingStars => {
            let model = rating_star::ActiveModel {
                id: id.map(Set).unwrap_or_default(),
                value: Set(try_form!(req_i32(form, "value"))),
            };
            save(db, model, id).await?;
        },
        EntityKind::ContactMessages => {
            let created_at = match id {
                Some(id) => {
                    contact_message::Entity::find_by_id(id)
                        .one(db)
                        .await?
                        .ok_or(AppError::NotFound)?
                        .created_at
                },
                None => jiff::Timestamp::now().as_second(),
            };
            let model = contact_message::ActiveModel {
                id: id.map(Set).unwrap_or_default(),
                name: Set(try_form!(req_text(form, "name"))),
                email: Set(try_form!(req_text(form, "email"))),
                message: Set(try_form!(req_text(form, "message"))),
                created_at: Set(created_at),
            };
            save(db, model, id).await?;
        },
    }

    Ok(Ok(()))
}

async fn save<A>(db: &DatabaseConnection, model: A, id: Option<i32>) -> AppResult<()>
where
    A: sea_orm::ActiveModelTrait + sea_orm::ActiveModelBehavior + Send + 'static,
    <A::Entity as EntityTrait>::Model: sea_orm::IntoActiveModel<A>,
{
    if id.is_some() {
        model.update(db).await?;
    } else {
        model.insert(db).await?;
    }
    Ok(())
}

pub async fn delete(db: &DatabaseConnection, screen: &Screen, id: i32) -> AppResult<()> {
    let affected = match screen.kind {
        EntityKind::Categories => category::Entity::delete_by_id(id).exec(db).await?.rows_affected,
        EntityKind::Genres => genre::Entity::delete_by_id(id).exec(db).await?.rows_affected,
        EntityKind::Actors => actor::Entity::delete_by_id(id).exec(db).await?.rows_affected,
        EntityKind::Movies => movie::Entity::delete_by_id(id).exec(db).await?.rows_affected,
        EntityKind::MovieCredits => {
            movie_credit::Entity::delete_by_id(id).exec(db).await?.rows_affected
        },
        EntityKind::MovieGenres => {
            movie_genre::Entity::delete_by_id(id).exec(db).await?.rows_affected
        },
        EntityKind::MovieShots => {
            movie_shot::Entity::delete_by_id(id).exec(db).await?.rows_affected
        },
        EntityKind::Reviews => review::Entity::delete_by_id(id).exec(db).await?.rows_affected,
        EntityKind::Ratings => rating::Entity::delete_by_id(id).exec(db).await?.rows_affected,
        EntityKind::RatingStars => {
            rating_star::Entity::delete_by_id(id).exec(db).await?.rows_affected
        },
        EntityKind::ContactMessages => {
            contact_message::Entity::delete_by_id(id).exec(db).await?.rows_affected
        },
    };

    if affected == 0 { Err(AppError::NotFound) } else { Ok(()) }
}

/// Bulk publish/unpublish: one UPDATE over the selected ids.
pub async fn set_draft(db: &DatabaseConnection, ids: &[i32], draft: bool) -> AppResult<u64> {
    if ids.is_empty() {
        return Ok(0);
    }

    let result = movie::Entity::update_many()
        .col_expr(movie::Column::Draft, sea_orm::sea_query::Expr::value(draft))
        .filter(movie::Column::Id.is_in(ids.to_vec()))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}

pub fn update_message(count: u64) -> String {
    if count == 1 {
        "1 record was updated".to_string()
    } else {
        format!("{count} records were updated")
    }
}

/// (value, label) pairs for a select field.
pub async fn select_options(
    db: &DatabaseConnection,
    source: SelectSource,
) -> AppResult<Vec<(String, String)>> {
    let options = match source {
        SelectSource::Categories => category::Entity::find()
            .order_by_asc(category::Column::Name)
            .all(db)
            .await?
            .into_iter()
            .map(|c| (c.id.to_string(), c.name))
            .collect(),
        SelectSource::Movies => movie::Entity::find()
            .order_by_asc(movie::Column::Title)
            .all(db)
            .await?
            .into_iter()
            .map(|m| (m.id.to_string(), m.title))
            .collect(),
        SelectSource::Actors => actor::Entity::find()
            .order_by_asc(actor::Column::Name)
            .all(db)
            .await?
            .into_iter()
            .map(|a| (a.id.to_string(), a.name))
            .collect(),
        SelectSource::Genres => genre::Entity::find()
            .order_by_asc(genre::Column::Name)
            .all(db)
            .await?
            .into_iter()
            .map(|g| (g.id.to_string(), g.name))
            .collect(),
        SelectSource::Stars => rating_star::Entity::find()
            .order_by_asc(rating_star::Column::Value)
            .all(db)
            .await?
            .into_iter()
            .map(|s| (s.id.to_string(), s.value.to_string()))
            .collect(),
        SelectSource::Professions => vec![
            ("actor".to_string(), "Actor".to_string()),
            ("director".to_string(), "Director".to_string()),
        ],
        SelectSource::Roles => vec![
            (CreditRole::Cast.as_code().to_string(), "Cast".to_string()),
            (CreditRole::Crew.as_code().to_string(), "Crew".to_string()),
        ],
    };

    Ok(options)
}

/// Options for the declared list filters on the movie screen.
pub async fn movie_filter_options(
    db: &DatabaseConnection,
) -> AppResult<(Vec<(String, String)>, Vec<String>)> {
    let categories = select_options(db, SelectSource::Categories).await?;

    let years: Vec<i32> = movie::Entity::find()
        .select_only()
        .column(movie::Column::Year)
        .distinct()
        .order_by_asc(movie::Column::Year)
        .into_tuple()
        .all(db)
        .await?;

    Ok((categories, years.into_iter().map(|y| y.to_string()).collect()))
}

/// Inline child rows shown on the movie edit screen.
pub struct MovieInlines {
    pub shots: Vec<movie_shot::Model>,
    pub reviews: Vec<review::Model>,
}

pub async fn movie_inlines(db: &DatabaseConnection, movie_id: i32) -> AppResult<MovieInlines> {
    let movie =
        movie::Entity::find_by_id(movie_id).one(db).await?.ok_or(AppError::NotFound)?;

    let shots = movie
        .find_related(movie_shot::Entity)
        .order_by_asc(movie_shot::Column::Id)
        .all(db)
        .await?;
    let reviews =
        movie.find_related(review::Entity).order_by_asc(review::Column::Id).all(db).await?;

    Ok(MovieInlines { shots, reviews })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::{insert_movie, test_catalog};

    #[test]
    fn update_message_pluralizes() {
        assert_eq!(update_message(1), "1 record was updated");
        assert_eq!(update_message(3), "3 records were updated");
        assert_eq!(update_message(0), "0 records were updated");
    }

    #[tokio::test]
    async fn bulk_publish_affects_only_selected() {
        let catalog = test_catalog().await;
        let a = insert_movie(&catalog, "A", "a", true).await;
        let b = insert_movie(&catalog, "B", "b", true).await;
        let c = insert_movie(&catalog, "C", "c", true).await;
        let untouched = insert_movie(&catalog, "D", "d", true).await;

        let count = set_draft(catalog.db(), &[a, b, c], false).await.unwrap();
        assert_eq!(count, 3);

        let published = catalog.list_published().await.unwrap();
        assert_eq!(published.iter().map(|m| m.id).collect::<Vec<_>>(), vec![a, b, c]);

        let still_draft = movie::Entity::find_by_id(untouched)
            .one(catalog.db())
            .await
            .unwrap()
            .unwrap();
        assert!(still_draft.draft);
    }

    #[tokio::test]
    async fn bulk_unpublish_reports_singular() {
        let catalog = test_catalog().await;
        let a = insert_movie(&catalog, "A", "a", false).await;

        let count = set_draft(catalog.db(), &[a], true).await.unwrap();
        assert_eq!(update_message(count), "1 record was updated");
        assert!(catalog.list_published().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn apply_creates_and_updates_category() {
        let catalog = test_catalog().await;
        let screen = screen_by_slug("categories").unwrap();

        let mut form = HashMap::new();
        form.insert("name".to_string(), "Films".to_string());
        form.insert("url".to_string(), "films".to_string());
        assert!(apply(catalog.db(), screen, None, &form).await.unwrap().is_ok());

        let created = category::Entity::find().one(catalog.db()).await.unwrap().unwrap();
        assert_eq!(created.name, "Films");

        form.insert("name".to_string(), "Feature films".to_string());
        assert!(apply(catalog.db(), screen, Some(created.id), &form).await.unwrap().is_ok());

        let updated = category::Entity::find_by_id(created.id)
            .one(catalog.db())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.name, "Feature films");
    }

    #[tokio::test]
    async fn apply_rejects_duplicate_slug() {
        let catalog = test_catalog().await;
        let screen = screen_by_slug("categories").unwrap();

        let mut form = HashMap::new();
        form.insert("name".to_string(), "Films".to_string());
        form.insert("url".to_string(), "films".to_string());
        apply(catalog.db(), screen, None, &form).await.unwrap().unwrap();

        form.insert("name".to_string(), "Other".to_string());
        let err = apply(catalog.db(), screen, None, &form).await.unwrap().unwrap_err();
        assert_eq!(err, FormError::Duplicate("url"));
    }

    #[tokio::test]
    async fn apply_rejects_missing_required_field() {
        let catalog = test_catalog().await;
        let screen = screen_by_slug("categories").unwrap();

        let mut form = HashMap::new();
        form.insert("url".to_string(), "films".to_string());
        let err = apply(catalog.db(), screen, None, &form).await.unwrap().unwrap_err();
        assert_eq!(err, FormError::Missing("name"));
    }

    #[tokio::test]
    async fn movie_search_matches_title_and_category() {
        let catalog = test_catalog().await;
        let screen = screen_by_slug("movies").unwrap();

        let category_id = category::Entity::insert(category::ActiveModel {
            id: Default::default(),
            name: Set("Crime".to_string()),
            description: Set(String::new()),
            url: Set("crime".to_string()),
        })
        .exec(catalog.db())
        .await
        .unwrap()
        .last_insert_id;

        let heat = insert_movie(&catalog, "Heat", "heat", false).await;
        insert_movie(&catalog, "Up", "up", false).await;

        let update = movie::ActiveModel {
            id: Set(heat),
            category_id: Set(Some(category_id)),
            ..Default::default()
        };
        movie::Entity::update(update).exec(catalog.db()).await.unwrap();

        let by_title = ListQuery { q: Some("heat".to_string()), ..Default::default() };
        let rows = load_rows(catalog.db(), screen, &by_title).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, heat);

        let by_category = ListQuery { q: Some("Crime".to_string()), ..Default::default() };
        let rows = load_rows(catalog.db(), screen, &by_category).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, heat);
    }

    #[tokio::test]
    async fn movie_filters_narrow_by_category_and_year() {
        let catalog = test_catalog().await;
        let screen = screen_by_slug("movies").unwrap();

        let heat = insert_movie(&catalog, "Heat", "heat", false).await;
        let ronin = insert_movie(&catalog, "Ronin", "ronin", false).await;

        let update =
            movie::ActiveModel { id: Set(ronin), year: Set(1998), ..Default::default() };
        movie::Entity::update(update).exec(catalog.db()).await.unwrap();

        let by_year = ListQuery { year: Some(1998), ..Default::default() };
        let rows = load_rows(catalog.db(), screen, &by_year).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, ronin);

        let other_year = ListQuery { year: Some(2020), ..Default::default() };
        let rows = load_rows(catalog.db(), screen, &other_year).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, heat);
    }
}
