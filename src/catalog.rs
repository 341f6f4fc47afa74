use std::collections::HashMap;

use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set,
};
use tracing::debug;

use crate::{
    entities::{
        actor, category, contact_message, genre, movie, movie_credit, movie_shot, rating,
        rating_star, review,
    },
    error::AppResult,
    models::{CreditRole, MoviePage, NewContact, NewRating, NewReview, RatingSummary, ReviewThread},
};

/// Single gateway for domain reads and writes.
#[derive(Clone)]
pub struct Catalog {
    db: DatabaseConnection,
}

impl Catalog {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub async fn list_published(&self) -> AppResult<Vec<movie::Model>> {
        let movies = movie::Entity::find()
            .filter(movie::Column::Draft.eq(false))
            .order_by_asc(movie::Column::Id)
            .all(&self.db)
            .await?;
        Ok(movies)
    }

    pub async fn find_by_slug(&self, slug: &str) -> AppResult<Option<movie::Model>> {
        let movie = movie::Entity::find().filter(movie::Column::Url.eq(slug)).one(&self.db).await?;
        Ok(movie)
    }

    /// Assembles everything the detail page needs for one movie.
    pub async fn movie_page(&self, slug: &str) -> AppResult<Option<MoviePage>> {
        let Some(movie) = self.find_by_slug(slug).await? else {
            return Ok(None);
        };

        let category = match movie.category_id {
            Some(id) => category::Entity::find_by_id(id).one(&self.db).await?,
            None => None,
        };

        let genres = movie.find_related(genre::Entity).all(&self.db).await?;

        let credits = movie_credit::Entity::find()
            .filter(movie_credit::Column::MovieId.eq(movie.id))
            .find_also_related(actor::Entity)
            .all(&self.db)
            .await?;

        let mut cast = Vec::new();
        let mut crew = Vec::new();
        for (credit, person) in credits {
            let Some(person) = person else { continue };
            match CreditRole::from_code(credit.role) {
                Some(CreditRole::Cast) => cast.push(person),
                Some(CreditRole::Crew) => crew.push(person),
                None => {},
            }
        }

        let shots = movie_shot::Entity::find()
            .filter(movie_shot::Column::MovieId.eq(movie.id))
            .order_by_asc(movie_shot::Column::Id)
            .all(&self.db)
            .await?;

        let reviews = self.review_threads(movie.id).await?;
        let rating = self.rating_summary(movie.id).await?;

        Ok(Some(MoviePage { movie, category, genres, cast, crew, shots, reviews, rating }))
    }

    /// Threads are rebuilt by grouping on parent id: top-level reviews in
    /// insertion order, direct replies nested under their parent.
    pub async fn review_threads(&self, movie_id: i32) -> AppResult<Vec<ReviewThread>> {
        let rows = review::Entity::find()
            .filter(review::Column::MovieId.eq(movie_id))
            .order_by_asc(review::Column::Id)
            .all(&self.db)
            .await?;

        let mut replies: HashMap<i32, Vec<review::Model>> = HashMap::new();
        let mut top = Vec::new();
        for row in rows {
            match row.parent_id {
                Some(parent) => replies.entry(parent).or_default().push(row),
                None => top.push(row),
            }
        }

        Ok(top
            .into_iter()
            .map(|review| {
                let replies = replies.remove(&review.id).unwrap_or_default();
                ReviewThread { review, replies }
            })
            .collect())
    }

    pub async fn rating_summary(&self, movie_id: i32) -> AppResult<RatingSummary> {
        let rows = rating::Entity::find()
            .filter(rating::Column::MovieId.eq(movie_id))
            .find_also_related(rating_star::Entity)
            .all(&self.db)
            .await?;

        let votes = rows.len() as u64;
        let sum: i64 =
            rows.iter().filter_map(|(_, star)| star.as_ref().map(|s| s.value as i64)).sum();
        let average = if votes == 0 { None } else { Some(sum as f64 / votes as f64) };

        Ok(RatingSummary { votes, average })
    }

    /// Returns false when the submission is discarded: unknown movie, or a
    /// parent review that belongs to a different movie.
    pub async fn add_review(&self, movie_id: i32, new: NewReview) -> AppResult<bool> {
        if movie::Entity::find_by_id(movie_id).one(&self.db).await?.is_none() {
            debug!(movie_id, "review rejected, unknown movie");
            return Ok(false);
        }

        if let Some(parent_id) = new.parent_id {
            let parent = review::Entity::find_by_id(parent_id).one(&self.db).await?;
            if parent.map(|p| p.movie_id) != Some(movie_id) {
                debug!(movie_id, parent_id, "review rejected, bad parent");
                return Ok(false);
            }
        }

        let model = review::ActiveModel {
            id: Default::default(),
            name: Set(new.name),
            email: Set(new.email),
            text: Set(new.text),
            parent_id: Set(new.parent_id),
            movie_id: Set(movie_id),
            created_at: Set(now_sec()),
        };
        review::Entity::insert(model).exec(&self.db).await?;

        Ok(true)
    }

    /// Upserts the (ip, movie) vote; a re-vote replaces the star.
    pub async fn add_rating(&self, ip: &str, new: NewRating) -> AppResult<bool> {
        if movie::Entity::find_by_id(new.movie_id).one(&self.db).await?.is_none() {
            debug!(movie_id = new.movie_id, "rating rejected, unknown movie");
            return Ok(false);
        }

        let star = rating_star::Entity::find()
            .filter(rating_star::Column::Value.eq(new.star_value))
            .one(&self.db)
            .await?;
        let Some(star) = star else {
            debug!(star_value = new.star_value, "rating rejected, unknown star value");
            return Ok(false);
        };

        let model = rating::ActiveModel {
            id: Default::default(),
            ip: Set(ip.to_string()),
            star_id: Set(star.id),
            movie_id: Set(new.movie_id),
        };
        rating::Entity::insert(model)
            .on_conflict(
                sea_orm::sea_query::OnConflict::columns([
                    rating::Column::Ip,
                    rating::Column::MovieId,
                ])
                .update_columns([rating::Column::StarId])
                .to_owned(),
            )
            .exec(&self.db)
            .await?;

        Ok(true)
    }

    pub async fn add_contact(&self, new: NewContact) -> AppResult<()> {
        let model = contact_message::ActiveModel {
            id: Default::default(),
            name: Set(new.name),
            email: Set(new.email),
            message: Set(new.message),
            created_at: Set(now_sec()),
        };
        contact_message::Entity::insert(model).exec(&self.db).await?;

        Ok(())
    }
}

fn now_sec() -> i64 {
    jiff::Timestamp::now().as_second()
}

#[cfg(test)]
pub(crate) mod tests {
    use migration::{Migrator, MigratorTrait};
    use sea_orm::Database;

    use super::*;

    pub(crate) async fn test_catalog() -> Catalog {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        Catalog::new(db)
    }

    pub(crate) async fn insert_movie(
        catalog: &Catalog,
        title: &str,
        slug: &str,
        draft: bool,
    ) -> i32 {
        let model = movie::ActiveModel {
            id: Default::default(),
            title: Set(title.to_string()),
            tagline: Set(String::new()),
            description: Set(String::new()),
            poster: Set("posters/placeholder.jpg".to_string()),
            year: Set(2020),
            world_premiere: Set("2020-01-01".to_string()),
            country: Set("US".to_string()),
            budget: Set(0),
            fees_usa: Set(0),
            fees_world: Set(0),
            category_id: Set(None),
            url: Set(slug.to_string()),
            draft: Set(draft),
        };
        movie::Entity::insert(model).exec(catalog.db()).await.unwrap().last_insert_id
    }

    fn review(name: &str, parent_id: Option<i32>) -> NewReview {
        NewReview {
            name: name.to_string(),
            email: format!("{name}@example.com"),
            text: "text".to_string(),
            parent_id,
        }
    }

    #[tokio::test]
    async fn listing_excludes_drafts() {
        let catalog = test_catalog().await;
        let published = insert_movie(&catalog, "Heat", "heat", false).await;
        insert_movie(&catalog, "Unfinished", "unfinished", true).await;

        let movies = catalog.list_published().await.unwrap();
        assert_eq!(movies.iter().map(|m| m.id).collect::<Vec<_>>(), vec![published]);
    }

    #[tokio::test]
    async fn each_published_movie_listed_once() {
        let catalog = test_catalog().await;
        insert_movie(&catalog, "Heat", "heat", false).await;
        insert_movie(&catalog, "Ronin", "ronin", false).await;

        let movies = catalog.list_published().await.unwrap();
        assert_eq!(movies.len(), 2);
        let slugs: Vec<_> = movies.iter().map(|m| m.url.as_str()).collect();
        assert_eq!(slugs, vec!["heat", "ronin"]);
    }

    #[tokio::test]
    async fn slug_lookup() {
        let catalog = test_catalog().await;
        insert_movie(&catalog, "Heat", "heat", false).await;

        assert_eq!(catalog.find_by_slug("heat").await.unwrap().unwrap().title, "Heat");
        assert!(catalog.find_by_slug("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn add_review_binds_to_movie() {
        let catalog = test_catalog().await;
        let movie_id = insert_movie(&catalog, "Heat", "heat", false).await;

        assert!(catalog.add_review(movie_id, review("ann", None)).await.unwrap());

        let rows = review::Entity::find().all(catalog.db()).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].movie_id, movie_id);
    }

    #[tokio::test]
    async fn add_review_rejects_unknown_movie() {
        let catalog = test_catalog().await;

        assert!(!catalog.add_review(999, review("ann", None)).await.unwrap());
        assert_eq!(review::Entity::find().all(catalog.db()).await.unwrap().len(), 0);
    }

    #[tokio::test]
    async fn add_review_rejects_parent_from_other_movie() {
        let catalog = test_catalog().await;
        let first = insert_movie(&catalog, "Heat", "heat", false).await;
        let second = insert_movie(&catalog, "Ronin", "ronin", false).await;

        assert!(catalog.add_review(first, review("ann", None)).await.unwrap());
        let parent = review::Entity::find().one(catalog.db()).await.unwrap().unwrap();

        assert!(!catalog.add_review(second, review("bob", Some(parent.id))).await.unwrap());
        assert_eq!(review::Entity::find().all(catalog.db()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn threads_group_replies_under_parent() {
        let catalog = test_catalog().await;
        let movie_id = insert_movie(&catalog, "Heat", "heat", false).await;

        catalog.add_review(movie_id, review("ann", None)).await.unwrap();
        let parent = review::Entity::find().one(catalog.db()).await.unwrap().unwrap();
        catalog.add_review(movie_id, review("bob", Some(parent.id))).await.unwrap();
        catalog.add_review(movie_id, review("eve", None)).await.unwrap();

        let threads = catalog.review_threads(movie_id).await.unwrap();
        assert_eq!(threads.len(), 2);
        assert_eq!(threads[0].review.name, "ann");
        assert_eq!(threads[0].replies.len(), 1);
        assert_eq!(threads[0].replies[0].name, "bob");
        assert_eq!(threads[1].review.name, "eve");
        assert!(threads[1].replies.is_empty());
    }

    #[tokio::test]
    async fn rating_is_one_vote_per_ip() {
        let catalog = test_catalog().await;
        let movie_id = insert_movie(&catalog, "Heat", "heat", false).await;

        assert!(catalog.add_rating("10.0.0.1", NewRating { movie_id, star_value: 3 }).await.unwrap());
        assert!(catalog.add_rating("10.0.0.1", NewRating { movie_id, star_value: 5 }).await.unwrap());

        let rows = rating::Entity::find().all(catalog.db()).await.unwrap();
        assert_eq!(rows.len(), 1);

        let summary = catalog.rating_summary(movie_id).await.unwrap();
        assert_eq!(summary.votes, 1);
        assert_eq!(summary.average, Some(5.0));
    }

    #[tokio::test]
    async fn ratings_from_different_ips_both_count() {
        let catalog = test_catalog().await;
        let movie_id = insert_movie(&catalog, "Heat", "heat", false).await;

        catalog.add_rating("10.0.0.1", NewRating { movie_id, star_value: 2 }).await.unwrap();
        catalog.add_rating("10.0.0.2", NewRating { movie_id, star_value: 4 }).await.unwrap();

        let summary = catalog.rating_summary(movie_id).await.unwrap();
        assert_eq!(summary.votes, 2);
        assert_eq!(summary.average, Some(3.0));
    }

    #[tokio::test]
    async fn rating_rejects_unknown_star_value() {
        let catalog = test_catalog().await;
        let movie_id = insert_movie(&catalog, "Heat", "heat", false).await;

        assert!(!catalog.add_rating("10.0.0.1", NewRating { movie_id, star_value: 9 }).await.unwrap());
        assert_eq!(rating::Entity::find().all(catalog.db()).await.unwrap().len(), 0);
    }

    #[tokio::test]
    async fn contact_message_persists() {
        let catalog = test_catalog().await;

        catalog
            .add_contact(NewContact {
                name: "Ann".to_string(),
                email: "ann@example.com".to_string(),
                message: "hello".to_string(),
            })
            .await
            .unwrap();

        let rows = contact_message::Entity::find().all(catalog.db()).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].email, "ann@example.com");
    }

    #[tokio::test]
    async fn movie_page_assembles_relations() {
        let catalog = test_catalog().await;
        let movie_id = insert_movie(&catalog, "Heat", "heat", false).await;

        let genre_id = genre::Entity::insert(genre::ActiveModel {
            id: Default::default(),
            name: Set("Crime".to_string()),
            description: Set(String::new()),
            url: Set("crime".to_string()),
        })
        .exec(catalog.db())
        .await
        .unwrap()
        .last_insert_id;

        crate::entities::movie_genre::Entity::insert(crate::entities::movie_genre::ActiveModel {
            id: Default::default(),
            movie_id: Set(movie_id),
            genre_id: Set(genre_id),
        })
        .exec(catalog.db())
        .await
        .unwrap();

        let actor_id = actor::Entity::insert(actor::ActiveModel {
            id: Default::default(),
            name: Set("Al Pacino".to_string()),
            age: Set(84),
            description: Set(String::new()),
            image: Set("actors/pacino.jpg".to_string()),
            profession: Set(actor::Profession::Actor),
        })
        .exec(catalog.db())
        .await
        .unwrap()
        .last_insert_id;

        movie_credit::Entity::insert(movie_credit::ActiveModel {
            id: Default::default(),
            movie_id: Set(movie_id),
            actor_id: Set(actor_id),
            role: Set(CreditRole::Cast.as_code()),
        })
        .exec(catalog.db())
        .await
        .unwrap();

        let page = catalog.movie_page("heat").await.unwrap().unwrap();
        assert_eq!(page.movie.id, movie_id);
        assert_eq!(page.genres.len(), 1);
        assert_eq!(page.cast.len(), 1);
        assert!(page.crew.is_empty());
        assert!(catalog.movie_page("missing").await.unwrap().is_none());
    }
}
