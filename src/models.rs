use serde::Deserialize;

use crate::entities::{actor, category, genre, movie, movie_shot, review};

/// Role code stored on a movie credit row.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CreditRole {
    Cast,
    Crew,
}

impl CreditRole {
    pub fn as_code(self) -> i32 {
        match self {
            CreditRole::Cast => 1,
            CreditRole::Crew => 2,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(CreditRole::Cast),
            2 => Some(CreditRole::Crew),
            _ => None,
        }
    }
}

#[derive(Debug, Eq, PartialEq, thiserror::Error)]
pub enum FormError {
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("email address is not valid")]
    BadEmail,
    #[error("{0} must be a number")]
    BadNumber(&'static str),
    #[error("{0} is already in use")]
    Duplicate(&'static str),
}

fn clean(value: Option<String>, field: &'static str) -> Result<String, FormError> {
    let value = value.map(|s| s.trim().to_string()).unwrap_or_default();
    if value.is_empty() { Err(FormError::Missing(field)) } else { Ok(value) }
}

fn clean_email(value: Option<String>) -> Result<String, FormError> {
    let email = clean(value, "email")?;
    if email.contains('@') && !email.starts_with('@') && !email.ends_with('@') {
        Ok(email)
    } else {
        Err(FormError::BadEmail)
    }
}

fn parse_opt_id(value: Option<String>, field: &'static str) -> Result<Option<i32>, FormError> {
    match value.map(|s| s.trim().to_string()) {
        None => Ok(None),
        Some(s) if s.is_empty() => Ok(None),
        Some(s) => s.parse().map(Some).map_err(|_| FormError::BadNumber(field)),
    }
}

fn parse_id(value: Option<String>, field: &'static str) -> Result<i32, FormError> {
    parse_opt_id(value, field)?.ok_or(FormError::Missing(field))
}

/// Raw review submission. Fields stay optional so validation, not the
/// extractor, decides what happens to a malformed body.
#[derive(Debug, Deserialize)]
pub struct ReviewForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub text: Option<String>,
    pub parent: Option<String>,
}

#[derive(Clone, Debug)]
pub struct NewReview {
    pub name: String,
    pub email: String,
    pub text: String,
    pub parent_id: Option<i32>,
}

impl ReviewForm {
    pub fn validate(self) -> Result<NewReview, FormError> {
        Ok(NewReview {
            name: clean(self.name, "name")?,
            email: clean_email(self.email)?,
            text: clean(self.text, "text")?,
            parent_id: parse_opt_id(self.parent, "parent")?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct ContactForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub message: Option<String>,
}

#[derive(Clone, Debug)]
pub struct NewContact {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl ContactForm {
    pub fn validate(self) -> Result<NewContact, FormError> {
        Ok(NewContact {
            name: clean(self.name, "name")?,
            email: clean_email(self.email)?,
            message: clean(self.message, "message")?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct RatingForm {
    pub movie: Option<String>,
    pub star: Option<String>,
}

#[derive(Clone, Copy, Debug)]
pub struct NewRating {
    pub movie_id: i32,
    pub star_value: i32,
}

impl RatingForm {
    pub fn validate(self) -> Result<NewRating, FormError> {
        Ok(NewRating {
            movie_id: parse_id(self.movie, "movie")?,
            star_value: parse_id(self.star, "star")?,
        })
    }
}

/// A top-level review with its direct replies.
#[derive(Clone, Debug)]
pub struct ReviewThread {
    pub review: review::Model,
    pub replies: Vec<review::Model>,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct RatingSummary {
    pub votes: u64,
    pub average: Option<f64>,
}

/// Everything the detail page renders for one movie.
#[derive(Clone, Debug)]
pub struct MoviePage {
    pub movie: movie::Model,
    pub category: Option<category::Model>,
    pub genres: Vec<genre::Model>,
    pub cast: Vec<actor::Model>,
    pub crew: Vec<actor::Model>,
    pub shots: Vec<movie_shot::Model>,
    pub reviews: Vec<ReviewThread>,
    pub rating: RatingSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn review_form_rejects_missing_email() {
        let form = ReviewForm {
            name: Some("Ann".into()),
            email: None,
            text: Some("great".into()),
            parent: None,
        };
        assert_eq!(form.validate().unwrap_err(), FormError::Missing("email"));
    }

    #[test]
    fn review_form_rejects_malformed_email() {
        let form = ReviewForm {
            name: Some("Ann".into()),
            email: Some("not-an-email".into()),
            text: Some("great".into()),
            parent: None,
        };
        assert_eq!(form.validate().unwrap_err(), FormError::BadEmail);
    }

    #[test]
    fn review_form_treats_empty_parent_as_top_level() {
        let form = ReviewForm {
            name: Some("Ann".into()),
            email: Some("ann@example.com".into()),
            text: Some("great".into()),
            parent: Some("".into()),
        };
        assert_eq!(form.validate().unwrap().parent_id, None);
    }

    #[test]
    fn rating_form_parses_ids() {
        let form = RatingForm { movie: Some("7".into()), star: Some("4".into()) };
        let rating = form.validate().unwrap();
        assert_eq!(rating.movie_id, 7);
        assert_eq!(rating.star_value, 4);
    }

    #[test]
    fn credit_role_codes_round_trip() {
        assert_eq!(CreditRole::from_code(CreditRole::Cast.as_code()), Some(CreditRole::Cast));
        assert_eq!(CreditRole::from_code(CreditRole::Crew.as_code()), Some(CreditRole::Crew));
        assert_eq!(CreditRole::from_code(0), None);
    }
}
