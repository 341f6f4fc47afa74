pub mod actor;
pub mod category;
pub mod contact_message;
pub mod genre;
pub mod movie;
pub mod movie_credit;
pub mod movie_genre;
pub mod movie_shot;
pub mod rating;
pub mod rating_star;
pub mod review;
