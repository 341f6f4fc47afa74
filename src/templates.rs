use maud::{DOCTYPE, Markup, html};

use crate::{
    entities::movie,
    models::{MoviePage, RatingSummary, ReviewThread},
};

const TAILWIND_CDN: &str = "https://cdn.tailwindcss.com";

/// Resolves a stored media reference against the configured media store.
pub fn media_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

pub fn index_page(movies: &[movie::Model], media_base: &str) -> String {
    page(
        "Movies",
        html! {
            div class="min-h-screen bg-gray-50" {
                div class="max-w-5xl mx-auto px-6 py-12" {
                    div class="flex items-baseline justify-between" {
                        h1 class="text-3xl font-bold text-gray-900" { "Movies" }
                        a class="text-sm text-blue-600 hover:text-blue-800" href="/contact" { "Contact us" }
                    }

                    @if movies.is_empty() {
                        div class="mt-10 bg-white shadow rounded-lg p-8" {
                            p class="text-gray-600" { "Nothing is published yet." }
                        }
                    } @else {
                        div class="mt-10 grid gap-6 sm:grid-cols-2 lg:grid-cols-3" {
                            @for movie in movies {
                                (movie_card(movie, media_base))
                            }
                        }
                    }
                }
            }
        },
    )
}

pub fn movie_detail_page(page_data: &MoviePage, media_base: &str) -> String {
    let movie = &page_data.movie;

    page(
        &movie.title,
        html! {
            div class="min-h-screen bg-gray-50" {
                div class="max-w-4xl mx-auto px-6 py-12" {
                    a class="text-sm text-blue-600 hover:text-blue-800" href="/" { "← All movies" }

                    div class="mt-6 bg-white shadow rounded-lg p-8" {
                        div class="flex gap-8" {
                            img class="w-48 rounded-md shadow" src=(media_url(media_base, &movie.poster)) alt=(movie.title);
                            div {
                                h1 class="text-3xl font-bold text-gray-900" { (movie.title) }
                                @if !movie.tagline.is_empty() {
                                    p class="mt-1 italic text-gray-500" { (movie.tagline) }
                                }
                                @if let Some(category) = &page_data.category {
                                    p class="mt-3 text-sm text-gray-600" { "Category: " (category.name) }
                                }
                                @if !page_data.genres.is_empty() {
                                    p class="mt-1 text-sm text-gray-600" {
                                        "Genres: "
                                        (page_data.genres.iter().map(|g| g.name.as_str()).collect::<Vec<_>>().join(", "))
                                    }
                                }
                                p class="mt-1 text-sm text-gray-600" { "Year: " (movie.year) " · Premiere: " (movie.world_premiere) " · " (movie.country) }
                                p class="mt-1 text-sm text-gray-600" { "Budget: $" (movie.budget) " · Fees (USA): $" (movie.fees_usa) " · Fees (world): $" (movie.fees_world) }
                                (rating_block(movie.id, &page_data.rating))
                            }
                        }

                        p class="mt-6 text-gray-700" { (movie.description) }
                    }

                    @if !page_data.cast.is_empty() || !page_data.crew.is_empty() {
                        div class="mt-6 bg-white shadow rounded-lg p-8" {
                            @if !page_data.crew.is_empty() {
                                h2 class="text-lg font-semibold text-gray-900" { "Directors" }
                                p class="mt-1 text-gray-600" {
                                    (page_data.crew.iter().map(|a| a.name.as_str()).collect::<Vec<_>>().join(", "))
                                }
                            }
                            @if !page_data.cast.is_empty() {
                                h2 class="mt-4 text-lg font-semibold text-gray-900" { "Cast" }
                                p class="mt-1 text-gray-600" {
                                    (page_data.cast.iter().map(|a| a.name.as_str()).collect::<Vec<_>>().join(", "))
                                }
                            }
                        }
                    }

                    @if !page_data.shots.is_empty() {
                        div class="mt-6 bg-white shadow rounded-lg p-8" {
                            h2 class="text-lg font-semibold text-gray-900" { "Shots" }
                            div class="mt-4 grid gap-4 sm:grid-cols-3" {
                                @for shot in &page_data.shots {
                                    figure {
                                        img class="rounded-md shadow" src=(media_url(media_base, &shot.image)) alt=(shot.title);
                                        figcaption class="mt-1 text-xs text-gray-500" { (shot.title) }
                                    }
                                }
                            }
                        }
                    }

                    div class="mt-6 bg-white shadow rounded-lg p-8" {
                        h2 class="text-lg font-semibold text-gray-900" { "Reviews" }

                        @if page_data.reviews.is_empty() {
                            p class="mt-2 text-gray-500" { "No reviews yet." }
                        } @else {
                            div class="mt-4 space-y-4" {
                                @for thread in &page_data.reviews {
                                    (review_block(thread))
                                }
                            }
                        }

                        (review_form(movie.id))
                    }
                }
            }
        },
    )
}

pub fn contact_page() -> String {
    page(
        "Contact",
        html! {
            div class="min-h-screen bg-gray-50" {
                div class="max-w-2xl mx-auto px-6 py-12" {
                    div class="bg-white shadow rounded-lg p-8" {
                        h1 class="text-3xl font-bold text-gray-900" { "Contact" }

                        form class="mt-8 space-y-6" method="post" action="/contact" {
                            div {
                                label class="block text-sm font-medium text-gray-700" for="name" { "Name" }
                                input class=(INPUT_CLASS) name="name" id="name" required;
                            }
                            div {
                                label class="block text-sm font-medium text-gray-700" for="email" { "Email" }
                                input class=(INPUT_CLASS) type="email" name="email" id="email" required;
                            }
                            div {
                                label class="block text-sm font-medium text-gray-700" for="message" { "Message" }
                                textarea class=(INPUT_CLASS) name="message" id="message" rows="5" required {}
                            }
                            button class="w-full rounded-md bg-blue-600 px-4 py-2 font-semibold text-white hover:bg-blue-700" type="submit" { "Send" }
                        }
                    }
                }
            }
        },
    )
}

pub fn not_found_page() -> String {
    page(
        "Not found",
        html! {
            div class="min-h-screen bg-gray-50 flex items-center justify-center" {
                div class="max-w-xl w-full px-6" {
                    div class="bg-white shadow rounded-lg p-8" {
                        h1 class="text-2xl font-bold text-gray-900" { "Page not found" }
                        p class="mt-4 text-gray-700" { "The movie you are looking for does not exist." }
                        a class="mt-6 inline-block text-blue-600 hover:text-blue-800" href="/" { "Back" }
                    }
                }
            }
        },
    )
}

pub fn error_page(message: String) -> String {
    page(
        "Error",
        html! {
            div class="min-h-screen bg-gray-50 flex items-center justify-center" {
                div class="max-w-xl w-full px-6" {
                    div class="bg-white shadow rounded-lg p-8" {
                        h1 class="text-2xl font-bold text-gray-900" { "Error" }
                        p class="mt-4 text-gray-700" { (message) }
                        a class="mt-6 inline-block text-blue-600 hover:text-blue-800" href="/" { "Back" }
                    }
                }
            }
        },
    )
}

const INPUT_CLASS: &str = "mt-2 w-full rounded-md border border-gray-300 px-3 py-2 focus:border-blue-500 focus:outline-none focus:ring-1 focus:ring-blue-500";

fn page(title: &str, body: Markup) -> String {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) }
                script src=(TAILWIND_CDN) {}
            }
            body { (body) }
        }
    }
    .into_string()
}

fn movie_card(movie: &movie::Model, media_base: &str) -> Markup {
    html! {
        a class="block bg-white shadow rounded-lg overflow-hidden hover:shadow-md" href=(format!("/movie/{}", movie.url)) {
            img class="w-full aspect-[2/3] object-cover" src=(media_url(media_base, &movie.poster)) alt=(movie.title);
            div class="p-4" {
                h2 class="font-semibold text-gray-900" { (movie.title) " (" (movie.year) ")" }
                @if !movie.tagline.is_empty() {
                    p class="mt-1 text-sm text-gray-500" { (movie.tagline) }
                }
            }
        }
    }
}

fn rating_block(movie_id: i32, summary: &RatingSummary) -> Markup {
    html! {
        div class="mt-4" {
            @if let Some(average) = summary.average {
                p class="text-sm text-gray-600" {
                    "Rating: " (format!("{average:.1}")) " / 5 (" (summary.votes) " votes)"
                }
            } @else {
                p class="text-sm text-gray-500" { "Not rated yet." }
            }

            form class="mt-2 flex items-center gap-2" method="post" action="/rating" {
                input type="hidden" name="movie" value=(movie_id);
                span class="text-sm text-gray-600" { "Your vote:" }
                @for value in 1..=5 {
                    label class="text-sm text-gray-700" {
                        input type="radio" name="star" value=(value) required;
                        " " (value)
                    }
                }
                button class="rounded-md bg-blue-600 px-3 py-1 text-sm font-semibold text-white hover:bg-blue-700" type="submit" { "Rate" }
            }
        }
    }
}

fn review_block(thread: &ReviewThread) -> Markup {
    html! {
        div class="border-l-4 border-blue-500 pl-4" {
            p class="text-sm font-semibold text-gray-900" { (thread.review.name) " · #" (thread.review.id) }
            p class="mt-1 text-sm text-gray-700" { (thread.review.text) }

            @for reply in &thread.replies {
                div class="mt-3 ml-6 border-l-4 border-gray-300 pl-4" {
                    p class="text-sm font-semibold text-gray-900" { (reply.name) }
                    p class="mt-1 text-sm text-gray-700" { (reply.text) }
                }
            }
        }
    }
}

fn review_form(movie_id: i32) -> Markup {
    html! {
        form class="mt-8 space-y-4" method="post" action=(format!("/review/{movie_id}")) {
            h3 class="text-sm font-semibold text-gray-700" { "Leave a review" }
            div class="grid gap-4 sm:grid-cols-2" {
                input class=(INPUT_CLASS) name="name" placeholder="Name" required;
                input class=(INPUT_CLASS) type="email" name="email" placeholder="Email" required;
            }
            textarea class=(INPUT_CLASS) name="text" rows="4" placeholder="Your review" required {}
            div {
                label class="block text-sm font-medium text-gray-700" for="parent" { "In reply to review # (optional)" }
                input class=(INPUT_CLASS) name="parent" id="parent";
            }
            button class="rounded-md bg-blue-600 px-4 py-2 font-semibold text-white hover:bg-blue-700" type="submit" { "Submit" }
        }
    }
}
