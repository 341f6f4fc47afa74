use std::collections::HashMap;

use maud::{DOCTYPE, Markup, html};

use crate::{
    admin::{AdminRow, Cell, FieldKind, MovieInlines, SCREENS, Screen, SelectSource},
    templates::media_url,
};

/// A filter dropdown ready for rendering: label, query param, options and
/// the currently selected value.
pub struct FilterControl {
    pub label: &'static str,
    pub param: &'static str,
    pub options: Vec<(String, String)>,
    pub selected: Option<String>,
}

pub fn dashboard_page() -> String {
    admin_page(
        "Admin",
        html! {
            h1 class="text-2xl font-bold text-gray-900" { "Administration" }
            ul class="mt-6 grid gap-3 sm:grid-cols-2" {
                @for screen in SCREENS {
                    li {
                        a class="block bg-white shadow rounded-lg px-4 py-3 text-blue-700 hover:bg-blue-50" href=(format!("/admin/{}", screen.slug)) {
                            (screen.title)
                        }
                    }
                }
            }
        },
    )
}

pub fn list_page(
    screen: &Screen,
    rows: &[AdminRow],
    q: Option<&str>,
    filters: &[FilterControl],
    message: Option<&str>,
    media_base: &str,
) -> String {
    admin_page(
        screen.title,
        html! {
            div class="flex items-center justify-between" {
                h1 class="text-2xl font-bold text-gray-900" { (screen.title) }
                a class="rounded-md bg-blue-600 px-3 py-1.5 text-sm font-semibold text-white hover:bg-blue-700" href=(format!("/admin/{}/new", screen.slug)) { "Add" }
            }

            @if let Some(message) = message {
                div class="mt-4 rounded-md bg-green-50 border border-green-200 px-4 py-2 text-sm text-green-800" { (message) }
            }

            @if screen.searchable || !filters.is_empty() {
                form class="mt-4 flex flex-wrap items-end gap-3" method="get" action=(format!("/admin/{}", screen.slug)) {
                    @if screen.searchable {
                        div {
                            label class="block text-xs font-medium text-gray-500" for="q" { "Search" }
                            input class="mt-1 rounded-md border border-gray-300 px-2 py-1 text-sm" name="q" id="q" value=(q.unwrap_or(""));
                        }
                    }
                    @for filter in filters {
                        div {
                            label class="block text-xs font-medium text-gray-500" for=(filter.param) { (filter.label) }
                            select class="mt-1 rounded-md border border-gray-300 px-2 py-1 text-sm" name=(filter.param) id=(filter.param) {
                                option value="" { "All" }
                                @for (value, label) in &filter.options {
                                    option value=(value) selected[filter.selected.as_deref() == Some(value.as_str())] { (label) }
                                }
                            }
                        }
                    }
                    button class="rounded-md bg-gray-200 px-3 py-1 text-sm text-gray-700 hover:bg-gray-300" type="submit" { "Apply" }
                }
            }

            @if screen.has_bulk_actions {
                form method="post" action=(format!("/admin/{}/bulk", screen.slug)) {
                    (rows_table(screen, rows, media_base, true))
                    div class="mt-4 flex gap-2" {
                        button class="rounded-md bg-green-600 px-3 py-1.5 text-sm font-semibold text-white hover:bg-green-700" type="submit" name="action" value="publish" { "Publish selected" }
                        button class="rounded-md bg-yellow-600 px-3 py-1.5 text-sm font-semibold text-white hover:bg-yellow-700" type="submit" name="action" value="unpublish" { "Unpublish selected" }
                    }
                }
            } @else {
                (rows_table(screen, rows, media_base, false))
            }
        },
    )
}

pub fn form_page(
    screen: &Screen,
    id: Option<i32>,
    values: &HashMap<&'static str, String>,
    options: &HashMap<SelectSource, Vec<(String, String)>>,
    error: Option<&str>,
    inlines: Option<&MovieInlines>,
    media_base: &str,
) -> String {
    let action = match id {
        Some(id) => format!("/admin/{}/{id}", screen.slug),
        None => format!("/admin/{}/new", screen.slug),
    };
    let heading = match id {
        Some(id) => format!("{} · #{id}", screen.title),
        None => format!("{} · new", screen.title),
    };

    admin_page(
        screen.title,
        html! {
            a class="text-sm text-blue-600 hover:text-blue-800" href=(format!("/admin/{}", screen.slug)) { "← Back to list" }
            h1 class="mt-2 text-2xl font-bold text-gray-900" { (heading) }

            @if let Some(error) = error {
                div class="mt-4 rounded-md bg-red-50 border border-red-200 px-4 py-2 text-sm text-red-800" { (error) }
            }

            form class="mt-6 space-y-4 bg-white shadow rounded-lg p-6" method="post" action=(action) {
                @for field in screen.fields {
                    (form_field(field, values.get(field.name).map(String::as_str).unwrap_or(""), options, media_base))
                }
                button class="rounded-md bg-blue-600 px-4 py-2 font-semibold text-white hover:bg-blue-700" type="submit" { "Save" }
            }

            @if let Some(id) = id {
                form class="mt-3" method="post" action=(format!("/admin/{}/{id}/delete", screen.slug)) {
                    button class="text-sm text-red-600 hover:text-red-800" type="submit" { "Delete" }
                }
            }

            @if let Some(inlines) = inlines {
                (movie_inline_sections(inlines, id, media_base))
            }
        },
    )
}

/// Thumbnail for a stored media reference, the same widget everywhere an
/// admin list or form shows an image column.
pub fn image_preview(media_base: &str, path: &str) -> Markup {
    html! {
        @if path.is_empty() {
            span class="text-xs text-gray-400" { "—" }
        } @else {
            img src=(media_url(media_base, path)) height="100" class="h-[100px] rounded";
        }
    }
}

fn rows_table(screen: &Screen, rows: &[AdminRow], media_base: &str, selectable: bool) -> Markup {
    html! {
        div class="mt-4 overflow-x-auto bg-white shadow rounded-lg" {
            table class="min-w-full text-sm" {
                thead class="bg-gray-100 text-left text-xs uppercase text-gray-500" {
                    tr {
                        @if selectable {
                            th class="px-3 py-2" { "" }
                        }
                        @for column in screen.columns {
                            th class="px-3 py-2" { (column) }
                        }
                        th class="px-3 py-2" { "" }
                    }
                }
                tbody class="divide-y divide-gray-100" {
                    @for row in rows {
                        tr {
                            @if selectable {
                                td class="px-3 py-2" {
                                    input type="checkbox" name="id" value=(row.id);
                                }
                            }
                            @for cell in &row.cells {
                                td class="px-3 py-2" { (cell_markup(cell, media_base)) }
                            }
                            td class="px-3 py-2" {
                                a class="text-blue-600 hover:text-blue-800" href=(format!("/admin/{}/{}", screen.slug, row.id)) { "Edit" }
                            }
                        }
                    }
                    @if rows.is_empty() {
                        tr {
                            td class="px-3 py-6 text-center text-gray-500" colspan=(screen.columns.len() + if selectable { 2 } else { 1 }) { "No records." }
                        }
                    }
                }
            }
        }
    }
}

fn cell_markup(cell: &Cell, media_base: &str) -> Markup {
    match cell {
        Cell::Text(value) => html! { (value) },
        Cell::Bool(value) => html! {
            @if *value {
                span class="rounded bg-yellow-100 px-2 py-0.5 text-xs text-yellow-800" { "draft" }
            } @else {
                span class="rounded bg-green-100 px-2 py-0.5 text-xs text-green-800" { "published" }
            }
        },
        Cell::Image(path) => image_preview(media_base, path),
    }
}

fn form_field(
    field: &crate::admin::FieldDef,
    value: &str,
    options: &HashMap<SelectSource, Vec<(String, String)>>,
    media_base: &str,
) -> Markup {
    const INPUT: &str = "mt-1 w-full rounded-md border border-gray-300 px-3 py-2 text-sm focus:border-blue-500 focus:outline-none";

    html! {
        div {
            label class="block text-sm font-medium text-gray-700" for=(field.name) { (field.label) }
            @match field.kind {
                FieldKind::TextArea => {
                    textarea class=(INPUT) name=(field.name) id=(field.name) rows="5" required[field.required] disabled[field.readonly] { (value) }
                },
                FieldKind::Number => {
                    input class=(INPUT) type="number" name=(field.name) id=(field.name) value=(value) required[field.required] disabled[field.readonly];
                },
                FieldKind::Checkbox => {
                    input type="checkbox" class="mt-1" name=(field.name) id=(field.name) checked[value == "on"] disabled[field.readonly];
                },
                FieldKind::Image => {
                    input class=(INPUT) name=(field.name) id=(field.name) value=(value) required[field.required] disabled[field.readonly];
                    div class="mt-2" { (image_preview(media_base, value)) }
                },
                FieldKind::Select(source) => {
                    select class=(INPUT) name=(field.name) id=(field.name) required[field.required] disabled[field.readonly] {
                        @if !field.required {
                            option value="" { "—" }
                        }
                        @if let Some(options) = options.get(&source) {
                            @for (option_value, label) in options {
                                option value=(option_value) selected[value == option_value.as_str()] { (label) }
                            }
                        }
                    }
                },
                FieldKind::Text => {
                    input class=(INPUT) name=(field.name) id=(field.name) value=(value) required[field.required] disabled[field.readonly];
                },
            }
        }
    }
}

fn movie_inline_sections(inlines: &MovieInlines, movie_id: Option<i32>, media_base: &str) -> Markup {
    html! {
        div class="mt-8 bg-white shadow rounded-lg p-6" {
            h2 class="text-lg font-semibold text-gray-900" { "Shots" }
            @if inlines.shots.is_empty() {
                p class="mt-2 text-sm text-gray-500" { "No shots." }
            } @else {
                table class="mt-3 min-w-full text-sm" {
                    tbody class="divide-y divide-gray-100" {
                        @for shot in &inlines.shots {
                            tr {
                                td class="px-3 py-2" { (image_preview(media_base, &shot.image)) }
                                td class="px-3 py-2" { (shot.title) }
                                td class="px-3 py-2" {
                                    a class="text-blue-600 hover:text-blue-800" href=(format!("/admin/movie-shots/{}", shot.id)) { "Edit" }
                                }
                            }
                        }
                    }
                }
            }

            @if let Some(movie_id) = movie_id {
                form class="mt-4 flex flex-wrap items-end gap-3" method="post" action="/admin/movie-shots/new" {
                    input type="hidden" name="movie_id" value=(movie_id);
                    div {
                        label class="block text-xs font-medium text-gray-500" for="inline-shot-title" { "Title" }
                        input class="mt-1 rounded-md border border-gray-300 px-2 py-1 text-sm" name="title" id="inline-shot-title";
                    }
                    div {
                        label class="block text-xs font-medium text-gray-500" for="inline-shot-image" { "Image" }
                        input class="mt-1 rounded-md border border-gray-300 px-2 py-1 text-sm" name="image" id="inline-shot-image";
                    }
                    button class="rounded-md bg-blue-600 px-3 py-1 text-sm font-semibold text-white hover:bg-blue-700" type="submit" { "Add shot" }
                }
            }
        }

        div class="mt-6 bg-white shadow rounded-lg p-6" {
            h2 class="text-lg font-semibold text-gray-900" { "Reviews" }
            @if inlines.reviews.is_empty() {
                p class="mt-2 text-sm text-gray-500" { "No reviews." }
            } @else {
                table class="mt-3 min-w-full text-sm" {
                    tbody class="divide-y divide-gray-100" {
                        @for review in &inlines.reviews {
                            tr {
                                td class="px-3 py-2 text-gray-500" { (review.email) }
                                td class="px-3 py-2" { (review.text) }
                                td class="px-3 py-2" {
                                    a class="text-blue-600 hover:text-blue-800" href=(format!("/admin/reviews/{}", review.id)) { "Edit" }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn admin_page(title: &str, body: Markup) -> String {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) " · Admin" }
                script src="https://cdn.tailwindcss.com" {}
            }
            body class="bg-gray-50" {
                nav class="bg-gray-900 text-white" {
                    div class="max-w-5xl mx-auto px-6 py-3 flex items-center justify-between" {
                        a class="font-semibold" href="/admin" { "Movie catalog admin" }
                        a class="text-sm text-gray-300 hover:text-white" href="/" { "View site" }
                    }
                }
                div class="max-w-5xl mx-auto px-6 py-8" { (body) }
            }
        }
    }
    .into_string()
}
