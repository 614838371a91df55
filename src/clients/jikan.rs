//! Jikan v4 (MyAnimeList read API) adapter for [`super::CatalogSource`].

mod client;
mod models;

pub use client::{JikanClient, JikanConfig, MAX_PAGE_LIMIT, genre_id};
