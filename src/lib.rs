//! GIF discovery and curation service.
//!
//! The core is a pure filter-to-query translation ([`query`]) and an
//! incremental result paginator ([`page`]); everything else delegates to an
//! opaque data store ([`domain::DataStore`]) and an authentication
//! collaborator ([`auth::AuthClient`]).

pub mod auth;
pub mod config;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod page;
pub mod query;
pub mod routes;
pub mod startup;
pub mod store;

use crate::auth::AuthClient;
use crate::domain::{DataStore, Records};
use crate::models::{Category, Collection, Favorite, Gif, NewsletterSubscriber};
use std::sync::Arc;

/// Shared resources for the web server: the data store and the
/// authentication collaborator, both behind their trait seams.
pub struct AppState {
    pub store: Arc<dyn DataStore>,
    pub auth: Arc<dyn AuthClient>,
}

impl AppState {
    pub fn new(store: Arc<dyn DataStore>, auth: Arc<dyn AuthClient>) -> Self {
        AppState { store, auth }
    }

    pub fn gifs(&self) -> Records<Gif> {
        Records::new(self.store.clone())
    }

    pub fn categories(&self) -> Records<Category> {
        Records::new(self.store.clone())
    }

    pub fn favorites(&self) -> Records<Favorite> {
        Records::new(self.store.clone())
    }

    pub fn collections(&self) -> Records<Collection> {
        Records::new(self.store.clone())
    }

    pub fn newsletter(&self) -> Records<NewsletterSubscriber> {
        Records::new(self.store.clone())
    }
}
