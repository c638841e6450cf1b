use crate::{
    AppState,
    auth::RequireUser,
    errors::AppError,
    models::{Category, Collection, Favorite, Format, Gif, NewsletterSubscriber, Tone, User},
    query::{self, Condition, FilterSelection, ListQuery, Sort, SortKey},
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

// --- GIF discovery ---

/// Filter dimensions as query parameters. Multi-value dimensions are
/// comma-separated lists (`tone=funny,professional`).
#[derive(Debug, Default, Deserialize)]
pub struct GifListParams {
    pub q: Option<String>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub tone: Option<String>,
    pub format: Option<String>,
    pub use_case: Option<String>,
    pub trending: Option<bool>,
    pub featured: Option<bool>,
    pub sort: Option<String>,
}

impl GifListParams {
    pub fn into_filters(self) -> Result<FilterSelection, AppError> {
        let sort = self
            .sort
            .as_deref()
            .map(SortKey::from_str)
            .transpose()
            .map_err(AppError::InvalidInput)?;
        Ok(FilterSelection {
            category: self.category,
            subcategory: self.subcategory,
            tones: parse_list::<Tone>(self.tone.as_deref())?,
            formats: parse_list::<Format>(self.format.as_deref())?,
            use_cases: parse_list::<String>(self.use_case.as_deref())?,
            trending: self.trending.unwrap_or(false),
            featured: self.featured.unwrap_or(false),
            sort,
            query: self.q,
        })
    }
}

fn parse_list<T>(raw: Option<&str>) -> Result<Vec<T>, AppError>
where
    T: FromStr,
    T::Err: ToString,
{
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse().map_err(|e: T::Err| AppError::InvalidInput(e.to_string())))
        .collect()
}

pub async fn list_gifs(
    State(state): State<Arc<AppState>>,
    Query(params): Query<GifListParams>,
) -> Result<Json<Vec<Gif>>, AppError> {
    let filters = params.into_filters()?;
    let query = query::compose(&filters);
    tracing::debug!(conditions = query.conditions.len(), "Listing GIFs");
    let gifs = state.gifs().list(&query).await?;
    Ok(Json(gifs))
}

pub async fn get_gif(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Gif>, AppError> {
    let gif = state.gifs().get(&id).await?.ok_or_else(|| gif_not_found(&id))?;
    Ok(Json(gif))
}

/// Home page carousel: trending GIFs ranked by views.
pub async fn trending_gifs(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Gif>>, AppError> {
    let query = ListQuery::filtered(vec![Condition::eq("is_trending", true)])
        .sorted(Sort::desc("views"))
        .limit(8);
    Ok(Json(state.gifs().list(&query).await?))
}

/// Home page grid: featured GIFs, newest first.
pub async fn featured_gifs(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Gif>>, AppError> {
    let query = ListQuery::filtered(vec![Condition::eq("is_featured", true)]).limit(12);
    Ok(Json(state.gifs().list(&query).await?))
}

/// Metadata for a newly uploaded GIF. Asset transfer happens elsewhere;
/// the record only carries the resulting URLs.
#[derive(Debug, Deserialize)]
pub struct CreateGif {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub url: String,
    pub thumbnail_url: Option<String>,
    pub category: String,
    pub subcategory: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub tone: Tone,
    pub format: Format,
    #[serde(default)]
    pub use_cases: Vec<String>,
    #[serde(default)]
    pub file_size: u64,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub duration: f64,
}

pub async fn create_gif(
    State(state): State<Arc<AppState>>,
    RequireUser(user): RequireUser,
    Json(payload): Json<CreateGif>,
) -> Result<(StatusCode, Json<Gif>), AppError> {
    let title = payload.title.trim();
    if title.is_empty() {
        return Err(AppError::InvalidInput("title is required".to_string()));
    }
    if payload.url.trim().is_empty() {
        return Err(AppError::InvalidInput("url is required".to_string()));
    }
    if payload.category.trim().is_empty() {
        return Err(AppError::InvalidInput("category is required".to_string()));
    }

    let now = Utc::now();
    let gif = Gif {
        id: Uuid::new_v4().to_string(),
        title: title.to_string(),
        description: payload.description,
        url: payload.url,
        thumbnail_url: payload.thumbnail_url,
        category: payload.category,
        subcategory: payload.subcategory,
        tags: payload.tags,
        tone: payload.tone,
        format: payload.format,
        use_cases: payload.use_cases,
        file_size: payload.file_size,
        width: payload.width,
        height: payload.height,
        duration: payload.duration,
        views: 0,
        downloads: 0,
        likes: 0,
        is_trending: false,
        is_featured: false,
        uploaded_by: user.id,
        created_at: now,
        updated_at: now,
    };
    state.gifs().create(&gif).await?;

    tracing::info!(gif_id = %gif.id, "GIF created");
    Ok((StatusCode::CREATED, Json(gif)))
}

/// A GIF was opened; bumps the view counter.
pub async fn record_view(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let gif = state.gifs().get(&id).await?.ok_or_else(|| gif_not_found(&id))?;
    let views = gif.views + 1;
    state.gifs().update(&id, json!({ "views": views })).await?;
    Ok(Json(json!({ "views": views })))
}

/// A download started; bumps the download counter.
pub async fn record_download(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let gif = state.gifs().get(&id).await?.ok_or_else(|| gif_not_found(&id))?;
    let downloads = gif.downloads + 1;
    state.gifs().update(&id, json!({ "downloads": downloads })).await?;
    Ok(Json(json!({ "downloads": downloads })))
}

fn gif_not_found(id: &str) -> AppError {
    AppError::NotFound(format!("GIF not found with ID: {id}"))
}

// --- Favorites ---

/// Toggles the (user, gif) like link: removes it when present, creates it
/// otherwise. Keeps the pair unique without any store-side constraint.
pub async fn toggle_favorite(
    State(state): State<Arc<AppState>>,
    RequireUser(user): RequireUser,
    Path(gif_id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    if state.gifs().get(&gif_id).await?.is_none() {
        return Err(gif_not_found(&gif_id));
    }

    let existing = state
        .favorites()
        .list(&ListQuery::filtered(vec![
            Condition::eq("user_id", user.id.as_str()),
            Condition::eq("gif_id", gif_id.as_str()),
        ]))
        .await?;

    let favorited = match existing.first() {
        Some(favorite) => {
            state.favorites().delete(&favorite.id).await?;
            false
        }
        None => {
            state.favorites().create(&Favorite::new(&user.id, &gif_id)).await?;
            true
        }
    };

    tracing::debug!(user_id = %user.id, %gif_id, favorited, "Favorite toggled");
    Ok(Json(json!({ "favorited": favorited })))
}

// --- Categories ---

pub async fn list_categories(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Category>>, AppError> {
    let query = ListQuery::all().sorted(Sort::asc("name"));
    Ok(Json(state.categories().list(&query).await?))
}

pub async fn get_category(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Json<Category>, AppError> {
    let query =
        ListQuery::filtered(vec![Condition::eq("slug", slug.as_str())]).limit(1);
    let mut matches = state.categories().list(&query).await?;
    match matches.pop() {
        Some(category) => Ok(Json(category)),
        None => Err(AppError::NotFound(format!("Category not found with slug: {slug}"))),
    }
}

// --- Dashboard ---

pub async fn me(RequireUser(user): RequireUser) -> Json<User> {
    Json(user)
}

pub async fn my_favorites(
    State(state): State<Arc<AppState>>,
    RequireUser(user): RequireUser,
) -> Result<Json<Vec<Gif>>, AppError> {
    let gifs = favorite_gifs(&state, &user).await?;
    Ok(Json(gifs))
}

async fn favorite_gifs(state: &AppState, user: &User) -> Result<Vec<Gif>, AppError> {
    let links = state
        .favorites()
        .list(
            &ListQuery::filtered(vec![Condition::eq("user_id", user.id.as_str())]).limit(20),
        )
        .await?;
    if links.is_empty() {
        return Ok(Vec::new());
    }
    let ids = links.iter().map(|f| json!(f.gif_id)).collect();
    let gifs = state
        .gifs()
        .list(&ListQuery::filtered(vec![Condition::is_in("id", ids)]))
        .await?;
    Ok(gifs)
}

pub async fn my_uploads(
    State(state): State<Arc<AppState>>,
    RequireUser(user): RequireUser,
) -> Result<Json<Vec<Gif>>, AppError> {
    let gifs = uploaded_gifs(&state, &user).await?;
    Ok(Json(gifs))
}

async fn uploaded_gifs(state: &AppState, user: &User) -> Result<Vec<Gif>, AppError> {
    let query = ListQuery::filtered(vec![Condition::eq("uploaded_by", user.id.as_str())])
        .limit(20);
    Ok(state.gifs().list(&query).await?)
}

pub async fn my_collections(
    State(state): State<Arc<AppState>>,
    RequireUser(user): RequireUser,
) -> Result<Json<Vec<Collection>>, AppError> {
    let query = ListQuery::filtered(vec![Condition::eq("user_id", user.id.as_str())]);
    Ok(Json(state.collections().list(&query).await?))
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct DashboardStats {
    pub total_favorites: usize,
    pub total_collections: usize,
    pub total_uploads: usize,
    pub total_downloads: u64,
}

/// Counters for the dashboard header, derived from the same bounded lists
/// the dashboard panels show.
pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    RequireUser(user): RequireUser,
) -> Result<Json<DashboardStats>, AppError> {
    let favorites = favorite_gifs(&state, &user).await?;
    let uploads = uploaded_gifs(&state, &user).await?;
    let collections = state
        .collections()
        .list(&ListQuery::filtered(vec![Condition::eq("user_id", user.id.as_str())]))
        .await?;

    Ok(Json(DashboardStats {
        total_favorites: favorites.len(),
        total_collections: collections.len(),
        total_uploads: uploads.len(),
        total_downloads: uploads.iter().map(|g| g.downloads).sum(),
    }))
}

// --- Collections ---

#[derive(Debug, Deserialize)]
pub struct CreateCollection {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_public: bool,
}

pub async fn create_collection(
    State(state): State<Arc<AppState>>,
    RequireUser(user): RequireUser,
    Json(payload): Json<CreateCollection>,
) -> Result<(StatusCode, Json<Collection>), AppError> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(AppError::InvalidInput("collection name is required".to_string()));
    }

    let now = Utc::now();
    let collection = Collection {
        id: Uuid::new_v4().to_string(),
        user_id: user.id,
        name: name.to_string(),
        description: payload.description,
        gif_ids: Vec::new(),
        is_public: payload.is_public,
        created_at: now,
        updated_at: now,
    };
    state.collections().create(&collection).await?;

    tracing::info!(collection_id = %collection.id, "Collection created");
    Ok((StatusCode::CREATED, Json(collection)))
}

#[derive(Debug, Deserialize)]
pub struct AddCollectionGif {
    pub gif_id: String,
}

pub async fn add_collection_gif(
    State(state): State<Arc<AppState>>,
    RequireUser(user): RequireUser,
    Path(id): Path<String>,
    Json(payload): Json<AddCollectionGif>,
) -> Result<Json<Collection>, AppError> {
    let mut collection = owned_collection(&state, &user, &id).await?;
    if state.gifs().get(&payload.gif_id).await?.is_none() {
        return Err(gif_not_found(&payload.gif_id));
    }

    // Adding an already-present GIF is a no-op; membership stays unique.
    if !collection.gif_ids.contains(&payload.gif_id) {
        collection.gif_ids.push(payload.gif_id);
        collection.updated_at = Utc::now();
        state
            .collections()
            .update(
                &collection.id,
                json!({ "gif_ids": collection.gif_ids.clone(), "updated_at": collection.updated_at }),
            )
            .await?;
    }
    Ok(Json(collection))
}

pub async fn remove_collection_gif(
    State(state): State<Arc<AppState>>,
    RequireUser(user): RequireUser,
    Path((id, gif_id)): Path<(String, String)>,
) -> Result<Json<Collection>, AppError> {
    let mut collection = owned_collection(&state, &user, &id).await?;

    if collection.gif_ids.contains(&gif_id) {
        collection.gif_ids.retain(|g| g != &gif_id);
        collection.updated_at = Utc::now();
        state
            .collections()
            .update(
                &collection.id,
                json!({ "gif_ids": collection.gif_ids.clone(), "updated_at": collection.updated_at }),
            )
            .await?;
    }
    Ok(Json(collection))
}

async fn owned_collection(
    state: &AppState,
    user: &User,
    id: &str,
) -> Result<Collection, AppError> {
    let collection = state
        .collections()
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Collection not found with ID: {id}")))?;
    if collection.user_id != user.id {
        return Err(AppError::Forbidden);
    }
    Ok(collection)
}

// --- Newsletter ---

#[derive(Debug, Deserialize)]
pub struct SubscribeRequest {
    pub email: String,
    pub name: Option<String>,
    #[serde(default)]
    pub interests: Vec<String>,
}

/// Newsletter signup. The email is validated before any store call;
/// repeated signups with the same address are not deduplicated.
pub async fn subscribe_newsletter(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SubscribeRequest>,
) -> Result<(StatusCode, Json<NewsletterSubscriber>), AppError> {
    let email = payload.email.trim();
    if email.is_empty() {
        return Err(AppError::InvalidInput("email is required".to_string()));
    }

    let subscriber = NewsletterSubscriber {
        id: Uuid::new_v4().to_string(),
        email: email.to_string(),
        name: payload.name,
        interests: payload.interests,
        is_active: true,
        created_at: Utc::now(),
    };
    state.newsletter().create(&subscriber).await?;

    tracing::info!(subscriber_id = %subscriber.id, "Newsletter subscription created");
    Ok((StatusCode::CREATED, Json(subscriber)))
}
