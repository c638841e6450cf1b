use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{Duration, Utc};
use gifverse::auth::{MemoryAuth, RequireUser};
use gifverse::errors::AppError;
use gifverse::handlers::{self, AddCollectionGif, CreateCollection, GifListParams, SubscribeRequest};
use gifverse::models::{Category, Format, Gif, Tone, User};
use gifverse::AppState;
use gifverse::store::MemoryStore;
use std::sync::Arc;

fn test_user() -> User {
    User {
        id: "u1".to_string(),
        email: "tester@example.com".to_string(),
        display_name: "Tester".to_string(),
        avatar: None,
    }
}

fn test_state() -> Arc<AppState> {
    let auth = MemoryAuth::new();
    auth.register("tok", test_user());
    Arc::new(AppState::new(Arc::new(MemoryStore::new()), Arc::new(auth)))
}

struct GifSpec {
    id: &'static str,
    title: &'static str,
    category: &'static str,
    tone: Tone,
    trending: bool,
    downloads: u64,
    age_days: i64,
    uploader: &'static str,
}

impl Default for GifSpec {
    fn default() -> Self {
        GifSpec {
            id: "g0",
            title: "Untitled",
            category: "developers",
            tone: Tone::Funny,
            trending: false,
            downloads: 0,
            age_days: 0,
            uploader: "uploader",
        }
    }
}

async fn seed_gif(state: &AppState, spec: GifSpec) -> Gif {
    let created = Utc::now() - Duration::days(spec.age_days);
    let gif = Gif {
        id: spec.id.to_string(),
        title: spec.title.to_string(),
        description: String::new(),
        url: format!("https://cdn.example.com/{}.gif", spec.id),
        thumbnail_url: None,
        category: spec.category.to_string(),
        subcategory: None,
        tags: vec!["work".to_string()],
        tone: spec.tone,
        format: Format::Loop,
        use_cases: vec!["slack".to_string()],
        file_size: 1024,
        width: 480,
        height: 270,
        duration: 2.0,
        views: 0,
        downloads: spec.downloads,
        likes: 0,
        is_trending: spec.trending,
        is_featured: false,
        uploaded_by: spec.uploader.to_string(),
        created_at: created,
        updated_at: created,
    };
    state.gifs().create(&gif).await.unwrap();
    gif
}

async fn seed_catalog(state: &AppState) {
    seed_gif(state, GifSpec {
        id: "g1",
        title: "Deploy on Friday",
        category: "developers",
        tone: Tone::Funny,
        trending: true,
        downloads: 900,
        age_days: 3,
        ..Default::default()
    })
    .await;
    seed_gif(state, GifSpec {
        id: "g2",
        title: "Quarterly numbers",
        category: "marketing",
        tone: Tone::Professional,
        downloads: 40,
        age_days: 1,
        ..Default::default()
    })
    .await;
    seed_gif(state, GifSpec {
        id: "g3",
        title: "Merge conflict face",
        category: "developers",
        tone: Tone::Sarcastic,
        trending: true,
        downloads: 300,
        age_days: 0,
        ..Default::default()
    })
    .await;
}

#[tokio::test]
async fn list_gifs_filters_by_category_and_trending() {
    let state = test_state();
    seed_catalog(&state).await;

    let params = GifListParams {
        category: Some("developers".to_string()),
        trending: Some(true),
        ..Default::default()
    };
    let Json(gifs) = handlers::list_gifs(State(state), Query(params)).await.unwrap();

    let ids: Vec<&str> = gifs.iter().map(|g| g.id.as_str()).collect();
    // Default sort is newest first.
    assert_eq!(ids, vec!["g3", "g1"]);
}

#[tokio::test]
async fn list_gifs_search_is_case_insensitive_and_title_only() {
    let state = test_state();
    seed_catalog(&state).await;

    let params = GifListParams { q: Some("  FRIDAY ".to_string()), ..Default::default() };
    let Json(gifs) = handlers::list_gifs(State(state), Query(params)).await.unwrap();
    assert_eq!(gifs.len(), 1);
    assert_eq!(gifs[0].id, "g1");
}

#[tokio::test]
async fn list_gifs_honors_only_first_tone() {
    let state = test_state();
    seed_catalog(&state).await;

    let params = GifListParams {
        tone: Some("sarcastic,funny".to_string()),
        ..Default::default()
    };
    let Json(gifs) = handlers::list_gifs(State(state), Query(params)).await.unwrap();
    assert_eq!(gifs.len(), 1);
    assert_eq!(gifs[0].id, "g3");
}

#[tokio::test]
async fn list_gifs_rejects_unknown_tone() {
    let state = test_state();
    let params = GifListParams { tone: Some("grumpy".to_string()), ..Default::default() };
    let err = handlers::list_gifs(State(state), Query(params)).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));
}

#[tokio::test]
async fn list_gifs_sorts_by_downloads_for_trending_key() {
    let state = test_state();
    seed_catalog(&state).await;

    let params = GifListParams { sort: Some("trending".to_string()), ..Default::default() };
    let Json(gifs) = handlers::list_gifs(State(state), Query(params)).await.unwrap();
    let ids: Vec<&str> = gifs.iter().map(|g| g.id.as_str()).collect();
    assert_eq!(ids, vec!["g1", "g3", "g2"]);
}

#[tokio::test]
async fn counters_increment_per_event() {
    let state = test_state();
    seed_catalog(&state).await;

    handlers::record_view(State(state.clone()), Path("g2".to_string())).await.unwrap();
    let Json(body) =
        handlers::record_view(State(state.clone()), Path("g2".to_string())).await.unwrap();
    assert_eq!(body["views"], serde_json::json!(2));

    let Json(body) =
        handlers::record_download(State(state.clone()), Path("g2".to_string())).await.unwrap();
    assert_eq!(body["downloads"], serde_json::json!(41));

    let err = handlers::record_view(State(state), Path("missing".to_string()))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn favorite_toggle_round_trip() {
    let state = test_state();
    seed_catalog(&state).await;

    let Json(body) = handlers::toggle_favorite(
        State(state.clone()),
        RequireUser(test_user()),
        Path("g1".to_string()),
    )
    .await
    .unwrap();
    assert_eq!(body["favorited"], serde_json::json!(true));

    let Json(favorites) =
        handlers::my_favorites(State(state.clone()), RequireUser(test_user())).await.unwrap();
    assert_eq!(favorites.len(), 1);
    assert_eq!(favorites[0].id, "g1");

    let Json(body) = handlers::toggle_favorite(
        State(state.clone()),
        RequireUser(test_user()),
        Path("g1".to_string()),
    )
    .await
    .unwrap();
    assert_eq!(body["favorited"], serde_json::json!(false));

    let Json(favorites) =
        handlers::my_favorites(State(state), RequireUser(test_user())).await.unwrap();
    assert!(favorites.is_empty());
}

#[tokio::test]
async fn collection_membership_is_owner_only_and_unique() {
    let state = test_state();
    seed_catalog(&state).await;

    let (status, Json(collection)) = handlers::create_collection(
        State(state.clone()),
        RequireUser(test_user()),
        Json(CreateCollection {
            name: "Standup reactions".to_string(),
            description: String::new(),
            is_public: false,
        }),
    )
    .await
    .unwrap();
    assert_eq!(status, StatusCode::CREATED);

    for _ in 0..2 {
        handlers::add_collection_gif(
            State(state.clone()),
            RequireUser(test_user()),
            Path(collection.id.clone()),
            Json(AddCollectionGif { gif_id: "g1".to_string() }),
        )
        .await
        .unwrap();
    }

    let Json(mine) =
        handlers::my_collections(State(state.clone()), RequireUser(test_user())).await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].gif_ids, vec!["g1".to_string()]);

    let stranger = User { id: "u2".to_string(), ..test_user() };
    let err = handlers::add_collection_gif(
        State(state.clone()),
        RequireUser(stranger),
        Path(collection.id.clone()),
        Json(AddCollectionGif { gif_id: "g2".to_string() }),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    let Json(updated) = handlers::remove_collection_gif(
        State(state),
        RequireUser(test_user()),
        Path((collection.id, "g1".to_string())),
    )
    .await
    .unwrap();
    assert!(updated.gif_ids.is_empty());
}

#[tokio::test]
async fn uploaded_metadata_starts_with_zeroed_counters() {
    let state = test_state();
    let (status, Json(gif)) = handlers::create_gif(
        State(state.clone()),
        RequireUser(test_user()),
        Json(serde_json::from_value(serde_json::json!({
            "title": "  Shipping it  ",
            "url": "https://cdn.example.com/ship.gif",
            "category": "startups",
            "tone": "motivational",
            "format": "short-clip",
            "tags": ["launch"],
        }))
        .unwrap()),
    )
    .await
    .unwrap();

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(gif.title, "Shipping it");
    assert_eq!(gif.uploaded_by, "u1");
    assert_eq!((gif.views, gif.downloads, gif.likes), (0, 0, 0));
    assert!(!gif.is_trending && !gif.is_featured);

    let Json(uploads) =
        handlers::my_uploads(State(state), RequireUser(test_user())).await.unwrap();
    assert_eq!(uploads.len(), 1);
}

#[tokio::test]
async fn upload_without_title_is_rejected() {
    let state = test_state();
    let err = handlers::create_gif(
        State(state),
        RequireUser(test_user()),
        Json(serde_json::from_value(serde_json::json!({
            "title": " ",
            "url": "https://cdn.example.com/x.gif",
            "category": "startups",
            "tone": "funny",
            "format": "meme",
        }))
        .unwrap()),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));
}

#[tokio::test]
async fn empty_collection_name_is_rejected() {
    let state = test_state();
    let err = handlers::create_collection(
        State(state),
        RequireUser(test_user()),
        Json(CreateCollection {
            name: "   ".to_string(),
            description: String::new(),
            is_public: true,
        }),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));
}

#[tokio::test]
async fn newsletter_rejects_blank_email_before_any_store_call() {
    let state = test_state();
    let err = handlers::subscribe_newsletter(
        State(state.clone()),
        Json(SubscribeRequest { email: "  ".to_string(), name: None, interests: Vec::new() }),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));

    let query = gifverse::query::ListQuery::all();
    assert!(state.newsletter().list(&query).await.unwrap().is_empty());
}

#[tokio::test]
async fn newsletter_signup_is_not_deduplicated() {
    let state = test_state();
    for _ in 0..2 {
        let (status, Json(subscriber)) = handlers::subscribe_newsletter(
            State(state.clone()),
            Json(SubscribeRequest {
                email: " pm@example.com ".to_string(),
                name: Some("PM".to_string()),
                interests: vec!["marketing".to_string()],
            }),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(subscriber.email, "pm@example.com");
        assert!(subscriber.is_active);
    }

    let query = gifverse::query::ListQuery::all();
    assert_eq!(state.newsletter().list(&query).await.unwrap().len(), 2);
}

#[tokio::test]
async fn dashboard_stats_sum_upload_downloads() {
    let state = test_state();
    seed_catalog(&state).await;

    // Two uploads belong to the signed-in user.
    for (id, downloads) in [("mine1", 5u64), ("mine2", 7u64)] {
        seed_gif(&state, GifSpec {
            id,
            title: "Mine",
            downloads,
            age_days: 2,
            uploader: "u1",
            ..Default::default()
        })
        .await;
    }

    handlers::toggle_favorite(
        State(state.clone()),
        RequireUser(test_user()),
        Path("g1".to_string()),
    )
    .await
    .unwrap();

    let Json(stats) =
        handlers::dashboard(State(state), RequireUser(test_user())).await.unwrap();
    assert_eq!(stats.total_favorites, 1);
    assert_eq!(stats.total_collections, 0);
    assert_eq!(stats.total_uploads, 2);
    assert_eq!(stats.total_downloads, 12);
}

#[tokio::test]
async fn categories_list_alphabetically_and_resolve_by_slug() {
    let state = test_state();
    for (name, slug) in [("Marketing", "marketing"), ("Developers", "developers")] {
        let category = Category {
            id: format!("cat-{slug}"),
            name: name.to_string(),
            slug: slug.to_string(),
            description: String::new(),
            icon: "sparkles".to_string(),
            color: "#6366f1".to_string(),
            subcategories: vec!["remote-work".to_string()],
            gif_count: 0,
            created_at: Utc::now(),
        };
        state.categories().create(&category).await.unwrap();
    }

    let Json(categories) = handlers::list_categories(State(state.clone())).await.unwrap();
    let names: Vec<&str> = categories.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Developers", "Marketing"]);

    let Json(category) =
        handlers::get_category(State(state.clone()), Path("marketing".to_string()))
            .await
            .unwrap();
    assert_eq!(category.name, "Marketing");

    let err = handlers::get_category(State(state), Path("nope".to_string())).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn trending_surface_ranks_by_views() {
    let state = test_state();
    seed_catalog(&state).await;
    state.gifs().update("g3", serde_json::json!({"views": 50})).await.unwrap();
    state.gifs().update("g1", serde_json::json!({"views": 10})).await.unwrap();

    let Json(gifs) = handlers::trending_gifs(State(state)).await.unwrap();
    let ids: Vec<&str> = gifs.iter().map(|g| g.id.as_str()).collect();
    assert_eq!(ids, vec!["g3", "g1"]);
}
