//! linlog - personal blog and content management backend

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use linlog::{
    api::{self, AppState},
    config::Config,
    db::{
        self,
        repositories::{
            SqlxArticleRepository, SqlxCommentRepository, SqlxDiaryRepository,
            SqlxFileRepository, SqlxMessageRepository, SqlxSubsetRepository, SqlxUserRepository,
        },
    },
    services::{
        ArticleService, CommentService, DiaryService, FileService, MessageService,
        SubsetService, TokenService, UserService,
    },
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "linlog=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting linlog...");

    // Load configuration (file + LINLOG_* environment overrides)
    let config = Config::load_with_env(Path::new("config.yml"))?;
    tracing::info!("Configuration loaded");

    // Initialize database
    let pool = db::create_pool(&config.database).await?;
    tracing::info!("Database connected: {:?}", config.database.driver);

    // Run migrations
    db::migrations::run_migrations(&pool).await?;
    tracing::info!("Database migrations completed");

    // Create repositories
    let user_repo = SqlxUserRepository::shared(pool.clone());
    let article_repo = SqlxArticleRepository::shared(pool.clone());
    let comment_repo = SqlxCommentRepository::shared(pool.clone());
    let message_repo = SqlxMessageRepository::shared(pool.clone());
    let subset_repo = SqlxSubsetRepository::shared(pool.clone());
    let file_repo = SqlxFileRepository::shared(pool.clone());
    let diary_repo = SqlxDiaryRepository::shared(pool.clone());

    // Wire up services
    let state = AppState {
        user_service: Arc::new(UserService::new(user_repo.clone())),
        article_service: Arc::new(ArticleService::new(article_repo.clone())),
        comment_service: Arc::new(CommentService::new(comment_repo, article_repo)),
        message_service: Arc::new(MessageService::new(message_repo, user_repo)),
        subset_service: Arc::new(SubsetService::new(subset_repo)),
        file_service: Arc::new(FileService::new(file_repo)),
        diary_service: Arc::new(DiaryService::new(diary_repo)),
        token_service: Arc::new(TokenService::new(&config.auth)),
    };

    // Build router
    let app = api::build_router(state, &config.server.cors_origin, &config.storage.data_dir);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
