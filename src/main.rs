//! # Foodgram 웹 서버 진입점
//!
//! 이 파일이 수행하는 작업:
//! 1. 환경변수(.env) 로딩
//! 2. 로깅(tracing) 초기화
//! 3. SQLite 데이터베이스 연결 풀 생성
//! 4. 데이터베이스 마이그레이션 실행
//! 5. 미디어 디렉토리 생성, 재료 카탈로그 초기 데이터 적재
//! 6. API 라우터 설정
//! 7. HTTP 서버 시작

// ── 모듈 선언 ──
mod config;
mod db;
mod error;
mod middleware;
mod models;
mod routes;
mod services;

use anyhow::Result; // anyhow::Result: 어떤 에러 타입이든 담을 수 있는 범용 Result 타입
use axum::{
    routing::{get, post},
    Router,
};
use config::Config;
use routes::*;
use services::MediaStore;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::{path::Path, str::FromStr};
use tower_http::{
    cors::{Any, CorsLayer}, // CORS(Cross-Origin Resource Sharing) 설정
    services::ServeDir,     // 업로드된 이미지 서빙
    trace::TraceLayer,      // HTTP 요청/응답 로깅 미들웨어
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1단계: 환경변수 로딩 ──
    // .env 파일이 없어도 에러 없이 넘어갑니다.
    dotenvy::dotenv().ok();

    // ── 2단계: 로깅(tracing) 초기화 ──
    // RUST_LOG가 없으면 foodgram, tower_http, axum 모듈을 debug 레벨로 설정
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "foodgram=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // ── 3단계: 설정 로딩 ──
    let config = Config::from_env()?;
    tracing::info!("Starting Foodgram server on {}:{}", config.host, config.port);

    // ── 4단계: SQLite 연결 풀 생성 ──
    // 파일이 없으면 새로 만들고, 외래키 제약(ON DELETE CASCADE)을 켭니다.
    let connect_options = SqliteConnectOptions::from_str(&config.database_url)?
        .create_if_missing(true)
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(connect_options)
        .await?;

    // ── 5단계: 데이터베이스 마이그레이션 실행 ──
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;

    // ── 6단계: 미디어 디렉토리와 재료 카탈로그 ──
    let media_path = Path::new(&config.media_path);
    if !media_path.exists() {
        tokio::fs::create_dir_all(media_path).await?;
        tracing::info!("Created media directory: {}", config.media_path);
    }

    let backfilled = db::backfill_ingredient_name_lower(&pool).await?;
    if backfilled > 0 {
        tracing::info!("Filled lowercase search names for {} ingredients", backfilled);
    }

    if let Some(csv_path) = &config.ingredients_csv {
        let (inserted, skipped) = db::import_ingredients_csv(&pool, Path::new(csv_path)).await?;
        tracing::info!(
            "Imported ingredients from {}: {} new, {} already present",
            csv_path,
            inserted,
            skipped
        );
    }

    // ── 7단계: 애플리케이션 상태(State) 생성 ──
    let state = AppState {
        pool: pool.clone(),
        jwt_secret: config.jwt_secret.clone(),
        limits: config.limits,
        media: MediaStore::new(&config.media_path, config.media_url.clone()),
    };

    // ── 8단계: API 라우터 설정 ──
    // 인증 관련 라우트 (회원가입, 로그인, 토큰 갱신, 로그아웃, 내 정보)
    let auth_routes = Router::new()
        .route("/auth/register", post(routes::auth::register))
        .route("/auth/login", post(routes::auth::login))
        .route("/auth/refresh", post(routes::auth::refresh))
        .route("/auth/logout", post(routes::auth::logout))
        .route("/auth/me", get(routes::auth::me));

    let api_routes = Router::new()
        .merge(auth_routes)
        // 사용자 프로필과 구독
        // 정적 경로(/users/subscriptions, /users/set_password)가 {id}보다 우선합니다.
        .route("/users", get(list_users))
        .route("/users/set_password", post(routes::auth::set_password))
        .route("/users/subscriptions", get(list_subscriptions))
        .route("/users/{id}", get(get_user))
        .route("/users/{id}/subscribe", post(subscribe).delete(unsubscribe))
        // 카탈로그
        .route("/tags", get(list_tags).post(create_tag))
        .route("/tags/{id}", get(get_tag))
        .route("/ingredients", get(list_ingredients).post(create_ingredient))
        .route("/ingredients/{id}", get(get_ingredient))
        // 레시피
        .route("/recipes", get(list_recipes).post(create_recipe))
        .route("/recipes/download_shopping_cart", get(download_shopping_cart))
        .route(
            "/recipes/{id}",
            get(get_recipe).patch(update_recipe).delete(delete_recipe),
        )
        .route("/recipes/{id}/favorite", post(add_favorite).delete(remove_favorite))
        .route("/recipes/{id}/shopping_cart", post(add_to_cart).delete(remove_from_cart))
        // 헬스체크 API
        .route("/health", get(health_check))
        .with_state(state);

    // ── 9단계: CORS 미들웨어 설정 ──
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // ── 10단계: 업로드 이미지 서빙 ──
    let app = Router::new()
        .nest("/api", api_routes)
        .nest_service(&config.media_url, ServeDir::new(&config.media_path))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // ── 11단계: 서버 시작 ──
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
