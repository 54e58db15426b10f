use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use courseshelf::state::AppState;
use courseshelf::{config, db, handlers, library};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "courseshelf=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = config::load_settings();
    let pool = db::init_db(&settings.database_path).expect("Failed to initialize catalog");

    let state = AppState::new(pool, settings);

    // Initial scan at launch. A failure must not keep the server from
    // starting; the admin page can rescan.
    match db::try_lock(&state.pool) {
        Ok(mut conn) => {
            match library::scan_library(&mut conn, &state.settings.courses_dir) {
                Ok(stats) => {
                    drop(conn);
                    state.set_scan_meta(stats);
                }
                Err(e) => tracing::error!(
                    "initial library scan failed (courses_dir={}): {}",
                    state.settings.courses_dir.display(),
                    e
                ),
            }
        }
        Err(e) => tracing::error!("skipping initial scan: {}", e),
    }

    let app = handlers::router(state);

    let bind_addr = config::server_bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|_| panic!("Failed to bind to {}", bind_addr));

    tracing::info!("Server running on http://localhost:{}", config::SERVER_PORT);

    axum::serve(listener, app)
        .await
        .expect("Server failed to start");
}
