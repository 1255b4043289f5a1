use serena::api::{api_router, ApiContext};
use serena::classifier::{Classifier, HttpModelClient};
use serena::config::{self, Config};
use serena::db::repository::{insert_caregiver, insert_patient, NewCaregiver, NewPatient};
use serena::db::sqlite::open_database;

use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = Config::from_env();
    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "fatal startup error");
        std::process::exit(1);
    }
}

async fn run(config: Config) -> Result<(), String> {
    if let Some(parent) = config.db_path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| format!("Cannot create data directory: {e}"))?;
    }
    let conn = open_database(&config.db_path)
        .map_err(|e| format!("Cannot open database: {e}"))?;
    tracing::info!(path = %config.db_path.display(), "database ready");

    if config.seed_demo_data {
        seed_demo_data(&conn).map_err(|e| format!("Cannot seed demo data: {e}"))?;
    }

    let client = HttpModelClient::new(&config.classifier_base_url, config.classifier_timeout_secs);
    let classifier = Classifier::new(Box::new(client), config.classifier_models.clone());
    tracing::info!(
        candidates = ?classifier.candidates(),
        base_url = %config.classifier_base_url,
        "classifier configured"
    );

    let ctx = ApiContext::new(conn, classifier, config.verify_token.clone());
    let app = api_router(ctx);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .map_err(|e| format!("Cannot bind {}: {e}", config.bind_addr))?;
    tracing::info!(addr = %config.bind_addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| format!("Server error: {e}"))?;

    tracing::info!("shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        tracing::error!("cannot install Ctrl-C handler; running until killed");
        std::future::pending::<()>().await;
    }
}

/// Development fixture: one patient with two caregivers, created only when
/// the patients table is empty.
fn seed_demo_data(conn: &rusqlite::Connection) -> Result<(), serena::db::DatabaseError> {
    let existing: i64 = conn
        .query_row("SELECT COUNT(*) FROM patients", [], |row| row.get(0))
        .map_err(serena::db::DatabaseError::from)?;
    if existing > 0 {
        return Ok(());
    }

    let now = chrono::Local::now().naive_local();
    let patient_id = insert_patient(
        conn,
        &NewPatient {
            name: "María García",
            age: Some(78),
            conditions: Some("Alzheimer inicial, hipertensión"),
            notes: None,
        },
        now,
    )?;
    insert_caregiver(
        conn,
        &NewCaregiver {
            patient_id,
            name: "Ana Pérez",
            phone: Some("+1234567890"),
            email: Some("ana@example.com"),
            role: Some("Profesional"),
        },
        now,
    )?;
    insert_caregiver(
        conn,
        &NewCaregiver {
            patient_id,
            name: "Juan Rodríguez",
            phone: Some("+0987654321"),
            email: Some("juan@example.com"),
            role: Some("Familiar"),
        },
        now,
    )?;

    tracing::info!("demo data created: 1 patient, 2 caregivers");
    Ok(())
}
