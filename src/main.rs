use std::{future::IntoFuture, process, sync::Arc};

use postdesk::{
    application::{
        controls::InFlightActions,
        error::AppError,
        posts::PostActions,
        repos::{PostsRepo, PostsWriteRepo, StoreHealth},
        session::{AuthProvider, SessionHub},
    },
    config,
    infra::{
        auth::RemoteAuthProvider,
        db::PostgresRepositories,
        error::InfraError,
        http::{self, HttpState},
        telemetry,
    },
};
use tokio::sync::watch;
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Migrate(_) => run_migrate(settings).await,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let repositories = init_repositories(&settings.database).await?;
    let state = build_http_state(repositories, &settings)?;
    serve_http(&settings.server, state).await
}

async fn run_migrate(settings: config::Settings) -> Result<(), AppError> {
    init_repositories(&settings.database).await?;
    info!(target = "postdesk::migrate", "Migrations applied");
    Ok(())
}

async fn init_repositories(
    database: &config::DatabaseSettings,
) -> Result<Arc<PostgresRepositories>, AppError> {
    let database_url = database
        .url
        .as_ref()
        .ok_or_else(|| InfraError::configuration("database url is not configured"))
        .map_err(AppError::from)?;

    let pool = PostgresRepositories::connect(database_url, database.max_connections.get())
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    Ok(Arc::new(PostgresRepositories::new(pool)))
}

fn build_http_state(
    repositories: Arc<PostgresRepositories>,
    settings: &config::Settings,
) -> Result<HttpState, AppError> {
    let posts_repo: Arc<dyn PostsRepo> = repositories.clone();
    let posts_write_repo: Arc<dyn PostsWriteRepo> = repositories.clone();
    let health: Arc<dyn StoreHealth> = repositories;

    let provider: Arc<dyn AuthProvider> =
        Arc::new(RemoteAuthProvider::new(&settings.auth).map_err(AppError::from)?);

    Ok(HttpState {
        posts: PostActions::new(posts_repo, posts_write_repo),
        sessions: SessionHub::new(provider),
        in_flight: InFlightActions::new(),
        health,
        copy: Arc::new(settings.copy.clone()),
        session_cookie: Arc::from(settings.auth.cookie_name.as_str()),
    })
}

async fn serve_http(server: &config::ServerSettings, state: HttpState) -> Result<(), AppError> {
    let router = http::build_router(state);
    let listener = tokio::net::TcpListener::bind(server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(target = "postdesk::serve", addr = %server.addr, "Listening");

    let (stop_tx, mut stop_rx) = watch::channel(false);
    let serve = axum::serve(listener, router.into_make_service()).with_graceful_shutdown(
        async move {
            let _ = stop_rx.changed().await;
        },
    );
    let mut server_task = tokio::spawn(serve.into_future());

    tokio::select! {
        joined = &mut server_task => return flatten_server_result(joined),
        () = shutdown_signal() => {}
    }

    info!(
        target = "postdesk::serve",
        grace_seconds = server.graceful_shutdown.as_secs(),
        "Shutdown requested; draining connections"
    );
    let _ = stop_tx.send(true);

    match tokio::time::timeout(server.graceful_shutdown, &mut server_task).await {
        Ok(joined) => flatten_server_result(joined),
        Err(_) => {
            // Session event streams never end on their own.
            warn!(
                target = "postdesk::serve",
                "Graceful shutdown window elapsed; closing remaining connections"
            );
            server_task.abort();
            Ok(())
        }
    }
}

fn flatten_server_result(
    joined: Result<std::io::Result<()>, tokio::task::JoinError>,
) -> Result<(), AppError> {
    match joined {
        Ok(Ok(())) => Ok(()),
        Ok(Err(err)) => Err(AppError::unexpected(format!("server error: {err}"))),
        Err(err) => Err(AppError::unexpected(format!("server task failed: {err}"))),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(target = "postdesk::serve", error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                warn!(target = "postdesk::serve", error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
