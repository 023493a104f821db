//! Configuration layer: typed settings with layered precedence (file → env → CLI).

mod cli;

pub use cli::{CliArgs, Command, DatabaseOverride, MigrateArgs, ServeArgs, ServeOverrides};

use std::{
    net::SocketAddr,
    num::{NonZeroU32, NonZeroU64},
    str::FromStr,
    time::Duration,
};

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "postdesk";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_GRACEFUL_SHUTDOWN_SECS: u64 = 30;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 8;
const DEFAULT_AUTH_BASE_URL: &str = "http://127.0.0.1:9999";
const DEFAULT_AUTH_COOKIE: &str = "postdesk_session";
const DEFAULT_AUTH_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub logging: LoggingSettings,
    pub database: DatabaseSettings,
    pub auth: AuthSettings,
    pub copy: CopySettings,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub addr: SocketAddr,
    pub graceful_shutdown: Duration,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub url: Option<String>,
    pub max_connections: NonZeroU32,
}

#[derive(Clone)]
pub struct AuthSettings {
    pub base_url: String,
    pub api_key: String,
    pub cookie_name: String,
    pub request_timeout_seconds: NonZeroU64,
}

impl std::fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSettings")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("cookie_name", &self.cookie_name)
            .field("request_timeout_seconds", &self.request_timeout_seconds)
            .finish()
    }
}

/// User-facing strings for the post controls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopySettings {
    pub create_post: String,
    pub publish_post: String,
    pub unpublish_post: String,
    pub delete_post: String,
    pub delete_confirm_title: String,
    pub delete_confirm_body: String,
    pub cancel: String,
    pub please_wait: String,
    pub success_post_created: String,
    pub success_post_published: String,
    pub success_post_unpublished: String,
    pub success_post_deleted: String,
    pub error_create: String,
    pub error_update: String,
    pub error_delete: String,
    pub error_sign_in_required: String,
    pub error_in_progress: String,
}

impl Default for CopySettings {
    fn default() -> Self {
        Self {
            create_post: "New post".into(),
            publish_post: "Publish".into(),
            unpublish_post: "Unpublish".into(),
            delete_post: "Delete".into(),
            delete_confirm_title: "Are you sure you want to delete this post?".into(),
            delete_confirm_body: "This action cannot be undone.".into(),
            cancel: "Cancel".into(),
            please_wait: "Please wait...".into(),
            success_post_created: "Post created.".into(),
            success_post_published: "Post published.".into(),
            success_post_unpublished: "Post moved back to drafts.".into(),
            success_post_deleted: "Post deleted.".into(),
            error_create: "Could not create the post. Please try again.".into(),
            error_update: "Could not update the post. Please try again.".into(),
            error_delete: "Could not delete the post. Please try again.".into(),
            error_sign_in_required: "Sign in to manage your posts.".into(),
            error_in_progress: "That action is already in progress.".into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix("POSTDESK").separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;

    match cli.command.as_ref() {
        Some(Command::Serve(args)) => raw.apply_serve_overrides(&args.overrides),
        Some(Command::Migrate(args)) => raw.apply_database_override(&args.database),
        None => raw.apply_serve_overrides(&ServeOverrides::default()),
    }

    Settings::from_raw(raw)
}

/// Resolve configuration using the process arguments, returning both.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    server: RawServerSettings,
    logging: RawLoggingSettings,
    database: RawDatabaseSettings,
    auth: RawAuthSettings,
    copy: RawCopySettings,
}

impl RawSettings {
    fn apply_serve_overrides(&mut self, overrides: &ServeOverrides) {
        if let Some(host) = overrides.server_host.as_ref() {
            self.server.host = Some(host.clone());
        }
        if let Some(port) = overrides.server_port {
            self.server.port = Some(port);
        }
        if let Some(seconds) = overrides.server_graceful_shutdown_seconds {
            self.server.graceful_shutdown_seconds = Some(seconds);
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(max) = overrides.database_max_connections {
            self.database.max_connections = Some(max);
        }
        if let Some(url) = overrides.auth_base_url.as_ref() {
            self.auth.base_url = Some(url.clone());
        }
        if let Some(key) = overrides.auth_api_key.as_ref() {
            self.auth.api_key = Some(key.clone());
        }

        self.apply_database_override(&overrides.database);
    }

    fn apply_database_override(&mut self, overrides: &DatabaseOverride) {
        if let Some(url) = overrides.database_url.as_ref() {
            self.database.url = Some(url.clone());
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            server,
            logging,
            database,
            auth,
            copy,
        } = raw;

        Ok(Self {
            server: build_server_settings(server)?,
            logging: build_logging_settings(logging)?,
            database: build_database_settings(database)?,
            auth: build_auth_settings(auth)?,
            copy: build_copy_settings(copy),
        })
    }
}

fn build_server_settings(server: RawServerSettings) -> Result<ServerSettings, LoadError> {
    let host = server.host.unwrap_or_else(|| DEFAULT_HOST.to_string());

    let port = server.port.unwrap_or(DEFAULT_PORT);
    if port == 0 {
        return Err(LoadError::invalid(
            "server.port",
            "port must be greater than zero",
        ));
    }

    let addr = parse_socket_addr(&host, port)
        .map_err(|reason| LoadError::invalid("server.addr", reason))?;

    let graceful_secs = server
        .graceful_shutdown_seconds
        .unwrap_or(DEFAULT_GRACEFUL_SHUTDOWN_SECS);
    if graceful_secs == 0 {
        return Err(LoadError::invalid(
            "server.graceful_shutdown_seconds",
            "must be greater than zero",
        ));
    }

    Ok(ServerSettings {
        addr,
        graceful_shutdown: Duration::from_secs(graceful_secs),
    })
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_database_settings(database: RawDatabaseSettings) -> Result<DatabaseSettings, LoadError> {
    let url = non_blank(database.url);
    let max_connections = non_zero_u32(
        database
            .max_connections
            .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS)
            .into(),
        "database.max_connections",
    )?;

    Ok(DatabaseSettings {
        url,
        max_connections,
    })
}

fn build_auth_settings(auth: RawAuthSettings) -> Result<AuthSettings, LoadError> {
    let base_url = non_blank(auth.base_url).unwrap_or_else(|| DEFAULT_AUTH_BASE_URL.to_string());
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        return Err(LoadError::invalid(
            "auth.base_url",
            format!("`{base_url}` must be an http(s) URL"),
        ));
    }

    let cookie_name =
        non_blank(auth.cookie_name).unwrap_or_else(|| DEFAULT_AUTH_COOKIE.to_string());
    if !cookie_name
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-')
    {
        return Err(LoadError::invalid(
            "auth.cookie_name",
            "only ASCII letters, digits, `_` and `-` are allowed",
        ));
    }

    let timeout = auth
        .request_timeout_seconds
        .unwrap_or(DEFAULT_AUTH_TIMEOUT_SECS);
    let request_timeout_seconds = NonZeroU64::new(timeout).ok_or_else(|| {
        LoadError::invalid("auth.request_timeout_seconds", "must be greater than zero")
    })?;

    Ok(AuthSettings {
        base_url,
        api_key: auth.api_key.unwrap_or_default(),
        cookie_name,
        request_timeout_seconds,
    })
}

fn build_copy_settings(copy: RawCopySettings) -> CopySettings {
    let defaults = CopySettings::default();
    let pick = |value: Option<String>, fallback: String| non_blank(value).unwrap_or(fallback);

    CopySettings {
        create_post: pick(copy.create_post, defaults.create_post),
        publish_post: pick(copy.publish_post, defaults.publish_post),
        unpublish_post: pick(copy.unpublish_post, defaults.unpublish_post),
        delete_post: pick(copy.delete_post, defaults.delete_post),
        delete_confirm_title: pick(copy.delete_confirm_title, defaults.delete_confirm_title),
        delete_confirm_body: pick(copy.delete_confirm_body, defaults.delete_confirm_body),
        cancel: pick(copy.cancel, defaults.cancel),
        please_wait: pick(copy.please_wait, defaults.please_wait),
        success_post_created: pick(copy.success_post_created, defaults.success_post_created),
        success_post_published: pick(
            copy.success_post_published,
            defaults.success_post_published,
        ),
        success_post_unpublished: pick(
            copy.success_post_unpublished,
            defaults.success_post_unpublished,
        ),
        success_post_deleted: pick(copy.success_post_deleted, defaults.success_post_deleted),
        error_create: pick(copy.error_create, defaults.error_create),
        error_update: pick(copy.error_update, defaults.error_update),
        error_delete: pick(copy.error_delete, defaults.error_delete),
        error_sign_in_required: pick(
            copy.error_sign_in_required,
            defaults.error_sign_in_required,
        ),
        error_in_progress: pick(copy.error_in_progress, defaults.error_in_progress),
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawServerSettings {
    host: Option<String>,
    port: Option<u16>,
    graceful_shutdown_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawDatabaseSettings {
    url: Option<String>,
    max_connections: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawAuthSettings {
    base_url: Option<String>,
    api_key: Option<String>,
    cookie_name: Option<String>,
    request_timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawCopySettings {
    create_post: Option<String>,
    publish_post: Option<String>,
    unpublish_post: Option<String>,
    delete_post: Option<String>,
    delete_confirm_title: Option<String>,
    delete_confirm_body: Option<String>,
    cancel: Option<String>,
    please_wait: Option<String>,
    success_post_created: Option<String>,
    success_post_published: Option<String>,
    success_post_unpublished: Option<String>,
    success_post_deleted: Option<String>,
    error_create: Option<String>,
    error_update: Option<String>,
    error_delete: Option<String>,
    error_sign_in_required: Option<String>,
    error_in_progress: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

fn parse_socket_addr(host: &str, port: u16) -> Result<SocketAddr, String> {
    let candidate = format!("{host}:{port}");
    candidate
        .parse()
        .map_err(|err| format!("invalid address `{candidate}`: {err}"))
}

fn non_zero_u32(value: u64, key: &'static str) -> Result<NonZeroU32, LoadError> {
    if value == 0 {
        return Err(LoadError::invalid(key, "must be greater than zero"));
    }
    let value_u32: u32 = value
        .try_into()
        .map_err(|_| LoadError::invalid(key, "value exceeds supported range for u32"))?;
    NonZeroU32::new(value_u32).ok_or_else(|| LoadError::invalid(key, "must be greater than zero"))
}
