use std::{collections::HashMap, fs, path::PathBuf};

#[derive(Debug, Clone)]
pub struct Settings {
    pub server_bind: String,
    pub database_url: String,
    pub static_dir: PathBuf,
    pub cors_origins: Vec<String>,
    pub project_name: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_bind: "127.0.0.1:8000".into(),
            database_url: "sqlite://./data/options.db".into(),
            static_dir: PathBuf::from("./static"),
            cors_origins: vec!["*".into()],
            project_name: "Dataset Options API".into(),
        }
    }
}

impl Settings {
    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.iter().any(|origin| origin == "*")
    }
}

pub fn load_settings() -> Settings {
    let file = fs::read_to_string("server.toml").ok();
    settings_from_sources(file.as_deref(), |name| std::env::var(name).ok())
}

/// Layers `server.toml` contents and then environment variables over the
/// defaults. Unparseable files are ignored.
pub fn settings_from_sources(
    file: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> Settings {
    let mut settings = Settings::default();

    if let Some(raw) = file {
        if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(raw) {
            if let Some(v) = file_cfg.get("bind_addr") {
                settings.server_bind = v.clone();
            }
            if let Some(v) = file_cfg.get("database_url") {
                settings.database_url = v.clone();
            }
            if let Some(v) = file_cfg.get("static_dir") {
                settings.static_dir = PathBuf::from(v);
            }
            if let Some(v) = file_cfg.get("cors_origins") {
                settings.cors_origins = split_origins(v);
            }
            if let Some(v) = file_cfg.get("project_name") {
                settings.project_name = v.clone();
            }
        }
    }

    if let Some(v) = env("SERVER_BIND") {
        settings.server_bind = v;
    }
    if let Some(v) = env("APP__BIND_ADDR") {
        settings.server_bind = v;
    }

    if let Some(v) = env("DATABASE_URL") {
        settings.database_url = v;
    }
    if let Some(v) = env("APP__DATABASE_URL") {
        settings.database_url = v;
    }

    if let Some(v) = env("APP__STATIC_DIR") {
        settings.static_dir = PathBuf::from(v);
    }

    if let Some(v) = env("APP__CORS_ORIGINS") {
        settings.cors_origins = split_origins(&v);
    }

    if let Some(v) = env("APP__PROJECT_NAME") {
        settings.project_name = v;
    }

    settings
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

/// Accepts bare paths and `sqlite:` URLs as well as full `sqlite://` URLs.
/// The parent directory is created when the store is opened.
pub(crate) fn normalize_database_url(raw_database_url: &str) -> String {
    let raw_database_url = raw_database_url.trim();

    if raw_database_url.is_empty() {
        return Settings::default().database_url;
    }

    if raw_database_url.starts_with("sqlite::memory:") || raw_database_url.contains("://") {
        return raw_database_url.to_string();
    }

    if let Some(path) = raw_database_url.strip_prefix("sqlite:") {
        let path = path.replace('\\', "/");
        return format!("sqlite://{path}");
    }

    format!("sqlite://{}", raw_database_url.replace('\\', "/"))
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
