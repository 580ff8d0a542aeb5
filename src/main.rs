mod app;
mod domain;
mod infra;
mod platform;
mod ui;
mod usecase;

#[cfg(test)]
mod tests;

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;
use tracing_subscriber::EnvFilter;

use crate::app::App;

const APP_QUALIFIER: &str = "app";
const APP_ORGANIZATION: &str = "hardcover";
const APP_NAME: &str = "librarian-assistant";
const CONFIG_FILE: &str = "config.json";
const HISTORY_FILE: &str = "search_history.json";

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let webview_data_dir =
        default_webview_data_dir().expect("should resolve and create WebView data directory");

    dioxus::LaunchBuilder::desktop()
        .with_cfg(
            dioxus::desktop::Config::new()
                .with_window(
                    dioxus::desktop::WindowBuilder::new().with_title("Librarian Assistant"),
                )
                .with_data_directory(webview_data_dir),
        )
        .launch(App);
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
        .ok_or_else(|| anyhow!("unable to resolve application directories"))
}

pub fn default_config_path() -> Result<PathBuf> {
    Ok(project_dirs()?.config_dir().join(CONFIG_FILE))
}

pub fn default_history_path() -> Result<PathBuf> {
    Ok(project_dirs()?.data_local_dir().join(HISTORY_FILE))
}

fn ensure_webview_data_dir(base_data_dir: &Path) -> Result<PathBuf> {
    let webview_data_dir = base_data_dir.join("webview");
    std::fs::create_dir_all(&webview_data_dir).with_context(|| {
        format!(
            "failed to create webview dir: {}",
            webview_data_dir.display()
        )
    })?;
    Ok(webview_data_dir)
}

fn default_webview_data_dir() -> Result<PathBuf> {
    ensure_webview_data_dir(project_dirs()?.data_local_dir())
}

pub fn root_container_style() -> &'static str {
    "font-family: sans-serif; padding: 12px; background: #fff; height: 100vh; box-sizing: border-box; display: flex; flex-direction: column; overflow: hidden;"
}

pub fn table_container_style() -> &'static str {
    "flex: 1; min-height: 0; overflow: auto; border: 1px solid #ccc; border-radius: 6px;"
}

pub fn table_header_cell_style() -> &'static str {
    "border: 1px solid #bbb; padding: 6px; background: #f2f2f2; position: sticky; top: 0; z-index: 1; cursor: pointer; white-space: nowrap; text-align: left;"
}

pub fn table_cell_style(highlight: bool) -> &'static str {
    if highlight {
        "border: 1px solid #bbb; padding: 4px 6px; background: #fde2e1; color: #a12622;"
    } else {
        "border: 1px solid #bbb; padding: 4px 6px;"
    }
}

pub fn tab_button_style(active: bool) -> &'static str {
    if active {
        "border: 1px solid #4a78c2; background: #eef4ff; padding: 6px 14px; border-radius: 6px 6px 0 0; cursor: pointer; font-weight: 600;"
    } else {
        "border: 1px solid #bbb; background: #fff; padding: 6px 14px; border-radius: 6px 6px 0 0; cursor: pointer;"
    }
}
