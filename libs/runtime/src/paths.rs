use anyhow::{anyhow, Context, Result};
use std::path::PathBuf;

/// Platform base directory used when no explicit home_dir is configured:
/// `%APPDATA%` on Windows, `$HOME` elsewhere.
fn platform_base_dir() -> Result<PathBuf> {
    #[cfg(target_os = "windows")]
    let var = "APPDATA";
    #[cfg(not(target_os = "windows"))]
    let var = "HOME";

    std::env::var_os(var)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .ok_or_else(|| anyhow!("environment variable {var} is not set"))
}

/// Resolve the server home directory into an absolute path.
///
/// - `None` resolves to `<platform base>/<default_subdir>`.
/// - A leading `~` is expanded against the platform base directory.
/// - Relative paths are joined onto the current working directory.
///
/// When `create` is set the directory is created if missing.
pub fn resolve_home_dir(
    configured: Option<String>,
    default_subdir: &str,
    create: bool,
) -> Result<PathBuf> {
    let path = match configured {
        None => platform_base_dir()?.join(default_subdir),
        Some(raw) => {
            if raw == "~" {
                platform_base_dir()?
            } else if let Some(rest) = raw.strip_prefix("~/").or_else(|| raw.strip_prefix("~\\")) {
                platform_base_dir()?.join(rest)
            } else {
                let p = PathBuf::from(&raw);
                if p.is_absolute() {
                    p
                } else {
                    std::env::current_dir()
                        .context("cannot read current directory")?
                        .join(p)
                }
            }
        }
    };

    if create {
        std::fs::create_dir_all(&path)
            .with_context(|| format!("cannot create home_dir {}", path.display()))?;
    }
    Ok(path)
}
