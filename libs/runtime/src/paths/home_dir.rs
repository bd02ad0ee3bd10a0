use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

/// Platform base under which the default home subdirectory is created.
/// Windows: `%APPDATA%`, elsewhere: `$HOME`.
fn platform_base() -> Option<PathBuf> {
    if cfg!(target_os = "windows") {
        dirs::config_dir()
    } else {
        dirs::home_dir()
    }
}

/// Expand a leading `~` or `~/` against the user's home directory.
fn expand_tilde(raw: &str) -> Result<PathBuf> {
    if raw == "~" {
        return dirs::home_dir().context("cannot expand '~': home directory is unknown");
    }
    if let Some(rest) = raw.strip_prefix("~/").or_else(|| raw.strip_prefix("~\\")) {
        let home = dirs::home_dir().context("cannot expand '~': home directory is unknown")?;
        return Ok(home.join(rest));
    }
    Ok(PathBuf::from(raw))
}

fn absolutize(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().context("cannot read current directory")?;
    Ok(cwd.join(path))
}

/// Resolve the server home directory to an absolute path.
///
/// `None` (or a blank string) selects `<platform base>/<default_subdir>`. A value
/// starting with `~` is expanded, a relative value is joined onto the current
/// directory. With `create` the directory is created when missing.
pub fn resolve_home_dir(
    configured: Option<String>,
    default_subdir: &str,
    create: bool,
) -> Result<PathBuf> {
    let path = match configured.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => absolutize(&expand_tilde(raw)?)?,
        _ => {
            let base = platform_base().context("platform home directory is unknown")?;
            base.join(default_subdir)
        }
    };

    if path.exists() && !path.is_dir() {
        bail!("home_dir '{}' exists and is not a directory", path.display());
    }
    if create {
        std::fs::create_dir_all(&path)
            .with_context(|| format!("cannot create home_dir '{}'", path.display()))?;
    }
    Ok(path)
}
