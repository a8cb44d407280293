use std::path::Path;

/// Load environment variables from .env (best-effort). Values already set in
/// the process environment win.
pub fn load_dotenv() {
    // 1) current dir, 2) parent, 3) grandparent
    for path in [".env", "../.env", "../../.env"] {
        if Path::new(path).exists() {
            match dotenv::from_path(path) {
                Ok(()) => tracing::debug!(%path, "loaded environment file"),
                Err(e) => tracing::warn!(%path, error = %e, "could not parse environment file"),
            }
            return;
        }
    }
}
