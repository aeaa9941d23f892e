use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::debug;

#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;

/// Generic fallback consulted after the per-source variable.
pub const PASSWORD_ENV: &str = "TICKETBRIDGE_PASSWORD";

/// Name of the per-source password variable, e.g. `TICKETBRIDGE_PASSWORD_A`.
pub fn password_env_var(source: &str) -> String {
    format!("{PASSWORD_ENV}_{}", source.to_uppercase())
}

/// JSON map of source name to password, kept with 0600 permissions.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `~/.ticketbridge/credentials`, or `None` without a home directory.
    pub fn default_location() -> Option<Self> {
        dirs::home_dir().map(|h| Self::new(h.join(".ticketbridge").join("credentials")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get_secret(&self, account: &str) -> Result<Option<String>> {
        Ok(self.read()?.remove(account))
    }

    pub fn set_secret(&self, account: &str, secret: &str) -> Result<()> {
        let mut creds = self.read()?;
        creds.insert(account.to_string(), secret.to_string());
        self.write(&creds)
    }

    pub fn delete_secret(&self, account: &str) -> Result<()> {
        if !self.path.exists() {
            return Ok(());
        }
        let mut creds = self.read()?;
        creds.remove(account);
        self.write(&creds)
    }

    fn read(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Unable to read credentials at {}", self.path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Malformed credentials file {}", self.path.display()))
    }

    fn write(&self, creds: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(0o600);

        let file = options
            .open(&self.path)
            .with_context(|| format!("Unable to write credentials at {}", self.path.display()))?;
        serde_json::to_writer_pretty(file, creds)?;
        Ok(())
    }
}

/// Resolve the password for `source`, first match wins:
/// inline value, `TICKETBRIDGE_PASSWORD_<SOURCE>`, `TICKETBRIDGE_PASSWORD`,
/// then the credential store. Blank values are skipped.
pub fn resolve_password(
    source: &str,
    inline: Option<&str>,
    store: Option<&CredentialStore>,
) -> Result<Option<String>> {
    resolve_password_with(source, inline, |name| std::env::var(name).ok(), store)
}

pub fn resolve_password_with<E>(
    source: &str,
    inline: Option<&str>,
    env: E,
    store: Option<&CredentialStore>,
) -> Result<Option<String>>
where
    E: Fn(&str) -> Option<String>,
{
    let non_blank = |value: &String| !value.trim().is_empty();

    if let Some(password) = inline.map(str::to_string).filter(non_blank) {
        debug!(source, "Using password from settings");
        return Ok(Some(password));
    }

    for name in [password_env_var(source), PASSWORD_ENV.to_string()] {
        if let Some(password) = env(&name).filter(non_blank) {
            debug!(source, var = %name, "Using password from environment");
            return Ok(Some(password));
        }
    }

    match store {
        Some(store) => Ok(store.get_secret(source)?.filter(non_blank)),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn store_in(dir: &tempfile::TempDir) -> CredentialStore {
        CredentialStore::new(dir.path().join("creds").join("credentials"))
    }

    #[test]
    fn test_set_get_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        assert_eq!(store.get_secret("a").unwrap(), None);

        store.set_secret("a", "alpha").unwrap();
        store.set_secret("b", "beta").unwrap();
        assert_eq!(store.get_secret("a").unwrap().as_deref(), Some("alpha"));

        store.delete_secret("a").unwrap();
        assert_eq!(store.get_secret("a").unwrap(), None);
        assert_eq!(store.get_secret("b").unwrap().as_deref(), Some("beta"));
    }

    #[test]
    fn test_malformed_store_is_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        let original = r#"{"a": "alpha-pass", "b": 42}"#;
        fs::write(store.path(), original).unwrap();

        assert!(store.get_secret("a").is_err());
        assert!(store.set_secret("b", "beta").is_err());
        assert!(store.delete_secret("a").is_err());
        assert_eq!(fs::read_to_string(store.path()).unwrap(), original);
    }

    #[test]
    fn test_delete_missing_file_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        assert!(store_in(&dir).delete_secret("a").is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn test_credentials_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.set_secret("a", "alpha").unwrap();

        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_password_env_var_name() {
        assert_eq!(password_env_var("b"), "TICKETBRIDGE_PASSWORD_B");
    }

    #[test]
    fn test_resolution_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.set_secret("a", "from-store").unwrap();

        let env: HashMap<&str, &str> = HashMap::from([
            ("TICKETBRIDGE_PASSWORD_A", "from-source-env"),
            ("TICKETBRIDGE_PASSWORD", "from-generic-env"),
        ]);
        let lookup = |name: &str| env.get(name).map(|v| v.to_string());

        let inline = resolve_password_with("a", Some("inline"), lookup, Some(&store)).unwrap();
        assert_eq!(inline.as_deref(), Some("inline"));

        let from_env = resolve_password_with("a", None, lookup, Some(&store)).unwrap();
        assert_eq!(from_env.as_deref(), Some("from-source-env"));

        let generic = resolve_password_with("b", None, lookup, Some(&store)).unwrap();
        assert_eq!(generic.as_deref(), Some("from-generic-env"));

        let stored = resolve_password_with("a", Some("  "), |_| None, Some(&store)).unwrap();
        assert_eq!(stored.as_deref(), Some("from-store"));

        let nothing = resolve_password_with("b", None, |_| None, Some(&store)).unwrap();
        assert_eq!(nothing, None);
    }
}
