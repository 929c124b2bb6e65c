//! Startup configuration, read from flags or the environment.
use std::path::PathBuf;
use std::time::Duration;

use crate::engine::EngineKind;
use crate::fsutil;

/// Invalid startup parameters.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("interval must be at least one second")]
    ZeroInterval,
    #[error("manifest path `{path}` is a directory")]
    IsDirectory { path: PathBuf },
    #[error("directory `{dir}` of manifest path `{path}` does not exist")]
    MissingDirectory { path: PathBuf, dir: PathBuf },
    #[error("directory `{dir}` of manifest path is not writable: {source}")]
    Unwritable {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Publishes `sui.app.*` container labels as an apps.json manifest.
#[derive(Debug, Clone, clap::Parser)]
#[command(name = "sui-discovery", version)]
pub struct Config {
    /// Location of the apps.json file.
    #[arg(
        long = "apps-config",
        env = "SUI_APPS_CONFIG",
        default_value = "./config/apps.json"
    )]
    pub apps_config: PathBuf,

    /// Seconds between two runs.
    #[arg(long, env = "SUI_INTERVAL", default_value_t = 30)]
    pub interval: u64,

    /// Container engine to query.
    #[arg(long, env = "SUI_ENGINE", value_enum, default_value_t = EngineKind::Docker)]
    pub engine: EngineKind,

    /// Engine socket; defaults to the engine's standard location.
    #[arg(long, env = "SUI_SOCKET")]
    pub socket: Option<PathBuf>,

    /// Run once and exit instead of polling.
    #[arg(long, env = "SUI_ONCE")]
    pub once: bool,
}

impl Config {
    /// Checks the parameters before anything is connected or written.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if the interval is zero, the manifest path is a
    /// directory, or its parent directory is missing or not writable.
    pub fn validate(&self) -> Result<()> {
        if self.interval == 0 {
            return Err(Error::ZeroInterval);
        }
        if self.apps_config.is_dir() {
            return Err(Error::IsDirectory {
                path: self.apps_config.clone(),
            });
        }
        let dir = fsutil::parent_dir(&self.apps_config);
        if !dir.is_dir() {
            return Err(Error::MissingDirectory {
                path: self.apps_config.clone(),
                dir: dir.to_path_buf(),
            });
        }
        // Publishing creates a temporary file next to the manifest.
        tempfile::tempfile_in(dir).map_err(|source| Error::Unwritable {
            dir: dir.to_path_buf(),
            source,
        })?;
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval)
    }

    pub fn socket_path(&self) -> PathBuf {
        self.socket
            .clone()
            .unwrap_or_else(|| self.engine.default_socket())
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    fn parse(args: &[&str]) -> Config {
        Config::try_parse_from(std::iter::once("sui-discovery").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = parse(&[]);
        assert_eq!(config.apps_config, PathBuf::from("./config/apps.json"));
        assert_eq!(config.interval(), Duration::from_secs(30));
        assert_eq!(config.engine, EngineKind::Docker);
        assert_eq!(config.socket_path(), PathBuf::from("/var/run/docker.sock"));
        assert!(!config.once);
    }

    #[test]
    fn test_flags() {
        let config = parse(&[
            "--apps-config",
            "/srv/sui/apps.json",
            "--interval",
            "5",
            "--engine",
            "containerd",
            "--once",
        ]);
        assert_eq!(config.apps_config, PathBuf::from("/srv/sui/apps.json"));
        assert_eq!(config.interval(), Duration::from_secs(5));
        assert_eq!(
            config.socket_path(),
            PathBuf::from("/run/containerd/containerd.sock")
        );
        assert!(config.once);
    }

    #[test]
    fn test_explicit_socket_wins() {
        let config = parse(&["--engine", "containerd", "--socket", "/tmp/c.sock"]);
        assert_eq!(config.socket_path(), PathBuf::from("/tmp/c.sock"));
    }

    #[test]
    fn test_rejects_negative_interval() {
        let result =
            Config::try_parse_from(["sui-discovery", "--interval", "-1"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_accepts_existing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let config = parse(&["--apps-config", dir.path().join("apps.json").to_str().unwrap()]);
        config.validate().unwrap();
    }

    #[test]
    fn test_validate_zero_interval() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("apps.json");
        let config = parse(&["--apps-config", path.to_str().unwrap(), "--interval", "0"]);
        assert!(matches!(config.validate(), Err(Error::ZeroInterval)));
    }

    #[test]
    fn test_validate_directory_path() {
        let dir = tempfile::tempdir().unwrap();
        let config = parse(&["--apps-config", dir.path().to_str().unwrap()]);
        assert!(matches!(config.validate(), Err(Error::IsDirectory { .. })));
    }

    #[test]
    fn test_validate_unwritable_directory() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("apps.json");
        std::fs::write(&path, "{\"apps\": []}").unwrap();
        std::fs::set_permissions(dir.path(), std::fs::Permissions::from_mode(0o555)).unwrap();
        if tempfile::tempfile_in(dir.path()).is_ok() {
            // permissions are not enforced for this user (root)
            std::fs::set_permissions(dir.path(), std::fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let config = parse(&["--apps-config", path.to_str().unwrap()]);
        let result = config.validate();
        std::fs::set_permissions(dir.path(), std::fs::Permissions::from_mode(0o755)).unwrap();

        match result {
            Err(Error::Unwritable { dir: err_dir, .. }) => assert_eq!(err_dir, dir.path()),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_validate_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing/apps.json");
        let config = parse(&["--apps-config", path.to_str().unwrap()]);
        match config.validate() {
            Err(Error::MissingDirectory { dir: missing, .. }) => {
                assert_eq!(missing, dir.path().join("missing"))
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
