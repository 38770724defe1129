use std::fmt;
use std::str::FromStr;

use camino::Utf8Path;
use camino::Utf8PathBuf;
use config::Config;
use config::ConfigError as ExternalConfigError;
use config::Environment;
use config::File;
use config::FileFormat;
use directories::ProjectDirs;
use serde::Deserialize;
use serde::Deserializer;
use thiserror::Error;

/// Name of the language server log file inside the logs directory.
pub const LOG_FILE_NAME: &str = "lsp.log";

const DEFAULT_LOGS_DIRECTORY: &str = "logs";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration build/deserialize error")]
    Config(#[from] ExternalConfigError),
}

/// Verbosity of the server's own logging.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warning,
    Error,
}

impl LogLevel {
    /// Parse a level name, ignoring case. Anything unrecognized is `Info`.
    #[must_use]
    pub fn from_str_lossy(level: &str) -> Self {
        level.parse().unwrap_or_default()
    }

    /// Directive understood by `tracing_subscriber::EnvFilter`.
    #[must_use]
    pub fn as_filter_directive(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warning" | "warn" => Ok(LogLevel::Warning),
            "error" => Ok(LogLevel::Error),
            other => Err(format!("unknown log level: {other}")),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warning",
            LogLevel::Error => "error",
        };
        f.write_str(name)
    }
}

impl<'de> Deserialize<'de> for LogLevel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let level = String::deserialize(deserializer)?;
        Ok(LogLevel::from_str_lossy(&level))
    }
}

#[derive(Debug, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub log_level: LogLevel,
    pub logs_directory: Option<Utf8PathBuf>,
}

impl Settings {
    pub fn new(project_root: &Utf8Path) -> Result<Self, ConfigError> {
        let user_config_file = ProjectDirs::from("org", "gauge", "gls")
            .map(|proj_dirs| proj_dirs.config_dir().join("gls.toml"))
            .and_then(|path| Utf8PathBuf::from_path_buf(path).ok());

        Self::load_from_paths(
            project_root,
            user_config_file.as_deref(),
            Environment::with_prefix("GLS"),
        )
    }

    fn load_from_paths(
        project_root: &Utf8Path,
        user_config_path: Option<&Utf8Path>,
        environment: Environment,
    ) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        if let Some(path) = user_config_path {
            builder = builder.add_source(
                File::from(path.as_std_path())
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        builder = builder.add_source(
            File::from(project_root.join(".gls.toml").as_std_path())
                .format(FileFormat::Toml)
                .required(false),
        );

        builder = builder.add_source(
            File::from(project_root.join("gls.toml").as_std_path())
                .format(FileFormat::Toml)
                .required(false),
        );

        builder = builder.add_source(environment);

        let config = builder.build()?;
        let settings = config.try_deserialize()?;
        Ok(settings)
    }

    /// Where the language server log goes.
    ///
    /// An absolute `logs_directory` is used as is. A relative one, or the
    /// default `logs`, is taken relative to `project_root`.
    #[must_use]
    pub fn log_file(&self, project_root: &Utf8Path) -> Utf8PathBuf {
        self.logs_dir(project_root).join(LOG_FILE_NAME)
    }

    #[must_use]
    pub fn logs_dir(&self, project_root: &Utf8Path) -> Utf8PathBuf {
        let dir = self
            .logs_directory
            .as_deref()
            .unwrap_or(Utf8Path::new(DEFAULT_LOGS_DIRECTORY));

        if dir.is_absolute() {
            dir.to_path_buf()
        } else {
            project_root.join(dir)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    fn utf8(path: &std::path::Path) -> &Utf8Path {
        Utf8Path::from_path(path).unwrap()
    }

    /// Environment source fed from a fixed map instead of the process env.
    fn environment_from(vars: &[(&str, &str)]) -> Environment {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect();
        Environment::with_prefix("GLS").source(Some(map))
    }

    fn load(project_root: &Utf8Path, user: Option<&Utf8Path>) -> Settings {
        Settings::load_from_paths(project_root, user, environment_from(&[])).unwrap()
    }

    mod defaults {
        use super::*;

        #[test]
        fn test_load_no_files() {
            let dir = tempdir().unwrap();
            let settings = load(utf8(dir.path()), None);
            assert_eq!(
                settings,
                Settings {
                    log_level: LogLevel::Info,
                    logs_directory: None,
                }
            );
        }
    }

    mod project_files {
        use super::*;

        #[test]
        fn test_load_gls_toml_only() {
            let dir = tempdir().unwrap();
            fs::write(dir.path().join("gls.toml"), "log_level = \"debug\"").unwrap();
            let settings = load(utf8(dir.path()), None);
            assert_eq!(settings.log_level, LogLevel::Debug);
        }

        #[test]
        fn test_load_dot_gls_toml_only() {
            let dir = tempdir().unwrap();
            fs::write(
                dir.path().join(".gls.toml"),
                "logs_directory = \"/var/log/gls\"",
            )
            .unwrap();
            let settings = load(utf8(dir.path()), None);
            assert_eq!(
                settings.logs_directory,
                Some(Utf8PathBuf::from("/var/log/gls"))
            );
        }
    }

    mod priority {
        use super::*;

        #[test]
        fn test_gls_overrides_dot_gls() {
            let dir = tempdir().unwrap();
            fs::write(dir.path().join(".gls.toml"), "log_level = \"error\"").unwrap();
            fs::write(dir.path().join("gls.toml"), "log_level = \"warning\"").unwrap();
            let settings = load(utf8(dir.path()), None);
            assert_eq!(settings.log_level, LogLevel::Warning);
        }

        #[test]
        fn test_project_overrides_user() {
            let user_dir = tempdir().unwrap();
            let project_dir = tempdir().unwrap();
            let user_conf_path = user_dir.path().join("gls.toml");
            fs::write(&user_conf_path, "log_level = \"debug\"").unwrap();
            fs::write(project_dir.path().join("gls.toml"), "log_level = \"error\"").unwrap();

            let settings = load(utf8(project_dir.path()), Some(utf8(&user_conf_path)));
            assert_eq!(settings.log_level, LogLevel::Error);
        }

        #[test]
        fn test_environment_overrides_files() {
            let dir = tempdir().unwrap();
            fs::write(dir.path().join("gls.toml"), "log_level = \"error\"").unwrap();

            let settings = Settings::load_from_paths(
                utf8(dir.path()),
                None,
                environment_from(&[
                    ("GLS_LOG_LEVEL", "debug"),
                    ("GLS_LOGS_DIRECTORY", "custom-logs"),
                ]),
            )
            .unwrap();
            assert_eq!(settings.log_level, LogLevel::Debug);
            assert_eq!(
                settings.logs_directory,
                Some(Utf8PathBuf::from("custom-logs"))
            );
        }
    }

    mod user_config {
        use super::*;

        #[test]
        fn test_load_user_config_only() {
            let user_dir = tempdir().unwrap();
            let project_dir = tempdir().unwrap();
            let user_conf_path = user_dir.path().join("gls.toml");
            fs::write(&user_conf_path, "log_level = \"warning\"").unwrap();

            let settings = load(utf8(project_dir.path()), Some(utf8(&user_conf_path)));
            assert_eq!(settings.log_level, LogLevel::Warning);
        }

        #[test]
        fn test_no_user_config_file_present() {
            let user_dir = tempdir().unwrap();
            let project_dir = tempdir().unwrap();
            let user_conf_path = user_dir.path().join("gls.toml");

            let settings = load(utf8(project_dir.path()), Some(utf8(&user_conf_path)));
            assert_eq!(settings, Settings::default());
        }
    }

    mod log_level {
        use super::*;

        #[test]
        fn test_parse_is_case_insensitive() {
            assert_eq!(LogLevel::from_str_lossy("DEBUG"), LogLevel::Debug);
            assert_eq!(LogLevel::from_str_lossy("Warning"), LogLevel::Warning);
            assert_eq!(LogLevel::from_str_lossy("error"), LogLevel::Error);
        }

        #[test]
        fn test_unknown_falls_back_to_info() {
            assert_eq!(LogLevel::from_str_lossy(""), LogLevel::Info);
            assert_eq!(LogLevel::from_str_lossy("verbose"), LogLevel::Info);
        }

        #[test]
        fn test_unknown_in_file_falls_back_to_info() {
            let dir = tempdir().unwrap();
            fs::write(dir.path().join("gls.toml"), "log_level = \"chatty\"").unwrap();
            let settings = load(utf8(dir.path()), None);
            assert_eq!(settings.log_level, LogLevel::Info);
        }

        #[test]
        fn test_filter_directive() {
            assert_eq!(LogLevel::Warning.as_filter_directive(), "warn");
            assert_eq!(LogLevel::Warning.to_string(), "warning");
        }
    }

    mod log_file {
        use super::*;

        #[test]
        fn test_default_is_under_project_root() {
            let settings = Settings::default();
            assert_eq!(
                settings.log_file(Utf8Path::new("/work/project")),
                Utf8PathBuf::from("/work/project/logs/lsp.log")
            );
        }

        #[test]
        fn test_relative_directory_is_under_project_root() {
            let settings = Settings {
                logs_directory: Some(Utf8PathBuf::from("out/logs")),
                ..Settings::default()
            };
            assert_eq!(
                settings.log_file(Utf8Path::new("/work/project")),
                Utf8PathBuf::from("/work/project/out/logs/lsp.log")
            );
        }

        #[test]
        fn test_absolute_directory_is_used_as_is() {
            let settings = Settings {
                logs_directory: Some(Utf8PathBuf::from("/var/log/gls")),
                ..Settings::default()
            };
            assert_eq!(
                settings.log_file(Utf8Path::new("/work/project")),
                Utf8PathBuf::from("/var/log/gls/lsp.log")
            );
        }
    }

    mod errors {
        use super::*;

        #[test]
        fn test_invalid_toml_content() {
            let dir = tempdir().unwrap();
            fs::write(dir.path().join("gls.toml"), "log_level = = nope").unwrap();
            let result = Settings::new(utf8(dir.path()));
            assert!(result.is_err());
            assert!(matches!(result.unwrap_err(), ConfigError::Config(_)));
        }

        #[test]
        fn test_invalid_toml_keeps_parse_error_as_source() {
            let dir = tempdir().unwrap();
            fs::write(dir.path().join("gls.toml"), "log_level = = nope").unwrap();
            let error = Settings::new(utf8(dir.path())).unwrap_err();

            let source = std::error::Error::source(&error).expect("parse error as source");
            assert!(source.to_string().contains("gls.toml"));
        }
    }
}
