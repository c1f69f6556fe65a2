//! Configuration file loader with multi-source merging

use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};

/// Project-level config file name
pub const PROJECT_CONFIG_FILE: &str = "cok.toml";

/// Prefix of environment overrides, e.g. `COK_PIPELINE__NUM_RATIONALES=3`
pub const ENV_PREFIX: &str = "COK_";

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables prefixed `COK_` (`__` separates sections)
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./cok.toml`
    /// 4. Global: `$XDG_CONFIG_HOME/chain-of-knowledge/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&PathBuf>) -> Result<FileConfig, Box<figment::Error>> {
        Self::figment(
            Self::global_config_path().as_deref(),
            Some(Path::new(PROJECT_CONFIG_FILE)),
            config_path.map(PathBuf::as_path),
        )
        .extract()
        .map_err(Box::new)
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    fn figment(global: Option<&Path>, project: Option<&Path>, explicit: Option<&Path>) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        for path in [global, project].into_iter().flatten() {
            if path.exists() {
                figment = figment.merge(Toml::file(path));
            }
        }

        // An explicit path must exist; Toml::file would silently skip it
        if let Some(path) = explicit {
            figment = figment.merge(Toml::file_exact(path));
        }

        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Get the global config file path
    ///
    /// Returns XDG_CONFIG_HOME/chain-of-knowledge/config.toml if set,
    /// otherwise falls back to ~/.config/chain-of-knowledge/config.toml
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("chain-of-knowledge").join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        let path = PathBuf::from(PROJECT_CONFIG_FILE);
        path.exists().then_some(path)
    }

    /// Print the config file locations being used (for debugging)
    pub fn print_config_sources(explicit: Option<&PathBuf>) {
        println!("Configuration sources (in priority order):");

        println!("  [     ] Env:     {}*", ENV_PREFIX);

        if let Some(path) = explicit {
            let mark = if path.exists() { "FOUND" } else { "MISSING" };
            println!("  [{:<5}] Flag:    {}", mark, path.display());
        }

        if let Some(path) = Self::project_config_path() {
            println!("  [FOUND] Project: {}", path.display());
        } else {
            println!("  [     ] Project: ./{}", PROJECT_CONFIG_FILE);
        }

        if let Some(path) = Self::global_config_path() {
            if path.exists() {
                println!("  [FOUND] Global:  {}", path.display());
            } else {
                println!("  [     ] Global:  {}", path.display());
            }
        }

        println!("  [     ] Default: built-in defaults");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_toml(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_defaults() {
        let config = ConfigLoader::load_defaults();
        assert_eq!(config.pipeline.num_rationales, 5);
        assert!(config.pipeline.early_stopping);
    }

    #[test]
    fn test_global_config_path_returns_some() {
        // Should return a path (even if file doesn't exist)
        let path = ConfigLoader::global_config_path();
        assert!(path.is_some());
        let path = path.unwrap();
        assert!(path.to_string_lossy().contains("chain-of-knowledge"));
    }

    #[test]
    fn test_explicit_file_overrides_project_file() {
        let project = write_toml("[pipeline]\nnum_rationales = 7\nconsensus_threshold = 0.5\n");
        let explicit = write_toml("[pipeline]\nnum_rationales = 3\n");

        figment::Jail::expect_with(|_| {
            let config: FileConfig =
                ConfigLoader::figment(None, Some(project.path()), Some(explicit.path()))
                    .extract()?;
            assert_eq!(config.pipeline.num_rationales, 3);
            assert_eq!(config.pipeline.consensus_threshold, 0.5);
            assert_eq!(config.retrieval.max_snippets, 5);
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_files() {
        let explicit = write_toml("[completion]\nmodel = \"from-file\"\n");

        figment::Jail::expect_with(|jail| {
            jail.set_env("COK_COMPLETION__MODEL", "from-env");
            jail.set_env("COK_PIPELINE__EARLY_STOPPING", "false");

            let config: FileConfig =
                ConfigLoader::figment(None, None, Some(explicit.path())).extract()?;
            assert_eq!(config.completion.model, "from-env");
            assert!(!config.pipeline.early_stopping);
            Ok(())
        });
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let result: Result<FileConfig, _> = ConfigLoader::figment(
            None,
            None,
            Some(Path::new("/nonexistent/cok-config.toml")),
        )
        .extract();
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_global_file_is_skipped() {
        figment::Jail::expect_with(|_| {
            let config: FileConfig =
                ConfigLoader::figment(Some(Path::new("/nonexistent/global.toml")), None, None)
                    .extract()?;
            assert_eq!(config, FileConfig::default());
            Ok(())
        });
    }
}
