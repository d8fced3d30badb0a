use anyhow::bail;

use super::structure::{RagConfigInner, RagConfigTOML};
use std::{
    ops::{Deref, DerefMut},
    path::PathBuf,
};

#[derive(Debug, Clone)]
pub struct RagConfig {
    pub path: PathBuf,
    cached: RagConfigTOML,
}

impl RagConfig {
    pub fn read(path: PathBuf) -> Result<Self, anyhow::Error> {
        let path = match path.is_dir() {
            true => path.join("config.toml"),
            false => path,
        };

        if !path.exists() {
            log::info!("no config at {}, writing defaults", path.display());
            return Self::new(path);
        }

        if !path.is_file() {
            bail!(
                "Given path exists and is not a file... either change the path or delete the file."
            );
        }

        let config_str = std::fs::read_to_string(&path)?;

        Ok(Self {
            path,
            cached: toml::from_str(&config_str)?,
        })
    }

    fn new(path: PathBuf) -> Result<Self, anyhow::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let config = Self {
            path,
            cached: RagConfigTOML::default(),
        };

        config.save()?;

        Ok(config)
    }

    pub fn save(&self) -> Result<(), anyhow::Error> {
        std::fs::write(&self.path, toml::to_string(&self.cached)?)?;

        Ok(())
    }
}

impl Deref for RagConfig {
    type Target = RagConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.cached.config
    }
}

impl DerefMut for RagConfig {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.cached.config
    }
}

impl PartialEq for RagConfig {
    fn eq(&self, other: &Self) -> bool {
        self.cached.config == other.cached.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("ragchain-{}-{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn missing_file_is_created_with_defaults() {
        let dir = scratch_dir("create");
        let path = dir.join("nested").join("config.toml");

        let config = RagConfig::read(path.clone()).unwrap();
        assert!(path.is_file());
        assert_eq!(config.retrieval.k, 2);

        let reread = RagConfig::read(path).unwrap();
        assert_eq!(config, reread);

        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn directory_resolves_to_config_toml() {
        let dir = scratch_dir("dir");
        std::fs::create_dir_all(&dir).unwrap();

        let mut config = RagConfig::read(dir.clone()).unwrap();
        assert_eq!(config.path, dir.join("config.toml"));

        config.llm.model = "gpt-4o".to_string();
        config.save().unwrap();

        let reread = RagConfig::read(dir.clone()).unwrap();
        assert_eq!(reread.llm.model, "gpt-4o");

        std::fs::remove_dir_all(dir).unwrap();
    }
}
