use serde::{Deserialize, Serialize};
use std::path::PathBuf;

lazy_static::lazy_static! {
    static ref DEFAULT_ALLOWED_TYPES: Vec<String> = [
        "image/jpeg",
        "image/jpg",
        "image/png",
        "image/gif",
        "video/mp4",
        "video/avi",
        "video/mov",
        "video/webm",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
}

const DEFAULT_MAX_BYTES: usize = 50 * 1024 * 1024;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub version: f32,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub upload: UploadConfig,
    #[serde(default)]
    pub image: ImageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    pub dir: PathBuf,
    pub max_bytes: usize,
    pub allowed_types: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageConfig {
    pub size: Vec<u32>,
    pub channels: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 3000 }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("model/detector.pt"),
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("uploads"),
            max_bytes: DEFAULT_MAX_BYTES,
            allowed_types: DEFAULT_ALLOWED_TYPES.clone(),
        }
    }
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            size: vec![224, 224],
            channels: 3,
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            version: 1.0,
            server: ServerConfig::default(),
            model: ModelConfig::default(),
            upload: UploadConfig::default(),
            image: ImageConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Loads `config/service.yaml` relative to the workspace, falling back to
    /// built-in defaults when the file is absent. Environment variables
    /// `PORT`, `MODEL_PATH` and `UPLOAD_DIR` override the file values.
    pub fn load() -> Self {
        let mut config = Self::read_file().unwrap_or_else(|e| {
            log::warn!("Using default service config: {}", e);
            Self::default()
        });

        if let Ok(port) = std::env::var("PORT") {
            if let Ok(port) = port.parse() {
                config.server.port = port;
            }
        }
        if let Ok(path) = std::env::var("MODEL_PATH") {
            config.model.path = PathBuf::from(path);
        }
        if let Ok(dir) = std::env::var("UPLOAD_DIR") {
            config.upload.dir = PathBuf::from(dir);
        }

        config
    }

    fn read_file() -> Result<Self, Box<dyn std::error::Error>> {
        let manifest_dir =
            std::env::var("CARGO_MANIFEST_DIR").map_err(|_| "Failed to get manifest directory")?;
        let config_path = format!("{}/../config/service.yaml", manifest_dir);
        let config_str = std::fs::read_to_string(config_path)?;
        let config: ServiceConfig = serde_yaml::from_str(&config_str)?;
        Ok(config)
    }

    pub fn is_allowed_type(&self, mime: &str) -> bool {
        self.upload.allowed_types.iter().any(|t| t == mime)
    }

    pub fn image_size(&self) -> (u32, u32) {
        (self.image.size[0], self.image.size[1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_upload_contract() {
        let config = ServiceConfig::default();
        assert_eq!(config.upload.max_bytes, 50 * 1024 * 1024);
        assert!(config.is_allowed_type("image/png"));
        assert!(config.is_allowed_type("video/webm"));
        assert!(!config.is_allowed_type("text/plain"));
        assert_eq!(config.image_size(), (224, 224));
    }

    #[test]
    fn file_config_parses() {
        let yaml = r#"
version: 1.0
server:
  port: 8080
model:
  path: /tmp/other.pt
upload:
  dir: /tmp/uploads
  max_bytes: 1024
  allowed_types: [image/png]
image:
  size: [224, 224]
  channels: 3
"#;
        let config: ServiceConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.upload.max_bytes, 1024);
        assert!(!config.is_allowed_type("image/jpeg"));
    }
}
