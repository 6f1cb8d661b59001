use anyhow::{anyhow, Result};
use std::env;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct PitchbridgeConfig {
    pub api_port: u16,
    pub paths: PitchbridgePaths,
    pub upload: UploadConfig,
}

impl PitchbridgeConfig {
    pub fn from_env() -> Result<Self> {
        let paths = PitchbridgePaths::discover()?;
        let api_port = env::var("PITCHBRIDGE_API_PORT")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(8080);
        Ok(Self {
            api_port,
            paths,
            upload: UploadConfig::from_env(),
        })
    }

    pub fn new(api_port: u16, paths: PitchbridgePaths) -> Self {
        Self {
            api_port,
            paths,
            upload: UploadConfig::from_env(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct UploadConfig {
    pub max_upload_bytes: Option<u64>,
}

impl UploadConfig {
    pub fn from_env() -> Self {
        let max_upload_bytes = env::var("PITCHBRIDGE_MAX_UPLOAD_BYTES")
            .ok()
            .and_then(|raw| raw.parse::<u64>().ok());
        Self { max_upload_bytes }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PitchbridgePaths {
    pub base: PathBuf,
    pub data_dir: PathBuf,
    pub db_path: PathBuf,
    pub uploads_dir: PathBuf,
    pub logs_dir: PathBuf,
}

impl PitchbridgePaths {
    /// Resolves the base directory from `PITCHBRIDGE_BASE_DIR`, falling back
    /// to the directory the executable lives in.
    pub fn discover() -> Result<Self> {
        if let Ok(base) = env::var("PITCHBRIDGE_BASE_DIR") {
            if !base.trim().is_empty() {
                return Self::from_base_dir(base);
            }
        }
        let exe_path = std::env::current_exe()
            .map_err(|err| anyhow!("failed to resolve current executable: {err}"))?;
        let base = exe_path
            .parent()
            .ok_or_else(|| anyhow!("executable path missing parent"))?
            .to_path_buf();
        Self::from_base_dir(base)
    }

    pub fn from_base_dir<P: AsRef<Path>>(base: P) -> Result<Self> {
        let base = base.as_ref().to_path_buf();
        let data_dir = base.join("data");
        let db_path = data_dir.join("pitchbridge.db");
        let uploads_dir = base.join("uploads");
        let logs_dir = base.join("logs");

        Ok(Self {
            base,
            data_dir,
            db_path,
            uploads_dir,
            logs_dir,
        })
    }
}
