use std::env;
use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

pub const DEFAULT_REDIS_SERVER: &str = "redis";
pub const REDIS_PORT: u16 = 6379;
pub const REDIS_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_SAVE_INTERVAL_SECS: i64 = 60;

pub const DATA_KEY: &str = "rb-podcast-pos:data";
pub const LOG_KEY: &str = "rb-podcast-pos:log";
pub const PURGED_KEY: &str = "rb-podcast-pos:purged";

pub const BACKUP_FILE_NAME: &str = ".rb-podcast-pos.json";

#[derive(Debug, Clone)]
pub struct Config {
    pub redis_server: String,
    pub redis_port: u16,
    pub redis_timeout: Duration,
    pub save_interval_secs: i64,
    pub backup_file: PathBuf,
    pub hostname: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            redis_server: redis_server_from_env(env::var_os("REDIS_SERVER")),
            redis_port: REDIS_PORT,
            redis_timeout: REDIS_TIMEOUT,
            save_interval_secs: save_interval_from_env(env::var_os(
                "RB_PODCAST_POS_SAVE_INTERVAL",
            )),
            backup_file: backup_file_path()?,
            hostname: local_hostname(),
        })
    }
}

pub fn backup_file_path() -> Result<PathBuf> {
    let base = dirs::home_dir().context("unable to resolve home directory")?;
    Ok(base.join(BACKUP_FILE_NAME))
}

pub(crate) fn redis_server_from_env(env_value: Option<OsString>) -> String {
    match env_value.and_then(|value| value.into_string().ok()) {
        Some(value) if !value.is_empty() => value,
        _ => DEFAULT_REDIS_SERVER.to_string(),
    }
}

pub(crate) fn save_interval_from_env(env_value: Option<OsString>) -> i64 {
    env_value
        .and_then(|value| value.into_string().ok())
        .and_then(|value| value.trim().parse::<i64>().ok())
        .filter(|interval| *interval > 0)
        .unwrap_or(DEFAULT_SAVE_INTERVAL_SECS)
}

#[cfg(unix)]
pub fn local_hostname() -> String {
    let mut buf = [0_u8; 256];
    let rc = unsafe { libc::gethostname(buf.as_mut_ptr().cast::<libc::c_char>(), buf.len()) };
    if rc == 0 {
        let len = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
        if let Ok(name) = std::str::from_utf8(&buf[..len])
            && !name.is_empty()
        {
            return name.to_string();
        }
    }
    fallback_hostname()
}

#[cfg(not(unix))]
pub fn local_hostname() -> String {
    fallback_hostname()
}

fn fallback_hostname() -> String {
    env::var("HOSTNAME")
        .ok()
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "localhost".to_string())
}
