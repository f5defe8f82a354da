use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use chrono::Local;
use tracing::{debug, warn};

use crate::config::{Config, DATA_KEY, LOG_KEY, PURGED_KEY};
use crate::player::Notifier;
use crate::store::{BackupStore, RemoteStore, StoreError};
use crate::table::{PositionRecord, PositionTable, local_file_path};

pub struct Engine {
    pub(crate) config: Config,
    remote: RemoteStore,
    backup: BackupStore,
    pub(crate) table: PositionTable,
    pub(crate) last_save: i64,
}

impl Engine {
    pub fn new(config: Config) -> Result<Self> {
        let remote = RemoteStore::new(
            &config.redis_server,
            config.redis_port,
            config.redis_timeout,
        )
        .context("failed to set up remote store client")?;
        let backup = BackupStore::new(config.backup_file.clone());
        Ok(Self {
            remote,
            backup,
            table: PositionTable::new(),
            last_save: unix_now(),
            config,
        })
    }

    // Prefers the shared redis snapshot, falls back to the local backup
    // file, falls back to an empty table.
    pub fn load(&mut self, notifier: &dyn Notifier) {
        if let Some(table) = self.load_remote() {
            self.table = table;
            notifier.show_message(&format!("Loaded {} entries from redis", self.table.len()));
            return;
        }

        match self.backup.read() {
            Ok(table) => {
                self.table = table;
                notifier.show_message(&format!(
                    "Loaded {} entries from local backup",
                    self.table.len()
                ));
            }
            Err(StoreError::NotFound) => {
                debug!("no local backup yet, starting empty");
                self.table = PositionTable::new();
            }
            Err(err) => {
                warn!("local backup unreadable, starting empty: {err}");
                self.table = PositionTable::new();
            }
        }
    }

    fn load_remote(&self) -> Option<PositionTable> {
        match self.remote.get(DATA_KEY) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(table) => Some(table),
                Err(err) => {
                    warn!("remote snapshot is malformed: {err}");
                    None
                }
            },
            Err(StoreError::NotFound) => {
                debug!("no snapshot stored in redis yet");
                None
            }
            Err(StoreError::Timeout) => {
                warn!("redis timed out while loading");
                None
            }
            Err(StoreError::Unavailable(err)) => {
                warn!("redis unavailable while loading: {err}");
                None
            }
            Err(StoreError::Malformed(err)) => {
                warn!("redis returned malformed data: {err}");
                None
            }
        }
    }

    // The local backup write is never skipped; remote writes are
    // best-effort.
    pub fn save(&mut self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.table)
            .context("failed to serialize position table")?;
        self.backup.write(&json).with_context(|| {
            format!(
                "failed to write local backup at {}",
                self.backup.path().display()
            )
        })?;

        match self.remote.set(DATA_KEY, &json) {
            Ok(()) => {
                let status = format!(
                    "{}@{}, count={}",
                    self.config.hostname,
                    Local::now().format("%c"),
                    self.table.len()
                );
                if let Err(err) = self.remote.set(LOG_KEY, &status) {
                    debug!("status write skipped: {err}");
                }
            }
            Err(err) => debug!("remote snapshot write skipped: {err}"),
        }

        self.last_save = unix_now();
        Ok(())
    }

    // Drops this host's claim on every tracked item whose local file is
    // gone, deletes records nobody claims anymore, then saves. An item a
    // host never re-checks keeps its claim indefinitely.
    pub fn purge_and_save(&mut self) -> Result<()> {
        let mut purged = Vec::new();
        for (key, record) in self.table.iter_mut() {
            if !record.has_host(&self.config.hostname) {
                continue;
            }
            // A host can only judge files on its own filesystem; claims on
            // items without a file scheme are left alone.
            let Some(path) = local_file_path(key) else {
                continue;
            };
            if !path.is_file() {
                record.drop_host(&self.config.hostname);
                if record.hosts.is_empty() {
                    purged.push(key.clone());
                }
            }
        }

        if !purged.is_empty() {
            let purge_date = Local::now().format("%c").to_string();
            let mut remote_up = true;
            for key in &purged {
                self.table.remove(key);
                if remote_up {
                    if let Err(err) = self
                        .remote
                        .append(PURGED_KEY, &format!("{purge_date}, {key}\n"))
                    {
                        debug!("purge audit write skipped: {err}");
                        remote_up = false;
                    }
                }
            }
        }

        self.save()
    }

    pub fn shutdown(&mut self, notifier: &dyn Notifier) -> Result<()> {
        self.purge_and_save()?;
        notifier.show_message(&format!("Saved {} entries to redis", self.table.len()));
        Ok(())
    }

    // A resume lookup also claims the item for this host.
    pub fn resume_position(&mut self, location: &str) -> Option<u32> {
        let record = self.table.get_mut(location)?;
        record.claim_host(&self.config.hostname);
        Some(record.pos)
    }

    pub fn track_elapsed(&mut self, location: &str, pos: u32) {
        if let Some(record) = self.table.get_mut(location) {
            record.pos = pos;
            return;
        }
        self.table.insert(
            location.to_string(),
            PositionRecord::new(unix_now(), pos, &self.config.hostname),
        );
    }

    pub fn save_due(&self) -> bool {
        unix_now() - self.last_save >= self.config.save_interval_secs
    }

    pub fn table(&self) -> &PositionTable {
        &self.table
    }

    pub fn hostname(&self) -> &str {
        &self.config.hostname
    }

    pub fn remote(&self) -> &RemoteStore {
        &self.remote
    }

    pub fn backup(&self) -> &BackupStore {
        &self.backup
    }
}

pub(crate) fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
pub(crate) mod testsupport {
    use super::*;
    use std::net::TcpListener;
    use std::path::Path;
    use std::time::Duration;

    // A port that was bound and released again; nothing listens there.
    pub(crate) fn dead_port() -> u16 {
        let listener = TcpListener::bind(("127.0.0.1", 0)).expect("bind probe");
        listener.local_addr().expect("local addr").port()
    }

    pub(crate) fn engine_at(backup_file: &Path, hostname: &str) -> Engine {
        let config = Config {
            redis_server: "127.0.0.1".to_string(),
            redis_port: dead_port(),
            redis_timeout: Duration::from_millis(100),
            save_interval_secs: 60,
            backup_file: backup_file.to_path_buf(),
            hostname: hostname.to_string(),
        };
        Engine::new(config).expect("engine should build")
    }
}
