use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub type PositionTable = HashMap<String, PositionRecord>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionRecord {
    pub timestamp: i64,
    pub pos: u32,
    pub hosts: Vec<String>,
}

impl PositionRecord {
    pub fn new(timestamp: i64, pos: u32, host: &str) -> Self {
        Self {
            timestamp,
            pos,
            hosts: vec![host.to_string()],
        }
    }

    pub fn has_host(&self, host: &str) -> bool {
        self.hosts.iter().any(|known| known == host)
    }

    pub fn claim_host(&mut self, host: &str) {
        if !self.has_host(host) {
            self.hosts.push(host.to_string());
        }
    }

    pub fn drop_host(&mut self, host: &str) {
        self.hosts.retain(|known| known != host);
    }
}

pub fn local_file_path(location: &str) -> Option<PathBuf> {
    let raw = location.strip_prefix("file://")?;
    let decoded = urlencoding::decode(raw)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| raw.to_string());
    Some(PathBuf::from(decoded))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claim_host_keeps_hosts_unique() {
        let mut record = PositionRecord::new(1700000000, 42, "alpha");
        record.claim_host("beta");
        record.claim_host("beta");
        record.claim_host("alpha");
        assert_eq!(record.hosts, vec!["alpha", "beta"]);
    }

    #[test]
    fn drop_host_removes_only_the_named_host() {
        let mut record = PositionRecord::new(1700000000, 42, "alpha");
        record.claim_host("beta");
        record.drop_host("alpha");
        assert_eq!(record.hosts, vec!["beta"]);
        record.drop_host("gamma");
        assert_eq!(record.hosts, vec!["beta"]);
    }

    #[test]
    fn local_file_path_strips_scheme_and_decodes() {
        let path = local_file_path("file:///podcasts/My%20Show/episode%201.mp3")
            .expect("file uri should resolve");
        assert_eq!(path, PathBuf::from("/podcasts/My Show/episode 1.mp3"));
    }

    #[test]
    fn local_file_path_rejects_non_file_schemes() {
        assert_eq!(local_file_path("http://example.test/episode.mp3"), None);
        assert_eq!(local_file_path("/podcasts/episode.mp3"), None);
    }

    #[test]
    fn record_json_shape_round_trips() {
        let record = PositionRecord {
            timestamp: 1700000000,
            pos: 321,
            hosts: vec!["alpha".to_string(), "beta".to_string()],
        };
        let json = serde_json::to_string(&record).expect("record should serialize");
        let parsed: PositionRecord = serde_json::from_str(&json).expect("record should parse");
        assert_eq!(parsed, record);
    }

    #[test]
    fn record_parses_snapshot_written_by_older_tooling() {
        let raw = r#"{"timestamp": 1447710000, "pos": 614, "hosts": ["den", "laptop"]}"#;
        let parsed: PositionRecord = serde_json::from_str(raw).expect("snapshot should parse");
        assert_eq!(parsed.pos, 614);
        assert_eq!(parsed.hosts, vec!["den", "laptop"]);
    }
}
