use std::time::Duration;

use redis::Connection;
use tracing::debug;

use super::StoreError;

pub struct RemoteStore {
    client: redis::Client,
    timeout: Duration,
}

impl RemoteStore {
    pub fn new(server: &str, port: u16, timeout: Duration) -> Result<Self, StoreError> {
        let url = format!("redis://{server}:{port}/");
        let client =
            redis::Client::open(url).map_err(|err| StoreError::Unavailable(err.to_string()))?;
        Ok(Self { client, timeout })
    }

    pub fn get(&self, key: &str) -> Result<String, StoreError> {
        let mut conn = self.connect()?;
        let value: Option<String> = redis::cmd("GET")
            .arg(key)
            .query(&mut conn)
            .map_err(classify)?;
        value.ok_or(StoreError::NotFound)
    }

    pub fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut conn = self.connect()?;
        redis::cmd("SET")
            .arg(key)
            .arg(value)
            .query::<()>(&mut conn)
            .map_err(classify)
    }

    pub fn append(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut conn = self.connect()?;
        let new_len: i64 = redis::cmd("APPEND")
            .arg(key)
            .arg(value)
            .query(&mut conn)
            .map_err(classify)?;
        debug!("appended to {key}, value is now {new_len} bytes");
        Ok(())
    }

    // Each operation opens its own connection, bounded by the fixed timeout.
    fn connect(&self) -> Result<Connection, StoreError> {
        let conn = self
            .client
            .get_connection_with_timeout(self.timeout)
            .map_err(classify)?;
        conn.set_read_timeout(Some(self.timeout)).map_err(classify)?;
        conn.set_write_timeout(Some(self.timeout))
            .map_err(classify)?;
        Ok(conn)
    }
}

fn classify(err: redis::RedisError) -> StoreError {
    if err.is_timeout() {
        StoreError::Timeout
    } else if err.kind() == redis::ErrorKind::TypeError {
        StoreError::Malformed(err.to_string())
    } else {
        StoreError::Unavailable(err.to_string())
    }
}
