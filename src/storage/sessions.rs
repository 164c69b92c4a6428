use chrono::Utc;
use redb::ReadableTable;

use super::db::{expiry_key, Database, DatabaseError};
use super::models::Session;
use super::tables::*;

impl Database {
    // ========================================================================
    // Session operations
    // ========================================================================

    /// Store a session and maintain the expiration index
    pub fn put_session(&self, session: &Session) -> Result<(), DatabaseError> {
        debug_assert!(!session.token.is_empty(), "session token must not be empty");
        debug_assert!(
            !session.member_id.is_empty(),
            "session member_id must not be empty"
        );

        let write_txn = self.begin_write()?;
        {
            let mut table = write_txn.open_table(SESSIONS)?;
            let data = bincode::serialize(session)?;
            table.insert(session.token.as_str(), data.as_slice())?;

            let mut expiry_table = write_txn.open_table(SESSION_EXPIRY)?;
            let ek = expiry_key(&session.expires_at, &session.token);
            expiry_table.insert(ek.as_str(), session.token.as_str())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Get a session by its secret token value
    pub fn get_session(&self, token: &str) -> Result<Option<Session>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(SESSIONS)?;

        match table.get(token)? {
            Some(data) => Ok(Some(bincode::deserialize(data.value())?)),
            None => Ok(None),
        }
    }

    /// Delete a session, returning whether it existed
    pub fn delete_session(&self, token: &str) -> Result<bool, DatabaseError> {
        let write_txn = self.begin_write()?;
        let existed = {
            let mut table = write_txn.open_table(SESSIONS)?;
            let removed = table.remove(token)?;

            if let Some(data) = &removed {
                let session: Session = bincode::deserialize(data.value())?;
                let mut expiry_table = write_txn.open_table(SESSION_EXPIRY)?;
                let ek = expiry_key(&session.expires_at, token);
                expiry_table.remove(ek.as_str())?;
            }
            removed.is_some()
        };
        write_txn.commit()?;
        Ok(existed)
    }

    /// Remove all sessions whose expiry is in the past, via the expiry index.
    /// Returns the number of sessions removed.
    pub fn cleanup_expired_sessions(&self) -> Result<u64, DatabaseError> {
        // '~' sorts after every hex digit, so this bounds all keys up to now
        let upper = format!("{:020}~", Utc::now().timestamp());

        let write_txn = self.begin_write()?;
        let removed = {
            let mut expiry_table = write_txn.open_table(SESSION_EXPIRY)?;

            let mut expired: Vec<(String, String)> = Vec::new();
            for entry in expiry_table.range::<&str>(..upper.as_str())? {
                let (ek, token) = entry?;
                expired.push((ek.value().to_string(), token.value().to_string()));
            }

            let mut table = write_txn.open_table(SESSIONS)?;
            for (ek, token) in &expired {
                expiry_table.remove(ek.as_str())?;
                table.remove(token.as_str())?;
            }
            expired.len() as u64
        };
        write_txn.commit()?;
        Ok(removed)
    }

    /// Delete every session. Test-mode only.
    pub fn purge_sessions(&self) -> Result<u64, DatabaseError> {
        let write_txn = self.begin_write()?;
        let removed = {
            let mut table = write_txn.open_table(SESSIONS)?;
            let mut tokens = Vec::new();
            for entry in table.iter()? {
                let (token, _) = entry?;
                tokens.push(token.value().to_string());
            }
            for token in &tokens {
                table.remove(token.as_str())?;
            }

            let mut expiry_table = write_txn.open_table(SESSION_EXPIRY)?;
            let mut keys = Vec::new();
            for entry in expiry_table.iter()? {
                let (ek, _) = entry?;
                keys.push(ek.value().to_string());
            }
            for ek in &keys {
                expiry_table.remove(ek.as_str())?;
            }

            tokens.len() as u64
        };
        write_txn.commit()?;
        Ok(removed)
    }
}
