use redb::ReadableTable;

use super::db::{Database, DatabaseError};
use super::models::Member;
use super::tables::*;
use crate::auth::provider::Provider;

fn provider_key(provider: Provider, key: &str) -> String {
    format!("{}:{key}", provider.as_str())
}

impl Database {
    // ========================================================================
    // Member operations
    // ========================================================================

    /// Store a member and maintain the provider index
    pub fn put_member(&self, member: &Member) -> Result<(), DatabaseError> {
        debug_assert!(!member.id.is_empty(), "member id must not be empty");
        debug_assert!(
            !member.provider_key.is_empty(),
            "member provider_key must not be empty"
        );

        let write_txn = self.begin_write()?;
        {
            let mut table = write_txn.open_table(MEMBERS)?;
            let data = bincode::serialize(member)?;
            table.insert(member.id.as_str(), data.as_slice())?;

            let mut index = write_txn.open_table(MEMBER_PROVIDERS)?;
            let pk = provider_key(member.provider, &member.provider_key);
            index.insert(pk.as_str(), member.id.as_str())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    pub fn get_member(&self, id: &str) -> Result<Option<Member>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(MEMBERS)?;

        match table.get(id)? {
            Some(data) => Ok(Some(bincode::deserialize(data.value())?)),
            None => Ok(None),
        }
    }

    /// Look up a member by the identity the provider reported
    pub fn find_member_by_provider(
        &self,
        provider: Provider,
        key: &str,
    ) -> Result<Option<Member>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let index = read_txn.open_table(MEMBER_PROVIDERS)?;

        let pk = provider_key(provider, key);
        let member_id = match index.get(pk.as_str())? {
            Some(id) => id.value().to_string(),
            None => return Ok(None),
        };

        let table = read_txn.open_table(MEMBERS)?;
        match table.get(member_id.as_str())? {
            Some(data) => Ok(Some(bincode::deserialize(data.value())?)),
            None => Ok(None),
        }
    }

    /// Apply a mutation to a stored member, returning the updated record
    pub fn update_member<F>(&self, id: &str, f: F) -> Result<Option<Member>, DatabaseError>
    where
        F: FnOnce(&mut Member),
    {
        let write_txn = self.begin_write()?;
        let updated = {
            let mut table = write_txn.open_table(MEMBERS)?;
            let existing = match table.get(id)? {
                Some(data) => Some(bincode::deserialize::<Member>(data.value())?),
                None => None,
            };

            match existing {
                Some(mut member) => {
                    f(&mut member);
                    let data = bincode::serialize(&member)?;
                    table.insert(id, data.as_slice())?;
                    Some(member)
                }
                None => None,
            }
        };
        write_txn.commit()?;
        Ok(updated)
    }

    /// Award activity points to a member
    pub fn add_point(&self, id: &str, amount: u64) -> Result<Option<Member>, DatabaseError> {
        self.update_member(id, |m| m.point += amount)
    }
}

#[cfg(test)]
mod tests {
    use crate::auth::provider::Provider;
    use crate::testutil::{make_member, setup_db};

    #[test]
    fn member_roundtrip_and_provider_lookup() {
        let (db, _temp) = setup_db();

        let member = make_member("m1", Provider::Kakao, "kakao-123");
        db.put_member(&member).unwrap();

        let fetched = db.get_member("m1").unwrap().unwrap();
        assert_eq!(fetched.nickname, member.nickname);

        let found = db
            .find_member_by_provider(Provider::Kakao, "kakao-123")
            .unwrap()
            .unwrap();
        assert_eq!(found.id, "m1");

        // Same key under a different provider is a different identity
        let missing = db
            .find_member_by_provider(Provider::Naver, "kakao-123")
            .unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn update_and_points() {
        let (db, _temp) = setup_db();

        let member = make_member("m1", Provider::Google, "g-1");
        db.put_member(&member).unwrap();

        let updated = db
            .update_member("m1", |m| m.nickname = "renamed".to_string())
            .unwrap()
            .unwrap();
        assert_eq!(updated.nickname, "renamed");

        let updated = db.add_point("m1", 50).unwrap().unwrap();
        assert_eq!(updated.point, 50);

        assert!(db.update_member("missing", |_| {}).unwrap().is_none());
    }
}
