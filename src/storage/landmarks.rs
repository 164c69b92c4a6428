use redb::ReadableTable;

use super::db::{Database, DatabaseError};
use super::models::Landmark;
use super::tables::*;

/// Result of a landmark ownership claim
#[derive(Debug, Clone)]
pub struct ClaimOutcome {
    pub landmark: Landmark,
    /// Member who held the landmark before this claim, if any
    pub previous_owner_id: Option<String>,
}

impl Database {
    // ========================================================================
    // Landmark operations
    // ========================================================================

    pub fn put_landmark(&self, landmark: &Landmark) -> Result<(), DatabaseError> {
        debug_assert!(!landmark.id.is_empty(), "landmark id must not be empty");

        let write_txn = self.begin_write()?;
        {
            let mut table = write_txn.open_table(LANDMARKS)?;
            let data = bincode::serialize(landmark)?;
            table.insert(landmark.id.as_str(), data.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    pub fn get_landmark(&self, id: &str) -> Result<Option<Landmark>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(LANDMARKS)?;

        match table.get(id)? {
            Some(data) => Ok(Some(bincode::deserialize(data.value())?)),
            None => Ok(None),
        }
    }

    /// Record a visit, returning the updated landmark
    pub fn visit_landmark(&self, id: &str) -> Result<Option<Landmark>, DatabaseError> {
        let write_txn = self.begin_write()?;
        let updated = {
            let mut table = write_txn.open_table(LANDMARKS)?;
            let existing = match table.get(id)? {
                Some(data) => Some(bincode::deserialize::<Landmark>(data.value())?),
                None => None,
            };

            match existing {
                Some(mut landmark) => {
                    landmark.visit_count += 1;
                    let data = bincode::serialize(&landmark)?;
                    table.insert(id, data.as_slice())?;
                    Some(landmark)
                }
                None => None,
            }
        };
        write_txn.commit()?;
        Ok(updated)
    }

    /// Make the member the landmark's representative, reporting who held it before
    pub fn claim_landmark(
        &self,
        id: &str,
        member_id: &str,
    ) -> Result<Option<ClaimOutcome>, DatabaseError> {
        let write_txn = self.begin_write()?;
        let outcome = {
            let mut table = write_txn.open_table(LANDMARKS)?;
            let existing = match table.get(id)? {
                Some(data) => Some(bincode::deserialize::<Landmark>(data.value())?),
                None => None,
            };

            match existing {
                Some(mut landmark) => {
                    let previous_owner_id = landmark.owner_id.take();
                    landmark.owner_id = Some(member_id.to_string());
                    let data = bincode::serialize(&landmark)?;
                    table.insert(id, data.as_slice())?;
                    Some(ClaimOutcome {
                        landmark,
                        previous_owner_id,
                    })
                }
                None => None,
            }
        };
        write_txn.commit()?;
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use crate::testutil::{make_landmark, setup_db};

    #[test]
    fn visits_accumulate() {
        let (db, _temp) = setup_db();
        db.put_landmark(&make_landmark("l1", "Namsan Tower")).unwrap();

        db.visit_landmark("l1").unwrap().unwrap();
        let landmark = db.visit_landmark("l1").unwrap().unwrap();
        assert_eq!(landmark.visit_count, 2);

        assert!(db.visit_landmark("missing").unwrap().is_none());
    }

    #[test]
    fn claim_reports_previous_owner() {
        let (db, _temp) = setup_db();
        db.put_landmark(&make_landmark("l1", "Gwanghwamun")).unwrap();

        // Unowned until claimed
        let outcome = db.claim_landmark("l1", "m1").unwrap().unwrap();
        assert!(outcome.previous_owner_id.is_none());
        assert_eq!(outcome.landmark.owner_id.as_deref(), Some("m1"));

        let outcome = db.claim_landmark("l1", "m2").unwrap().unwrap();
        assert_eq!(outcome.previous_owner_id.as_deref(), Some("m1"));
        assert_eq!(outcome.landmark.owner_id.as_deref(), Some("m2"));
    }
}
