use chrono::Utc;
use redb::ReadableTable;

use super::db::{edge_key, Database, DatabaseError};
use super::models::{Like, Scrap, Spot};
use super::tables::*;

/// Outcome of a soft delete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpotDelete {
    AlreadyDeleted,
    Deleted,
    NotFound,
}

/// State of a like/scrap edge after a toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleState {
    /// True when the toggle turned the edge on
    pub active: bool,
    /// The spot's counter after the toggle
    pub count: u64,
}

impl Database {
    // ========================================================================
    // Spot operations
    // ========================================================================

    pub fn put_spot(&self, spot: &Spot) -> Result<(), DatabaseError> {
        debug_assert!(!spot.id.is_empty(), "spot id must not be empty");
        debug_assert!(!spot.member_id.is_empty(), "spot member_id must not be empty");

        let write_txn = self.begin_write()?;
        {
            let mut table = write_txn.open_table(SPOTS)?;
            let data = bincode::serialize(spot)?;
            table.insert(spot.id.as_str(), data.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    pub fn get_spot(&self, id: &str) -> Result<Option<Spot>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(SPOTS)?;

        match table.get(id)? {
            Some(data) => Ok(Some(bincode::deserialize(data.value())?)),
            None => Ok(None),
        }
    }

    /// Soft-delete a spot owned by the given member.
    ///
    /// Deleting someone else's spot reports `NotFound` rather than
    /// acknowledging the spot exists.
    pub fn delete_spot(&self, id: &str, member_id: &str) -> Result<SpotDelete, DatabaseError> {
        let write_txn = self.begin_write()?;
        let outcome = {
            let mut table = write_txn.open_table(SPOTS)?;
            let existing = match table.get(id)? {
                Some(data) => Some(bincode::deserialize::<Spot>(data.value())?),
                None => None,
            };

            match existing {
                Some(mut spot) if spot.member_id == member_id => {
                    if spot.deleted {
                        SpotDelete::AlreadyDeleted
                    } else {
                        spot.deleted = true;
                        let data = bincode::serialize(&spot)?;
                        table.insert(id, data.as_slice())?;
                        SpotDelete::Deleted
                    }
                }
                _ => SpotDelete::NotFound,
            }
        };
        write_txn.commit()?;
        Ok(outcome)
    }

    /// List a member's spots, newest first
    pub fn list_spots_by_member(&self, member_id: &str) -> Result<Vec<Spot>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(SPOTS)?;

        let mut spots = Vec::new();
        for entry in table.iter()? {
            let (_, data) = entry?;
            let spot: Spot = bincode::deserialize(data.value())?;
            if spot.member_id == member_id && !spot.deleted {
                spots.push(spot);
            }
        }
        spots.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(spots)
    }

    /// List spots inside a bounding box, newest first
    pub fn list_spots_in_bounds(
        &self,
        west: f64,
        south: f64,
        east: f64,
        north: f64,
    ) -> Result<Vec<Spot>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(SPOTS)?;

        let mut spots = Vec::new();
        for entry in table.iter()? {
            let (_, data) = entry?;
            let spot: Spot = bincode::deserialize(data.value())?;
            if spot.deleted {
                continue;
            }
            let c = spot.coordinate;
            if c.lng >= west && c.lng <= east && c.lat >= south && c.lat <= north {
                spots.push(spot);
            }
        }
        spots.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(spots)
    }

    // ========================================================================
    // Like / scrap toggles
    // ========================================================================

    /// Toggle the member's like on a spot inside a single write transaction.
    ///
    /// Returns `None` when the spot does not exist or is deleted. The
    /// counter never goes below zero.
    pub fn toggle_like(
        &self,
        member_id: &str,
        spot_id: &str,
    ) -> Result<Option<ToggleState>, DatabaseError> {
        let write_txn = self.begin_write()?;
        let state = {
            let mut spots = write_txn.open_table(SPOTS)?;
            let existing = match spots.get(spot_id)? {
                Some(data) => Some(bincode::deserialize::<Spot>(data.value())?),
                None => None,
            };

            match existing {
                Some(mut spot) if !spot.deleted => {
                    let mut likes = write_txn.open_table(LIKES)?;
                    let key = edge_key(member_id, spot_id);

                    let active = if likes.get(key.as_str())?.is_some() {
                        likes.remove(key.as_str())?;
                        spot.like_count = spot.like_count.saturating_sub(1);
                        false
                    } else {
                        let like = Like {
                            created_at: Utc::now(),
                            member_id: member_id.to_string(),
                            spot_id: spot_id.to_string(),
                        };
                        let data = bincode::serialize(&like)?;
                        likes.insert(key.as_str(), data.as_slice())?;
                        spot.like_count += 1;
                        true
                    };

                    let data = bincode::serialize(&spot)?;
                    spots.insert(spot_id, data.as_slice())?;
                    Some(ToggleState {
                        active,
                        count: spot.like_count,
                    })
                }
                _ => None,
            }
        };
        write_txn.commit()?;
        Ok(state)
    }

    /// Toggle the member's scrap on a spot, maintaining the per-member index
    pub fn toggle_scrap(
        &self,
        member_id: &str,
        spot_id: &str,
    ) -> Result<Option<ToggleState>, DatabaseError> {
        let write_txn = self.begin_write()?;
        let state = {
            let mut spots = write_txn.open_table(SPOTS)?;
            let existing = match spots.get(spot_id)? {
                Some(data) => Some(bincode::deserialize::<Spot>(data.value())?),
                None => None,
            };

            match existing {
                Some(mut spot) if !spot.deleted => {
                    let mut scraps = write_txn.open_table(SCRAPS)?;
                    let mut index = write_txn.open_table(MEMBER_SCRAPS)?;
                    let key = edge_key(member_id, spot_id);

                    let mut scrapped: Vec<String> = index
                        .get(member_id)?
                        .map(|v| bincode::deserialize(v.value()))
                        .transpose()?
                        .unwrap_or_default();

                    let active = if scraps.get(key.as_str())?.is_some() {
                        scraps.remove(key.as_str())?;
                        scrapped.retain(|id| id != spot_id);
                        spot.scrap_count = spot.scrap_count.saturating_sub(1);
                        false
                    } else {
                        let scrap = Scrap {
                            created_at: Utc::now(),
                            member_id: member_id.to_string(),
                            spot_id: spot_id.to_string(),
                        };
                        let data = bincode::serialize(&scrap)?;
                        scraps.insert(key.as_str(), data.as_slice())?;
                        scrapped.push(spot_id.to_string());
                        spot.scrap_count += 1;
                        true
                    };

                    let index_data = bincode::serialize(&scrapped)?;
                    index.insert(member_id, index_data.as_slice())?;

                    let data = bincode::serialize(&spot)?;
                    spots.insert(spot_id, data.as_slice())?;
                    Some(ToggleState {
                        active,
                        count: spot.scrap_count,
                    })
                }
                _ => None,
            }
        };
        write_txn.commit()?;
        Ok(state)
    }

    pub fn has_liked(&self, member_id: &str, spot_id: &str) -> Result<bool, DatabaseError> {
        let read_txn = self.begin_read()?;
        let likes = read_txn.open_table(LIKES)?;
        Ok(likes.get(edge_key(member_id, spot_id).as_str())?.is_some())
    }

    pub fn has_scrapped(&self, member_id: &str, spot_id: &str) -> Result<bool, DatabaseError> {
        let read_txn = self.begin_read()?;
        let scraps = read_txn.open_table(SCRAPS)?;
        Ok(scraps.get(edge_key(member_id, spot_id).as_str())?.is_some())
    }

    /// List the spots a member has scrapped, via the member index
    pub fn list_scrapped_spots(&self, member_id: &str) -> Result<Vec<Spot>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let index = read_txn.open_table(MEMBER_SCRAPS)?;

        let spot_ids: Vec<String> = index
            .get(member_id)?
            .map(|v| bincode::deserialize(v.value()))
            .transpose()?
            .unwrap_or_default();

        let table = read_txn.open_table(SPOTS)?;
        let mut spots = Vec::new();
        for id in spot_ids {
            if let Some(data) = table.get(id.as_str())? {
                let spot: Spot = bincode::deserialize(data.value())?;
                if !spot.deleted {
                    spots.push(spot);
                }
            }
        }
        spots.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(spots)
    }
}
