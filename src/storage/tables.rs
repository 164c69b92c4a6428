use redb::TableDefinition;

/// Members: member_id -> Member (bincode)
pub const MEMBERS: TableDefinition<&str, &[u8]> = TableDefinition::new("members");

/// Secondary index: "provider:provider_key" -> member_id
pub const MEMBER_PROVIDERS: TableDefinition<&str, &str> = TableDefinition::new("member_providers");

/// Spots: spot_id -> Spot (bincode)
pub const SPOTS: TableDefinition<&str, &[u8]> = TableDefinition::new("spots");

/// Landmarks: landmark_id -> Landmark (bincode)
pub const LANDMARKS: TableDefinition<&str, &[u8]> = TableDefinition::new("landmarks");

/// Likes: "member_id:spot_id" -> Like (bincode)
pub const LIKES: TableDefinition<&str, &[u8]> = TableDefinition::new("likes");

/// Scraps: "member_id:spot_id" -> Scrap (bincode)
pub const SCRAPS: TableDefinition<&str, &[u8]> = TableDefinition::new("scraps");

/// Secondary index: member_id -> Vec<spot_id> (for listing a member's scraps)
pub const MEMBER_SCRAPS: TableDefinition<&str, &[u8]> = TableDefinition::new("member_scraps");

/// Sessions: token -> Session (bincode)
pub const SESSIONS: TableDefinition<&str, &[u8]> = TableDefinition::new("sessions");

/// Expiration index: zero-padded "timestamp:token" -> token
pub const SESSION_EXPIRY: TableDefinition<&str, &str> = TableDefinition::new("session_expiry");
