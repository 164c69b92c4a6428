use rand::Rng;

/// Generate a secure random token (32 bytes, hex encoded = 64 characters)
pub fn generate_token() -> String {
    let mut rng = rand::thread_rng();
    let bytes: [u8; 32] = rng.gen();
    hex::encode(bytes)
}

/// Generate a short random suffix for default nicknames
pub fn generate_nickname() -> String {
    let mut rng = rand::thread_rng();
    let bytes: [u8; 4] = rng.gen();
    format!("traveler-{}", hex::encode(bytes))
}
