mod admin;
mod auth;
mod landmarks;
mod members;
mod spots;

use serde::Deserialize;

use crate::api::response::ApiError;

/// Shared pagination query parameters for list endpoints
#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
}

impl ListParams {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.limit == 0 {
            return Err(ApiError::bad_request("limit must be greater than 0"));
        }
        Ok(())
    }
}

fn default_limit() -> u32 {
    20
}

pub use admin::{admin_purge, create_landmark, health};
pub use auth::login;
pub use landmarks::{get_landmark, occupy_landmark, visit_landmark};
pub use members::{my_info, register_notice_token, update_my_info};
pub use spots::{
    create_spot, delete_spot, map_spots, my_scraps, my_spots, spot_detail, toggle_like,
    toggle_scrap,
};
