mod auth;
mod health_check;

pub use auth::{
    current_user, json_error_handler, refresh, sign_in, sign_out, sign_up, AuthRequest,
};
pub use health_check::{auth_health, health_check};
