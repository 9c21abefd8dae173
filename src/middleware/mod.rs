/// Middleware module
///
/// Bearer-token guard for routes that require a signed-in user.

mod jwt_middleware;

pub use jwt_middleware::{bearer_token, JwtMiddleware};
