//! Domain services.

pub mod auth_service;
pub mod auth_service_impl;
pub mod post_service;
pub mod post_service_impl;
pub mod throttle;

pub use auth_service::{AccountInfo, AuthError, AuthService, LoginSession};
pub use auth_service_impl::SeaOrmAuthService;
pub use post_service::{PostDraft, PostError, PostService};
pub use post_service_impl::SeaOrmPostService;
pub use throttle::LoginThrottle;
