//! Cache layout and user environment configuration

pub mod env;
pub mod layout;

pub use env::load_user_env;
pub use layout::CacheLayout;
