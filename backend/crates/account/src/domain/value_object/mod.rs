//! Value Objects

pub mod display_name;
pub mod email;

pub use display_name::DisplayName;
pub use email::Email;
