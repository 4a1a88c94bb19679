//! Application Layer
//!
//! Use cases and application services.

pub mod attach_payment_card;
pub mod config;
pub mod delete_account;
pub mod ports;
pub mod update_picture;
pub mod update_profile;

// Re-exports
pub use attach_payment_card::{AttachPaymentCardUseCase, AttachedCard};
pub use config::AccountConfig;
pub use delete_account::DeleteAccountUseCase;
pub use ports::{AccountDeps, AccountPorts};
pub use update_picture::{PictureUpload, UpdatePictureUseCase};
pub use update_profile::{ProfileInput, UpdateProfileUseCase};
