pub mod credentials;
pub mod events;
pub mod share_token;

pub use credentials::CredentialStore;
pub use events::EventService;
