pub mod guard;
pub mod password;
pub mod token;

pub use guard::AuthUser;
pub use token::{Claims, TokenIssuer};
