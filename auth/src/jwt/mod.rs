pub mod claims;
pub mod errors;
pub mod service;

pub use claims::SessionClaim;
pub use claims::SignedClaims;
pub use errors::TokenError;
pub use service::TokenService;
