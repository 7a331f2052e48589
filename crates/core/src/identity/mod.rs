//! Identity: password hashing, bearer tokens, Google ID-token verification and the
//! authenticated principal.

pub mod google;
pub mod password;
pub mod principal;
pub mod token;

pub use google::{GoogleIdentity, GoogleTokenVerifier};
pub use password::{hash_password, verify_password};
pub use principal::Principal;
pub use token::{Claims, TokenService};
