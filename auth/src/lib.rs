//! Request authentication shared by the customers and orders services.
//!
//! - [`codec`]: HS256 tokens carrying a numeric subject and an expiry
//! - [`outcome`]: the `{Status, ID}` protocol spoken across services
//! - [`local`] / [`remote`]: the two verification strategies
//! - [`middleware`]: the per-request orchestrator and its `apply` wrapper
//! - [`endpoint`]: the verification route the identity owner exposes
pub mod cache;
pub mod codec;
pub mod endpoint;
pub mod error;
pub mod local;
pub mod middleware;
pub mod outcome;
pub mod remote;
pub mod resolver;
pub mod subject;

pub use codec::TokenCodec;
pub use error::AuthError;
pub use local::{StoreError, SubjectExistenceChecker};
pub use outcome::{AuthOutcome, AuthStatus};
pub use remote::RemoteVerifier;
pub use resolver::{Authenticator, IdentityResolver};
pub use subject::{AuthSubject, SubjectId};
