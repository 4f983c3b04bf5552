pub mod address;
pub mod query;
pub mod types;

pub use address::{AddressNormalizer, NormalizedAddress};
pub use query::AirdropQueryService;
pub use types::{FailureReason, QueryOutcome, RemotePayload};
