pub mod airdrop;
pub mod check;
pub mod config;
pub mod error;
pub mod storage;
pub mod transport;
pub mod utils;

pub use config::Config;
pub use error::{CheckerError, Result};
