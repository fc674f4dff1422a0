pub mod cancel;
pub mod checker;
pub mod lucas;
pub mod miller_rabin;
pub mod oracle;
pub mod parse;
pub mod sieve;

pub use crate::domain::model::{Classification, PrimalityVerdict};
pub use crate::domain::ports::{ConfigProvider, PrimeService};
pub use crate::utils::error::Result;
