//! Wire and result types exchanged with the consent service.

mod assessment;
mod catalog;
mod consent;
mod request;

pub use assessment::*;
pub use catalog::*;
pub use consent::*;
pub use request::*;
