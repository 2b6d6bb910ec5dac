//! Sales domain module.

pub mod sale;

pub use sale::{PaymentStatus, Sale, SaleRepository};
