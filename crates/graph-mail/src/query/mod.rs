//! OData query building for message listings

mod filter;
mod odata;

pub use filter::{EqualityOperator, Filter};
pub use odata::{DEFAULT_SELECT, EmailParams, MessageQuery};
