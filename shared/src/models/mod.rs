//! Domain models shared by the server and clients

pub mod board;
pub mod business_day;
pub mod store;
pub mod waiting;

pub use board::*;
pub use business_day::*;
pub use store::*;
pub use waiting::*;
