// Library root: category resolution, standings aggregation, fixtures,
// access control and the user session for the Try It Sevens league.

pub mod access;
pub mod category;
pub mod config;
pub mod fixtures;
pub mod model;
pub mod session;
pub mod source;
pub mod standings;
