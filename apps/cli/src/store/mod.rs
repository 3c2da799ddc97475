//! Store — thin query layer over the PostgreSQL pool.
//!
//! All functions take `&PgPool` and return plain row structs; no state is
//! held here. The scoring pipeline treats this as an opaque read/write API.

pub mod companies;
pub mod jobs;
pub mod logs;
pub mod stats;
