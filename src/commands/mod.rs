//! CLI command implementations

mod chunk;
mod embed;
mod eval;
mod init;
mod load;
mod query;
mod status;

pub use chunk::*;
pub use embed::*;
pub use eval::*;
pub use init::*;
pub use load::*;
pub use query::*;
pub use status::*;
