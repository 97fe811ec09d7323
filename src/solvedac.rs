pub mod assets;
pub mod client;
pub mod user;

pub use assets::{AssetKind, AssetLocator};
pub use client::{Endpoint, SolvedAc};
pub use user::{ClassDecoration, UserRecord};
