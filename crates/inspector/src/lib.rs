pub mod builder;
pub mod controller;
pub mod error;
pub mod host;
pub mod options;
pub mod state;
pub mod toolbar;
pub mod tree;

pub use builder::*;
pub use controller::*;
pub use error::*;
pub use host::*;
pub use options::*;
pub use state::*;
pub use tree::*;
