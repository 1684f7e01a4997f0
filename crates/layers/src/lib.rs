pub mod fixture;
pub mod layer;
pub mod query;
pub mod raster;
pub mod registry;
pub mod symbology;
pub mod vector;

pub use layer::*;
pub use query::*;
pub use registry::*;
