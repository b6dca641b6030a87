pub mod fill;
pub mod primitives;
pub mod reduce;
pub mod types;
pub mod unparse;


pub use fill::*;
pub use primitives::*;
pub use reduce::*;
pub use types::*;
pub use unparse::*;
