pub mod convert;
pub mod field;
pub mod normalize;
pub mod raw;

pub use convert::*;
pub use field::*;
pub use normalize::*;
pub use raw::*;
