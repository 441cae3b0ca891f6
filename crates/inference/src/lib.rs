pub mod depth;

mod error;
pub use error::*;

mod inference;
pub use inference::*;
