pub mod config;
pub mod source;

#[allow(unused_imports)]
pub use config::*;
#[allow(unused_imports)]
pub use source::*;
