pub mod cli;
pub mod util;
pub mod validate;
