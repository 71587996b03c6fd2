pub mod utils;
pub mod z3_ext;
