pub mod eval;
pub mod reference;
pub mod vectors;

pub use eval::{evaluate, Evaluation};
pub use reference::{booth_decode, booth_rows_signed, binary_rows, expected_product, BoothRow};
pub use vectors::{generate, write_defines, write_hex_files, VectorSet};
