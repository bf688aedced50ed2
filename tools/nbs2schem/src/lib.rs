//! nbs2schem - Note Block Studio song to schematic converter
//!
//! The conversion pipeline behind the `nbs2schem` binary:
//! decode `.nbs` → presence timelines → packed containers → `.schem`.

pub mod convert;

pub use convert::{ConvertOptions, ConvertReport, convert_file, default_output_path, load_config};
