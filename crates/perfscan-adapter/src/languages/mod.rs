//! Built-in mapping tables

mod go;
mod java;
mod javascript;
mod python;
mod rust;

pub use go::GO;
pub use java::JAVA;
pub use javascript::{JAVASCRIPT, TYPESCRIPT};
pub use python::PYTHON;
pub use rust::RUST;

use crate::MappingTable;

/// Every table shipped with the adapter
pub fn builtin() -> [&'static MappingTable; 6] {
    [&PYTHON, &JAVASCRIPT, &TYPESCRIPT, &RUST, &GO, &JAVA]
}
