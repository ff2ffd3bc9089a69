pub mod bit;
pub mod cell;
pub mod config;
pub mod dadda;
pub mod error;
pub mod heap;
pub mod model;
pub mod partial;
pub mod prefix;
pub mod reduce;
pub mod trace;

pub use bit::{Bit, BitKind};
pub use cell::{CellKind, CompressorCell, Consumption};
pub use config::{Algorithm, Config, Encoding};
pub use error::{Error, Result};
pub use heap::{BitHeap, HeapColumn};
pub use model::ReductionModel;
pub use trace::{NullObserver, StageObserver, TraceEvent};
