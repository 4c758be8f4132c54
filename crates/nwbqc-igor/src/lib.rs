//! # nwbqc-igor
//!
//! Reader for Igor Pro binary wave files (`.ibw`), the per-sweep files inside
//! the original acquisition archives.
//!
//! Supports format versions 1, 2, 3 and 5 in either byte order, with real
//! numeric element types. Samples are widened to `f64` without rounding.
//!
//! ```no_run
//! let wave = nwbqc_igor::read_ibw(std::path::Path::new("sweep.ibw")).expect("ibw");
//! println!("{} @ {} Hz", wave.header.base_name, wave.header.sampling_rate());
//! ```

mod encode;
mod error;
mod parse;
mod wave;

pub use error::IgorError;
pub use parse::{parse_ibw, read_ibw};
pub use wave::{ByteOrder, IgorHeader, IgorWave, NumberType};
