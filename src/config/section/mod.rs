//! Configuration section definitions.
//!
//! Each module corresponds to a section in `diagram-export.toml`:
//!
//! | Module   | TOML Section | Purpose                              |
//! |----------|--------------|--------------------------------------|
//! | `export` | `[export]`   | SVG exporter command, timeout, naming |
//! | `png`    | `[png]`      | Scale and rasterizer fallback list    |

mod export;
mod png;

pub use export::ExporterConfig;
pub use png::{PngConfig, Rasterizer};
