// Library exports for testing and reuse

pub mod aoi;
pub mod archive;
pub mod cli;
pub mod clip;
pub mod crs;
pub mod error;
pub mod io;
pub mod layout;
pub mod mosaic;
pub mod options;
pub mod pipeline;
pub mod report;
pub mod scene;
pub mod stack;

// Re-export commonly used types
pub use aoi::Aoi;
pub use clip::{clip_raster, ClipWindow};
pub use error::{PreprocessError, Result};
pub use io::RasterMetadata;
pub use layout::Layout;
pub use mosaic::mosaic_directory;
pub use options::OutputOptions;
pub use pipeline::{run, run_period, Settings};
pub use scene::{BandId, Scene};
pub use stack::stack_scene;
