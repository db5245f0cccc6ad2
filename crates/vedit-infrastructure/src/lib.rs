pub mod config_service;
pub mod file_source;
pub mod image_export;
pub mod paths;

pub use crate::config_service::ConfigService;
pub use crate::file_source::FileImageSource;
pub use crate::image_export::export_image;
pub use crate::paths::VeditPaths;
