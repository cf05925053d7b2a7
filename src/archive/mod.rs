pub mod tar_builder;
pub mod zip_builder;

pub use tar_builder::build_tar;
pub use zip_builder::build_zip;
