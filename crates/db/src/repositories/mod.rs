//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod analysis_repo;
pub mod barrier_repo;
pub mod guide_repo;
pub mod image_repo;
pub mod profile_repo;
pub mod scan_repo;

pub use analysis_repo::AnalysisRepo;
pub use barrier_repo::BarrierRepo;
pub use guide_repo::GuideRepo;
pub use image_repo::ScanImageRepo;
pub use profile_repo::WheelchairProfileRepo;
pub use scan_repo::ScanRepo;
