//! Projective geometry shared by all sectors.

mod frame;
mod plane;

pub use frame::SectorFrame;
pub use plane::MeasurementPlane;
