//! Concrete learnable roles

pub mod flyer;
pub mod ranged;

pub use flyer::FlyerRole;
pub use ranged::RangedRole;
