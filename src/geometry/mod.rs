pub mod cuboid;

pub use cuboid::Cuboid;
