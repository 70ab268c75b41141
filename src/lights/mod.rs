//! Light sources (§3 Data Model, §4.5): point lights and stratified
//! surface-area lights.

pub mod area_light;
pub mod point_light;

pub use area_light::{LightShape, LightSource};
pub use point_light::PointLight;
