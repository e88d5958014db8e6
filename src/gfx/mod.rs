pub mod anim;
pub mod bitmap;
pub mod draw;
pub mod gl;
pub mod math;
pub mod sprite;
pub mod surface;
