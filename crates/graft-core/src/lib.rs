//! Asset graph types for the graft glTF interchange engine.
//!
//! This crate provides the in-memory representation of a glTF 2.0 document:
//! - The [`Asset`] root with its ordered entity collections
//! - Typed buffer access descriptions ([`Accessor`], [`BufferView`], [`Buffer`])
//! - Scene structure ([`Scene`], [`Node`], [`Skin`], [`Camera`], [`Light`])
//! - Geometry ([`Mesh`], [`Primitive`]) and appearance ([`Material`], [`Texture`])
//! - [`Animation`] data
//!
//! Reading, validating and writing these types is the job of `graft-io`.

pub mod accessor;
pub mod animation;
pub mod asset;
pub mod buffer;
pub mod camera;
pub mod light;
pub mod material;
pub mod mesh;
pub mod scene;
pub mod texture;

pub use accessor::*;
pub use animation::*;
pub use asset::*;
pub use buffer::*;
pub use camera::*;
pub use light::*;
pub use material::*;
pub use mesh::*;
pub use scene::*;
pub use texture::*;
