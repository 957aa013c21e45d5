pub mod renderers;

pub use renderers::{JsonlRendererPlugin, TextRendererPlugin, TreeRendererPlugin};
