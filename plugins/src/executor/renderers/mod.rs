pub mod jsonl;
pub mod text;
pub mod tree;

pub use jsonl::JsonlRendererPlugin;
pub use text::TextRendererPlugin;
pub use tree::TreeRendererPlugin;
