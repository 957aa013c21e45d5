use std::time::Duration;

use taskline_core::api::{EventSink, MonitorStyle, RenderConfig, RenderFormat};

use crate::executor::{JsonlRendererPlugin, TextRendererPlugin, TreeRendererPlugin};

pub fn build_renderer(cfg: &RenderConfig) -> Box<dyn EventSink> {
    tracing::debug!(format = cfg.format.as_str(), ascii = cfg.ascii, "building renderer");
    match cfg.format {
        RenderFormat::Tree => Box::new(TreeRendererPlugin::new(MonitorStyle {
            enabled: true,
            ascii: cfg.ascii,
            tick: Duration::from_millis(cfg.tick_ms.max(1)),
            show_results: cfg.show_results,
        })),
        RenderFormat::Text => Box::new(TextRendererPlugin::new(cfg.ascii, cfg.show_results)),
        RenderFormat::Jsonl => Box::new(JsonlRendererPlugin::new(cfg.pretty)),
    }
}
