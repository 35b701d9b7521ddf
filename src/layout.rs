//! Tooltip scale factor derived from the rendered map width.

use std::collections::HashMap;

/// Selector of the element wrapping the rendered map.
pub const MAP_WRAPPER: &str = ".wrapper";
/// Map width (px) at which tooltips are drawn at scale 1.
pub const BASE_MAP_WIDTH: f64 = 1000.0;

/// Measures rendered element widths. Implemented by the host (a DOM bridge,
/// a window toolkit, or [`StaticLayout`] in tests and the CLI).
pub trait LayoutProbe {
    /// Current width in pixels of the first element matching `selector`,
    /// or `None` if no such element is rendered.
    fn element_width(&self, selector: &str) -> Option<f64>;
}

/// Fixed selector → width table.
#[derive(Debug, Clone, Default)]
pub struct StaticLayout {
    widths: HashMap<String, f64>,
}

impl StaticLayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, selector: &str, width: f64) -> Self {
        self.widths.insert(selector.to_string(), width);
        self
    }
}

impl LayoutProbe for StaticLayout {
    fn element_width(&self, selector: &str) -> Option<f64> {
        self.widths.get(selector).copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TooltipScale {
    pub factor: f64,
}

impl Default for TooltipScale {
    fn default() -> Self {
        Self { factor: 1.0 }
    }
}

/// Recompute `scale.factor` as wrapper width / 1000. If the wrapper is not
/// rendered the factor is left as is and `false` is returned.
pub fn update_scale(scale: &mut TooltipScale, probe: &dyn LayoutProbe) -> bool {
    let Some(width) = probe.element_width(MAP_WRAPPER) else {
        return false;
    };
    scale.factor = width / BASE_MAP_WIDTH;
    log::debug!("updated map scale factor: {}", scale.factor);
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factor_tracks_wrapper_width() {
        let mut s = TooltipScale::default();
        assert!(update_scale(&mut s, &StaticLayout::new().with(MAP_WRAPPER, 750.0)));
        assert_eq!(s.factor, 0.75);
    }

    #[test]
    fn missing_wrapper_keeps_previous_factor() {
        let mut s = TooltipScale { factor: 1.3 };
        assert!(!update_scale(&mut s, &StaticLayout::new().with(".other", 500.0)));
        assert_eq!(s.factor, 1.3);
    }
}
