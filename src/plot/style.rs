//! Chart theme: white background, light grid, no top/right spines,
//! sizes expressed in inches/points and rendered at `dpi`.

use plotters::style::{
    Color, FontDesc, FontFamily, FontStyle, RGBAColor, RGBColor, ShapeStyle, BLACK,
};

pub const NAISS: RGBColor = RGBColor(0x1f, 0x77, 0xb4);
pub const MORTS: RGBColor = RGBColor(0xd6, 0x27, 0x28);
pub const DELTA: RGBColor = RGBColor(0x2c, 0xa0, 0x2c);
pub const VIVANTS: RGBColor = RGBColor(0x4c, 0x78, 0xa8);
pub const BAND: RGBColor = RGBColor(0x9e, 0xca, 0xe1);
pub const JUV: RGBColor = RGBColor(0x1f, 0x77, 0xb4);
pub const ENF: RGBColor = RGBColor(0xff, 0x7f, 0x0e);
pub const ADULT: RGBColor = RGBColor(0x2c, 0xa0, 0x2c);

pub const STD_LINE: RGBColor = RGBColor(0xf2, 0x8e, 0x2b);
pub const PROPORTION_LINE: RGBColor = RGBColor(0x20, 0x53, 0x75);
pub const SCATTER: RGBColor = RGBColor(0x0c, 0x5c, 0x78);
pub const DYNAMIQUE: RGBColor = RGBColor(0xfb, 0x85, 0x00);

/// Figure size in inches.
#[derive(Debug, Clone, Copy)]
pub struct Figure {
    pub width: f64,
    pub height: f64,
}

impl Figure {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Style {
    pub dpi: u32,
    pub title_pt: f64,
    pub label_pt: f64,
    pub legend_pt: f64,
    pub tick_pt: f64,
    pub annotation_pt: f64,
    pub grid_alpha: f64,
}

impl Default for Style {
    fn default() -> Self {
        Self::with_dpi(150)
    }
}

impl Style {
    pub fn with_dpi(dpi: u32) -> Self {
        Self {
            dpi,
            title_pt: 16.0,
            label_pt: 12.0,
            legend_pt: 11.0,
            tick_pt: 10.0,
            annotation_pt: 9.0,
            grid_alpha: 0.25,
        }
    }

    /// Pixel dimensions of a figure.
    pub fn pixels(&self, fig: Figure) -> (u32, u32) {
        let dpi = self.dpi as f64;
        ((fig.width * dpi).round() as u32, (fig.height * dpi).round() as u32)
    }

    /// Convert a point size to pixels.
    pub fn px(&self, pt: f64) -> u32 {
        (pt * self.dpi as f64 / 72.0).round().max(1.0) as u32
    }

    fn font(&self, pt: f64) -> FontDesc<'static> {
        FontDesc::new(FontFamily::SansSerif, self.px(pt) as f64, FontStyle::Normal)
    }

    pub fn title(&self) -> FontDesc<'static> {
        self.font(self.title_pt)
    }

    pub fn label(&self) -> FontDesc<'static> {
        self.font(self.label_pt)
    }

    pub fn legend(&self) -> FontDesc<'static> {
        self.font(self.legend_pt)
    }

    pub fn tick(&self) -> FontDesc<'static> {
        self.font(self.tick_pt)
    }

    pub fn annotation(&self) -> FontDesc<'static> {
        self.font(self.annotation_pt)
    }

    pub fn grid_color(&self) -> RGBAColor {
        BLACK.mix(self.grid_alpha * 0.4)
    }

    /// Line of `width_pt` points.
    pub fn line(&self, color: RGBColor, width_pt: f64) -> ShapeStyle {
        color.stroke_width(self.px(width_pt))
    }

    pub fn margin(&self) -> u32 {
        self.px(12.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_scale_with_dpi() {
        let s = Style::with_dpi(150);
        assert_eq!(s.pixels(Figure::new(16.0, 6.0)), (2400, 900));
        assert_eq!(s.px(72.0), 150);
        let small = Style::with_dpi(72);
        assert_eq!(small.px(16.0), 16);
        assert_eq!(small.px(0.1), 1);
    }
}
