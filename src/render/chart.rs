//! Bar chart drawing with `plotters`, JPEG encoding with `image`.

use crate::axis::AxisBound;
use crate::config::Config;
use crate::error::PopError;
use crate::mode::ChartMode;
use crate::render::palette::Palette;
use crate::render::Frame;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::path::{Path, PathBuf};
use tracing::debug;

const FONT: &str = "sans-serif";

/// Draws one frame per selection into `<dir>/<period>.jpg`
pub struct ChartRenderer {
    width: u32,
    height: u32,
    selection_size: usize,
    palette: Palette,
}

impl ChartRenderer {
    pub fn new(config: &Config, palette: Palette) -> Self {
        Self {
            width: config.frame_width,
            height: config.frame_height,
            selection_size: config.selection_size,
            palette,
        }
    }

    /// File a frame of `period` is written to
    pub fn frame_path(dir: &Path, period: &str) -> PathBuf {
        dir.join(format!("{}.jpg", period))
    }

    /// Render `frame` against the shared `bound` and write it under `dir`
    pub fn render(
        &self,
        frame: &Frame,
        bound: AxisBound,
        mode: &ChartMode,
        dir: &Path,
    ) -> Result<PathBuf, PopError> {
        std::fs::create_dir_all(dir)?;
        let path = Self::frame_path(dir, &frame.selection.period);

        let mut buffer = vec![0u8; self.width as usize * self.height as usize * 3];
        self.draw(frame, bound, mode, &mut buffer)?;

        let rgb = image::RgbImage::from_raw(self.width, self.height, buffer)
            .ok_or_else(|| PopError::Render("frame buffer has the wrong size".to_string()))?;
        rgb.save_with_format(&path, image::ImageFormat::Jpeg)?;

        debug!("Wrote frame {}", path.display());
        Ok(path)
    }

    fn draw(
        &self,
        frame: &Frame,
        bound: AxisBound,
        mode: &ChartMode,
        buffer: &mut [u8],
    ) -> Result<(), PopError> {
        let root = BitMapBackend::with_buffer(buffer, (self.width, self.height)).into_drawing_area();
        root.fill(&WHITE).map_err(render_error)?;

        let text = mode.display_text(self.selection_size, frame.highlight.as_deref());
        let body = root
            .titled(&text.title, (FONT, 24).into_font().style(FontStyle::Bold))
            .map_err(render_error)?;

        let entries = &frame.selection.entries;
        let slots = entries.len().max(1);

        let mut chart = ChartBuilder::on(&body)
            .caption(&text.subtitle, (FONT, 18))
            .margin(15)
            .x_label_area_size(60)
            .y_label_area_size(70)
            .build_cartesian_2d((0..slots).into_segmented(), 0f64..bound.value())
            .map_err(render_error)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_label_formatter(&|_| String::new())
            .y_label_formatter(&|v| format_millions(*v))
            .x_desc("Country Name")
            .y_desc("Population Size [mln]")
            .axis_desc_style((FONT, 15))
            .draw()
            .map_err(render_error)?;

        chart
            .draw_series(entries.iter().enumerate().map(|(i, obs)| {
                let mut bar = Rectangle::new(
                    [(SegmentValue::Exact(i), 0.0), (SegmentValue::Exact(i + 1), obs.value)],
                    self.palette.color_of(&obs.entity).filled(),
                );
                bar.set_margin(0, 0, 12, 12);
                bar
            }))
            .map_err(render_error)?;

        let value_style = TextStyle::from((FONT, 14).into_font()).pos(Pos::new(HPos::Center, VPos::Bottom));
        chart
            .draw_series(entries.iter().enumerate().map(|(i, obs)| {
                Text::new(
                    format!("{:.1}", obs.value / 1_000_000.0),
                    (SegmentValue::CenterOf(i), obs.value),
                    value_style.clone(),
                )
            }))
            .map_err(render_error)?;

        // Entity names are drawn by hand so the highlighted one can be red.
        for (i, obs) in entries.iter().enumerate() {
            let (x, y) = chart.backend_coord(&(SegmentValue::CenterOf(i), 0.0));
            let color = if frame.highlight.as_deref() == Some(obs.entity.as_str()) {
                RED
            } else {
                BLACK
            };
            let style = (FONT, 13)
                .into_font()
                .color(&color)
                .pos(Pos::new(HPos::Center, VPos::Top));
            root.draw(&Text::new(obs.entity.clone(), (x, y + 8), style))
                .map_err(render_error)?;
        }

        let (body_width, body_height) = body.dim_in_pixel();
        body.draw(&Text::new(
            frame.selection.period.clone(),
            ((body_width as f64 * 0.78) as i32, (body_height as f64 * 0.15) as i32),
            (FONT, 34).into_font(),
        ))
        .map_err(render_error)?;

        root.present().map_err(render_error)?;
        Ok(())
    }
}

fn render_error<E: std::fmt::Debug>(e: E) -> PopError {
    PopError::Render(format!("{:?}", e))
}

/// Value in millions, no decimals, with thousands separators
pub fn format_millions(value: f64) -> String {
    let millions = (value / 1_000_000.0).round() as i64;
    let digits = millions.unsigned_abs().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    if millions < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_millions() {
        assert_eq!(format_millions(0.0), "0");
        assert_eq!(format_millions(38_000_000.0), "38");
        assert_eq!(format_millions(1_400_000_000.0), "1,400");
        assert_eq!(format_millions(1_234_567_890_000.0), "1,234,568");
        assert_eq!(format_millions(-2_500_000_000.0), "-2,500");
    }

    #[test]
    fn test_frame_path_uses_period() {
        let path = ChartRenderer::frame_path(Path::new("images/1"), "1999");
        assert_eq!(path, Path::new("images/1").join("1999.jpg"));
    }
}
