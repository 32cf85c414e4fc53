use crate::zones::{CurrentLocation, LogScanMode, ZoneCoordinate};

use super::metrics::LoopMetricsSnapshot;
use super::rendering::{draw_text, glyph_advance, line_advance, Canvas, Rgba};

const HUD_TEXT_SCALE: i32 = 2;
const HUD_PADDING: i32 = 6 * HUD_TEXT_SCALE;
const HUD_PANEL_INSET_X: i32 = 4 * HUD_TEXT_SCALE;
const HUD_PANEL_INSET_Y: i32 = 3 * HUD_TEXT_SCALE;
const HUD_TEXT_PRIMARY_COLOR: Rgba = [244, 248, 252, 255];
const HUD_TEXT_DIM_COLOR: Rgba = [176, 198, 220, 255];
const HUD_PANEL_BG_COLOR: Rgba = [10, 12, 16, 210];
const HUD_PANEL_BORDER_COLOR: Rgba = [92, 106, 126, 255];
const VIEW_SECTION_LABEL: &str = "View";
const PERF_SECTION_LABEL: &str = "Perf";
const CONTROLS_SECTION_LABEL: &str = "Controls";

#[derive(Debug, Clone, PartialEq)]
pub struct HudData {
    pub location: CurrentLocation,
    pub level: u32,
    pub level_aware: bool,
    pub zoom: f64,
    /// Cell under the cursor and its catalog name, if any.
    pub hovered: Option<(ZoneCoordinate, Option<String>)>,
    pub metrics: LoopMetricsSnapshot,
    pub render_fps_cap: Option<u32>,
    pub scan_mode: LogScanMode,
}

pub(crate) fn draw_hud(canvas: &mut Canvas<'_>, data: &HudData) {
    if canvas.width() == 0 || canvas.height() == 0 {
        return;
    }

    let lines = build_hud_lines(data);
    let longest_line_chars = lines
        .iter()
        .map(|line| line.chars().count() as i32)
        .max()
        .unwrap_or(0);
    let advance = glyph_advance(HUD_TEXT_SCALE);
    let line_height = line_advance(HUD_TEXT_SCALE);
    let panel_width = longest_line_chars * advance + HUD_PANEL_INSET_X * 2;
    let panel_height = lines.len() as i32 * line_height + HUD_PANEL_INSET_Y * 2;
    let panel_left = HUD_PADDING - HUD_PANEL_INSET_X;
    let panel_top = HUD_PADDING - HUD_PANEL_INSET_Y;
    canvas.blend_rect(
        panel_left,
        panel_top,
        panel_width,
        panel_height,
        HUD_PANEL_BG_COLOR,
    );
    canvas.outline_rect(
        panel_left,
        panel_top,
        panel_width,
        panel_height,
        1,
        HUD_PANEL_BORDER_COLOR,
    );

    let mut y = HUD_PADDING;
    for line in lines {
        let color = hud_line_color(&line);
        draw_text(canvas, HUD_PADDING, y, &line, HUD_TEXT_SCALE, color);
        y += line_height;
    }
}

pub(crate) fn build_hud_lines(data: &HudData) -> Vec<String> {
    let mut lines = vec![
        format!("Current: {}", data.location),
        String::new(),
        VIEW_SECTION_LABEL.to_string(),
        if data.level_aware {
            format!("Level: {}", data.level)
        } else {
            format!("Level: {} (fixed)", data.level)
        },
        format!("Zoom: x{:.2}", data.zoom),
        match data.hovered.as_ref() {
            Some((coord, Some(name))) => format!("Cell: {coord} {name}"),
            Some((coord, None)) => format!("Cell: {coord}"),
            None => "Cell: none".to_string(),
        },
        String::new(),
        PERF_SECTION_LABEL.to_string(),
        format_fps_line(data.metrics.fps, data.render_fps_cap),
        format!("Frame: {:.2} ms", data.metrics.frame_time_ms),
        format!(
            "Log: {} ({} scans)",
            scan_mode_text(data.scan_mode),
            data.metrics.scans
        ),
        String::new(),
        CONTROLS_SECTION_LABEL.to_string(),
        "Wheel/+/-: zoom".to_string(),
        "Middle drag/arrows: pan".to_string(),
    ];
    if data.level_aware {
        lines.push("PgUp/PgDn: level".to_string());
    }
    lines.push("Home: reset  F3: hud  Esc: quit".to_string());
    lines
}

fn hud_line_color(line: &str) -> Rgba {
    if matches!(
        line,
        VIEW_SECTION_LABEL | PERF_SECTION_LABEL | CONTROLS_SECTION_LABEL
    ) {
        HUD_TEXT_DIM_COLOR
    } else {
        HUD_TEXT_PRIMARY_COLOR
    }
}

fn format_fps_line(current_fps: f32, cap: Option<u32>) -> String {
    let cap_text = match cap {
        Some(value) => value.to_string(),
        None => "inf".to_string(),
    };
    format!("[{:.0} / {}] fps", current_fps, cap_text)
}

fn scan_mode_text(mode: LogScanMode) -> &'static str {
    match mode {
        LogScanMode::FullRescan => "full",
        LogScanMode::Incremental => "tail",
    }
}
