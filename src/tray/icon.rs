//! Tray icon management
//!
//! Icons are drawn at startup rather than shipped as assets: a filled disc
//! while connected, a ring while disconnected, a ring with a dot when the
//! state is unknown.

use crate::core::state::IconKind;
use anyhow::{Context, Result};
use tray_icon::Icon;

/// Tray icon edge length in pixels
pub const TRAY_ICON_SIZE: u32 = 32;

/// Launcher icon edge length in pixels
pub const LAUNCHER_ICON_SIZE: u32 = 128;

const WARP_ORANGE: [u8; 3] = [0xF3, 0x80, 0x20];
const IDLE_GREY: [u8; 3] = [0x9E, 0x9E, 0x9E];
const WARNING_AMBER: [u8; 3] = [0xFF, 0xB3, 0x00];

/// Icons for each connection state
pub struct TrayIcon {
    pub connected: Icon,
    pub disconnected: Icon,
    pub unknown: Icon,
}

impl TrayIcon {
    /// Render all tray icons
    pub fn new() -> Result<Self> {
        Ok(Self {
            connected: to_icon(IconKind::Connected)?,
            disconnected: to_icon(IconKind::Disconnected)?,
            unknown: to_icon(IconKind::Unknown)?,
        })
    }

    pub fn get(&self, kind: IconKind) -> &Icon {
        match kind {
            IconKind::Connected => &self.connected,
            IconKind::Disconnected => &self.disconnected,
            IconKind::Unknown => &self.unknown,
        }
    }
}

fn to_icon(kind: IconKind) -> Result<Icon> {
    Icon::from_rgba(render_rgba(kind, TRAY_ICON_SIZE), TRAY_ICON_SIZE, TRAY_ICON_SIZE)
        .map_err(|e| anyhow::anyhow!("Failed to create icon: {}", e))
}

/// Draw the icon for `kind` as `size` x `size` RGBA pixels
pub fn render_rgba(kind: IconKind, size: u32) -> Vec<u8> {
    let center = size as f32 / 2.0;
    let outer = center - 1.0;
    let ring = (size as f32 / 8.0).max(2.0);
    let dot = size as f32 / 6.0;

    let mut rgba = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        for x in 0..size {
            let dx = x as f32 + 0.5 - center;
            let dy = y as f32 + 0.5 - center;
            let d = (dx * dx + dy * dy).sqrt();

            let (color, alpha) = match kind {
                IconKind::Connected => (WARP_ORANGE, coverage(outer, d)),
                IconKind::Disconnected => {
                    (IDLE_GREY, coverage(outer, d) - coverage(outer - ring, d))
                }
                IconKind::Unknown => (
                    WARNING_AMBER,
                    (coverage(outer, d) - coverage(outer - ring, d) + coverage(dot, d)).min(1.0),
                ),
            };

            rgba.extend_from_slice(&color);
            rgba.push((alpha.clamp(0.0, 1.0) * 255.0).round() as u8);
        }
    }
    rgba
}

/// Anti-aliased coverage of a pixel at distance `d` by a disc of `radius`
fn coverage(radius: f32, d: f32) -> f32 {
    (radius + 0.5 - d).clamp(0.0, 1.0)
}

/// Encode the icon for `kind` as PNG, for the desktop launcher
pub fn encode_png(kind: IconKind, size: u32) -> Result<Vec<u8>> {
    let rgba = render_rgba(kind, size);
    let mut out = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut out, size, size);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header().context("Failed to write PNG header")?;
        writer
            .write_image_data(&rgba)
            .context("Failed to write PNG data")?;
        writer.finish().context("Failed to finish PNG")?;
    }
    Ok(out)
}
