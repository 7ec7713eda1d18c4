//! JSON scene description: one canvas, a set of named source images and an
//! ordered list of draws.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::display::PixelBuffer;
use crate::format::PixelFormat;
use crate::orientation::Orientation;
use crate::pattern::Pattern;
use crate::render::{self, DrawParams, Filter};

fn one() -> f32 {
    1.0
}

fn black() -> Color {
    Color::BLACK
}

/// Destination buffer the scene renders into
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasSpec {
    /// Native (panel) width
    pub width: i32,
    /// Native (panel) height
    pub height: i32,
    pub format: PixelFormat,
    #[serde(default)]
    pub orientation: Orientation,
    #[serde(default = "black")]
    pub background: Color,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageSpec {
    pub name: String,
    pub width: i32,
    pub height: i32,
    pub format: PixelFormat,
    #[serde(default)]
    pub pattern: Pattern,
}

/// One draw call, in the canvas's logical coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawOp {
    pub image: String,
    pub x: i32,
    pub y: i32,
    #[serde(default = "one")]
    pub scale: f32,
    #[serde(default)]
    pub rotation: Orientation,
    #[serde(default = "one")]
    pub alpha: f32,
    #[serde(default)]
    pub filter: Filter,
}

impl DrawOp {
    pub fn params(&self) -> DrawParams {
        DrawParams::new(self.scale, self.rotation, self.alpha).with_filter(self.filter)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub name: String,
    pub canvas: CanvasSpec,
    #[serde(default)]
    pub images: Vec<ImageSpec>,
    #[serde(default)]
    pub draws: Vec<DrawOp>,
}

impl Scene {
    /// Save scene to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), String> {
        let json = serde_json::to_string_pretty(self).map_err(|e| e.to_string())?;
        fs::write(path, json).map_err(|e| e.to_string())
    }

    /// Load scene from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, String> {
        let json = fs::read_to_string(path).map_err(|e| e.to_string())?;
        serde_json::from_str(&json).map_err(|e| e.to_string())
    }

    /// Build every source image, then run the draws in order onto a fresh
    /// canvas. Stops at the first failing draw.
    pub fn render(&self) -> Result<PixelBuffer, String> {
        let canvas = &self.canvas;
        let mut frame = PixelBuffer::new(
            canvas.width,
            canvas.height,
            canvas.format,
            canvas.orientation,
        )
        .map_err(|e| format!("canvas: {}", e))?;
        frame
            .fill(canvas.background)
            .map_err(|e| format!("canvas background: {}", e))?;

        let mut images = HashMap::new();
        for spec in &self.images {
            let mut image = PixelBuffer::new(spec.width, spec.height, spec.format, Orientation::Rotate0)
                .map_err(|e| format!("image '{}': {}", spec.name, e))?;
            spec.pattern
                .paint(&mut image)
                .map_err(|e| format!("image '{}': {}", spec.name, e))?;
            if images.insert(spec.name.as_str(), image).is_some() {
                return Err(format!("duplicate image name '{}'", spec.name));
            }
        }

        for (i, op) in self.draws.iter().enumerate() {
            let image = images
                .get(op.image.as_str())
                .ok_or_else(|| format!("draw {}: unknown image '{}'", i, op.image))?;
            let path = render::draw(&mut frame, image, op.x, op.y, &op.params())
                .map_err(|e| format!("draw {} ('{}'): {}", i, op.image, e))?;
            debug!("draw {} '{}' done via {:?}", i, op.image, path);
        }

        info!(
            "rendered scene '{}': {} images, {} draws onto {}x{} {} rotated {} degrees",
            self.name,
            self.images.len(),
            self.draws.len(),
            canvas.width,
            canvas.height,
            canvas.format,
            canvas.orientation.degrees()
        );
        Ok(frame)
    }
}

impl Default for Scene {
    /// A portrait 480x800 RGB565 panel mounted in landscape, with a red
    /// banner and a translucent rotated checkerboard
    fn default() -> Self {
        Self {
            name: "landscape-panel".to_string(),
            canvas: CanvasSpec {
                width: 480,
                height: 800,
                format: PixelFormat::RGB565,
                orientation: Orientation::Rotate270,
                background: Color::BLACK,
            },
            images: vec![
                ImageSpec {
                    name: "banner".to_string(),
                    width: 200,
                    height: 50,
                    format: PixelFormat::RGB888,
                    pattern: Pattern::Solid {
                        color: Color::from_rgb(0xFF, 0, 0),
                    },
                },
                ImageSpec {
                    name: "checker".to_string(),
                    width: 32,
                    height: 32,
                    format: PixelFormat::ARGB8888,
                    pattern: Pattern::Checkerboard {
                        tile: 4,
                        a: Color::WHITE,
                        b: Color::from_rgb(0, 0x80, 0xFF),
                    },
                },
            ],
            draws: vec![
                DrawOp {
                    image: "banner".to_string(),
                    x: 140,
                    y: 150,
                    scale: 1.0,
                    rotation: Orientation::Rotate0,
                    alpha: 1.0,
                    filter: Filter::Nearest,
                },
                DrawOp {
                    image: "checker".to_string(),
                    x: 400,
                    y: 200,
                    scale: 2.0,
                    rotation: Orientation::Rotate90,
                    alpha: 0.75,
                    filter: Filter::Bilinear,
                },
            ],
        }
    }
}
