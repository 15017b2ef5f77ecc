//! egui texture as a drawing surface

use eframe::egui;
use std::sync::{Arc, Mutex};

use crate::core::DrawSurface;
use crate::media::VideoFrame;

/// Texture slot shared between a surface (writer) and its pane (reader)
pub type SharedTexture = Arc<Mutex<Option<egui::TextureHandle>>>;

/// Uploads every drawn frame into one named egui texture.
pub struct TextureSurface {
    ctx: egui::Context,
    name: String,
    texture: SharedTexture,
}

impl TextureSurface {
    pub fn new(ctx: egui::Context, name: impl Into<String>) -> Self {
        Self {
            ctx,
            name: name.into(),
            texture: Arc::new(Mutex::new(None)),
        }
    }

    /// Handle for reading the current texture
    pub fn texture(&self) -> SharedTexture {
        Arc::clone(&self.texture)
    }
}

impl DrawSurface for TextureSurface {
    fn draw(&mut self, frame: &VideoFrame) {
        let image = egui::ColorImage::from_rgba_unmultiplied(
            [frame.width(), frame.height()],
            frame.pixels(),
        );
        let mut slot = self.texture.lock().unwrap_or_else(|e| e.into_inner());
        match slot.as_mut() {
            Some(texture) => texture.set(image, egui::TextureOptions::LINEAR),
            None => {
                *slot = Some(
                    self.ctx
                        .load_texture(&self.name, image, egui::TextureOptions::LINEAR),
                );
            }
        }
        self.ctx.request_repaint();
    }
}
