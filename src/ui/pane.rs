//! One playback pane: video, transport, stepping, scrub and readouts.

use eframe::egui;
use std::time::{Duration, Instant};

use super::surface::{SharedTexture, TextureSurface};
use crate::core::frame_rate::{FrameRate, to_fixed};
use crate::core::{MediaEngine, PlaybackRate, Player, ResourceBinder, TickScheduler};
use crate::media::SourceFile;

/// Frame steps offered by the step buttons
const STEPS: [i64; 4] = [-10, -1, 1, 10];

pub struct PlayerPane<E: MediaEngine> {
    title: &'static str,
    about: &'static str,
    player: Player<E>,
    texture: SharedTexture,
}

impl<E: MediaEngine> PlayerPane<E> {
    pub fn new(
        title: &'static str,
        about: &'static str,
        engine: E,
        scheduler: TickScheduler,
        ctx: &egui::Context,
    ) -> Self {
        let surface = TextureSurface::new(ctx.clone(), format!("pane-{}", title));
        let texture = surface.texture();
        let mut player = Player::new(engine, scheduler);
        player.attach_surface(Box::new(surface));
        Self {
            title,
            about,
            player,
            texture,
        }
    }

    pub fn player(&self) -> &Player<E> {
        &self.player
    }

    /// Load `file` at the default frame rate until detection reports.
    /// With `autoplay` playback starts once metadata is in.
    pub fn load(&mut self, file: &SourceFile, binder: &ResourceBinder, autoplay: bool) {
        self.clear_texture();
        self.player.load(file, binder);
        self.player.set_frame_rate(FrameRate::default());
        self.player.set_autoplay(autoplay);
    }

    pub fn clear(&mut self) {
        self.player.unload();
        self.clear_texture();
    }

    fn clear_texture(&mut self) {
        *self.texture.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }

    pub fn set_frame_rate(&mut self, rate: FrameRate) {
        self.player.set_frame_rate(rate);
    }

    pub fn set_playback_rate(&mut self, rate: PlaybackRate) {
        self.player.set_playback_rate(rate);
    }

    pub fn update(&mut self, now: Instant) {
        self.player.update(now);
    }

    pub fn repaint_after(&self, now: Instant) -> Option<Duration> {
        self.player.repaint_after(now)
    }

    pub fn ui(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.heading(self.title);
            ui.label(egui::RichText::new("ⓘ").weak())
                .on_hover_text(self.about);
        });

        if let Some(err) = self.player.last_error() {
            ui.label(egui::RichText::new(err).weak());
        }

        self.video_ui(ui);

        ui.add_enabled_ui(self.player.state().is_loaded(), |ui| {
            self.transport_ui(ui);
            self.scrub_ui(ui);
        });

        self.readout_ui(ui);
    }

    fn video_ui(&self, ui: &mut egui::Ui) {
        let texture = self.texture.lock().unwrap_or_else(|e| e.into_inner()).clone();
        let width = ui.available_width();
        match texture {
            Some(texture) => {
                let [w, h] = texture.size();
                let aspect = if w > 0 { h as f32 / w as f32 } else { 9.0 / 16.0 };
                ui.image((texture.id(), egui::vec2(width, width * aspect)));
            }
            None => {
                let size = egui::vec2(width, width * 9.0 / 16.0);
                let (rect, _) = ui.allocate_exact_size(size, egui::Sense::hover());
                ui.painter().rect_filled(rect, 4.0, egui::Color32::from_gray(20));
                let text = if self.player.state().is_loaded() || self.player.handle().is_some() {
                    "Loading..."
                } else {
                    "No video"
                };
                ui.painter().text(
                    rect.center(),
                    egui::Align2::CENTER_CENTER,
                    text,
                    egui::FontId::proportional(14.0),
                    egui::Color32::GRAY,
                );
            }
        }
    }

    fn transport_ui(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let label = if self.player.is_playing() { "⏸ Pause" } else { "▶ Play" };
            if ui.button(label).clicked() {
                self.player.play_pause();
            }
            if ui.button("⏹ Stop").clicked() {
                self.player.stop();
            }

            let mut rate = self.player.playback_rate();
            egui::ComboBox::from_id_salt(("rate", self.title))
                .selected_text(rate.label())
                .width(70.0)
                .show_ui(ui, |ui| {
                    for option in PlaybackRate::ALL {
                        ui.selectable_value(&mut rate, option, option.label());
                    }
                });
            if rate != self.player.playback_rate() {
                self.player.set_playback_rate(rate);
            }
        });

        ui.horizontal(|ui| {
            for step in STEPS {
                let text = if step < 0 {
                    format!("◀ {}", step.abs())
                } else {
                    format!("{} ▶", step)
                };
                if ui
                    .button(text)
                    .on_hover_text(format!("{:+} frames", step))
                    .clicked()
                {
                    self.player.seek_by_frames(step);
                }
            }
        });
    }

    fn scrub_ui(&mut self, ui: &mut egui::Ui) {
        let total = self.player.total_frames() as i64;
        let mut index = self.player.frame_index().clamp(0, total);
        ui.spacing_mut().slider_width = ui.available_width() - 8.0;
        let response = ui.add(
            egui::Slider::new(&mut index, 0..=total)
                .show_value(false)
                .step_by(1.0),
        );
        if response.changed() {
            self.player.seek_to_frame(index);
        }
    }

    fn readout_ui(&self, ui: &mut egui::Ui) {
        let player = &self.player;
        ui.horizontal(|ui| {
            ui.monospace(format!(
                "Time: {} / {} s",
                to_fixed(player.current_time(), 3),
                to_fixed(player.duration(), 3)
            ));
            ui.separator();
            ui.monospace(format!(
                "Frame: {} / {}",
                player.frame_index(),
                player.total_frames()
            ));
            ui.separator();
            ui.label(egui::RichText::new(player.state().to_string()).weak());
        });
    }
}
