//! Application shell: picker on top, the two panes side by side.
//!
//! Data flow is one-way: the picker emits selection and frame rate events on
//! the bus, `handle_events()` forwards them to both panes. Panes never talk
//! to each other.

use eframe::egui;
use log::{debug, info};
use std::time::Instant;

use super::pane::PlayerPane;
use super::picker::{FilePicker, is_video_path};
use crate::cli::Args;
use crate::core::events::{FileSelectedEvent, FrameRateDetectedEvent, SelectionClearedEvent};
use crate::core::{
    BoxedEvent, EventBus, MediaEngine, ResourceBinder, TickScheduler, downcast_event,
};
use crate::media::{ExtractSource, MediaElement, SeekSource};

const SEEK_TITLE: &str = "Seek decoder";
const SEEK_ABOUT: &str = "Trusts container timestamps, like a platform video element. \
A seek jumps to the nearest preceding keyframe and decodes forward to the \
requested presentation time. Fast, but only as accurate as the file's timestamps.";

const EXTRACT_TITLE: &str = "Frame extractor";
const EXTRACT_ABOUT: &str = "Counts decoded frames from the start of the stream and \
serves them from an extracted-frame cache. Frame N is always the N-th decoded \
frame, whatever its timestamp says. Stepping back over cached frames is instant; \
a cache miss decodes again from the beginning.";

/// Route one picker event to both panes
fn forward_event<A: MediaEngine, B: MediaEngine>(
    event: &BoxedEvent,
    seek: &mut PlayerPane<A>,
    extract: &mut PlayerPane<B>,
    binder: &ResourceBinder,
    autoplay: bool,
) {
    if let Some(FileSelectedEvent(file)) = downcast_event::<FileSelectedEvent>(event) {
        debug!("Loading {} into both panes", file.name());
        seek.load(file, binder, autoplay);
        extract.load(file, binder, autoplay);
    } else if downcast_event::<SelectionClearedEvent>(event).is_some() {
        seek.clear();
        extract.clear();
    } else if let Some(FrameRateDetectedEvent(rate)) =
        downcast_event::<FrameRateDetectedEvent>(event)
    {
        seek.set_frame_rate(*rate);
        extract.set_frame_rate(*rate);
    }
}

pub struct ComparisonApp {
    bus: EventBus,
    binder: ResourceBinder,
    scheduler: TickScheduler,
    picker: FilePicker,
    seek_pane: PlayerPane<MediaElement<SeekSource>>,
    extract_pane: PlayerPane<MediaElement<ExtractSource>>,
    autoplay: bool,
}

impl ComparisonApp {
    pub fn new(cc: &eframe::CreationContext<'_>, args: &Args) -> Self {
        let ctx = &cc.egui_ctx;
        let bus = EventBus::new();
        let binder = ResourceBinder::new();
        let scheduler = TickScheduler::new();

        bus.subscribe::<FrameRateDetectedEvent, _>(|e| {
            info!("Frame rate for both panes: {} fps", e.0);
        });

        let mut seek_pane = PlayerPane::new(
            SEEK_TITLE,
            SEEK_ABOUT,
            MediaElement::new(),
            scheduler.clone(),
            ctx,
        );
        let mut extract_pane = PlayerPane::new(
            EXTRACT_TITLE,
            EXTRACT_ABOUT,
            MediaElement::new(),
            scheduler.clone(),
            ctx,
        );
        seek_pane.set_playback_rate(args.rate);
        extract_pane.set_playback_rate(args.rate);

        let mut app = Self {
            picker: FilePicker::new(bus.emitter(), binder.clone()),
            bus,
            binder,
            scheduler,
            seek_pane,
            extract_pane,
            autoplay: args.autoplay,
        };

        if let Some(path) = &args.file_path {
            app.picker.select_path(path);
        }
        app
    }

    /// Forward picker events to both panes
    fn handle_events(&mut self) {
        for event in self.bus.poll() {
            forward_event(
                &event,
                &mut self.seek_pane,
                &mut self.extract_pane,
                &self.binder,
                self.autoplay,
            );
        }
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped: Vec<std::path::PathBuf> = ctx.input(|i| {
            i.raw
                .dropped_files
                .iter()
                .filter_map(|f| f.path.clone())
                .collect()
        });
        if dropped.is_empty() {
            return;
        }
        info!("Files dropped: {:?}", dropped);
        // First video wins; only one file is compared at a time
        if let Some(path) = dropped.iter().find(|p| is_video_path(p)).or(dropped.first()) {
            self.picker.select_path(path);
        }
    }
}

impl eframe::App for ComparisonApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_dropped_files(ctx);
        self.picker.poll();
        self.handle_events();

        let now = Instant::now();
        self.seek_pane.update(now);
        self.extract_pane.update(now);

        egui::TopBottomPanel::top("picker").show(ctx, |ui| {
            ui.add_space(4.0);
            self.picker.ui(ui);
            ui.add_space(4.0);
        });

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                // Both panes share one rate
                let frame_rate = self.seek_pane.player().frame_rate();
                ui.label(format!("Frame rate: {} fps", frame_rate));
                ui.separator();
                ui.label(
                    egui::RichText::new(format!(
                        "{} of {} playable handle(s) live, {} ticker(s)",
                        self.binder.live_handles(),
                        self.binder.created_count(),
                        self.scheduler.live_tasks()
                    ))
                    .weak(),
                );
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            if self.picker.file().is_none() {
                ui.centered_and_justified(|ui| {
                    ui.label(egui::RichText::new("Choose or drop a video file to compare").weak());
                });
                return;
            }
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.columns(2, |cols| {
                    self.seek_pane.ui(&mut cols[0]);
                    self.extract_pane.ui(&mut cols[1]);
                });
            });
        });

        // Keep sampling while playing or while workers owe us results
        let wake = [
            self.seek_pane.repaint_after(now),
            self.extract_pane.repaint_after(now),
            self.picker.is_probing().then(TickScheduler::interval),
        ]
        .into_iter()
        .flatten()
        .min();
        if let Some(after) = wake {
            ctx.request_repaint_after(after);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::frame_rate::FrameRate;
    use crate::core::{PlaybackState, Player};
    use crate::media::testing::FakeEngine;
    use crate::media::{MediaError, SourceFile, StreamInfo};
    use std::path::Path;
    use std::thread;
    use std::time::Duration;

    fn ntsc_reader(_: &Path) -> Result<StreamInfo, MediaError> {
        Ok(StreamInfo {
            width: 1920,
            height: 1080,
            duration: 60.06,
            nominal_fps: 29.97,
            codec_name: "h264".to_string(),
        })
    }

    struct Rig {
        bus: EventBus,
        binder: ResourceBinder,
        picker: FilePicker,
        seek: PlayerPane<FakeEngine>,
        extract: PlayerPane<FakeEngine>,
    }

    impl Rig {
        fn new() -> Self {
            let ctx = egui::Context::default();
            let bus = EventBus::new();
            let binder = ResourceBinder::new();
            let scheduler = TickScheduler::new();
            let picker = FilePicker::with_reader(bus.emitter(), binder.clone(), ntsc_reader);
            let seek = PlayerPane::new("A", "", FakeEngine::default(), scheduler.clone(), &ctx);
            let extract = PlayerPane::new("B", "", FakeEngine::default(), scheduler, &ctx);
            Self {
                bus,
                binder,
                picker,
                seek,
                extract,
            }
        }

        fn forward(&mut self, autoplay: bool) {
            for event in self.bus.poll() {
                forward_event(
                    &event,
                    &mut self.seek,
                    &mut self.extract,
                    &self.binder,
                    autoplay,
                );
            }
        }

        fn update(&mut self) {
            let now = Instant::now();
            self.seek.update(now);
            self.extract.update(now);
        }

        fn rates(&self) -> (FrameRate, FrameRate) {
            (
                self.seek.player().frame_rate(),
                self.extract.player().frame_rate(),
            )
        }

        fn finish_probe(&mut self) {
            let deadline = Instant::now() + Duration::from_secs(2);
            while self.picker.is_probing() {
                assert!(Instant::now() < deadline, "metadata probe did not finish");
                thread::sleep(Duration::from_millis(2));
                self.picker.poll();
            }
        }
    }

    fn states<A: MediaEngine, B: MediaEngine>(
        a: &Player<A>,
        b: &Player<B>,
    ) -> (PlaybackState, PlaybackState) {
        (a.state(), b.state())
    }

    #[test]
    fn test_selection_resets_both_panes_to_default_rate() {
        let mut rig = Rig::new();
        rig.seek.set_frame_rate(FrameRate::NTSC);
        rig.extract.set_frame_rate(FrameRate::NTSC);

        rig.picker.select(SourceFile::new("/videos/r2.mp4", 1));
        rig.forward(false);
        assert_eq!(rig.rates(), (FrameRate::STANDARD, FrameRate::STANDARD));
        // Probe handle plus one per pane
        assert_eq!(rig.binder.live_handles(), 3);
    }

    #[test]
    fn test_detected_rate_reaches_both_panes() {
        let mut rig = Rig::new();
        rig.picker.select(SourceFile::new("/videos/r1.mp4", 1));
        rig.forward(false);
        rig.finish_probe();
        rig.forward(false);

        assert_eq!(rig.rates(), (FrameRate::NTSC, FrameRate::NTSC));
        assert_eq!(rig.binder.live_handles(), 2);

        rig.update();
        assert_eq!(rig.seek.player().total_frames(), 299);
        assert_eq!(rig.extract.player().total_frames(), 299);
    }

    #[test]
    fn test_autoplay_starts_both_panes_once() {
        let mut rig = Rig::new();
        rig.picker.select(SourceFile::new("/videos/r1.mp4", 1));
        rig.forward(true);
        rig.update(); // metadata, autoplay requested
        rig.update(); // play confirmed
        assert_eq!(
            states(rig.seek.player(), rig.extract.player()),
            (PlaybackState::Playing, PlaybackState::Playing)
        );

        rig.update();
        assert_eq!(rig.seek.player().engine().play_calls, 1);
        assert_eq!(rig.extract.player().engine().play_calls, 1);
    }

    #[test]
    fn test_clear_unloads_both_panes() {
        let mut rig = Rig::new();
        rig.picker.select(SourceFile::new("/videos/r1.mp4", 1));
        rig.forward(false);
        rig.update();
        assert_eq!(
            states(rig.seek.player(), rig.extract.player()),
            (PlaybackState::Ready, PlaybackState::Ready)
        );

        rig.picker.clear();
        rig.forward(false);
        assert_eq!(
            states(rig.seek.player(), rig.extract.player()),
            (PlaybackState::Idle, PlaybackState::Idle)
        );
        assert_eq!(rig.binder.live_handles(), 0);
    }
}
