//! File selection surface with the metadata card.

use eframe::egui;
use log::{info, warn};
use std::path::Path;

use crate::core::events::{FileSelectedEvent, FrameRateDetectedEvent, SelectionClearedEvent};
use crate::core::{EventEmitter, ResourceBinder};
use crate::media::{MediaError, ProbeJob, SourceFile, StreamInfo, VIDEO_EXTS, VideoMetadata};

/// Reads stream properties for the metadata probe
pub type StreamReader = fn(&Path) -> Result<StreamInfo, MediaError>;

/// Create configured file dialog for video selection.
pub fn create_video_dialog(title: &str) -> rfd::FileDialog {
    rfd::FileDialog::new()
        .add_filter("Video Files", VIDEO_EXTS)
        .add_filter("All Files", &["*"])
        .set_title(title)
}

/// True when `path` has one of the offered video extensions
pub fn is_video_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| VIDEO_EXTS.iter().any(|v| v.eq_ignore_ascii_case(ext)))
}

pub struct FilePicker {
    emitter: EventEmitter,
    binder: ResourceBinder,
    file: Option<SourceFile>,
    metadata: Option<VideoMetadata>,
    probe: Option<ProbeJob>,
    reader: StreamReader,
    error: Option<String>,
}

impl FilePicker {
    /// Picker probing files with FFmpeg
    pub fn new(emitter: EventEmitter, binder: ResourceBinder) -> Self {
        Self::with_reader(emitter, binder, StreamInfo::read)
    }

    pub fn with_reader(
        emitter: EventEmitter,
        binder: ResourceBinder,
        reader: StreamReader,
    ) -> Self {
        Self {
            emitter,
            binder,
            file: None,
            metadata: None,
            probe: None,
            reader,
            error: None,
        }
    }

    pub fn file(&self) -> Option<&SourceFile> {
        self.file.as_ref()
    }

    pub fn is_probing(&self) -> bool {
        self.probe.is_some()
    }

    /// Stat and select a file from disk
    pub fn select_path(&mut self, path: &Path) {
        match SourceFile::open(path) {
            Ok(file) => self.select(file),
            Err(e) => {
                warn!("Cannot select {}: {}", path.display(), e);
                self.error = Some(e.to_string());
            }
        }
    }

    /// Make `file` the current selection and start probing it
    pub fn select(&mut self, file: SourceFile) {
        info!("Selected {} ({:.2} MB)", file.name(), file.size_mb());
        // Drop the previous probe (and its handle) before binding a new one
        self.probe = None;
        self.metadata = None;
        self.error = None;

        let handle = self.binder.bind(&file);
        self.probe = Some(ProbeJob::spawn(file.clone(), handle, self.reader));
        self.file = Some(file.clone());
        self.emitter.emit(FileSelectedEvent(file));
    }

    pub fn clear(&mut self) {
        if self.file.is_none() {
            return;
        }
        info!("Selection cleared");
        self.probe = None;
        self.file = None;
        self.metadata = None;
        self.error = None;
        self.emitter.emit(SelectionClearedEvent);
    }

    /// Collect a finished probe
    pub fn poll(&mut self) {
        let Some(result) = self.probe.as_mut().and_then(|job| job.try_finish()) else {
            return;
        };
        self.probe = None;
        match result {
            Ok(meta) => {
                info!(
                    "Metadata: {}x{}, {:.3}s, {} fps, {} kbps",
                    meta.width, meta.height, meta.duration, meta.frame_rate, meta.bitrate_kbps
                );
                self.emitter.emit(FrameRateDetectedEvent(meta.frame_rate));
                self.metadata = Some(meta);
            }
            Err(e) => {
                warn!("Metadata probe failed: {}", e);
                self.error = Some(e.to_string());
            }
        }
    }

    pub fn ui(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if ui.button("📂 Choose video...").clicked()
                && let Some(path) = create_video_dialog("Open Video").pick_file()
            {
                self.select_path(&path);
            }
            if ui
                .add_enabled(self.file.is_some(), egui::Button::new("Clear"))
                .clicked()
            {
                self.clear();
            }

            match &self.file {
                Some(file) => {
                    ui.strong(file.name());
                    ui.label(format!("({:.2} MB)", file.size_mb()));
                }
                None => {
                    ui.label(egui::RichText::new("or drop a video file onto the window").weak());
                }
            }
            if self.probe.is_some() {
                ui.spinner();
            }
        });

        if let Some(err) = &self.error {
            ui.label(egui::RichText::new(err).weak());
        }

        if let Some(meta) = &self.metadata {
            egui::Grid::new("video_info")
                .num_columns(2)
                .spacing([24.0, 2.0])
                .show(ui, |ui| {
                    for (label, value) in meta.rows() {
                        ui.label(egui::RichText::new(label).weak());
                        ui.monospace(value);
                        ui.end_row();
                    }
                });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::frame_rate::FrameRate;
    use crate::core::{EventBus, downcast_event};
    use std::thread;
    use std::time::{Duration, Instant};

    fn ntsc_reader(_: &Path) -> Result<StreamInfo, MediaError> {
        Ok(StreamInfo {
            width: 1280,
            height: 720,
            duration: 60.06,
            nominal_fps: 29.97,
            codec_name: "h264".to_string(),
        })
    }

    fn failing_reader(path: &Path) -> Result<StreamInfo, MediaError> {
        Err(MediaError::NoVideoStream(path.to_path_buf()))
    }

    /// Poll until the probe finishes
    fn finish_probe(picker: &mut FilePicker) {
        let deadline = Instant::now() + Duration::from_secs(2);
        while picker.is_probing() {
            assert!(Instant::now() < deadline, "metadata probe did not finish");
            thread::sleep(Duration::from_millis(2));
            picker.poll();
        }
    }

    #[test]
    fn test_is_video_path() {
        assert!(is_video_path(Path::new("/v/clip.MP4")));
        assert!(is_video_path(Path::new("clip.webm")));
        assert!(!is_video_path(Path::new("notes.txt")));
        assert!(!is_video_path(Path::new("noext")));
    }

    #[test]
    fn test_select_emits_and_holds_probe_handle() {
        let bus = EventBus::new();
        let binder = ResourceBinder::new();
        let mut picker = FilePicker::new(bus.emitter(), binder.clone());

        picker.select(SourceFile::new("/videos/a.mp4", 1));
        assert!(picker.is_probing());
        assert_eq!(binder.live_handles(), 1);

        // Replacing releases the earlier probe handle first
        picker.select(SourceFile::new("/videos/b.mp4", 1));
        assert_eq!(binder.live_handles(), 1);
        assert_eq!(binder.released_count(), 1);

        let events = bus.poll();
        assert_eq!(events.len(), 2);
        let last = downcast_event::<FileSelectedEvent>(&events[1]).unwrap();
        assert_eq!(last.0.name(), "b.mp4");

        picker.clear();
        assert_eq!(binder.live_handles(), 0);
        assert!(picker.file().is_none());
        assert!(downcast_event::<SelectionClearedEvent>(&bus.poll()[0]).is_some());
    }

    #[test]
    fn test_missing_path_reports_error() {
        let bus = EventBus::new();
        let mut picker = FilePicker::new(bus.emitter(), ResourceBinder::new());
        picker.select_path(Path::new("/definitely/not/here.mp4"));
        assert!(picker.file().is_none());
        assert!(bus.poll().is_empty());
        picker.clear();
        assert!(bus.poll().is_empty());
    }

    #[test]
    fn test_metadata_read_emits_detected_rate() {
        let bus = EventBus::new();
        let binder = ResourceBinder::new();
        let mut picker = FilePicker::with_reader(bus.emitter(), binder.clone(), ntsc_reader);

        picker.select(SourceFile::new("/videos/r1.mp4", 15_015_000));
        assert_eq!(bus.poll().len(), 1);
        finish_probe(&mut picker);

        let events = bus.poll();
        assert_eq!(events.len(), 1);
        let detected = downcast_event::<FrameRateDetectedEvent>(&events[0]).unwrap();
        assert_eq!(detected.0, FrameRate::NTSC);

        let meta = picker.metadata.as_ref().unwrap();
        assert_eq!(meta.total_frames(), 1800);
        assert_eq!(meta.bitrate_kbps, 2000);
        // The probe handle is gone once the result is in
        assert_eq!(binder.live_handles(), 0);
    }

    #[test]
    fn test_metadata_failure_sets_error_without_rate() {
        let bus = EventBus::new();
        let mut picker =
            FilePicker::with_reader(bus.emitter(), ResourceBinder::new(), failing_reader);

        picker.select(SourceFile::new("/videos/audio.m4a", 1));
        bus.poll();
        finish_probe(&mut picker);

        assert!(bus.poll().is_empty());
        assert!(picker.metadata.is_none());
        assert!(picker.error.as_deref().is_some_and(|e| e.contains("No video stream")));
    }
}
