//! Crop session: owns the source image, the viewport transform and the
//! surface state, and turns host input into events.
//!
//! # Event dispatch
//!
//! Every event runs through two steps in order: the session's own handler
//! (which maintains the affordance, the last error and the transform reset
//! on load) and then the optional external listener. The listener receives
//! a shared reference and cannot call back into the session.
//!
//! # Loading
//!
//! Encoded bytes, rasters and files load synchronously. URL sources only
//! produce a [`LoadTicket`]; the host fetches the bytes and completes the
//! load with [`CropSession::finish_load_bytes`]. Starting a new load
//! invalidates every earlier ticket.

mod events;
mod source;
mod state;


use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use image::RgbaImage;
use tracing::{debug, trace, warn};

use crate::decode::{decode_image, DecodeError, SourceImage};
use crate::encode::OutputType;
use crate::error::{ClipError, ErrorKind};
use crate::export::{export, raster_fits, source_rect, CropResult, ExportError, SourceRect};
use crate::geometry::{render_overlay, Region};
use crate::gesture::{GestureAction, GestureMachine, PointerPhase, PointerSample};
use crate::options::Options;
use crate::viewport::{CoverageBounds, Transform};

pub use events::{HideReason, Listener, SessionEvent};
pub use source::{cache_bust, ImageSource, LoadTicket};
pub use state::{Affordance, LoadState, ViewportWindow};

/// Per-call overrides for [`CropSession::save`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SaveRequest {
    pub output_type: Option<OutputType>,
    pub quality: Option<f64>,
}

impl SaveRequest {
    pub fn new(output_type: OutputType, quality: Option<f64>) -> Self {
        Self {
            output_type: Some(output_type),
            quality,
        }
    }
}

pub struct CropSession {
    options: Options,
    state: LoadState,
    /// State to restore when the in-flight load fails.
    state_before_load: LoadState,
    image: Option<SourceImage>,
    window: ViewportWindow,
    open: bool,
    transform: Transform,
    gestures: GestureMachine,
    affordance: Affordance,
    last_error: Option<ClipError>,
    result: Option<Arc<CropResult>>,
    generation: u64,
    pending: Option<u64>,
    cache_nonce: u32,
    listener: Option<Listener>,
}

impl Default for CropSession {
    fn default() -> Self {
        Self::new(Options::default())
    }
}

impl fmt::Debug for CropSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CropSession")
            .field("options", &self.options)
            .field("state", &self.state)
            .field("window", &self.window)
            .field("open", &self.open)
            .field("transform", &self.transform)
            .field("affordance", &self.affordance)
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

impl CropSession {
    pub fn new(options: Options) -> Self {
        Self {
            options,
            state: LoadState::Idle,
            state_before_load: LoadState::Idle,
            image: None,
            window: ViewportWindow::default(),
            open: false,
            transform: Transform::default(),
            gestures: GestureMachine::new(),
            affordance: Affordance::Empty,
            last_error: None,
            result: None,
            generation: 0,
            pending: None,
            cache_nonce: source::random_nonce(),
            listener: None,
        }
    }

    /// Fix the `_random` value appended to URL loads.
    pub fn with_cache_nonce(mut self, nonce: u32) -> Self {
        self.cache_nonce = nonce;
        self
    }

    pub fn set_listener<F>(&mut self, listener: F)
    where
        F: FnMut(&SessionEvent) + 'static,
    {
        self.listener = Some(Box::new(listener));
    }

    pub fn clear_listener(&mut self) {
        self.listener = None;
    }

    // ===== Accessors =====

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn image(&self) -> Option<&SourceImage> {
        self.image.as_ref()
    }

    pub fn window(&self) -> &ViewportWindow {
        &self.window
    }

    pub fn region(&self) -> Region {
        self.window.region
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    pub fn affordance(&self) -> &Affordance {
        &self.affordance
    }

    pub fn last_error(&self) -> Option<&ClipError> {
        self.last_error.as_ref()
    }

    /// Most recent successful export.
    pub fn result(&self) -> Option<&CropResult> {
        self.result.as_deref()
    }

    pub fn target_width(&self) -> Option<u32> {
        self.options.width
    }

    pub fn target_height(&self) -> Option<u32> {
        self.options.height
    }

    /// Set the export width; zero is ignored.
    pub fn set_target_width(&mut self, width: u32) {
        self.options.set_width(width);
    }

    /// Set the export height; zero is ignored.
    pub fn set_target_height(&mut self, height: u32) {
        self.options.set_height(height);
    }

    /// Whether a save would have something to export.
    pub fn can_save(&self) -> bool {
        self.state == LoadState::Loaded && self.image.is_some() && !self.window.region.is_empty()
    }

    /// Source pixels currently inside the crop region.
    pub fn visible_rect(&self) -> Option<SourceRect> {
        if self.state != LoadState::Loaded {
            return None;
        }
        source_rect(&self.transform, &self.window.region).ok()
    }

    /// Dimmed cover layer for the current window, shape and region.
    pub fn overlay(&self) -> Option<RgbaImage> {
        if self.window.is_empty() || !raster_fits(self.window.width, self.window.height) {
            return None;
        }
        Some(render_overlay(
            self.window.width,
            self.window.height,
            &self.window.region,
            self.options.shape,
        ))
    }

    // ===== Configuration =====

    /// Replace the options and re-fit the view to the new region.
    pub fn set_options(&mut self, options: Options) {
        self.options = options;
        self.window = ViewportWindow::new(self.window.width, self.window.height, &self.options);
        self.reset();
    }

    // ===== Loading =====

    /// Load an image from `source`.
    ///
    /// Returns a ticket for URL sources, which the host completes with
    /// [`finish_load_bytes`](Self::finish_load_bytes) or
    /// [`finish_load`](Self::finish_load). Other sources complete before
    /// this returns.
    pub fn load(&mut self, source: ImageSource) -> Result<Option<LoadTicket>, ClipError> {
        match source {
            ImageSource::Url(url) => {
                let mut ticket = self.begin_load();
                let request = cache_bust(&url, self.cache_nonce);
                debug!(url = %request, generation = ticket.generation, "requesting image");
                ticket.url = Some(request);
                Ok(Some(ticket))
            }
            ImageSource::Encoded(bytes) => {
                let ticket = self.begin_load();
                self.finish_load_bytes(&ticket, &bytes).map(|()| None)
            }
            ImageSource::Raster(image) => {
                let ticket = self.begin_load();
                self.finish_load(&ticket, Ok::<_, DecodeError>(image))
                    .map(|()| None)
            }
            ImageSource::File(path) => {
                let bytes = match std::fs::read(&path) {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "failed to read image file");
                        let err = ClipError::with_cause(ErrorKind::OpenFileFail, e);
                        self.emit(SessionEvent::Error(err.clone()));
                        return Err(err);
                    }
                };
                let ticket = self.begin_load();
                self.finish_load_bytes(&ticket, &bytes).map(|()| None)
            }
        }
    }

    /// Enter `Loading` and invalidate earlier tickets.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        if self.state != LoadState::Loading {
            self.state_before_load = self.state;
        }
        self.state = LoadState::Loading;
        self.pending = Some(self.generation);
        debug!(generation = self.generation, "load started");
        self.emit(SessionEvent::Loading);
        LoadTicket {
            generation: self.generation,
            url: None,
        }
    }

    /// Decode `bytes` and complete the load for `ticket`.
    pub fn finish_load_bytes(&mut self, ticket: &LoadTicket, bytes: &[u8]) -> Result<(), ClipError> {
        if !self.is_current(ticket) {
            debug!(generation = ticket.generation, "ignoring stale load");
            return Ok(());
        }
        self.finish_load(ticket, decode_image(bytes))
    }

    /// Complete the load for `ticket` with a decoded image or the error
    /// that prevented one. Stale tickets are ignored.
    pub fn finish_load<E>(
        &mut self,
        ticket: &LoadTicket,
        outcome: Result<SourceImage, E>,
    ) -> Result<(), ClipError>
    where
        E: StdError + Send + Sync + 'static,
    {
        if !self.is_current(ticket) {
            debug!(generation = ticket.generation, "ignoring stale load");
            return Ok(());
        }
        self.pending = None;

        let err = match outcome {
            Ok(image) if !image.is_empty() => {
                let (width, height) = (image.width, image.height);
                self.image = Some(image);
                self.state = LoadState::Loaded;
                self.last_error = None;
                debug!(width, height, generation = ticket.generation, "image loaded");
                self.emit(SessionEvent::Loaded { width, height });
                return Ok(());
            }
            Ok(image) => ClipError::with_cause(
                ErrorKind::LoadImgFail,
                DecodeError::EmptyImage {
                    width: image.width,
                    height: image.height,
                },
            ),
            Err(e) => ClipError::with_cause(ErrorKind::LoadImgFail, e),
        };

        self.state = self.state_before_load;
        warn!(error = %err, generation = ticket.generation, "image load failed");
        self.emit(SessionEvent::Error(err.clone()));
        Err(err)
    }

    fn is_current(&self, ticket: &LoadTicket) -> bool {
        self.pending == Some(ticket.generation)
    }

    // ===== Surface =====

    /// Open the surface at `width x height`. An open surface is torn down
    /// first without emitting `Hide`.
    pub fn show(&mut self, width: u32, height: u32) {
        if self.open {
            self.gestures.reset();
        }
        self.window = ViewportWindow::new(width, height, &self.options);
        self.open = true;
        self.reset();
        debug!(width, height, "surface shown");
        self.emit(SessionEvent::Show { width, height });
    }

    /// Close the surface. Does nothing when already closed.
    pub fn hide(&mut self, reason: HideReason) {
        if !self.open {
            return;
        }
        self.open = false;
        self.gestures.reset();
        debug!(%reason, "surface hidden");
        self.emit(SessionEvent::Hide(reason));
    }

    /// The surface changed size: recompute the region and re-fit.
    pub fn resize_window(&mut self, width: u32, height: u32) {
        self.window = ViewportWindow::new(width, height, &self.options);
        self.reset();
    }

    /// Re-fit the image so it covers the window.
    pub fn reset(&mut self) {
        let Some(bounds) = self.coverage_bounds() else {
            return;
        };
        let Some(image) = self.image.as_ref() else {
            return;
        };
        self.transform = Transform::reset_covering(
            &bounds,
            image.width,
            image.height,
            self.window.width,
            self.window.height,
        );
        trace!(
            x = self.transform.x,
            y = self.transform.y,
            scale = self.transform.scale,
            "transform reset"
        );
    }

    /// Drop the image, result and errors. An open surface is hidden and
    /// shown again at the same size.
    pub fn clear(&mut self) {
        self.image = None;
        self.state = LoadState::Idle;
        self.state_before_load = LoadState::Idle;
        self.pending = None;
        self.transform = Transform::default();
        self.gestures.reset();
        self.last_error = None;
        self.result = None;
        self.affordance = Affordance::Empty;
        debug!("session cleared");

        if self.open {
            let (width, height) = (self.window.width, self.window.height);
            self.hide(HideReason::Hide);
            self.show(width, height);
        }
    }

    fn coverage_bounds(&self) -> Option<CoverageBounds> {
        if self.state != LoadState::Loaded {
            return None;
        }
        let image = self.image.as_ref()?;
        Some(CoverageBounds::new(image.width, image.height, self.window.region))
    }

    // ===== Input =====

    /// Feed one pointer frame. Frames are dropped while the surface is
    /// closed; pan and pinch only move a loaded image.
    pub fn pointer(&mut self, phase: PointerPhase, contacts: &[PointerSample]) -> Option<GestureAction> {
        if !self.open {
            return None;
        }
        let action = self.gestures.handle(phase, contacts)?;
        trace!(?action, "gesture");

        match action {
            GestureAction::Pan { dx, dy } => {
                if let Some(bounds) = self.coverage_bounds() {
                    self.transform.pan(dx, dy, &bounds);
                }
            }
            GestureAction::Pinch {
                focal_x,
                focal_y,
                ratio,
            } => {
                if let Some(bounds) = self.coverage_bounds() {
                    self.transform.pinch(focal_x, focal_y, ratio, &bounds);
                }
            }
            GestureAction::Tap { x, y } => self.emit(SessionEvent::Tap { x, y }),
        }
        Some(action)
    }

    /// Mouse-wheel zoom at `(x, y)`. Returns whether the transform changed.
    pub fn wheel(&mut self, x: f64, y: f64, delta_y: f64) -> bool {
        if !self.open {
            return false;
        }
        let Some(bounds) = self.coverage_bounds() else {
            return false;
        };
        let applied = self.transform.zoom_wheel(x, y, delta_y, &bounds);
        trace!(x, y, delta_y, applied, "wheel zoom");
        applied
    }

    // ===== Export =====

    /// Export the visible region. See [`save_then`](Self::save_then).
    pub fn save(&mut self, request: SaveRequest) -> Result<Arc<CropResult>, ClipError> {
        self.save_then(request, |_| {})
    }

    /// Export the visible region, then run `callback` with the outcome.
    ///
    /// Order on success: `Saved` event, callback, then hide with reason
    /// `save`. On failure the previous result is kept and `Error` is
    /// emitted before the callback.
    pub fn save_then<F>(&mut self, request: SaveRequest, callback: F) -> Result<Arc<CropResult>, ClipError>
    where
        F: FnOnce(Result<&CropResult, &ClipError>),
    {
        let output_type = request.output_type.unwrap_or(self.options.output_type);
        let quality = request.quality.or(self.options.quality);

        let outcome = match (&self.image, self.state) {
            (Some(image), LoadState::Loaded) => export(
                image,
                &self.transform,
                &self.window.region,
                &self.options,
                output_type,
                quality,
            ),
            _ => Err(ExportError::NoImage),
        };

        match outcome {
            Ok(result) => {
                let result = Arc::new(result);
                self.result = Some(Arc::clone(&result));
                self.emit(SessionEvent::Saved(Arc::clone(&result)));
                callback(Ok(&result));
                self.hide(HideReason::Save);
                Ok(result)
            }
            Err(e) => {
                warn!(error = %e, "export failed");
                let err = ClipError::with_cause(ErrorKind::SaveImgFail, e);
                self.emit(SessionEvent::Error(err.clone()));
                callback(Err(&err));
                Err(err)
            }
        }
    }

    // ===== Dispatch =====

    fn emit(&mut self, event: SessionEvent) {
        self.handle_event(&event);
        if let Some(listener) = self.listener.as_mut() {
            listener(&event);
        }
    }

    fn handle_event(&mut self, event: &SessionEvent) {
        match event {
            SessionEvent::Loading => self.affordance = Affordance::Loading,
            SessionEvent::Loaded { .. } => {
                self.reset();
                self.affordance = Affordance::None;
            }
            SessionEvent::Show { .. } => {
                self.affordance = match self.state {
                    LoadState::Idle => Affordance::Empty,
                    LoadState::Loading => Affordance::Loading,
                    LoadState::Loaded => Affordance::None,
                };
            }
            SessionEvent::Error(err) => {
                self.last_error = Some(err.clone());
                self.affordance = Affordance::Error(err.message().to_string());
            }
            SessionEvent::Hide(_) | SessionEvent::Saved(_) | SessionEvent::Tap { .. } => {}
        }
    }
}
