use crate::album::{Album, AlbumPicker};
use crate::analysis::SpectrumFrame;
use crate::bars::SpectrumBars;
use crate::config::PlayerConfig;
use crate::error::PlayerError;
use crate::state::PlaybackState;
use crate::timers::{Timer, TimerKind, Timers};

/// Everything the player needs from the page: media loading, the audio
/// route, and the DOM mirrors of its state.
pub trait PlayerHost {
    /// Remove the current video and disconnect its audio route, if any.
    fn teardown_media(&mut self);

    /// Start loading `album`. Readiness or failure must be reported back
    /// through [`Player::media_ready`] / [`Player::media_failed`] with the
    /// same `generation`.
    fn load_media(&mut self, album: &Album, generation: u64) -> Result<(), PlayerError>;

    /// Play the loaded media and route its audio at `volume`.
    fn start_playback(&mut self, volume: f32) -> Result<(), PlayerError>;

    /// Fill `frame.frequency_data` from the analyser.
    fn read_spectrum(&mut self, frame: &mut SpectrumFrame);

    fn volume(&self) -> f32;
    fn set_volume(&mut self, volume: f32);

    fn show_state(&mut self, previous: PlaybackState, next: PlaybackState);
    fn show_active_album(&mut self, previous: Option<usize>, next: usize);
    fn set_backdrop_alpha(&mut self, alpha: f32);
}

/// Properties of a video once the browser can play it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MediaInfo {
    pub width: u32,
    pub height: u32,
    pub duration: f64,
}

impl MediaInfo {
    pub fn aspect(&self) -> f32 {
        if self.height == 0 {
            return 0.0;
        }
        self.width as f32 / self.height as f32
    }
}

/// The objects tied to one selected album. Replaced wholesale on every swap.
#[derive(Debug)]
pub struct Session {
    pub album: usize,
    pub generation: u64,
    pub media: Option<MediaInfo>,
    pub bars: Option<SpectrumBars>,
}

impl Session {
    pub fn is_ready(&self) -> bool {
        self.bars.is_some()
    }
}

/// What a click on the picker ended up doing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Selection {
    /// Dropped because a fadeout is already running.
    Ignored,
    /// Media for the album is loading now.
    Swapping,
    /// The current album fades out first; the swap follows after the delay.
    FadingOut,
}

pub struct Player {
    config: PlayerConfig,
    state: PlaybackState,
    picker: AlbumPicker,
    session: Option<Session>,
    generation: u64,
    timers: Timers,
    spectrum: SpectrumFrame,
    backdrop_alpha: f32,
}

impl Player {
    pub fn new(config: PlayerConfig) -> Self {
        let picker = AlbumPicker::new(&config.band, config.album_count);
        let spectrum = SpectrumFrame::new(config.bin_count());
        let backdrop_alpha = config.tint_base_alpha;
        Self {
            config,
            state: PlaybackState::Initial,
            picker,
            session: None,
            generation: 0,
            timers: Timers::default(),
            spectrum,
            backdrop_alpha,
        }
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn picker(&self) -> &AlbumPicker {
        &self.picker
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn bars(&self) -> Option<&SpectrumBars> {
        self.session.as_ref().and_then(|s| s.bars.as_ref())
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn backdrop_alpha(&self) -> f32 {
        self.backdrop_alpha
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Push the current state to the page, e.g. right after startup.
    pub fn mirror_state(&self, host: &mut impl PlayerHost) {
        host.show_state(self.state, self.state);
    }

    /// Handle a click on album `index`.
    pub fn select_album(
        &mut self,
        index: usize,
        now_ms: f64,
        host: &mut impl PlayerHost,
    ) -> Result<Selection, PlayerError> {
        self.picker.get(index)?;
        if !self.state.accepts_selection() {
            log::debug!("ignoring album {index} while {}", self.state);
            return Ok(Selection::Ignored);
        }

        let previous = self.picker.activate(index)?;
        host.show_active_album(previous, index);

        if self.state == PlaybackState::Playing {
            self.enter(PlaybackState::Fadeout, host)?;
            self.timers.schedule(
                now_ms,
                self.config.fade_delay_ms,
                self.generation,
                TimerKind::BeginSwap { album: index },
            );
            return Ok(Selection::FadingOut);
        }

        self.begin_swap(index, now_ms, host);
        Ok(Selection::Swapping)
    }

    /// The host's video for `generation` can play.
    ///
    /// Returns `false` when the report is stale or repeated.
    pub fn media_ready(
        &mut self,
        generation: u64,
        info: MediaInfo,
        now_ms: f64,
        host: &mut impl PlayerHost,
    ) -> bool {
        if generation != self.generation {
            log::debug!("stale media ready for generation {generation}");
            return false;
        }
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        if session.is_ready() {
            return false;
        }

        session.media = Some(info);
        session.bars = Some(SpectrumBars::new(
            self.config.bin_count(),
            self.config.visual_width,
            info.aspect(),
            self.config.initial_bar_height,
        ));
        let album = session.album;
        log::info!(
            "album {album} ready: {}x{}, {:.1}s",
            info.width,
            info.height,
            info.duration
        );

        if let Err(err) = host.start_playback(self.config.output_volume) {
            self.fail(err, host);
            return false;
        }
        self.timers.schedule(
            now_ms,
            self.config.settle_delay_ms,
            generation,
            TimerKind::Settle,
        );
        true
    }

    /// The host's video for `generation` failed to load or play.
    pub fn media_failed(&mut self, generation: u64, reason: &str, host: &mut impl PlayerHost) {
        if generation != self.generation {
            log::debug!("stale media failure for generation {generation}: {reason}");
            return;
        }
        let album = self.session.as_ref().map_or(0, |s| s.album);
        self.fail(
            PlayerError::MediaFailed {
                album,
                reason: reason.to_owned(),
            },
            host,
        );
    }

    /// One tick of the render loop: fire due timers, then move bars, tint
    /// and volume according to the current state.
    pub fn frame(&mut self, now_ms: f64, host: &mut impl PlayerHost) {
        for timer in self.timers.take_due(now_ms) {
            self.fire(timer, now_ms, host);
        }

        match self.state {
            PlaybackState::Playing => {
                let Some(bars) = self.session.as_mut().and_then(|s| s.bars.as_mut()) else {
                    return;
                };
                self.spectrum.reset(self.config.bin_count());
                host.read_spectrum(&mut self.spectrum);
                bars.apply_spectrum(&self.spectrum.frequency_data);
                self.backdrop_alpha = self.spectrum.backdrop_alpha(
                    self.config.fft_size,
                    self.config.tint_base_alpha,
                    self.config.max_tint_alpha,
                );
                host.set_backdrop_alpha(self.backdrop_alpha);
            }
            PlaybackState::Fadeout => {
                let step = self.config.fade_step;
                if let Some(bars) = self.session.as_mut().and_then(|s| s.bars.as_mut()) {
                    bars.decay(step);
                }
                let volume = (host.volume() - step).max(0.0);
                host.set_volume(volume);
            }
            PlaybackState::Initial | PlaybackState::Failed => {}
        }
    }

    fn fire(&mut self, timer: Timer, now_ms: f64, host: &mut impl PlayerHost) {
        if timer.generation != self.generation {
            return;
        }
        match timer.kind {
            TimerKind::BeginSwap { album } => {
                if self.state == PlaybackState::Fadeout {
                    self.begin_swap(album, now_ms, host);
                }
            }
            TimerKind::Settle => {
                if self.session.as_ref().is_some_and(Session::is_ready) {
                    if let Err(err) = self.enter(PlaybackState::Playing, host) {
                        log::warn!("settle: {err}");
                    }
                }
            }
            TimerKind::ReadyTimeout => {
                if let Some(session) = self.session.as_ref().filter(|s| !s.is_ready()) {
                    let album = session.album;
                    self.fail(PlayerError::MediaTimeout { album }, host);
                }
            }
        }
    }

    /// Tear down the current session and start loading `album`.
    fn begin_swap(&mut self, album: usize, now_ms: f64, host: &mut impl PlayerHost) {
        host.teardown_media();
        self.session = None;
        self.generation += 1;
        let generation = self.generation;

        let target = match self.picker.get(album) {
            Ok(a) => a.clone(),
            Err(err) => {
                self.fail(err, host);
                return;
            }
        };
        log::info!("loading album {album} from {} (generation {generation})", target.video);
        self.session = Some(Session {
            album,
            generation,
            media: None,
            bars: None,
        });
        self.timers.schedule(
            now_ms,
            self.config.ready_timeout_ms,
            generation,
            TimerKind::ReadyTimeout,
        );
        if let Err(err) = host.load_media(&target, generation) {
            self.fail(err, host);
        }
    }

    fn fail(&mut self, err: PlayerError, host: &mut impl PlayerHost) {
        log::error!("{err}");
        host.teardown_media();
        self.session = None;
        self.generation += 1;
        self.timers.clear();
        if self.state != PlaybackState::Failed {
            if let Err(e) = self.enter(PlaybackState::Failed, host) {
                log::warn!("{e}");
            }
        }
    }

    fn enter(&mut self, to: PlaybackState, host: &mut impl PlayerHost) -> Result<(), PlayerError> {
        let from = self.state.transition(to)?;
        log::info!("state {from} -> {to}");
        host.show_state(from, to);
        Ok(())
    }
}
