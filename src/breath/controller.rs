//! The session state machine.
//!
//! `Idle → Running ⇄ Paused`, `Running → Finished → Running` on the next
//! trigger, and any state back to `Idle` on a configuration change.
//!
//! The controller never sleeps or spawns. The host loop calls
//! [`SessionController::pump`] whenever [`SessionController::next_deadline`]
//! has passed, and forwards user input to [`SessionController::toggle`] and
//! friends. All timing is recomputed from the injected [`Clock`], so missed
//! or late ticks never stretch a phase.

use std::time::Duration;

use tracing::{debug, info};

use crate::breath::phase::{Phase, PhasePlan};
use crate::breath::presenter::{Banner, Presenter};
use crate::breath::session::{SessionSnapshot, SessionState, SessionStatus};
use crate::breath::tone::{Cue, ToneEmitter};
use crate::breath::visual::{self, RenderPolicy, VisualFrame};
use crate::config::SessionConfig;
use crate::core::{Clock, TaskHandle, TaskScheduler};

/// Pause between the end of one phase and the start of the next.
pub const SETTLE_DELAY: Duration = Duration::from_millis(50);
/// Pause between the end of a cycle and the next Inhale.
pub const CYCLE_GAP: Duration = Duration::from_millis(1_000);

/// Tick cadences and transition delays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverTimings {
    /// Progress (ring and orb) refresh interval.
    pub frame_interval: Duration,
    /// Countdown refresh interval.
    pub countdown_interval: Duration,
    /// Delay before advancing to the next phase.
    pub settle: Duration,
    /// Delay between cycles.
    pub cycle_gap: Duration,
}

impl Default for DriverTimings {
    fn default() -> Self {
        Self {
            frame_interval: Duration::from_millis(16),
            countdown_interval: Duration::from_millis(100),
            settle: SETTLE_DELAY,
            cycle_gap: CYCLE_GAP,
        }
    }
}

impl DriverTimings {
    /// Timings from the `session` config section.
    #[must_use]
    pub fn from_config(config: &SessionConfig) -> Self {
        Self {
            frame_interval: Duration::from_millis(config.frame_interval_ms.max(1)),
            countdown_interval: Duration::from_millis(config.countdown_interval_ms.max(1)),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DriverTask {
    Progress,
    Countdown,
    Settle { next: usize },
    NextCycle,
}

impl DriverTask {
    const fn next_phase(self) -> Option<usize> {
        match self {
            Self::Settle { next } => Some(next),
            Self::NextCycle => Some(0),
            Self::Progress | Self::Countdown => None,
        }
    }
}

/// Handles of the tasks currently registered for the session.
#[derive(Debug, Default)]
struct Driver {
    progress: Option<TaskHandle>,
    countdown: Option<TaskHandle>,
    transition: Option<(TaskHandle, DriverTask)>,
}

impl Driver {
    fn owns(&self, handle: TaskHandle, task: DriverTask) -> bool {
        let current = match task {
            DriverTask::Progress => self.progress,
            DriverTask::Countdown => self.countdown,
            DriverTask::Settle { .. } | DriverTask::NextCycle => {
                self.transition.map(|(handle, _)| handle)
            }
        };
        current == Some(handle)
    }
}

/// A settle or cycle gap interrupted by a pause, resumed with its remaining
/// delay.
#[derive(Debug, Clone, Copy)]
struct HeldTransition {
    task: DriverTask,
    remaining: Duration,
}

/// Owns one breathing session and drives its presenter and tones.
pub struct SessionController<P: Presenter, C: Clock> {
    plan: PhasePlan,
    timings: DriverTimings,
    policy: RenderPolicy,
    configured_target: u32,
    state: SessionState,
    scheduler: TaskScheduler<DriverTask>,
    driver: Driver,
    held: Option<HeldTransition>,
    presenter: P,
    clock: C,
    tones: ToneEmitter,
}

impl<P: Presenter, C: Clock> SessionController<P, C> {
    /// Create an idle controller and paint the Ready state.
    pub fn new(
        plan: PhasePlan,
        target_cycles: u32,
        timings: DriverTimings,
        presenter: P,
        clock: C,
        tones: ToneEmitter,
    ) -> Self {
        let target = target_cycles.max(1);
        let mut controller = Self {
            plan,
            timings,
            policy: RenderPolicy::default(),
            configured_target: target,
            state: SessionState::new(target),
            scheduler: TaskScheduler::new(),
            driver: Driver::default(),
            held: None,
            presenter,
            clock,
            tones,
        };
        controller.show_ready();
        controller
    }

    /// Set the renderer policy used for visual frames.
    #[must_use]
    pub const fn with_policy(mut self, policy: RenderPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The single user-facing trigger: start, pause or resume.
    pub fn toggle(&mut self) {
        if !self.tones.audio_requested() || self.state.status.can_start() {
            self.start();
            return;
        }
        match self.state.status {
            SessionStatus::Running => self.pause(),
            SessionStatus::Paused => self.resume(),
            SessionStatus::Idle | SessionStatus::Finished => {}
        }
    }

    /// Start a fresh session. Ignored unless idle or finished.
    pub fn start(&mut self) {
        if !self.state.status.can_start() {
            return;
        }
        self.tones.ensure_ready();
        self.sync_sound();
        self.cancel_all();
        self.held = None;

        self.state.cycle_count = 0;
        self.state.target_cycles = self.configured_target;
        self.state.status = SessionStatus::Running;
        info!(
            target_cycles = self.state.target_cycles,
            cycle = ?self.plan.cycle_duration(),
            "session started"
        );

        self.presenter.set_active(true);
        self.presenter.show_cycles(0, self.state.target_cycles);
        self.advance_phase(0);
    }

    /// Freeze the current phase. Ignored unless running.
    pub fn pause(&mut self) {
        if !self.state.is_running() {
            return;
        }
        let now = self.clock.now();
        if let Some(duration) = self.current_phase().map(|phase| phase.duration) {
            let elapsed = now.saturating_sub(self.state.phase_started_at);
            self.state.elapsed_phase = elapsed.min(duration);
        }
        let held = self.driver.transition.and_then(|(handle, task)| {
            let due = self.scheduler.due_of(handle)?;
            Some(HeldTransition {
                task,
                remaining: due.saturating_sub(now),
            })
        });
        self.cancel_all();
        self.held = held;

        self.state.status = SessionStatus::Paused;
        debug!(elapsed = ?self.state.elapsed_phase, held = self.held.is_some(), "session paused");
        self.presenter.set_active(false);
        self.presenter.show_banner(Banner::Paused);
    }

    /// Continue a paused session where it stopped. Ignored unless paused.
    pub fn resume(&mut self) {
        if self.state.status != SessionStatus::Paused {
            return;
        }
        let Some(phase) = self.current_phase().cloned() else {
            return;
        };
        let now = self.clock.now();
        self.state.phase_started_at = now.saturating_sub(self.state.elapsed_phase);
        self.state.status = SessionStatus::Running;
        debug!(phase = %phase.kind, elapsed = ?self.state.elapsed_phase, "session resumed");

        self.presenter.set_active(true);
        self.presenter.show_phase(&phase);

        match self.held.take() {
            Some(held) => {
                let frame = match held.task {
                    DriverTask::NextCycle => VisualFrame::baseline(),
                    _ => self.frame_at(&phase, self.state.elapsed_phase),
                };
                self.presenter.show_visual(&frame);
                self.presenter.show_countdown(0);
                self.schedule_transition(now + held.remaining, held.task);
            }
            None => self.start_driver(self.state.elapsed_phase),
        }
    }

    /// Switch tones on or off. Never touches the session. Returns the
    /// effective setting.
    pub fn set_sound_enabled(&mut self, enabled: bool) -> bool {
        let effective = self.tones.set_sound_enabled(enabled);
        debug!(requested = enabled, effective, "sound switched");
        self.presenter.show_sound(effective);
        effective
    }

    /// Flip the sound switch. Returns the effective setting.
    pub fn toggle_sound(&mut self) -> bool {
        let enabled = !self.tones.sound_enabled();
        self.set_sound_enabled(enabled)
    }

    /// Apply a new target cycle count and reset to Ready, from any state.
    pub fn on_configuration_changed(&mut self, target_cycles: u32) {
        self.cancel_all();
        self.held = None;
        self.configured_target = target_cycles.max(1);
        self.state = SessionState::new(self.configured_target);
        debug!(target_cycles = self.configured_target, "configuration changed, session reset");
        self.show_ready();
    }

    /// Run every task due now. Call whenever the next deadline passes.
    pub fn pump(&mut self) {
        let now = self.clock.now();
        while let Some((handle, task)) = self.scheduler.pop_due(now) {
            self.dispatch(handle, task, now);
        }
    }

    /// Clock reading at which [`pump`](Self::pump) next has work.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.scheduler.next_due()
    }

    /// Time until the next deadline, zero if it already passed.
    #[must_use]
    pub fn time_until_next_task(&self) -> Option<Duration> {
        let now = self.clock.now();
        self.next_deadline().map(|due| due.saturating_sub(now))
    }

    /// A serializable view of the session.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        let elapsed = if self.state.is_running() {
            self.current_phase().map_or(self.state.elapsed_phase, |phase| {
                self.clock
                    .now()
                    .saturating_sub(self.state.phase_started_at)
                    .min(phase.duration)
            })
        } else {
            self.state.elapsed_phase
        };
        SessionSnapshot {
            status: self.state.status,
            phase: self.current_phase().map(|phase| phase.kind),
            phase_index: self.state.current_phase,
            cycle_count: self.state.cycle_count,
            target_cycles: self.state.target_cycles,
            elapsed_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            sound_enabled: self.tones.sound_enabled(),
            audio_ready: self.tones.audio_ready(),
        }
    }

    #[must_use]
    pub const fn status(&self) -> SessionStatus {
        self.state.status
    }

    #[must_use]
    pub const fn state(&self) -> &SessionState {
        &self.state
    }

    #[must_use]
    pub const fn plan(&self) -> &PhasePlan {
        &self.plan
    }

    #[must_use]
    pub const fn tones(&self) -> &ToneEmitter {
        &self.tones
    }

    #[must_use]
    pub const fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    /// Consume the controller, returning its presenter.
    pub fn into_presenter(self) -> P {
        self.presenter
    }

    fn dispatch(&mut self, handle: TaskHandle, task: DriverTask, now: Duration) {
        if !self.state.is_running() || !self.driver.owns(handle, task) {
            debug!(?task, "stale driver task ignored");
            return;
        }
        match task {
            DriverTask::Progress => self.on_progress(now),
            DriverTask::Countdown => self.on_countdown(now),
            DriverTask::Settle { .. } | DriverTask::NextCycle => {
                self.driver.transition = None;
                if let Some(next) = task.next_phase() {
                    self.advance_phase(next);
                }
            }
        }
    }

    /// Enter phase `index`, or close the cycle when past the last phase.
    fn advance_phase(&mut self, index: usize) {
        let now = self.clock.now();
        if let Some(phase) = self.plan.get(index).cloned() {
            self.state.current_phase = Some(index);
            self.state.elapsed_phase = Duration::ZERO;
            self.state.phase_started_at = now;
            debug!(phase = %phase.kind, cycle = self.state.cycle_count + 1, "phase started");

            self.presenter.show_phase(&phase);
            self.tones.play_cue(phase.kind.cue());
            self.sync_sound();
            self.start_driver(Duration::ZERO);
            return;
        }

        self.cancel_all();
        self.state.cycle_count += 1;
        self.presenter
            .show_cycles(self.state.cycle_count, self.state.target_cycles);
        debug!(
            completed = self.state.cycle_count,
            target = self.state.target_cycles,
            "cycle complete"
        );

        if self.state.cycle_count >= self.state.target_cycles {
            self.finish();
        } else {
            self.presenter.show_visual(&VisualFrame::baseline());
            self.schedule_transition(now + self.timings.cycle_gap, DriverTask::NextCycle);
        }
    }

    /// Render the phase from `initial_elapsed` and register the ticks.
    fn start_driver(&mut self, initial_elapsed: Duration) {
        let Some(phase) = self.current_phase().cloned() else {
            return;
        };
        self.cancel_all();
        let now = self.clock.now();
        let elapsed = initial_elapsed.min(phase.duration);
        self.state.phase_started_at = now.saturating_sub(elapsed);
        self.state.elapsed_phase = elapsed;

        let frame = self.frame_at(&phase, elapsed);
        self.presenter.show_visual(&frame);
        self.presenter
            .show_countdown(visual::remaining_whole_seconds(elapsed, phase.duration));

        let frame_every = self.timings.frame_interval;
        let countdown_every = self.timings.countdown_interval;
        self.driver.progress = Some(self.scheduler.schedule_every(
            now + frame_every,
            frame_every,
            DriverTask::Progress,
        ));
        self.driver.countdown = Some(self.scheduler.schedule_every(
            now + countdown_every,
            countdown_every,
            DriverTask::Countdown,
        ));
    }

    fn on_progress(&mut self, now: Duration) {
        let Some(index) = self.state.current_phase else {
            return;
        };
        let Some(phase) = self.plan.get(index).cloned() else {
            return;
        };
        let elapsed = now
            .saturating_sub(self.state.phase_started_at)
            .min(phase.duration);
        self.state.elapsed_phase = elapsed;

        let frame = self.frame_at(&phase, elapsed);
        self.presenter.show_visual(&frame);

        if elapsed >= phase.duration {
            self.cancel_all();
            self.presenter.show_countdown(0);
            self.schedule_transition(
                now + self.timings.settle,
                DriverTask::Settle { next: index + 1 },
            );
        }
    }

    fn on_countdown(&mut self, now: Duration) {
        let Some(phase) = self.current_phase() else {
            return;
        };
        let elapsed = now.saturating_sub(self.state.phase_started_at);
        let seconds = visual::remaining_whole_seconds(elapsed, phase.duration);
        self.presenter.show_countdown(seconds);
    }

    fn finish(&mut self) {
        self.cancel_all();
        self.state.status = SessionStatus::Finished;
        info!(cycles = self.state.cycle_count, "session finished");

        self.presenter.set_active(false);
        self.presenter.show_banner(Banner::Complete);
        self.presenter.show_countdown(0);
        self.presenter.show_visual(&VisualFrame::baseline());
        self.tones.play_cue(Cue::Completion);
        self.sync_sound();
    }

    fn show_ready(&mut self) {
        self.presenter.set_active(false);
        self.presenter.show_banner(Banner::Ready);
        self.presenter.show_countdown(0);
        self.presenter.show_visual(&VisualFrame::baseline());
        self.presenter.show_cycles(0, self.configured_target);
        self.sync_sound();
    }

    fn schedule_transition(&mut self, due: Duration, task: DriverTask) {
        let handle = self.scheduler.schedule_once(due, task);
        self.driver.transition = Some((handle, task));
    }

    fn cancel_all(&mut self) {
        self.scheduler.cancel_all();
        self.driver = Driver::default();
    }

    fn sync_sound(&mut self) {
        self.presenter.show_sound(self.tones.sound_enabled());
    }

    fn frame_at(&self, phase: &Phase, elapsed: Duration) -> VisualFrame {
        let progress = visual::progress(elapsed, phase.duration);
        visual::frame_for(phase.kind, progress, &phase.color, self.policy)
    }

    fn current_phase(&self) -> Option<&Phase> {
        self.state.current_phase.and_then(|index| self.plan.get(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::breath::phase::PhaseKind;
    use crate::breath::presenter::ViewModel;
    use crate::breath::tone::{AudioBackend, ToneSpec, WaveShape};
    use crate::core::ManualClock;
    use crate::error::BreathError;

    const FRAME: Duration = Duration::from_millis(10);

    /// Keeps a view model plus a log of the calls that matter for ordering.
    #[derive(Debug, Default)]
    struct Recorder {
        view: ViewModel,
        phases: Vec<PhaseKind>,
        banners: Vec<Banner>,
        visuals: usize,
    }

    impl Presenter for Recorder {
        fn show_phase(&mut self, phase: &Phase) {
            self.phases.push(phase.kind);
            self.view.show_phase(phase);
        }

        fn show_banner(&mut self, banner: Banner) {
            self.banners.push(banner);
            self.view.show_banner(banner);
        }

        fn show_visual(&mut self, frame: &VisualFrame) {
            self.visuals += 1;
            self.view.show_visual(frame);
        }

        fn show_countdown(&mut self, seconds: u32) {
            self.view.show_countdown(seconds);
        }

        fn set_active(&mut self, active: bool) {
            self.view.set_active(active);
        }

        fn show_sound(&mut self, enabled: bool) {
            self.view.show_sound(enabled);
        }

        fn show_cycles(&mut self, completed: u32, target: u32) {
            self.view.show_cycles(completed, target);
        }
    }

    struct RecordingBackend(Rc<RefCell<Vec<ToneSpec>>>);

    impl AudioBackend for RecordingBackend {
        fn play(&mut self, tone: &ToneSpec) -> Result<(), BreathError> {
            self.0.borrow_mut().push(*tone);
            Ok(())
        }

        fn name(&self) -> &'static str {
            "recording"
        }
    }

    struct Harness {
        session: SessionController<Recorder, ManualClock>,
        clock: ManualClock,
        tones: Rc<RefCell<Vec<ToneSpec>>>,
    }

    impl Harness {
        fn new(plan: PhasePlan, target: u32) -> Self {
            let tones = Rc::new(RefCell::new(Vec::new()));
            let log = Rc::clone(&tones);
            let emitter = ToneEmitter::new(
                Box::new(move || Ok(Box::new(RecordingBackend(log)) as Box<dyn AudioBackend>)),
                true,
            );
            Self::with_emitter(plan, target, emitter, tones)
        }

        fn with_failing_audio(plan: PhasePlan, target: u32) -> Self {
            let emitter = ToneEmitter::new(
                Box::new(|| Err(BreathError::Audio("no device".to_string()))),
                true,
            );
            Self::with_emitter(plan, target, emitter, Rc::new(RefCell::new(Vec::new())))
        }

        fn with_emitter(
            plan: PhasePlan,
            target: u32,
            emitter: ToneEmitter,
            tones: Rc<RefCell<Vec<ToneSpec>>>,
        ) -> Self {
            let clock = ManualClock::new();
            let timings = DriverTimings {
                frame_interval: FRAME,
                countdown_interval: Duration::from_millis(100),
                ..DriverTimings::default()
            };
            let session = SessionController::new(
                plan,
                target,
                timings,
                Recorder::default(),
                clock.clone(),
                emitter,
            );
            Self {
                session,
                clock,
                tones,
            }
        }

        /// Step the clock one frame at a time, pumping after each step.
        fn run_until(&mut self, ms: u64) {
            let until = Duration::from_millis(ms);
            while self.clock.now() < until {
                self.clock.advance(FRAME);
                self.session.pump();
            }
        }

        fn index(&self) -> Option<usize> {
            self.session.state().current_phase
        }

        fn view(&self) -> &ViewModel {
            &self.session.presenter().view
        }

        fn frequencies(&self) -> Vec<f32> {
            self.tones.borrow().iter().map(|t| t.frequency_hz).collect()
        }
    }

    fn fast_plan() -> PhasePlan {
        PhasePlan::default().with_pattern("0.1-0.1-0.1".parse().unwrap())
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_new_controller_paints_ready() {
        let h = Harness::new(PhasePlan::default(), 4);
        let view = h.view();
        assert_eq!(h.session.status(), SessionStatus::Idle);
        assert_eq!(view.label, "Ready");
        assert_eq!(view.hint, "Tap the ring to begin");
        assert_eq!(view.cycles_target, 4);
        assert!(view.sound_enabled);
        assert!(!view.active);
        assert!(h.session.next_deadline().is_none());
        assert!(!h.session.tones().audio_requested());
    }

    #[test]
    fn test_four_seven_eight_single_cycle_timeline() {
        let mut h = Harness::new(PhasePlan::default(), 1);
        h.session.toggle();
        assert_eq!(h.session.status(), SessionStatus::Running);
        assert_eq!(h.index(), Some(0));
        assert_eq!(h.view().countdown, 4);
        assert!(approx(h.view().orb_scale, 0.8));
        assert!(h.view().active);

        h.run_until(3_990);
        assert_eq!(h.index(), Some(0));
        h.run_until(4_000);
        assert_eq!(h.index(), Some(0));
        assert_eq!(h.view().countdown, 0);
        assert!(approx(h.view().ring.fraction, 1.0));

        h.run_until(4_040);
        assert_eq!(h.index(), Some(0));
        h.run_until(4_050);
        assert_eq!(h.index(), Some(1));
        assert_eq!(h.view().label, "Hold");
        assert!(approx(h.view().orb_scale, 1.15));
        assert_eq!(h.view().countdown, 7);

        h.run_until(11_090);
        assert_eq!(h.index(), Some(1));
        h.run_until(11_100);
        assert_eq!(h.index(), Some(2));
        assert!(approx(h.view().ring.fraction, 1.0));
        h.run_until(11_110);
        assert!(h.view().ring.fraction < 1.0);

        h.run_until(19_140);
        assert_eq!(h.session.status(), SessionStatus::Running);
        h.run_until(19_150);
        assert_eq!(h.session.status(), SessionStatus::Finished);
        assert_eq!(h.session.state().cycle_count, 1);

        let view = h.view();
        assert_eq!(view.label, "Cycle complete ✓");
        assert_eq!(view.hint, "Tap the ring to start again");
        assert_eq!(view.countdown, 0);
        assert!(approx(view.orb_scale, 0.8));
        assert!(approx(view.ring.fraction, 0.0));
        assert!(!view.active);
        assert!(h.session.next_deadline().is_none());

        assert_eq!(h.frequencies(), vec![392.0, 262.0, 220.0, 660.0, 880.0]);
    }

    #[test]
    fn test_each_phase_renders_its_mapping() {
        let mut h = Harness::new(fast_plan(), 1);
        h.session.start();
        let expected = [
            (0.0, 0.8, 1.0, 1.15),
            (1.0, 1.15, 1.0, 1.15),
            (1.0, 1.15, 0.0, 0.8),
        ];
        let mut now = 0;
        for (index, (ring0, orb0, ring1, orb1)) in expected.into_iter().enumerate() {
            h.session.advance_phase(index);
            assert_eq!(h.index(), Some(index));
            assert!(approx(h.view().ring.fraction, ring0));
            assert!(approx(h.view().orb_scale, orb0));

            now += 100;
            h.run_until(now);
            assert!(approx(h.view().ring.fraction, ring1));
            assert!(approx(h.view().orb_scale, orb1));
        }
    }

    #[test]
    fn test_pause_resume_preserves_elapsed() {
        let mut h = Harness::new(PhasePlan::default(), 1);
        h.session.toggle();
        h.run_until(1_000);
        assert_eq!(h.session.snapshot().elapsed_ms, 1_000);

        h.session.toggle();
        assert_eq!(h.session.status(), SessionStatus::Paused);
        assert_eq!(h.view().label, "Paused");
        assert_eq!(h.view().hint, "Tap the ring to resume");
        assert!(!h.view().active);
        assert!(h.session.next_deadline().is_none());

        h.clock.advance(Duration::from_secs(5));
        h.session.pump();
        assert_eq!(h.session.snapshot().elapsed_ms, 1_000);

        h.session.toggle();
        assert_eq!(h.session.status(), SessionStatus::Running);
        assert_eq!(h.session.snapshot().elapsed_ms, 1_000);
        assert_eq!(h.view().label, "Inhale");
        assert!(h.view().active);
        assert!(approx(h.view().ring.fraction, 0.25));
        assert_eq!(h.tones.borrow().len(), 1);

        // 5 s paused shifts the rest of the phase by 5 s.
        h.run_until(9_040);
        assert_eq!(h.index(), Some(0));
        h.run_until(9_050);
        assert_eq!(h.index(), Some(1));
    }

    #[test]
    fn test_immediate_pause_resume_is_continuous() {
        let mut h = Harness::new(PhasePlan::default(), 1);
        h.session.toggle();
        h.run_until(2_000);
        let before = h.view().ring.fraction;

        h.session.pause();
        h.session.resume();
        assert_eq!(h.session.snapshot().elapsed_ms, 2_000);
        assert!(approx(h.view().ring.fraction, before));

        h.run_until(2_010);
        assert!(h.view().ring.fraction > before);
    }

    #[test]
    fn test_cycle_gap_increments_once() {
        let mut h = Harness::new(fast_plan(), 2);
        h.session.toggle();

        h.run_until(440);
        assert_eq!(h.session.state().cycle_count, 0);
        h.run_until(450);
        assert_eq!(h.session.state().cycle_count, 1);
        assert_eq!(h.view().cycles_completed, 1);
        assert_eq!(h.index(), Some(2));
        assert_eq!(h.session.status(), SessionStatus::Running);
        assert!(approx(h.view().orb_scale, 0.8));

        h.run_until(1_440);
        assert_eq!(h.index(), Some(2));
        h.run_until(1_450);
        assert_eq!(h.index(), Some(0));
        assert_eq!(h.session.state().cycle_count, 1);
        assert_eq!(h.tones.borrow().len(), 4);

        h.run_until(1_890);
        assert_eq!(h.session.status(), SessionStatus::Running);
        h.run_until(1_900);
        assert_eq!(h.session.status(), SessionStatus::Finished);
        assert_eq!(h.session.state().cycle_count, 2);
    }

    #[test]
    fn test_pause_during_cycle_gap_keeps_remaining_delay() {
        let mut h = Harness::new(fast_plan(), 2);
        h.session.toggle();
        h.run_until(800);
        assert_eq!(h.session.state().cycle_count, 1);

        h.session.toggle();
        h.clock.advance(Duration::from_secs(10));
        h.session.pump();
        assert_eq!(h.session.state().cycle_count, 1);

        h.session.toggle();
        assert!(approx(h.view().orb_scale, 0.8));
        assert_eq!(h.session.next_deadline(), Some(Duration::from_millis(11_450)));

        h.run_until(11_440);
        assert_eq!(h.index(), Some(2));
        h.run_until(11_450);
        assert_eq!(h.index(), Some(0));
        assert_eq!(h.session.state().cycle_count, 1);

        h.run_until(11_900);
        assert_eq!(h.session.status(), SessionStatus::Finished);
        assert_eq!(h.session.state().cycle_count, 2);
    }

    #[test]
    fn test_pause_during_settle_keeps_remaining_delay() {
        let mut h = Harness::new(fast_plan(), 1);
        h.session.toggle();
        h.run_until(120);
        assert_eq!(h.index(), Some(0));

        h.session.toggle();
        h.clock.advance(Duration::from_secs(1));
        h.session.toggle();
        assert_eq!(h.view().countdown, 0);

        h.run_until(1_140);
        assert_eq!(h.index(), Some(0));
        h.run_until(1_150);
        assert_eq!(h.index(), Some(1));

        h.run_until(1_450);
        assert_eq!(h.session.status(), SessionStatus::Finished);
        assert_eq!(h.session.state().cycle_count, 1);
    }

    #[test]
    fn test_completion_plays_two_tones_then_restarts_fresh() {
        let mut h = Harness::new(fast_plan(), 1);
        h.session.toggle();
        h.run_until(450);
        assert_eq!(h.session.status(), SessionStatus::Finished);

        let chimes = h
            .tones
            .borrow()
            .iter()
            .filter(|t| t.shape == WaveShape::Triangle)
            .count();
        assert_eq!(chimes, 2);

        h.run_until(3_000);
        assert_eq!(h.tones.borrow().len(), 5);
        assert_eq!(h.session.status(), SessionStatus::Finished);

        h.session.toggle();
        assert_eq!(h.session.status(), SessionStatus::Running);
        assert_eq!(h.session.state().cycle_count, 0);
        assert_eq!(h.index(), Some(0));
        assert_eq!(h.view().cycles_completed, 0);
        assert_eq!(h.frequencies().last(), Some(&392.0));
    }

    #[test]
    fn test_configuration_change_resets_from_any_state() {
        let setups: [(&str, u32, fn(&mut Harness)); 5] = [
            ("idle", 1, |_| {}),
            ("running", 1, |h| {
                h.session.toggle();
                h.run_until(50);
            }),
            ("paused", 1, |h| {
                h.session.toggle();
                h.run_until(50);
                h.session.toggle();
            }),
            ("between cycles", 2, |h| {
                h.session.toggle();
                h.run_until(800);
            }),
            ("finished", 1, |h| {
                h.session.toggle();
                h.run_until(450);
            }),
        ];

        for (name, target, setup) in setups {
            let mut h = Harness::new(fast_plan(), target);
            setup(&mut h);
            h.session.on_configuration_changed(3);

            let state = h.session.state();
            assert_eq!(state.status, SessionStatus::Idle, "{name}");
            assert_eq!(state.current_phase, None, "{name}");
            assert_eq!(state.cycle_count, 0, "{name}");
            assert_eq!(state.elapsed_phase, Duration::ZERO, "{name}");
            assert!(h.session.next_deadline().is_none(), "{name}");

            let view = h.view();
            assert_eq!(view.label, "Ready", "{name}");
            assert_eq!(view.countdown, 0, "{name}");
            assert!(approx(view.orb_scale, 0.8), "{name}");
            assert!(approx(view.ring.fraction, 0.0), "{name}");
            assert!(!view.active, "{name}");
            assert_eq!((view.cycles_completed, view.cycles_target), (0, 3), "{name}");

            h.session.toggle();
            assert_eq!(h.session.status(), SessionStatus::Running, "{name}");
            assert_eq!(h.session.snapshot().target_cycles, 3, "{name}");
        }
    }

    #[test]
    fn test_mute_mid_phase_suppresses_next_cue_only() {
        let mut h = Harness::new(PhasePlan::default(), 1);
        h.session.toggle();
        h.run_until(1_000);

        assert!(!h.session.set_sound_enabled(false));
        assert!(!h.view().sound_enabled);
        assert_eq!(h.session.status(), SessionStatus::Running);

        h.run_until(4_050);
        assert_eq!(h.index(), Some(1));
        assert!(approx(h.view().orb_scale, 1.15));
        assert_eq!(h.tones.borrow().len(), 1);

        assert!(h.session.toggle_sound());
        h.run_until(11_100);
        assert_eq!(h.index(), Some(2));
        assert_eq!(h.frequencies(), vec![392.0, 220.0]);
    }

    #[test]
    fn test_failed_audio_degrades_to_silent_session() {
        let mut h = Harness::with_failing_audio(fast_plan(), 1);
        assert!(h.view().sound_enabled);

        h.session.toggle();
        assert!(h.session.tones().is_unavailable());
        assert!(!h.view().sound_enabled);
        assert!(!h.session.set_sound_enabled(true));

        h.run_until(450);
        assert_eq!(h.session.status(), SessionStatus::Finished);
    }

    #[test]
    fn test_invalid_transitions_are_ignored() {
        let mut h = Harness::new(fast_plan(), 1);
        h.session.pause();
        h.session.resume();
        assert_eq!(h.session.status(), SessionStatus::Idle);
        assert!(h.session.next_deadline().is_none());

        h.session.start();
        h.session.start();
        h.session.resume();
        assert_eq!(h.session.presenter().phases, vec![PhaseKind::Inhale]);
        assert_eq!(h.tones.borrow().len(), 1);

        h.session.pause();
        h.session.pause();
        assert_eq!(h.session.presenter().banners.last(), Some(&Banner::Paused));
        h.session.start();
        assert_eq!(h.session.status(), SessionStatus::Paused);
    }

    #[test]
    fn test_paused_session_never_redraws() {
        let mut h = Harness::new(PhasePlan::default(), 1);
        h.session.toggle();
        h.run_until(500);
        h.session.toggle();

        let visuals = h.session.presenter().visuals;
        for _ in 0..100 {
            h.clock.advance(FRAME);
            h.session.pump();
        }
        assert_eq!(h.session.presenter().visuals, visuals);
        assert_eq!(h.session.snapshot().elapsed_ms, 500);
    }

    #[test]
    fn test_late_pump_coalesces_frames() {
        let mut h = Harness::new(PhasePlan::default(), 1);
        h.session.toggle();
        let visuals = h.session.presenter().visuals;

        h.clock.advance(Duration::from_millis(2_000));
        h.session.pump();
        assert_eq!(h.session.presenter().visuals, visuals + 1);
        assert!(approx(h.view().ring.fraction, 0.5));
        assert_eq!(h.view().countdown, 2);
    }

    #[test]
    fn test_snapshot_serializes() {
        let mut h = Harness::new(PhasePlan::default(), 2);
        h.session.toggle();
        h.run_until(4_050);

        let value = serde_json::to_value(h.session.snapshot()).unwrap();
        assert_eq!(value["status"], "running");
        assert_eq!(value["phase"], "hold");
        assert_eq!(value["phase_index"], 1);
        assert_eq!(value["target_cycles"], 2);
        assert_eq!(value["audio_ready"], true);
    }

    #[test]
    fn test_time_until_next_task() {
        let mut h = Harness::new(PhasePlan::default(), 1);
        assert_eq!(h.session.time_until_next_task(), None);
        h.session.toggle();
        assert_eq!(h.session.time_until_next_task(), Some(FRAME));
    }
}
