//! Lurk session state and the companion window it keeps alive.
//!
//! [`SessionController`] is driven from the outside: the page feeds it user
//! actions, API outcomes and timer firings, and it talks back through the
//! [`WindowHost`] and [`Scheduler`] it was built with. Nothing here touches
//! the browser directly, so the whole lifecycle runs under `cargo test`.

use std::time::Duration;

use chrono::Timelike;

use crate::api::{LurkStatus, ScheduleItem, ViewerProfile};
use crate::config::MonitorTimings;
use crate::error::{ApiError, NavigationError};
use crate::schedule::ScheduleCache;
use crate::window_mode::WindowMode;

pub const MSG_SAVE_NICK_FIRST: &str = "Primeiro salve o nick do canal";
pub const MSG_START_IN_FLIGHT: &str = "Aguarde, o lurk está sendo iniciado";
pub const MSG_STOP_IN_FLIGHT: &str = "Aguarde, o lurk está sendo finalizado";
pub const MSG_EMPTY_NICK: &str = "Por favor, digite o nick do canal";

/// Trimmed nickname from the viewer's input box.
pub fn validate_nickname(raw: &str) -> Result<String, ApiError> {
    let nick = raw.trim();
    if nick.is_empty() {
        Err(ApiError::invalid(MSG_EMPTY_NICK))
    } else {
        Ok(nick.to_string())
    }
}

/// A secondary browser window or tab the controller opened.
pub trait CompanionWindow {
    fn is_closed(&self) -> bool;
    fn close(&self);
    /// Fails once the window shows a page from another origin.
    fn current_url(&self) -> Result<String, NavigationError>;
    fn navigate(&self, url: &str) -> Result<(), NavigationError>;
}

pub trait WindowHost {
    type Window: CompanionWindow;

    /// `None` when the user agent refused to open the window.
    fn open(&mut self, url: &str, mode: WindowMode) -> Option<Self::Window>;
}

/// Timer backend. Scheduling a task that is already pending replaces it.
pub trait Scheduler {
    fn schedule_repeating(&mut self, task: TimerTask, period: Duration);
    fn schedule_once(&mut self, task: TimerTask, delay: Duration);
    fn cancel(&mut self, task: TimerTask);
}

pub trait Clock {
    /// Hour of the local wall clock, 0..=23.
    fn local_hour(&self) -> u32;
}

/// Wall clock in the user's time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn local_hour(&self) -> u32 {
        chrono::Local::now().hour()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerTask {
    StatusPoll,
    ScheduleReload,
    LivenessRefresh,
    HourCheck,
    DeferredReopen,
    DeferredModeSwitch,
}

impl TimerTask {
    pub const ALL: [TimerTask; 6] = [
        TimerTask::StatusPoll,
        TimerTask::ScheduleReload,
        TimerTask::LivenessRefresh,
        TimerTask::HourCheck,
        TimerTask::DeferredReopen,
        TimerTask::DeferredModeSwitch,
    ];

    /// Tasks that only exist while the session is active.
    pub fn is_session_bound(self) -> bool {
        !matches!(self, TimerTask::StatusPoll | TimerTask::ScheduleReload)
    }
}

/// Work a timer hands back to the page because it needs the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostRequest {
    PollStatus,
    ReloadSchedule,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleRequest {
    Start(WindowMode),
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    #[default]
    Stopped,
    Starting,
    Active,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionState {
    pub phase: SessionPhase,
    pub window_mode: WindowMode,
    pub nickname: Option<String>,
    /// A stop request has been sent and not answered yet.
    pub stopping: bool,
}

impl SessionState {
    pub fn is_active(&self) -> bool {
        self.phase == SessionPhase::Active
    }
}

/// What a status poll did to the local session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciled {
    Unchanged,
    Activated,
    Deactivated,
}

pub struct SessionController<H: WindowHost, S: Scheduler, C: Clock> {
    host: H,
    scheduler: S,
    clock: C,
    timings: MonitorTimings,
    schedule: ScheduleCache,
    state: SessionState,
    window: Option<H::Window>,
    reopen_pending: bool,
}

impl<H: WindowHost, S: Scheduler, C: Clock> SessionController<H, S, C> {
    pub fn new(host: H, scheduler: S, clock: C, timings: MonitorTimings) -> Self {
        Self {
            host,
            scheduler,
            clock,
            timings,
            schedule: ScheduleCache::default(),
            state: SessionState::default(),
            window: None,
            reopen_pending: false,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn schedule(&self) -> &ScheduleCache {
        &self.schedule
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn reopen_pending(&self) -> bool {
        self.reopen_pending
    }

    pub fn has_open_window(&self) -> bool {
        self.window.as_ref().is_some_and(|w| !w.is_closed())
    }

    /// Start the page-level timers that run regardless of the session.
    pub fn start_background(&mut self) {
        self.scheduler
            .schedule_repeating(TimerTask::StatusPoll, self.timings.status_poll);
        self.scheduler
            .schedule_repeating(TimerTask::ScheduleReload, self.timings.schedule_reload);
    }

    pub fn replace_schedule(&mut self, items: &[ScheduleItem]) {
        self.schedule = ScheduleCache::from_items(items);
        tracing::debug!(entries = self.schedule.len(), "schedule replaced");
    }

    pub fn apply_profile(&mut self, profile: &ViewerProfile) {
        self.state.nickname = Some(profile.nick_canal.clone());
        self.state.window_mode = profile.tipo_janela;
    }

    pub fn set_nickname(&mut self, nickname: impl Into<String>) {
        self.state.nickname = Some(nickname.into());
    }

    /// Decide what the lurk button should do right now.
    pub fn request_toggle(&mut self) -> Result<ToggleRequest, ApiError> {
        if self.state.nickname.is_none() {
            return Err(ApiError::invalid(MSG_SAVE_NICK_FIRST));
        }
        match self.state.phase {
            SessionPhase::Stopped => {
                self.state.phase = SessionPhase::Starting;
                Ok(ToggleRequest::Start(self.state.window_mode))
            }
            SessionPhase::Starting => Err(ApiError::invalid(MSG_START_IN_FLIGHT)),
            SessionPhase::Active if self.state.stopping => {
                Err(ApiError::invalid(MSG_STOP_IN_FLIGHT))
            }
            SessionPhase::Active => {
                self.state.stopping = true;
                Ok(ToggleRequest::Stop)
            }
        }
    }

    pub fn complete_start(
        &mut self,
        outcome: Result<String, ApiError>,
    ) -> Result<String, ApiError> {
        match &outcome {
            Ok(_) => {
                tracing::info!(mode = self.state.window_mode.as_str(), "lurk session started");
                self.state.phase = SessionPhase::Active;
                self.open_window(self.state.window_mode);
                self.start_monitoring();
            }
            Err(err) => {
                tracing::warn!(error = %err, "lurk start failed");
                if self.state.phase == SessionPhase::Starting {
                    self.state.phase = SessionPhase::Stopped;
                }
            }
        }
        outcome
    }

    /// Stop locally whatever the server said, then hand the outcome back.
    pub fn complete_stop(
        &mut self,
        outcome: Result<String, ApiError>,
    ) -> Result<String, ApiError> {
        if let Err(err) = &outcome {
            tracing::warn!(error = %err, "lurk stop call failed, stopping locally");
        }
        self.stop_locally();
        outcome
    }

    /// Align local state with the server's view of the session.
    pub fn reconcile(&mut self, status: &LurkStatus) -> Reconciled {
        if let Some(profile) = &status.usuario {
            self.apply_profile(profile);
        }

        let locally_active = self.state.is_active();
        match (status.lurk_ativo, locally_active) {
            (true, false) => {
                tracing::info!("server reports an active session, resuming monitoring");
                self.state.phase = SessionPhase::Active;
                self.start_monitoring();
                Reconciled::Activated
            }
            (false, true) => {
                tracing::info!("server reports no active session, stopping");
                self.stop_locally();
                Reconciled::Deactivated
            }
            _ => Reconciled::Unchanged,
        }
    }

    pub fn change_mode(&mut self, mode: WindowMode) {
        self.state.window_mode = mode;
        if !self.state.is_active() {
            return;
        }
        tracing::debug!(mode = mode.as_str(), "switching companion window mode");
        self.close_window();
        self.reopen_pending = false;
        self.scheduler.cancel(TimerTask::DeferredReopen);
        self.scheduler
            .schedule_once(TimerTask::DeferredModeSwitch, self.timings.mode_switch_delay);
    }

    /// Run one timer firing. Network-bound tasks come back as a request.
    pub fn on_timer(&mut self, task: TimerTask) -> Option<HostRequest> {
        match task {
            TimerTask::StatusPoll => return Some(HostRequest::PollStatus),
            TimerTask::ScheduleReload => return Some(HostRequest::ReloadSchedule),
            TimerTask::LivenessRefresh => self.liveness_tick(),
            TimerTask::HourCheck => self.hour_check(),
            TimerTask::DeferredReopen => {
                self.reopen_pending = false;
                if self.state.is_active() {
                    self.open_window(self.state.window_mode);
                }
            }
            TimerTask::DeferredModeSwitch => {
                if self.state.is_active() {
                    self.open_window(self.state.window_mode);
                }
            }
        }
        None
    }

    /// Close the companion window for a page unload. Timers and the handle
    /// stay, so a page restored from the back/forward cache sees the window
    /// as closed and reopens it on the next liveness tick.
    pub fn close_companion(&mut self) {
        if let Some(window) = self.window.as_ref().filter(|w| !w.is_closed()) {
            window.close();
        }
    }

    /// Controller is being torn down.
    pub fn shutdown(&mut self) {
        self.close_window();
        for task in TimerTask::ALL {
            self.scheduler.cancel(task);
        }
        self.reopen_pending = false;
    }

    pub fn resolve_active_channel_url(&self) -> String {
        self.schedule.resolve_channel_url(self.clock.local_hour())
    }

    fn open_window(&mut self, mode: WindowMode) {
        self.close_window();
        let url = self.resolve_active_channel_url();
        self.window = self.host.open(&url, mode);
        if self.window.is_none() {
            tracing::warn!(%url, mode = mode.as_str(), "companion window was blocked");
        } else {
            tracing::debug!(%url, mode = mode.as_str(), "companion window opened");
        }
    }

    fn close_window(&mut self) {
        if let Some(window) = self.window.take() {
            if !window.is_closed() {
                window.close();
            }
        }
    }

    fn start_monitoring(&mut self) {
        self.scheduler
            .schedule_repeating(TimerTask::LivenessRefresh, self.timings.liveness_refresh);
        self.scheduler
            .schedule_repeating(TimerTask::HourCheck, self.timings.hour_check);
    }

    fn stop_locally(&mut self) {
        self.state.phase = SessionPhase::Stopped;
        self.state.stopping = false;
        self.close_window();
        self.reopen_pending = false;
        for task in TimerTask::ALL.into_iter().filter(|t| t.is_session_bound()) {
            self.scheduler.cancel(task);
        }
    }

    fn liveness_tick(&mut self) {
        let Some(window) = &self.window else {
            return;
        };
        if window.is_closed() {
            if !self.reopen_pending {
                tracing::info!("companion window closed by the user, reopening shortly");
                self.window = None;
                self.reopen_pending = true;
                self.scheduler
                    .schedule_once(TimerTask::DeferredReopen, self.timings.reopen_delay);
            }
            return;
        }
        let url = self.resolve_active_channel_url();
        if let Err(err) = window.navigate(&url) {
            tracing::debug!(error = %err, "refresh navigation ignored");
        }
    }

    fn hour_check(&mut self) {
        let Some(window) = self.window.as_ref().filter(|w| !w.is_closed()) else {
            return;
        };
        let current = match window.current_url() {
            Ok(url) => url,
            Err(err) => {
                tracing::debug!(error = %err, "hour check skipped");
                return;
            }
        };
        let target = self.schedule.resolve_channel_url(self.clock.local_hour());
        if current != target {
            if let Err(err) = window.navigate(&target) {
                tracing::debug!(error = %err, "hour change navigation ignored");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;
    use std::rc::Rc;

    #[derive(Debug, Default)]
    struct WindowRecord {
        url: String,
        mode: Option<WindowMode>,
        closed: bool,
        cross_origin: bool,
        navigations: Vec<String>,
    }

    #[derive(Clone)]
    struct FakeWindow(Rc<RefCell<WindowRecord>>);

    impl CompanionWindow for FakeWindow {
        fn is_closed(&self) -> bool {
            self.0.borrow().closed
        }

        fn close(&self) {
            self.0.borrow_mut().closed = true;
        }

        fn current_url(&self) -> Result<String, NavigationError> {
            let record = self.0.borrow();
            if record.closed {
                return Err(NavigationError::Closed);
            }
            if record.cross_origin {
                return Err(NavigationError::Inaccessible("SecurityError".into()));
            }
            Ok(record.url.clone())
        }

        fn navigate(&self, url: &str) -> Result<(), NavigationError> {
            let mut record = self.0.borrow_mut();
            if record.closed {
                return Err(NavigationError::Closed);
            }
            record.url = url.to_string();
            record.navigations.push(url.to_string());
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeHost {
        opened: Vec<FakeWindow>,
        /// Live handles at the moment of each `open` call.
        live_at_open: Vec<usize>,
        block_next: bool,
    }

    impl FakeHost {
        fn live_count(&self) -> usize {
            self.opened.iter().filter(|w| !w.is_closed()).count()
        }

        fn last(&self) -> &FakeWindow {
            self.opened.last().expect("a window was opened")
        }
    }

    impl WindowHost for FakeHost {
        type Window = FakeWindow;

        fn open(&mut self, url: &str, mode: WindowMode) -> Option<FakeWindow> {
            let live = self.live_count();
            self.live_at_open.push(live);
            if std::mem::take(&mut self.block_next) {
                return None;
            }
            let window = FakeWindow(Rc::new(RefCell::new(WindowRecord {
                url: url.to_string(),
                mode: Some(mode),
                ..Default::default()
            })));
            self.opened.push(window.clone());
            Some(window)
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Pending {
        Repeating(Duration),
        Once(Duration),
    }

    #[derive(Default)]
    struct RecordingScheduler {
        pending: HashMap<TimerTask, Pending>,
        once_calls: Vec<(TimerTask, Duration)>,
        cancels: Vec<TimerTask>,
    }

    impl RecordingScheduler {
        fn is_pending(&self, task: TimerTask) -> bool {
            self.pending.contains_key(&task)
        }

        fn once_count(&self, task: TimerTask) -> usize {
            self.once_calls.iter().filter(|(t, _)| *t == task).count()
        }
    }

    impl Scheduler for RecordingScheduler {
        fn schedule_repeating(&mut self, task: TimerTask, period: Duration) {
            self.pending.insert(task, Pending::Repeating(period));
        }

        fn schedule_once(&mut self, task: TimerTask, delay: Duration) {
            self.pending.insert(task, Pending::Once(delay));
            self.once_calls.push((task, delay));
        }

        fn cancel(&mut self, task: TimerTask) {
            self.pending.remove(&task);
            self.cancels.push(task);
        }
    }

    #[derive(Clone)]
    struct FixedClock(Rc<Cell<u32>>);

    impl Clock for FixedClock {
        fn local_hour(&self) -> u32 {
            self.0.get()
        }
    }

    type TestController = SessionController<FakeHost, RecordingScheduler, FixedClock>;

    fn schedule_item(hora: &str, name: &str) -> ScheduleItem {
        ScheduleItem {
            id: None,
            hora: hora.to_string(),
            data: None,
            nome_canal: name.to_string(),
            link_plataforma: "https://www.twitch.tv/".to_string(),
        }
    }

    fn controller(hour: u32) -> (TestController, Rc<Cell<u32>>) {
        let clock = Rc::new(Cell::new(hour));
        let mut ctl = SessionController::new(
            FakeHost::default(),
            RecordingScheduler::default(),
            FixedClock(clock.clone()),
            MonitorTimings::default(),
        );
        ctl.replace_schedule(&[schedule_item("10:00", "morning"), schedule_item("11:00", "noon")]);
        ctl.set_nickname("lurker");
        (ctl, clock)
    }

    fn active_controller(hour: u32) -> (TestController, Rc<Cell<u32>>) {
        let (mut ctl, clock) = controller(hour);
        assert_eq!(ctl.request_toggle(), Ok(ToggleRequest::Start(WindowMode::Popup)));
        ctl.complete_start(Ok("Lurk iniciado".into())).unwrap();
        (ctl, clock)
    }

    fn status(active: bool) -> LurkStatus {
        LurkStatus {
            lurk_ativo: active,
            usuario: None,
        }
    }

    #[test]
    fn nickname_is_trimmed_and_required() {
        assert_eq!(validate_nickname("  streamer "), Ok("streamer".to_string()));
        assert_eq!(
            validate_nickname("   "),
            Err(ApiError::Invalid(MSG_EMPTY_NICK.into()))
        );
    }

    #[test]
    fn toggle_without_nickname_is_rejected_before_any_call() {
        let mut ctl = SessionController::new(
            FakeHost::default(),
            RecordingScheduler::default(),
            FixedClock(Rc::new(Cell::new(0))),
            MonitorTimings::default(),
        );
        assert_eq!(
            ctl.request_toggle(),
            Err(ApiError::Invalid(MSG_SAVE_NICK_FIRST.into()))
        );
        assert_eq!(ctl.state().phase, SessionPhase::Stopped);
    }

    #[test]
    fn toggle_walks_the_state_machine() {
        let (mut ctl, _) = controller(10);
        assert_eq!(ctl.request_toggle(), Ok(ToggleRequest::Start(WindowMode::Popup)));
        assert_eq!(ctl.state().phase, SessionPhase::Starting);
        assert!(ctl.request_toggle().is_err());

        ctl.complete_start(Ok("ok".into())).unwrap();
        assert!(ctl.state().is_active());
        assert_eq!(ctl.request_toggle(), Ok(ToggleRequest::Stop));
    }

    #[test]
    fn successful_start_opens_window_at_scheduled_channel() {
        let (ctl, _) = active_controller(10);
        let window = ctl.host().last().0.borrow();
        assert_eq!(window.url, "https://www.twitch.tv/morning");
        assert_eq!(window.mode, Some(WindowMode::Popup));
        assert!(ctl.scheduler().is_pending(TimerTask::LivenessRefresh));
        assert!(ctl.scheduler().is_pending(TimerTask::HourCheck));
    }

    #[test]
    fn failed_start_returns_to_stopped_without_window() {
        let (mut ctl, _) = controller(10);
        ctl.request_toggle().unwrap();
        let err = ctl
            .complete_start(Err(ApiError::Rejected("Usuário não encontrado".into())))
            .unwrap_err();
        assert_eq!(err.user_message("x"), "Usuário não encontrado");
        assert_eq!(ctl.state().phase, SessionPhase::Stopped);
        assert!(ctl.host().opened.is_empty());
        assert!(!ctl.scheduler().is_pending(TimerTask::LivenessRefresh));
    }

    #[test]
    fn stop_always_ends_locally_even_on_failure() {
        let (mut ctl, _) = active_controller(10);
        let result = ctl.complete_stop(Err(ApiError::Transport("fetch error".into())));
        assert!(result.is_err());
        assert_eq!(ctl.state().phase, SessionPhase::Stopped);
        assert_eq!(ctl.host().live_count(), 0);
        for task in TimerTask::ALL.into_iter().filter(|t| t.is_session_bound()) {
            assert!(!ctl.scheduler().is_pending(task), "{task:?} left running");
        }
    }

    #[test]
    fn opening_in_popup_closes_existing_tab_first() {
        let (mut ctl, _) = controller(10);
        ctl.change_mode(WindowMode::Tab);
        ctl.request_toggle().unwrap();
        ctl.complete_start(Ok("ok".into())).unwrap();
        assert_eq!(ctl.host().live_count(), 1);

        ctl.change_mode(WindowMode::Popup);
        assert_eq!(ctl.host().live_count(), 0);
        ctl.on_timer(TimerTask::DeferredModeSwitch);

        assert_eq!(ctl.host().opened.len(), 2);
        assert!(ctl.host().opened[0].is_closed());
        assert_eq!(ctl.host().last().0.borrow().mode, Some(WindowMode::Popup));
        assert_eq!(ctl.host().live_count(), 1);
        assert_eq!(ctl.host().live_at_open, vec![0, 0]);
    }

    #[test]
    fn repeated_starts_never_leave_two_live_windows() {
        let (mut ctl, _) = active_controller(10);
        ctl.complete_start(Ok("ok".into())).unwrap();
        ctl.on_timer(TimerTask::DeferredModeSwitch);
        assert_eq!(ctl.host().opened.len(), 3);
        assert_eq!(ctl.host().live_count(), 1);
        assert_eq!(ctl.host().live_at_open, vec![0, 0, 0]);
    }

    #[test]
    fn reopen_paths_close_before_opening() {
        let (mut ctl, _) = active_controller(10);
        ctl.host().last().close();
        ctl.on_timer(TimerTask::LivenessRefresh);
        ctl.on_timer(TimerTask::DeferredReopen);

        // A mode-switch firing while the reopened window is still live.
        ctl.on_timer(TimerTask::DeferredModeSwitch);
        assert_eq!(ctl.host().opened.len(), 3);
        assert!(ctl.host().live_at_open.iter().all(|&live| live == 0));
        assert!(ctl.host().live_count() <= 1);
    }

    #[test]
    fn mode_change_while_stopped_only_records_mode() {
        let (mut ctl, _) = controller(10);
        ctl.change_mode(WindowMode::Tab);
        assert_eq!(ctl.state().window_mode, WindowMode::Tab);
        assert!(!ctl.scheduler().is_pending(TimerTask::DeferredModeSwitch));
        assert!(ctl.host().opened.is_empty());
    }

    #[test]
    fn mode_change_while_active_defers_reopen() {
        let (mut ctl, _) = active_controller(10);
        ctl.change_mode(WindowMode::Tab);
        assert_eq!(
            ctl.scheduler().pending.get(&TimerTask::DeferredModeSwitch),
            Some(&Pending::Once(Duration::from_millis(500)))
        );
    }

    #[test]
    fn closed_window_schedules_exactly_one_reopen() {
        let (mut ctl, _) = active_controller(10);
        ctl.host().last().close();

        ctl.on_timer(TimerTask::LivenessRefresh);
        assert!(ctl.reopen_pending());
        assert_eq!(ctl.scheduler().once_count(TimerTask::DeferredReopen), 1);
        assert_eq!(
            ctl.scheduler().pending.get(&TimerTask::DeferredReopen),
            Some(&Pending::Once(Duration::from_secs(5)))
        );

        ctl.on_timer(TimerTask::LivenessRefresh);
        assert_eq!(ctl.scheduler().once_count(TimerTask::DeferredReopen), 1);

        ctl.on_timer(TimerTask::DeferredReopen);
        assert!(!ctl.reopen_pending());
        assert_eq!(ctl.host().opened.len(), 2);
        assert_eq!(ctl.host().live_count(), 1);
    }

    #[test]
    fn deferred_reopen_after_stop_opens_nothing() {
        let (mut ctl, _) = active_controller(10);
        ctl.host().last().close();
        ctl.on_timer(TimerTask::LivenessRefresh);
        ctl.complete_stop(Ok("Lurk finalizado".into())).unwrap();
        assert!(!ctl.reopen_pending());

        ctl.on_timer(TimerTask::DeferredReopen);
        assert_eq!(ctl.host().opened.len(), 1);
    }

    #[test]
    fn liveness_tick_refreshes_open_window() {
        let (mut ctl, clock) = active_controller(10);
        clock.set(11);
        ctl.on_timer(TimerTask::LivenessRefresh);
        assert_eq!(
            ctl.host().last().0.borrow().navigations,
            vec!["https://www.twitch.tv/noon".to_string()]
        );
    }

    #[test]
    fn hour_check_navigates_only_on_change() {
        let (mut ctl, clock) = active_controller(10);
        ctl.on_timer(TimerTask::HourCheck);
        assert!(ctl.host().last().0.borrow().navigations.is_empty());

        clock.set(11);
        ctl.on_timer(TimerTask::HourCheck);
        assert_eq!(ctl.host().last().0.borrow().url, "https://www.twitch.tv/noon");

        clock.set(3);
        ctl.on_timer(TimerTask::HourCheck);
        assert_eq!(ctl.host().last().0.borrow().url, "https://www.twitch.tv/");
    }

    #[test]
    fn hour_check_is_silent_on_cross_origin_window() {
        let (mut ctl, clock) = active_controller(10);
        ctl.host().last().0.borrow_mut().cross_origin = true;
        clock.set(11);
        ctl.on_timer(TimerTask::HourCheck);
        assert!(ctl.host().last().0.borrow().navigations.is_empty());
        assert!(ctl.state().is_active());
    }

    #[test]
    fn server_active_resumes_monitoring_without_opening() {
        let (mut ctl, _) = controller(10);
        let outcome = ctl.reconcile(&LurkStatus {
            lurk_ativo: true,
            usuario: Some(ViewerProfile {
                id: Some(1),
                nick_canal: "restored".into(),
                tipo_janela: WindowMode::Tab,
            }),
        });
        assert_eq!(outcome, Reconciled::Activated);
        assert!(ctl.state().is_active());
        assert_eq!(ctl.state().nickname.as_deref(), Some("restored"));
        assert_eq!(ctl.state().window_mode, WindowMode::Tab);
        assert!(ctl.host().opened.is_empty());
        assert!(ctl.scheduler().is_pending(TimerTask::LivenessRefresh));
    }

    #[test]
    fn server_inactive_stops_local_session() {
        let (mut ctl, _) = active_controller(10);
        assert_eq!(ctl.reconcile(&status(false)), Reconciled::Deactivated);
        assert_eq!(ctl.state().phase, SessionPhase::Stopped);
        assert_eq!(ctl.host().live_count(), 0);
        assert!(!ctl.scheduler().is_pending(TimerTask::HourCheck));
    }

    #[test]
    fn poll_during_start_leaves_phase_alone() {
        let (mut ctl, _) = controller(10);
        ctl.request_toggle().unwrap();
        assert_eq!(ctl.reconcile(&status(false)), Reconciled::Unchanged);
        assert_eq!(ctl.state().phase, SessionPhase::Starting);
    }

    #[test]
    fn blocked_popup_leaves_no_handle() {
        let mut blocked = SessionController::new(
            FakeHost {
                block_next: true,
                ..Default::default()
            },
            RecordingScheduler::default(),
            FixedClock(Rc::new(Cell::new(10))),
            MonitorTimings::default(),
        );
        blocked.set_nickname("lurker");
        blocked.request_toggle().unwrap();
        blocked.complete_start(Ok("ok".into())).unwrap();
        assert!(blocked.state().is_active());
        assert!(!blocked.has_open_window());

        // Without a handle the liveness tick has nothing to reopen.
        blocked.on_timer(TimerTask::LivenessRefresh);
        assert!(!blocked.reopen_pending());
    }

    #[test]
    fn background_timers_return_host_requests() {
        let (mut ctl, _) = controller(10);
        ctl.start_background();
        assert_eq!(
            ctl.scheduler().pending.get(&TimerTask::StatusPoll),
            Some(&Pending::Repeating(Duration::from_secs(30)))
        );
        assert_eq!(ctl.on_timer(TimerTask::StatusPoll), Some(HostRequest::PollStatus));
        assert_eq!(
            ctl.on_timer(TimerTask::ScheduleReload),
            Some(HostRequest::ReloadSchedule)
        );
        assert_eq!(ctl.on_timer(TimerTask::HourCheck), None);
    }

    #[test]
    fn stopping_keeps_background_timers() {
        let (mut ctl, _) = active_controller(10);
        ctl.start_background();
        ctl.complete_stop(Ok("ok".into())).unwrap();
        assert!(ctl.scheduler().is_pending(TimerTask::StatusPoll));
        assert!(ctl.scheduler().is_pending(TimerTask::ScheduleReload));
    }

    #[test]
    fn unload_closes_window_but_keeps_session_running() {
        let (mut ctl, _) = active_controller(10);
        ctl.start_background();
        ctl.close_companion();

        assert_eq!(ctl.host().live_count(), 0);
        assert!(ctl.state().is_active());
        for task in [
            TimerTask::StatusPoll,
            TimerTask::ScheduleReload,
            TimerTask::LivenessRefresh,
            TimerTask::HourCheck,
        ] {
            assert!(ctl.scheduler().is_pending(task), "{task:?} cancelled");
        }
        assert!(ctl.scheduler().cancels.is_empty());

        // Restored page: the next liveness tick brings the window back.
        ctl.on_timer(TimerTask::LivenessRefresh);
        assert!(ctl.reopen_pending());
        ctl.on_timer(TimerTask::DeferredReopen);
        assert_eq!(ctl.host().live_count(), 1);
    }

    #[test]
    fn second_stop_click_is_rejected_while_in_flight() {
        let (mut ctl, _) = active_controller(10);
        assert_eq!(ctl.request_toggle(), Ok(ToggleRequest::Stop));
        assert!(ctl.state().stopping);
        assert_eq!(
            ctl.request_toggle(),
            Err(ApiError::Invalid(MSG_STOP_IN_FLIGHT.into()))
        );

        ctl.complete_stop(Err(ApiError::Transport("fetch error".into())))
            .unwrap_err();
        assert!(!ctl.state().stopping);
        assert_eq!(ctl.state().phase, SessionPhase::Stopped);
        assert_eq!(ctl.request_toggle(), Ok(ToggleRequest::Start(WindowMode::Popup)));
    }

    #[test]
    fn shutdown_closes_window_and_cancels_everything() {
        let (mut ctl, _) = active_controller(10);
        ctl.start_background();
        ctl.shutdown();
        assert_eq!(ctl.host().live_count(), 0);
        assert!(ctl.scheduler().pending.is_empty());
        assert_eq!(ctl.scheduler().cancels.len(), TimerTask::ALL.len());
    }
}
