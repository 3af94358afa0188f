//! Page-side owner of the viewer's [`SessionController`].
//!
//! The controller is not `Send`, so it lives in a thread-local next to the
//! signals it mirrors. Every entry point borrows it for the duration of one
//! synchronous call and copies the resulting state into the signals.

use std::cell::RefCell;

use leptos::prelude::*;
use wasm_bindgen_futures::spawn_local;

use weblurk_shared::config::MonitorTimings;
use weblurk_shared::schedule::ScheduleSlot;
use weblurk_shared::session::{HostRequest, LocalClock, ToggleRequest, validate_nickname};
use weblurk_shared::{SessionController, SessionPhase, TimerTask, WindowMode};

use crate::api;
use crate::browser::BrowserWindowHost;
use crate::notify::Notifier;
use crate::timers::BrowserScheduler;

type Controller = SessionController<BrowserWindowHost, BrowserScheduler, LocalClock>;

/// Reactive mirror of the controller state.
#[derive(Clone, Copy)]
pub struct SessionSignals {
    pub phase: RwSignal<SessionPhase>,
    pub stopping: RwSignal<bool>,
    pub window_mode: RwSignal<WindowMode>,
    pub nickname: RwSignal<Option<String>>,
    pub nick_input: RwSignal<String>,
    pub slots: RwSignal<Vec<ScheduleSlot>>,
    pub schedule_loading: RwSignal<bool>,
    pub notifier: Notifier,
}

impl SessionSignals {
    pub fn new(notifier: Notifier) -> Self {
        Self {
            phase: RwSignal::new(SessionPhase::Stopped),
            stopping: RwSignal::new(false),
            window_mode: RwSignal::new(WindowMode::default()),
            nickname: RwSignal::new(None),
            nick_input: RwSignal::new(String::new()),
            slots: RwSignal::new(weblurk_shared::ScheduleCache::default().slots()),
            schedule_loading: RwSignal::new(false),
            notifier,
        }
    }
}

struct PageSession {
    controller: Controller,
    signals: SessionSignals,
}

impl PageSession {
    fn sync(&self) {
        let state = self.controller.state();
        let signals = self.signals;
        if signals.phase.get_untracked() != state.phase {
            signals.phase.set(state.phase);
        }
        if signals.stopping.get_untracked() != state.stopping {
            signals.stopping.set(state.stopping);
        }
        if signals.window_mode.get_untracked() != state.window_mode {
            signals.window_mode.set(state.window_mode);
        }
        if signals.nickname.get_untracked() != state.nickname {
            signals.nickname.set(state.nickname.clone());
        }
    }
}

thread_local! {
    static PAGE_SESSION: RefCell<Option<PageSession>> = const { RefCell::new(None) };
}

fn with_session<R>(f: impl FnOnce(&mut Controller) -> R) -> Option<R> {
    PAGE_SESSION.with(|slot| {
        let mut slot = slot.borrow_mut();
        let session = slot.as_mut()?;
        let out = f(&mut session.controller);
        session.sync();
        Some(out)
    })
}

fn signals() -> Option<SessionSignals> {
    PAGE_SESSION.with(|slot| slot.borrow().as_ref().map(|s| s.signals))
}

fn dispatch_timer(task: TimerTask) {
    match with_session(|c| c.on_timer(task)).flatten() {
        Some(HostRequest::PollStatus) => spawn_local(poll_status()),
        Some(HostRequest::ReloadSchedule) => spawn_local(reload_schedule()),
        None => {}
    }
}

/// Create the page's controller, start the background timers and run the
/// first status poll and schedule load.
pub fn install(signals: SessionSignals) {
    let mut controller = Controller::new(
        BrowserWindowHost,
        BrowserScheduler::new(dispatch_timer),
        LocalClock,
        MonitorTimings::default(),
    );
    controller.start_background();
    let previous = PAGE_SESSION.with(|slot| {
        slot.borrow_mut().replace(PageSession {
            controller,
            signals,
        })
    });
    if let Some(mut previous) = previous {
        previous.controller.shutdown();
    }
    spawn_local(poll_status());
    spawn_local(reload_schedule());
}

/// Close the companion window and stop every timer.
pub fn uninstall() {
    if let Some(mut session) = PAGE_SESSION.with(|slot| slot.borrow_mut().take()) {
        session.controller.shutdown();
        tracing::debug!("viewer session torn down");
    }
}

/// Close the companion window when the page unloads, keeping the session.
pub fn close_on_unload() {
    with_session(|c| c.close_companion());
}

async fn poll_status() {
    match api::lurk_status().await {
        Ok(status) => {
            with_session(|c| c.reconcile(&status));
            if let (Some(profile), Some(signals)) = (&status.usuario, signals()) {
                signals.nick_input.set(profile.nick_canal.clone());
            }
        }
        Err(e) => tracing::warn!(error = %e, "status poll failed"),
    }
}

async fn reload_schedule() {
    let Some(signals) = signals() else {
        return;
    };
    signals.schedule_loading.set(true);
    match api::current_schedule().await {
        Ok(items) => {
            if let Some(slots) = with_session(|c| {
                c.replace_schedule(&items);
                c.schedule().slots()
            }) {
                signals.slots.set(slots);
            }
        }
        Err(e) => signals.notifier.api_error(&e, "Erro ao carregar agenda"),
    }
    signals.schedule_loading.set(false);
}

pub fn save_nick() {
    let Some(signals) = signals() else {
        return;
    };
    let nick = match validate_nickname(&signals.nick_input.get_untracked()) {
        Ok(nick) => nick,
        Err(e) => {
            signals.notifier.api_error(&e, "");
            return;
        }
    };
    spawn_local(async move {
        match api::save_nick(&nick).await {
            Ok(resp) => {
                with_session(|c| match &resp.usuario {
                    Some(profile) => c.apply_profile(profile),
                    None => c.set_nickname(nick.clone()),
                });
                signals.notifier.success(resp.message);
            }
            Err(e) => signals.notifier.api_error(&e, "Erro ao salvar nick do canal"),
        }
    });
}

pub fn toggle_lurk() {
    let Some(signals) = signals() else {
        return;
    };
    let Some(request) = with_session(|c| c.request_toggle()) else {
        return;
    };
    let notifier = signals.notifier;
    match request {
        Err(e) => notifier.api_error(&e, ""),
        Ok(ToggleRequest::Start(mode)) => spawn_local(async move {
            let outcome = api::start_lurk(mode).await;
            if let Some(result) = with_session(|c| c.complete_start(outcome)) {
                notifier.report(result, "Erro ao iniciar lurk");
            }
        }),
        Ok(ToggleRequest::Stop) => spawn_local(async move {
            let outcome = api::stop_lurk().await;
            if let Some(result) = with_session(|c| c.complete_stop(outcome)) {
                notifier.report(result, "Erro ao finalizar lurk");
            }
        }),
    }
}

pub fn change_mode(mode: WindowMode) {
    with_session(|c| c.change_mode(mode));
}
