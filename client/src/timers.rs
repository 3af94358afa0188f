use std::collections::HashMap;
use std::time::Duration;

use gloo_timers::callback::{Interval, Timeout};
use wasm_bindgen_futures::spawn_local;

use weblurk_shared::TimerTask;
use weblurk_shared::session::Scheduler;

enum TimerBinding {
    Repeating(Interval),
    Once(Timeout),
}

fn millis(duration: Duration) -> u32 {
    u32::try_from(duration.as_millis()).unwrap_or(u32::MAX)
}

/// [`Scheduler`] on browser timers.
///
/// Firings are handed to `dispatch` from a fresh task rather than from inside
/// the timer callback, so `dispatch` may borrow whatever owns this scheduler.
pub struct BrowserScheduler {
    dispatch: fn(TimerTask),
    bindings: HashMap<TimerTask, TimerBinding>,
}

impl BrowserScheduler {
    pub fn new(dispatch: fn(TimerTask)) -> Self {
        Self {
            dispatch,
            bindings: HashMap::new(),
        }
    }
}

impl Scheduler for BrowserScheduler {
    fn schedule_repeating(&mut self, task: TimerTask, period: Duration) {
        let dispatch = self.dispatch;
        let interval = Interval::new(millis(period), move || {
            spawn_local(async move { dispatch(task) });
        });
        // Dropping the previous binding clears its browser timer.
        self.bindings.insert(task, TimerBinding::Repeating(interval));
    }

    fn schedule_once(&mut self, task: TimerTask, delay: Duration) {
        let dispatch = self.dispatch;
        let timeout = Timeout::new(millis(delay), move || {
            spawn_local(async move { dispatch(task) });
        });
        self.bindings.insert(task, TimerBinding::Once(timeout));
    }

    fn cancel(&mut self, task: TimerTask) {
        match self.bindings.remove(&task) {
            Some(TimerBinding::Repeating(interval)) => {
                interval.cancel();
            }
            Some(TimerBinding::Once(timeout)) => {
                timeout.cancel();
            }
            None => {}
        }
    }
}
