pub mod admin;
pub mod api;
pub mod config;
pub mod error;
pub mod online;
pub mod ranking;
pub mod schedule;
pub mod session;
pub mod time_format;
pub mod window_mode;

pub use error::{ApiError, NavigationError};
pub use ranking::{RankingFilter, RankingList, SortField};
pub use schedule::{ScheduleCache, ScheduleEntry};
pub use session::{SessionController, SessionPhase, TimerTask};
pub use window_mode::WindowMode;
