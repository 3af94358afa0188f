use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use crate::api::OnlineUserItem;
use crate::config::MIN_ONLINE_REFRESH_SECS;
use crate::error::ApiError;
use crate::time_format::{format_datetime_br, parse_timestamp, time_online_since};
use crate::window_mode::WindowMode;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OnlineFilter {
    pub search: String,
    pub window_mode: Option<WindowMode>,
}

impl OnlineFilter {
    pub fn matches(&self, user: &OnlineUserItem) -> bool {
        let needle = self.search.trim().to_lowercase();
        user.nick_canal.to_lowercase().contains(&needle)
            && self.window_mode.is_none_or(|mode| user.tipo_janela == mode)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OnlineOrder {
    /// Server order.
    #[default]
    Unordered,
    Nick,
    Points,
    /// Longest online first.
    TimeOnline,
}

impl OnlineOrder {
    pub const ALL: [OnlineOrder; 4] = [
        OnlineOrder::Unordered,
        OnlineOrder::Nick,
        OnlineOrder::Points,
        OnlineOrder::TimeOnline,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unordered => "",
            Self::Nick => "nick_canal",
            Self::Points => "pontos",
            Self::TimeOnline => "tempo_online",
        }
    }

    pub fn parse(raw: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|order| order.as_str() == raw)
            .unwrap_or_default()
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Unordered => "Padrão",
            Self::Nick => "Nick",
            Self::Points => "Pontos",
            Self::TimeOnline => "Tempo online",
        }
    }
}

fn last_activity(user: &OnlineUserItem) -> Option<DateTime<Utc>> {
    user.ultima_atividade.as_deref().and_then(parse_timestamp)
}

fn compare_users(order: OnlineOrder, a: &OnlineUserItem, b: &OnlineUserItem) -> Ordering {
    match order {
        OnlineOrder::Unordered => Ordering::Equal,
        OnlineOrder::Nick => a
            .nick_canal
            .to_lowercase()
            .cmp(&b.nick_canal.to_lowercase()),
        OnlineOrder::Points => b.pontos.cmp(&a.pontos),
        // Unknown activity sorts last.
        OnlineOrder::TimeOnline => match (last_activity(a), last_activity(b)) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
    }
}

/// Online users as last fetched, plus the filtered and ordered view.
#[derive(Debug, Clone, Default)]
pub struct OnlineRoster {
    users: Vec<OnlineUserItem>,
    view: Vec<OnlineUserItem>,
    filter: OnlineFilter,
    order: OnlineOrder,
}

impl OnlineRoster {
    /// Replace the list, keeping the current filter and order.
    pub fn reload(&mut self, users: Vec<OnlineUserItem>) {
        self.users = users;
        self.rebuild_view();
    }

    pub fn set_filter(&mut self, filter: OnlineFilter) {
        self.filter = filter;
        self.rebuild_view();
    }

    pub fn set_order(&mut self, order: OnlineOrder) {
        self.order = order;
        self.rebuild_view();
    }

    fn rebuild_view(&mut self) {
        let mut view: Vec<OnlineUserItem> = self
            .users
            .iter()
            .filter(|u| self.filter.matches(u))
            .cloned()
            .collect();
        let order = self.order;
        view.sort_by(|a, b| compare_users(order, a, b));
        self.view = view;
    }

    pub fn users(&self) -> &[OnlineUserItem] {
        &self.users
    }

    pub fn view(&self) -> &[OnlineUserItem] {
        &self.view
    }

    pub fn filter(&self) -> &OnlineFilter {
        &self.filter
    }

    pub fn order(&self) -> OnlineOrder {
        self.order
    }

    pub fn find(&self, nick: &str) -> Option<&OnlineUserItem> {
        self.users.iter().find(|u| u.nick_canal == nick)
    }

    pub fn stats(&self) -> OnlineStats {
        let count = |mode| self.users.iter().filter(|u| u.tipo_janela == mode).count();
        OnlineStats {
            total: self.users.len(),
            popup: count(WindowMode::Popup),
            tab: count(WindowMode::Tab),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OnlineStats {
    pub total: usize,
    pub popup: usize,
    pub tab: usize,
}

/// `"Xh Ym"` since the user's last recorded activity, `"-"` when unknown.
pub fn time_online(user: &OnlineUserItem, now: DateTime<Utc>) -> String {
    match last_activity(user) {
        Some(since) => time_online_since(since, now),
        None => "-".to_string(),
    }
}

pub fn last_activity_label(user: &OnlineUserItem) -> String {
    match last_activity(user) {
        Some(at) => format_datetime_br(&at.with_timezone(&chrono::Local)),
        None => "-".to_string(),
    }
}

/// Text of the "details" dialog.
pub fn user_details(user: &OnlineUserItem, now: DateTime<Utc>) -> String {
    format!(
        "Usuário: {}\nPontos: {}\nTipo de Janela: {}\nTempo Online: {}\nÚltima Atividade: {}\nStatus: Online",
        user.nick_canal,
        user.pontos,
        user.tipo_janela.label(),
        time_online(user, now),
        last_activity_label(user),
    )
}

/// Validate a new auto-update interval typed by the admin.
///
/// `Ok(None)` means the prompt was cancelled or left empty.
pub fn parse_refresh_interval(raw: Option<&str>) -> Result<Option<u32>, ApiError> {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return Ok(None);
    };
    match raw.parse::<u32>() {
        Ok(secs) if secs >= MIN_ONLINE_REFRESH_SECS => Ok(Some(secs)),
        _ => Err(ApiError::invalid(format!(
            "Intervalo deve ser um número maior ou igual a {MIN_ONLINE_REFRESH_SECS} segundos"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(nick: &str, points: u64, mode: WindowMode, activity: Option<&str>) -> OnlineUserItem {
        OnlineUserItem {
            nick_canal: nick.to_string(),
            pontos: points,
            tipo_janela: mode,
            ultima_atividade: activity.map(str::to_string),
        }
    }

    fn roster() -> OnlineRoster {
        let mut roster = OnlineRoster::default();
        roster.reload(vec![
            user("zed", 5, WindowMode::Tab, Some("2025-03-01T10:30:00")),
            user("Amy", 50, WindowMode::Popup, Some("2025-03-01T09:00:00")),
            user("bob", 20, WindowMode::Popup, None),
        ]);
        roster
    }

    fn nicks(roster: &OnlineRoster) -> Vec<&str> {
        roster.view().iter().map(|u| u.nick_canal.as_str()).collect()
    }

    #[test]
    fn orders_by_each_key() {
        let mut roster = roster();
        assert_eq!(nicks(&roster), vec!["zed", "Amy", "bob"]);

        roster.set_order(OnlineOrder::Nick);
        assert_eq!(nicks(&roster), vec!["Amy", "bob", "zed"]);

        roster.set_order(OnlineOrder::Points);
        assert_eq!(nicks(&roster), vec!["Amy", "bob", "zed"]);

        roster.set_order(OnlineOrder::TimeOnline);
        assert_eq!(nicks(&roster), vec!["Amy", "zed", "bob"]);
    }

    #[test]
    fn filter_survives_reload() {
        let mut roster = roster();
        roster.set_filter(OnlineFilter {
            search: "".into(),
            window_mode: Some(WindowMode::Popup),
        });
        assert_eq!(nicks(&roster), vec!["Amy", "bob"]);

        roster.reload(vec![user("tabby", 1, WindowMode::Tab, None)]);
        assert!(roster.view().is_empty());
        assert_eq!(roster.users().len(), 1);
    }

    #[test]
    fn search_is_case_insensitive() {
        let mut roster = roster();
        roster.set_filter(OnlineFilter {
            search: "AM".into(),
            window_mode: None,
        });
        assert_eq!(nicks(&roster), vec!["Amy"]);
    }

    #[test]
    fn stats_count_by_mode() {
        assert_eq!(
            roster().stats(),
            OnlineStats {
                total: 3,
                popup: 2,
                tab: 1
            }
        );
    }

    #[test]
    fn time_online_uses_last_activity() {
        let now = parse_timestamp("2025-03-01T11:45:00").unwrap();
        let roster = roster();
        let amy = roster.find("Amy").unwrap();
        assert_eq!(time_online(amy, now), "2h 45m");
        let bob = roster.find("bob").unwrap();
        assert_eq!(time_online(bob, now), "-");
        assert!(user_details(amy, now).contains("Tempo Online: 2h 45m"));
    }

    #[test]
    fn refresh_interval_has_a_floor() {
        assert_eq!(parse_refresh_interval(None), Ok(None));
        assert_eq!(parse_refresh_interval(Some("  ")), Ok(None));
        assert_eq!(parse_refresh_interval(Some("10")), Ok(Some(10)));
        assert_eq!(parse_refresh_interval(Some("45")), Ok(Some(45)));
        assert!(parse_refresh_interval(Some("9")).is_err());
        assert!(parse_refresh_interval(Some("soon")).is_err());
    }

    #[test]
    fn order_round_trips_through_select_values() {
        for order in OnlineOrder::ALL {
            assert_eq!(OnlineOrder::parse(order.as_str()), order);
        }
        assert_eq!(OnlineOrder::parse("bogus"), OnlineOrder::Unordered);
    }
}
