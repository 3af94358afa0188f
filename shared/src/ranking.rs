use std::cmp::Ordering;

use crate::api::RankingItem;
use crate::config::RANKING_PAGE_SIZE;
use crate::window_mode::WindowMode;

#[derive(Debug, Clone, PartialEq)]
pub struct RankedRow {
    pub entry: RankingItem,
    /// 1-based position by points in the current view.
    pub rank: u32,
    pub average: f64,
}

impl RankedRow {
    pub fn average_label(&self) -> String {
        format!("{:.2}", self.average)
    }

    pub fn medal(&self) -> Option<Medal> {
        Medal::for_rank(self.rank)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Medal {
    Gold,
    Silver,
    Bronze,
}

impl Medal {
    pub fn for_rank(rank: u32) -> Option<Self> {
        match rank {
            1 => Some(Self::Gold),
            2 => Some(Self::Silver),
            3 => Some(Self::Bronze),
            _ => None,
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Self::Gold => "#ffd700",
            Self::Silver => "#c0c0c0",
            Self::Bronze => "#cd7f32",
        }
    }
}

fn average_points(entry: &RankingItem) -> f64 {
    entry.pontos as f64 / f64::from(entry.sessoes_lurk.max(1))
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RankingFilter {
    pub search: String,
    pub window_mode: Option<WindowMode>,
    pub online: Option<bool>,
}

impl RankingFilter {
    pub fn matches(&self, entry: &RankingItem) -> bool {
        let needle = self.search.trim().to_lowercase();
        entry.nick_canal.to_lowercase().contains(&needle)
            && self.window_mode.is_none_or(|mode| entry.tipo_janela == mode)
            && self.online.is_none_or(|online| entry.online == online)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Rank,
    Nick,
    Points,
    Average,
    Online,
    WindowMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }
}

fn compare_rows(field: SortField, a: &RankedRow, b: &RankedRow) -> Ordering {
    match field {
        SortField::Rank => a.rank.cmp(&b.rank),
        SortField::Points => a.entry.pontos.cmp(&b.entry.pontos),
        SortField::Average => a.average.total_cmp(&b.average),
        SortField::Nick => a
            .entry
            .nick_canal
            .to_lowercase()
            .cmp(&b.entry.nick_canal.to_lowercase()),
        SortField::Online => a.entry.online.to_string().cmp(&b.entry.online.to_string()),
        SortField::WindowMode => a
            .entry
            .tipo_janela
            .as_str()
            .cmp(b.entry.tipo_janela.as_str()),
    }
}

/// Leaderboard held by the admin console.
///
/// `entries` is the list exactly as loaded; `view` is what the table shows
/// after filtering and sorting. Ranks are only recomputed by a reload or a
/// filter, so sorting by nick keeps every row's points rank.
#[derive(Debug, Clone)]
pub struct RankingList {
    entries: Vec<RankingItem>,
    view: Vec<RankedRow>,
    page: usize,
    sort_field: SortField,
    sort_direction: SortDirection,
}

impl Default for RankingList {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            view: Vec::new(),
            page: 1,
            sort_field: SortField::Points,
            sort_direction: SortDirection::Descending,
        }
    }
}

impl RankingList {
    pub fn reload(&mut self, entries: Vec<RankingItem>) {
        self.view = Self::ranked(entries.iter().cloned());
        self.entries = entries;
        self.reset_order();
    }

    pub fn filter(&mut self, filter: &RankingFilter) {
        self.view = Self::ranked(self.entries.iter().filter(|e| filter.matches(e)).cloned());
        self.reset_order();
    }

    /// A freshly ranked view is ordered by points, highest first.
    fn reset_order(&mut self) {
        self.page = 1;
        self.sort_field = SortField::Points;
        self.sort_direction = SortDirection::Descending;
    }

    /// Sort the view by `field`. The same field twice flips the direction.
    pub fn sort(&mut self, field: SortField) {
        if self.sort_field == field {
            self.sort_direction = self.sort_direction.toggled();
        } else {
            self.sort_field = field;
            self.sort_direction = SortDirection::Descending;
        }
        let direction = self.sort_direction;
        self.view.sort_by(|a, b| {
            let ord = compare_rows(field, a, b);
            match direction {
                SortDirection::Ascending => ord,
                SortDirection::Descending => ord.reverse(),
            }
        });
    }

    fn ranked(entries: impl Iterator<Item = RankingItem>) -> Vec<RankedRow> {
        let mut rows: Vec<RankingItem> = entries.collect();
        rows.sort_by(|a, b| b.pontos.cmp(&a.pontos));
        rows.into_iter()
            .enumerate()
            .map(|(idx, entry)| RankedRow {
                average: average_points(&entry),
                rank: idx as u32 + 1,
                entry,
            })
            .collect()
    }

    pub fn entries(&self) -> &[RankingItem] {
        &self.entries
    }

    pub fn view(&self) -> &[RankedRow] {
        &self.view
    }

    pub fn sort_state(&self) -> (SortField, SortDirection) {
        (self.sort_field, self.sort_direction)
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_count(&self) -> usize {
        self.view.len().div_ceil(RANKING_PAGE_SIZE)
    }

    /// Returns `false` and stays put when `page` is out of range.
    pub fn go_to_page(&mut self, page: usize) -> bool {
        if page == 0 || page > self.page_count() {
            return false;
        }
        self.page = page;
        true
    }

    pub fn next_page(&mut self) -> bool {
        self.go_to_page(self.page + 1)
    }

    pub fn previous_page(&mut self) -> bool {
        self.page > 1 && self.go_to_page(self.page - 1)
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.page_count()
    }

    pub fn current_page_rows(&self) -> &[RankedRow] {
        let start = (self.page - 1) * RANKING_PAGE_SIZE;
        if start >= self.view.len() {
            return &[];
        }
        let end = (start + RANKING_PAGE_SIZE).min(self.view.len());
        &self.view[start..end]
    }

    pub fn page_window(&self) -> PageWindow {
        let total = self.view.len();
        let start = if total == 0 {
            0
        } else {
            (self.page - 1) * RANKING_PAGE_SIZE + 1
        };
        PageWindow {
            start,
            end: (self.page * RANKING_PAGE_SIZE).min(total),
            total,
        }
    }

    /// Totals over the full list, regardless of the active filter.
    pub fn stats(&self) -> RankingStats {
        let total_users = self.entries.len();
        let total_points: u64 = self.entries.iter().map(|e| e.pontos).sum();
        let mean_points = if total_users == 0 {
            0.0
        } else {
            total_points as f64 / total_users as f64
        };
        RankingStats {
            total_users,
            online_users: self.entries.iter().filter(|e| e.online).count(),
            total_points,
            mean_points_label: format!("{mean_points:.2}"),
        }
    }
}

/// "Showing `start`-`end` of `total`".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub start: usize,
    pub end: usize,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankingStats {
    pub total_users: usize,
    pub online_users: usize,
    pub total_points: u64,
    pub mean_points_label: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(nick: &str, points: u64) -> RankingItem {
        RankingItem {
            nick_canal: nick.to_string(),
            pontos: points,
            tipo_janela: WindowMode::Popup,
            online: false,
            sessoes_lurk: 0,
        }
    }

    fn list(items: Vec<RankingItem>) -> RankingList {
        let mut list = RankingList::default();
        list.reload(items);
        list
    }

    fn nicks(rows: &[RankedRow]) -> Vec<&str> {
        rows.iter().map(|r| r.entry.nick_canal.as_str()).collect()
    }

    #[test]
    fn ties_keep_load_order() {
        let list = list(vec![item("A", 100), item("C", 50), item("B", 100)]);
        let ranks: Vec<(&str, u32)> = list
            .view()
            .iter()
            .map(|r| (r.entry.nick_canal.as_str(), r.rank))
            .collect();
        assert_eq!(ranks, vec![("A", 1), ("B", 2), ("C", 3)]);
    }

    #[test]
    fn filter_is_case_insensitive_and_reranks() {
        let mut list = list(vec![item("Bob", 5), item("alice", 50), item("BOB2", 10)]);
        list.filter(&RankingFilter {
            search: "b".into(),
            ..Default::default()
        });
        assert_eq!(nicks(list.view()), vec!["BOB2", "Bob"]);
        assert_eq!(list.view()[0].rank, 1);
        assert_eq!(list.entries().len(), 3);
    }

    #[test]
    fn filter_combines_mode_and_online() {
        let mut online_tab = item("tabby", 1);
        online_tab.tipo_janela = WindowMode::Tab;
        online_tab.online = true;
        let mut offline_tab = item("tabless", 2);
        offline_tab.tipo_janela = WindowMode::Tab;
        let mut list = list(vec![online_tab, offline_tab, item("pop", 3)]);

        list.filter(&RankingFilter {
            window_mode: Some(WindowMode::Tab),
            online: Some(true),
            ..Default::default()
        });
        assert_eq!(nicks(list.view()), vec!["tabby"]);

        list.filter(&RankingFilter::default());
        assert_eq!(list.view().len(), 3);
    }

    #[test]
    fn average_divides_by_at_least_one_session() {
        let mut regular = item("regular", 25);
        regular.sessoes_lurk = 4;
        let list = list(vec![regular, item("fresh", 7), item("zero", 0)]);
        let labels: Vec<String> = list.view().iter().map(|r| r.average_label()).collect();
        assert_eq!(labels, vec!["6.25", "7.00", "0.00"]);
        assert_eq!(list.view()[0].entry.sessoes_lurk, 4);
        assert_eq!(list.view()[0].average, 6.25);
    }

    #[test]
    fn twenty_three_rows_make_three_pages() {
        let items = (0..23).map(|i| item(&format!("u{i:02}"), 100 - i)).collect();
        let mut list = list(items);
        assert_eq!(list.page_count(), 3);
        assert_eq!(list.current_page_rows().len(), 10);

        assert!(!list.go_to_page(4));
        assert!(!list.go_to_page(0));
        assert_eq!(list.page(), 1);
        assert!(!list.previous_page());

        assert!(list.go_to_page(3));
        assert_eq!(list.current_page_rows().len(), 3);
        assert!(!list.next_page());
        assert_eq!(
            list.page_window(),
            PageWindow {
                start: 21,
                end: 23,
                total: 23
            }
        );
    }

    #[test]
    fn reload_and_filter_reset_page() {
        let items: Vec<RankingItem> = (0..15).map(|i| item(&format!("u{i}"), i)).collect();
        let mut list = list(items.clone());
        assert!(list.next_page());
        list.filter(&RankingFilter::default());
        assert_eq!(list.page(), 1);
        assert!(list.next_page());
        list.reload(items);
        assert_eq!(list.page(), 1);
    }

    #[test]
    fn rerank_resets_sort_state_to_points() {
        let mut list = list(vec![item("carol", 30), item("Alice", 10), item("bob", 20)]);
        list.sort(SortField::Nick);
        list.sort(SortField::Nick);
        assert_eq!(list.sort_state(), (SortField::Nick, SortDirection::Ascending));

        list.filter(&RankingFilter::default());
        assert_eq!(list.sort_state(), (SortField::Points, SortDirection::Descending));
        assert_eq!(nicks(list.view()), vec!["carol", "bob", "Alice"]);

        list.sort(SortField::Average);
        list.reload(vec![item("dave", 5), item("erin", 50)]);
        assert_eq!(list.sort_state(), (SortField::Points, SortDirection::Descending));
        assert_eq!(nicks(list.view()), vec!["erin", "dave"]);
    }

    #[test]
    fn sort_toggles_on_same_field_and_keeps_ranks() {
        let mut list = list(vec![item("carol", 30), item("Alice", 10), item("bob", 20)]);

        list.sort(SortField::Nick);
        assert_eq!(list.sort_state(), (SortField::Nick, SortDirection::Descending));
        assert_eq!(nicks(list.view()), vec!["carol", "bob", "Alice"]);

        list.sort(SortField::Nick);
        assert_eq!(list.sort_state().1, SortDirection::Ascending);
        assert_eq!(nicks(list.view()), vec!["Alice", "bob", "carol"]);
        let ranks: Vec<u32> = list.view().iter().map(|r| r.rank).collect();
        assert_eq!(ranks, vec![3, 2, 1]);

        list.sort(SortField::Points);
        assert_eq!(list.sort_state(), (SortField::Points, SortDirection::Descending));
        assert_eq!(nicks(list.view()), vec!["carol", "bob", "Alice"]);
    }

    #[test]
    fn sort_average_is_numeric() {
        let mut a = item("a", 9);
        a.sessoes_lurk = 1;
        let mut b = item("b", 100);
        b.sessoes_lurk = 10;
        let mut list = list(vec![a, b]);
        list.sort(SortField::Rank);
        list.sort(SortField::Average);
        assert_eq!(nicks(list.view()), vec!["b", "a"]);
    }

    #[test]
    fn empty_view_has_no_pages() {
        let list = RankingList::default();
        assert_eq!(list.page_count(), 0);
        assert!(list.current_page_rows().is_empty());
        assert_eq!(
            list.page_window(),
            PageWindow {
                start: 0,
                end: 0,
                total: 0
            }
        );
    }

    #[test]
    fn stats_cover_full_list() {
        let mut on = item("on", 10);
        on.online = true;
        let mut list = list(vec![on, item("off", 5)]);
        list.filter(&RankingFilter {
            search: "on".into(),
            ..Default::default()
        });
        let stats = list.stats();
        assert_eq!(stats.total_users, 2);
        assert_eq!(stats.online_users, 1);
        assert_eq!(stats.total_points, 15);
        assert_eq!(stats.mean_points_label, "7.50");
        assert_eq!(RankingList::default().stats().mean_points_label, "0.00");
    }

    #[test]
    fn podium_ranks_get_medals() {
        assert_eq!(Medal::for_rank(1), Some(Medal::Gold));
        assert_eq!(Medal::for_rank(3).map(Medal::color), Some("#cd7f32"));
        assert_eq!(Medal::for_rank(4), None);
    }
}
