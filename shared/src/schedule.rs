use crate::api::ScheduleItem;
use crate::config::{DEFAULT_CHANNEL_URL, HOURS_PER_DAY};

/// One hour of the day's programming.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleEntry {
    pub hour: u32,
    pub channel_name: String,
    pub platform_link_prefix: String,
}

impl ScheduleEntry {
    /// Decode a server item. `None` when its hour is not a valid 0..=23 hour.
    pub fn from_item(item: &ScheduleItem) -> Option<Self> {
        Some(Self {
            hour: parse_hour(&item.hora)?,
            channel_name: item.nome_canal.clone(),
            platform_link_prefix: item.link_plataforma.clone(),
        })
    }

    pub fn channel_url(&self) -> String {
        format!("{}{}", self.platform_link_prefix, self.channel_name)
    }
}

/// Hour component of an `"HH:MM"` string.
pub fn parse_hour(raw: &str) -> Option<u32> {
    let head = raw.split(':').next()?.trim();
    let hour = head.parse::<u32>().ok()?;
    (hour < HOURS_PER_DAY).then_some(hour)
}

/// Canonical `"HH:00"` label.
pub fn hour_label(hour: u32) -> String {
    format!("{:02}:00", hour % HOURS_PER_DAY)
}

/// The current day's schedule, replaced wholesale on every reload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleCache {
    entries: Vec<ScheduleEntry>,
}

impl ScheduleCache {
    pub fn new(entries: Vec<ScheduleEntry>) -> Self {
        let mut cache = Self::default();
        cache.replace(entries);
        cache
    }

    /// Build from server items, dropping the ones with an unusable hour.
    pub fn from_items(items: &[ScheduleItem]) -> Self {
        let entries = items
            .iter()
            .filter_map(|item| {
                let entry = ScheduleEntry::from_item(item);
                if entry.is_none() {
                    tracing::warn!(
                        hora = %item.hora,
                        canal = %item.nome_canal,
                        "dropping schedule item with invalid hour"
                    );
                }
                entry
            })
            .collect();
        Self::new(entries)
    }

    pub fn replace(&mut self, mut entries: Vec<ScheduleEntry>) {
        entries.sort_by_key(|entry| entry.hour);
        self.entries = entries;
    }

    pub fn entries(&self) -> &[ScheduleEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First entry stored for `hour`.
    pub fn active_entry_for_hour(&self, hour: u32) -> Option<&ScheduleEntry> {
        self.entries.iter().find(|entry| entry.hour == hour)
    }

    /// Address the companion window should show at `hour`.
    ///
    /// An entry without a platform link cannot form an address, so it falls
    /// back to the default like a missing entry.
    pub fn resolve_channel_url(&self, hour: u32) -> String {
        match self.active_entry_for_hour(hour) {
            Some(entry) if !entry.platform_link_prefix.is_empty() => entry.channel_url(),
            _ => DEFAULT_CHANNEL_URL.to_string(),
        }
    }

    /// The 24 display slots, 01:00 through 00:00.
    pub fn slots(&self) -> Vec<ScheduleSlot> {
        (1..=HOURS_PER_DAY)
            .map(|display_hour| {
                let hour = display_hour % HOURS_PER_DAY;
                ScheduleSlot {
                    display_hour,
                    label: hour_label(hour),
                    entry: self.active_entry_for_hour(hour).cloned(),
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleSlot {
    /// 1..=24; 24 stands for midnight.
    pub display_hour: u32,
    pub label: String,
    pub entry: Option<ScheduleEntry>,
}

impl ScheduleSlot {
    pub fn is_active(&self) -> bool {
        self.entry.is_some()
    }
}

/// Counters shown above the admin schedule table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleStats {
    pub total_items: usize,
    pub filled_hours: usize,
    pub vacant_hours: usize,
}

impl ScheduleStats {
    pub fn from_items(items: &[ScheduleItem]) -> Self {
        let total_items = items.len();
        Self {
            total_items,
            filled_hours: total_items,
            vacant_hours: (HOURS_PER_DAY as usize).saturating_sub(total_items),
        }
    }
}
