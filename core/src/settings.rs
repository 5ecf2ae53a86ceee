use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const DEFAULT_MIN_NUMBER: u32 = 2;
pub const DEFAULT_MAX_NUMBER: u32 = 20;

/// Only `Bucket` has generation behaviour. `Random` is kept so saved settings
/// from either mode load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PracticeMode {
    Random,
    #[default]
    Bucket,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PracticeSettings {
    pub mode: PracticeMode,
    pub included_buckets: BTreeSet<u32>,
    pub excluded_buckets: BTreeSet<u32>,
    pub min_number: u32,
    pub max_number: u32,
}

impl Default for PracticeSettings {
    fn default() -> Self {
        Self {
            mode: PracticeMode::Bucket,
            included_buckets: BTreeSet::new(),
            excluded_buckets: BTreeSet::new(),
            min_number: DEFAULT_MIN_NUMBER,
            max_number: DEFAULT_MAX_NUMBER,
        }
    }
}

impl PracticeSettings {
    /// The "Random" include option: no inclusion list, range minus exclusions.
    pub fn is_random(&self) -> bool {
        self.included_buckets.is_empty()
    }

    pub fn is_included(&self, bucket: u32) -> bool {
        self.included_buckets.contains(&bucket)
    }

    pub fn is_excluded(&self, bucket: u32) -> bool {
        self.excluded_buckets.contains(&bucket)
    }

    pub fn toggle_included(&self, bucket: u32) -> SettingsPatch {
        SettingsPatch {
            included_buckets: Some(toggled(&self.included_buckets, bucket)),
            ..Default::default()
        }
    }

    pub fn toggle_excluded(&self, bucket: u32) -> SettingsPatch {
        SettingsPatch {
            excluded_buckets: Some(toggled(&self.excluded_buckets, bucket)),
            ..Default::default()
        }
    }

    pub fn clear_included(&self) -> SettingsPatch {
        SettingsPatch {
            included_buckets: Some(BTreeSet::new()),
            ..Default::default()
        }
    }

    /// Field-by-field merge; `None` leaves the current value alone.
    pub fn apply(&mut self, patch: SettingsPatch) {
        let SettingsPatch {
            mode,
            included_buckets,
            excluded_buckets,
            min_number,
            max_number,
        } = patch;

        if let Some(mode) = mode {
            self.mode = mode;
        }
        if let Some(included) = included_buckets {
            self.included_buckets = included;
        }
        if let Some(excluded) = excluded_buckets {
            self.excluded_buckets = excluded;
        }
        if let Some(min) = min_number {
            self.min_number = min;
        }
        if let Some(max) = max_number {
            self.max_number = max;
        }
    }
}

fn toggled(set: &BTreeSet<u32>, bucket: u32) -> BTreeSet<u32> {
    let mut next = set.clone();
    if !next.remove(&bucket) {
        next.insert(bucket);
    }
    next
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsPatch {
    pub mode: Option<PracticeMode>,
    pub included_buckets: Option<BTreeSet<u32>>,
    pub excluded_buckets: Option<BTreeSet<u32>>,
    pub min_number: Option<u32>,
    pub max_number: Option<u32>,
}

impl SettingsPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
