use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::aggregate::TimeBucket;
use crate::fallback;
use crate::model::{DayOfWeek, Platform};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    pub max_days: usize,
    pub slots_per_day: usize,
    pub flat_slots: usize,
    pub fallback_enabled: bool,
    pub fallback_confidence: f64,
    pub full_confidence_posts: u32,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            max_days: 3,
            slots_per_day: 3,
            flat_slots: 5,
            fallback_enabled: true,
            fallback_confidence: 0.5,
            full_confidence_posts: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub day: DayOfWeek,
    pub hour: u8,
    pub score: f64,
    pub confidence: f64,
    pub posts: u32,
}

impl TimeSlot {
    pub fn label(&self) -> String {
        format!("{} {:02}:00", self.day.label(), self.hour)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayRecommendation {
    pub day: DayOfWeek,
    pub slots: Vec<TimeSlot>,
}

impl DayRecommendation {
    pub fn best_score(&self) -> f64 {
        self.slots.first().map(|slot| slot.score).unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationSource {
    History,
    Fallback,
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformRecommendation {
    pub platform: Platform,
    pub source: RecommendationSource,
    pub best_days: Vec<DayRecommendation>,
    pub explanation: String,
}

#[derive(Debug, Clone)]
pub struct Ranker {
    config: RankingConfig,
}

impl Ranker {
    pub fn new(config: RankingConfig) -> Self {
        Self { config }
    }

    /// One recommendation per requested platform: the filter's platform, or
    /// every platform in canonical order.
    pub fn recommend(
        &self,
        buckets: &[TimeBucket],
        platform: Option<Platform>,
    ) -> Vec<PlatformRecommendation> {
        match platform {
            Some(platform) => vec![self.rank_platform(buckets, platform)],
            None => Platform::ALL
                .iter()
                .map(|platform| self.rank_platform(buckets, *platform))
                .collect(),
        }
    }

    pub fn rank_platform(&self, buckets: &[TimeBucket], platform: Platform) -> PlatformRecommendation {
        let mut slots: Vec<TimeSlot> = buckets
            .iter()
            .filter(|bucket| bucket.platform == Some(platform) && bucket.posts > 0)
            .map(|bucket| self.history_slot(bucket))
            .collect();

        if slots.is_empty() {
            return self.fallback_for(platform);
        }

        let post_count: u32 = slots.iter().map(|slot| slot.posts).sum();
        sort_slots(&mut slots);

        PlatformRecommendation {
            platform,
            source: RecommendationSource::History,
            best_days: self.group_by_day(slots),
            explanation: format!(
                "Based on {} published {} post{} from your history.",
                post_count,
                platform.label(),
                if post_count == 1 { "" } else { "s" }
            ),
        }
    }

    /// Flat ranking of cross-platform slots, best first.
    pub fn rank_flat(&self, buckets: &[TimeBucket]) -> Vec<TimeSlot> {
        let mut slots: Vec<TimeSlot> = buckets
            .iter()
            .filter(|bucket| bucket.posts > 0)
            .map(|bucket| self.history_slot(bucket))
            .collect();
        sort_slots(&mut slots);
        slots.truncate(self.config.flat_slots);
        slots
    }

    fn history_slot(&self, bucket: &TimeBucket) -> TimeSlot {
        let full = self.config.full_confidence_posts.max(1) as f64;
        TimeSlot {
            day: bucket.day,
            hour: bucket.hour,
            score: bucket.average(),
            confidence: (bucket.posts as f64 / full).min(1.0),
            posts: bucket.posts,
        }
    }

    /// Expects slots already sorted best first.
    fn group_by_day(&self, slots: Vec<TimeSlot>) -> Vec<DayRecommendation> {
        let mut days: Vec<DayRecommendation> = Vec::new();
        for slot in slots {
            match days.iter_mut().find(|entry| entry.day == slot.day) {
                Some(entry) => {
                    if entry.slots.len() < self.config.slots_per_day {
                        entry.slots.push(slot);
                    }
                }
                None => {
                    if self.config.slots_per_day > 0 {
                        days.push(DayRecommendation {
                            day: slot.day,
                            slots: vec![slot],
                        });
                    }
                }
            }
        }

        days.sort_by(|a, b| b.best_score().total_cmp(&a.best_score()));
        days.truncate(self.config.max_days);
        days
    }

    fn fallback_for(&self, platform: Platform) -> PlatformRecommendation {
        let table = if self.config.fallback_enabled {
            fallback::table_for(platform)
        } else {
            None
        };

        let Some(table) = table else {
            return PlatformRecommendation {
                platform,
                source: RecommendationSource::Unavailable,
                best_days: Vec::new(),
                explanation: format!(
                    "No {} posting history yet and no generic schedule is available.",
                    platform.label()
                ),
            };
        };

        let mut position = 0usize;
        let mut best_days = Vec::new();
        for entry in table.iter().take(self.config.max_days) {
            let mut slots = Vec::new();
            for hour in entry.hours.iter().take(self.config.slots_per_day) {
                slots.push(TimeSlot {
                    day: entry.day,
                    hour: *hour,
                    score: fallback::synthetic_score(position),
                    confidence: self.config.fallback_confidence,
                    posts: 0,
                });
                position += 1;
            }
            if !slots.is_empty() {
                best_days.push(DayRecommendation {
                    day: entry.day,
                    slots,
                });
            }
        }

        PlatformRecommendation {
            platform,
            source: RecommendationSource::Fallback,
            best_days,
            explanation: format!(
                "Not enough {} history yet; these are generic industry best times, not personalized.",
                platform.label()
            ),
        }
    }
}

/// Score descending; ties fall back to day (Monday first) then hour.
fn sort_slots(slots: &mut [TimeSlot]) {
    slots.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then(a.day.cmp(&b.day))
            .then(a.hour.cmp(&b.hour))
    });
}
