use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::model::{DayOfWeek, Platform};
use crate::rank::PlatformRecommendation;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledSlot {
    pub platform: Platform,
    pub day: DayOfWeek,
    pub hour: u8,
    pub at: DateTime<Utc>,
    pub score: f64,
}

/// Next concrete occurrence (within a week of `from`) of every recommended
/// slot, earliest first.
pub fn upcoming_slots(
    recommendations: &[PlatformRecommendation],
    from: DateTime<Utc>,
    tz: Tz,
    limit: usize,
) -> Vec<ScheduledSlot> {
    let mut scheduled = Vec::new();

    for recommendation in recommendations {
        for day in &recommendation.best_days {
            for slot in &day.slots {
                if let Some(at) = next_occurrence(slot.day, slot.hour, from, tz) {
                    scheduled.push(ScheduledSlot {
                        platform: recommendation.platform,
                        day: slot.day,
                        hour: slot.hour,
                        at,
                        score: slot.score,
                    });
                }
            }
        }
    }

    scheduled.sort_by(|a, b| a.at.cmp(&b.at).then(a.platform.cmp(&b.platform)));
    scheduled.truncate(limit);
    scheduled
}

pub fn next_occurrence(day: DayOfWeek, hour: u8, from: DateTime<Utc>, tz: Tz) -> Option<DateTime<Utc>> {
    let local_today = from.with_timezone(&tz).date_naive();
    for offset in 0..=7 {
        let date = local_today + Duration::days(offset);
        if date.weekday() != day.weekday() {
            continue;
        }
        let naive = date.and_hms_opt(hour as u32, 0, 0)?;
        // Skipped local hours (DST gaps) have no instant.
        let Some(local) = tz.from_local_datetime(&naive).earliest() else {
            continue;
        };
        let instant = local.with_timezone(&Utc);
        if instant > from {
            return Some(instant);
        }
    }
    None
}
