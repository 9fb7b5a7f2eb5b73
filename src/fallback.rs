use crate::model::{DayOfWeek, Platform};

#[derive(Debug, Clone, Copy)]
pub struct FallbackDay {
    pub day: DayOfWeek,
    pub hours: &'static [u8],
}

const INSTAGRAM: &[FallbackDay] = &[
    FallbackDay { day: DayOfWeek::Wednesday, hours: &[11, 13, 19] },
    FallbackDay { day: DayOfWeek::Friday, hours: &[10, 11, 14] },
    FallbackDay { day: DayOfWeek::Tuesday, hours: &[9, 11, 14] },
];

const FACEBOOK: &[FallbackDay] = &[
    FallbackDay { day: DayOfWeek::Wednesday, hours: &[11, 13, 15] },
    FallbackDay { day: DayOfWeek::Thursday, hours: &[12, 13, 15] },
    FallbackDay { day: DayOfWeek::Friday, hours: &[10, 11, 13] },
];

const TWITTER: &[FallbackDay] = &[
    FallbackDay { day: DayOfWeek::Tuesday, hours: &[9, 12, 15] },
    FallbackDay { day: DayOfWeek::Wednesday, hours: &[9, 12, 17] },
    FallbackDay { day: DayOfWeek::Thursday, hours: &[9, 11, 15] },
];

const LINKEDIN: &[FallbackDay] = &[
    FallbackDay { day: DayOfWeek::Tuesday, hours: &[8, 10, 12] },
    FallbackDay { day: DayOfWeek::Wednesday, hours: &[9, 12, 17] },
    FallbackDay { day: DayOfWeek::Thursday, hours: &[8, 9, 10] },
];

const TOP_SCORE: f64 = 0.90;
const SCORE_STEP: f64 = 0.05;

pub fn table_for(platform: Platform) -> Option<&'static [FallbackDay]> {
    let table = match platform {
        Platform::Instagram => INSTAGRAM,
        Platform::Facebook => FACEBOOK,
        Platform::Twitter => TWITTER,
        Platform::Linkedin => LINKEDIN,
    };
    if table.is_empty() {
        None
    } else {
        Some(table)
    }
}

/// Synthetic score for the n-th slot of a table, counted across days.
pub fn synthetic_score(position: usize) -> f64 {
    (TOP_SCORE - SCORE_STEP * position as f64).max(SCORE_STEP)
}
