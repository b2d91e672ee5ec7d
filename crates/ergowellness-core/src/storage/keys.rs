//! Persisted key names. The store adds its namespace prefix to each.

pub const SETTINGS: &str = "settings";
pub const LAST_BREAK_TIME: &str = "lastBreakTime";
pub const LAST_HYDRATION_TIME: &str = "lastHydrationTime";
pub const TRACKING_DATA: &str = "trackingData";
pub const BADGES: &str = "badges";
pub const STREAK_DAYS: &str = "streakDays";
pub const TODAY_BREAKS: &str = "todayBreaks";
pub const WEEKLY_BREAKS: &str = "weeklyBreaks";
pub const HYDRATION_TODAY: &str = "hydrationToday";
pub const CURRENT_PAIN_LEVEL: &str = "currentPainLevel";
pub const PAIN_AREAS: &str = "painAreas";
pub const LAST_ASSESSMENT: &str = "lastAssessment";
pub const ONBOARDED: &str = "onboarded";
pub const THEME: &str = "theme";
pub const USER_DATA: &str = "userData";
