// Scheduling defaults - these are the single source of truth for defaults
pub const DEFAULT_FREQUENCY_DAYS: i64 = 7;
pub const DEFAULT_UPCOMING_LIMIT: usize = 5;

// Backend placeholder used when a programme has no target recorded
pub const PLACEHOLDER_TARGET: &str = "All growing areas";

// Urgency badge labels
pub const BADGE_OVERDUE: &str = "Overdue";
pub const BADGE_TODAY: &str = "Today";
pub const BADGE_TOMORROW: &str = "Tomorrow";
pub const BADGE_UNSCHEDULED: &str = "Unscheduled";

// localStorage keys checked (in order) for the bearer token
pub const AUTH_TOKEN_KEYS: [&str; 3] = ["authToken", "auth_token", "token"];

// REST collection for spray programmes
pub const SPRAY_PROGRAMMES_PATH: &str = "/spray-programmes";
