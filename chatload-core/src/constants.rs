use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:4000";

pub const DEFAULT_ROOM_ID: &str = "11";

pub const DEFAULT_MESSAGES_PER_USER: usize = 20;

/// Users already registered against the reference deployment.
pub const DEFAULT_USERS: [(&str, &str); 4] = [
    ("user1", "pass123"),
    ("user2", "pass123"),
    ("user3", "pass123"),
    ("user4", "pass123"),
];

/// Lower bound of the pause between two messages of the same user.
pub const DEFAULT_MIN_DELAY: Duration = Duration::from_millis(50);

/// Upper bound of the pause between two messages of the same user.
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_millis(200);

pub const P95: f64 = 0.95;
pub const P99: f64 = 0.99;
