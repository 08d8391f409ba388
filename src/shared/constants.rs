/// Cookie holding the server-side session id
pub const SESSION_COOKIE: &str = "edms_session";

/// Cookie holding the signed claims token
pub const TOKEN_COOKIE: &str = "edms_token";

/// Session and token lifetime in hours
pub const AUTH_TTL_HOURS: i64 = 24;

// =============================================================================
// SYSTEM ACCOUNTS
// =============================================================================

/// User id of the seeded admin account
pub const SYSTEM_ADMIN: &str = "admin";

/// User id of the seeded contributor account
pub const SYSTEM_CONTRIBUTOR: &str = "contributor";

/// User id of the seeded viewer account
pub const SYSTEM_VIEWER: &str = "viewer";
