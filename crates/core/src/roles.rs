//! Well-known role name constants.
//!
//! These must match the role values stored in the `users.role` column and
//! the seed data in the users migration.

pub const ROLE_USER: &str = "user";
pub const ROLE_MODERATOR: &str = "moderator";
pub const ROLE_ADMIN: &str = "admin";
