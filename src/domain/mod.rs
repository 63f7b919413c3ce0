//! Domain layer - Core business entities and logic
//!
//! Users, their roles, credential hashing and the access rules that
//! apply between users. Nothing here touches HTTP or the database.

pub mod password;
pub mod policy;
pub mod user;

pub use password::Password;
pub use user::{NewUser, Registration, User, UserResponse, UserRole};
