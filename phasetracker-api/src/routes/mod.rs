/// API route handlers
///
/// Organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Signup, verification, and login endpoints
/// - `projects`: Project CRUD and client assignment (admin)
/// - `phases`: Phase lifecycle endpoints (admin)
/// - `clients`: Client management (admin) and the client timeline

pub mod auth;
pub mod clients;
pub mod health;
pub mod phases;
pub mod projects;
