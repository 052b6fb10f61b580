/// Middleware modules for the API server
///
/// - `security`: response security headers
///
/// Authentication layers live in `app.rs` next to the router that applies
/// them.

pub mod security;
