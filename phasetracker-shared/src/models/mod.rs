/// Database models
///
/// One module per table:
///
/// - `admin`: Admin accounts (email + password, verified via one-time code)
/// - `client`: Passwordless client accounts
/// - `verification_code`: One-time codes for both admins and clients
/// - `project`: Projects owned by admins
/// - `phase`: Ordered project phases and their lifecycle transitions
/// - `project_client`: Project/client assignment join table

pub mod admin;
pub mod client;
pub mod phase;
pub mod project;
pub mod project_client;
pub mod verification_code;
