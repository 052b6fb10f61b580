/// Authentication utilities
///
/// - `jwt`: HS256 session tokens for admins and clients (8-hour lifetime)
/// - `password`: Argon2id hashing and verification for admin passwords
/// - `code`: one-time verification code issuance
/// - `middleware`: request auth context shared with the API server

pub mod code;
pub mod jwt;
pub mod middleware;
pub mod password;
