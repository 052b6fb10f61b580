/// Service layer
///
/// The two subsystems with real invariants live here, behind typed error
/// enums the transport layer maps to status codes:
///
/// - `auth`: signup/verification/login flows and token issuance
/// - `phases`: the phase lifecycle engine (single-active invariant,
///   ordering, reorder)
///
/// Everything else (project metadata, client assignment) is plain data
/// plumbing and calls the models directly from its route handlers.

pub mod auth;
pub mod phases;
