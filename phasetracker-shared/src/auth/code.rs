/// One-time verification code issuance
///
/// Produces the 6-digit codes used for admin signup verification and client
/// passwordless login. Pure generation — callers persist the result (keyed
/// to exactly one owner) and hand the code to the mailer.
///
/// Six digits trade brute-force resistance against manual entry; the
/// 10-minute expiry bounds the guessing window. There is deliberately no
/// attempt counter or lockout here (see DESIGN.md).

use chrono::{DateTime, Duration, Utc};
use rand::Rng;

/// How long an issued code stays redeemable
pub const CODE_TTL_MINUTES: i64 = 10;

/// A freshly generated code and its expiry
#[derive(Debug, Clone)]
pub struct IssuedCode {
    /// 6-digit decimal string, uniformly drawn from [100000, 999999]
    pub code: String,

    /// Instant after which redemption fails regardless of use
    pub expires_at: DateTime<Utc>,
}

/// Generates a one-time code with its expiry
pub fn issue_code() -> IssuedCode {
    let mut rng = rand::thread_rng();
    let value: u32 = rng.gen_range(100_000..=999_999);

    IssuedCode {
        code: value.to_string(),
        expires_at: Utc::now() + Duration::minutes(CODE_TTL_MINUTES),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_is_six_decimal_digits() {
        for _ in 0..100 {
            let issued = issue_code();
            assert_eq!(issued.code.len(), 6);
            assert!(issued.code.chars().all(|c| c.is_ascii_digit()));

            let value: u32 = issued.code.parse().unwrap();
            assert!((100_000..=999_999).contains(&value));
        }
    }

    #[test]
    fn test_expiry_is_ten_minutes_out() {
        let issued = issue_code();
        let remaining = issued.expires_at - Utc::now();

        assert!(remaining <= Duration::minutes(CODE_TTL_MINUTES));
        assert!(remaining > Duration::minutes(CODE_TTL_MINUTES - 1));
    }

    #[test]
    fn test_codes_vary() {
        // 100 draws from a million-value space colliding every time would
        // mean the generator is broken
        let first = issue_code().code;
        let all_same = (0..100).all(|_| issue_code().code == first);
        assert!(!all_same);
    }
}
