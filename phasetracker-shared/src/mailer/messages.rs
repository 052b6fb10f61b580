/// Outbound message content
///
/// The two emails the system sends. Plain text only; the code must appear
/// verbatim so recipients can type it into the verification form.

use super::EmailMessage;

/// Admin signup verification email
pub fn admin_verification(to: &str, first_name: &str, code: &str) -> EmailMessage {
    EmailMessage {
        to: to.to_string(),
        subject: "Verify your PhaseTracker account".to_string(),
        body: format!(
            "Hi {first_name},\n\n\
             Your PhaseTracker verification code is: {code}\n\n\
             Enter it within 10 minutes to activate your account.\n\n\
             If you didn't sign up, you can ignore this email."
        ),
    }
}

/// Client login-code email
pub fn client_login(to: &str, code: &str) -> EmailMessage {
    EmailMessage {
        to: to.to_string(),
        subject: "Your PhaseTracker login code".to_string(),
        body: format!(
            "Your PhaseTracker login code is: {code}\n\n\
             Enter it within 10 minutes to view your projects.\n\n\
             If you didn't request a code, you can ignore this email."
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_verification_contains_code_and_name() {
        let message = admin_verification("ops@example.com", "Ada", "123456");

        assert_eq!(message.to, "ops@example.com");
        assert!(message.body.contains("123456"));
        assert!(message.body.contains("Ada"));
    }

    #[test]
    fn test_client_login_contains_code() {
        let message = client_login("viewer@example.com", "654321");

        assert_eq!(message.to, "viewer@example.com");
        assert!(message.body.contains("654321"));
        assert!(message.subject.contains("login code"));
    }
}
