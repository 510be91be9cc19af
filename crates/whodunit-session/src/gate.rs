//! Passphrase hook for game-master claims.
//!
//! The session does not know how a claim is vetted. It only needs a yes or
//! no, so the check sits behind the [`MasterGate`] trait and the server
//! picks an implementation from its configuration:
//! - [`OpenGate`] when no passphrase is configured
//! - [`Passphrase`] when one is
//! - anything else (a mock in tests, an external lookup) without touching
//!   the session code

/// Decides whether a connection may claim the game-master seat.
///
/// `Send + Sync + 'static` because the gate lives in the room task for the
/// whole server lifetime.
///
/// # Example
///
/// ```rust
/// use whodunit_session::MasterGate;
///
/// /// Locks the seat for good.
/// struct NeverGate;
///
/// impl MasterGate for NeverGate {
///     fn admit(&self, _password: Option<&str>) -> bool {
///         false
///     }
/// }
///
/// assert!(!NeverGate.admit(Some("anything")));
/// ```
pub trait MasterGate: Send + Sync + 'static {
    /// Returns `true` if `password` entitles the caller to claim the seat.
    fn admit(&self, password: Option<&str>) -> bool;
}

impl<T: MasterGate + ?Sized> MasterGate for Box<T> {
    fn admit(&self, password: Option<&str>) -> bool {
        (**self).admit(password)
    }
}

/// Admits every claim. Used when no passphrase is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenGate;

impl MasterGate for OpenGate {
    fn admit(&self, _password: Option<&str>) -> bool {
        true
    }
}

/// Admits a claim only if it carries exactly the configured passphrase.
#[derive(Clone)]
pub struct Passphrase(String);

impl Passphrase {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }
}

// Keep the secret out of logs.
impl std::fmt::Debug for Passphrase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Passphrase(..)")
    }
}

impl MasterGate for Passphrase {
    fn admit(&self, password: Option<&str>) -> bool {
        password == Some(self.0.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_gate_admits_without_password() {
        assert!(OpenGate.admit(None));
        assert!(OpenGate.admit(Some("whatever")));
    }

    #[test]
    fn test_passphrase_admits_exact_match_only() {
        let gate = Passphrase::new("clue");
        assert!(gate.admit(Some("clue")));
        assert!(!gate.admit(Some("Clue")));
        assert!(!gate.admit(Some("")));
        assert!(!gate.admit(None));
    }

    #[test]
    fn test_boxed_gate_delegates() {
        let gate: Box<dyn MasterGate> = Box::new(Passphrase::new("x"));
        assert!(gate.admit(Some("x")));
        assert!(!gate.admit(None));
    }

    #[test]
    fn test_passphrase_debug_hides_secret() {
        let shown = format!("{:?}", Passphrase::new("top-secret"));
        assert!(!shown.contains("top-secret"));
    }
}
