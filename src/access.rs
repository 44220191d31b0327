//! Access modes and the password challenges that switch between them.
//!
//! The checks compare against secrets that ship with the client (or sit in
//! the user's own config file). Anyone who can read either can unlock every
//! mode; this gates UI actions, it does not protect content.

use thiserror::Error;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccessMode {
  #[default]
  Public,
  Admin,
  Spectator,
}

impl AccessMode {
  pub fn label(self) -> &'static str {
    match self {
      AccessMode::Public => "Público",
      AccessMode::Admin => "Admin",
      AccessMode::Spectator => "VIP",
    }
  }

  /// Upload, delete, banner change, tags and comment counts.
  pub fn can_manage(self) -> bool {
    self == AccessMode::Admin
  }

  /// Direct playback instead of the locked-content redirect.
  pub fn can_play(self) -> bool {
    matches!(self, AccessMode::Admin | AccessMode::Spectator)
  }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccessError {
  #[error("Senha incorreta.")]
  IncorrectPassword { target: AccessMode },
}

/// A single yes/no credential check, so the literal secrets can be replaced
/// without touching the mode transitions.
pub trait CredentialCheck: Send {
  fn check(&self, password: &str) -> bool;
}

/// Byte-exact match.
pub struct ExactSecret(String);

impl ExactSecret {
  pub fn new(secret: impl Into<String>) -> Self {
    Self(secret.into())
  }
}

impl CredentialCheck for ExactSecret {
  fn check(&self, password: &str) -> bool {
    password == self.0
  }
}

/// Match after trimming and lower-casing the attempt.
pub struct FoldedPhrase(String);

impl FoldedPhrase {
  pub fn new(phrase: &str) -> Self {
    Self(phrase.trim().to_lowercase())
  }
}

impl CredentialCheck for FoldedPhrase {
  fn check(&self, password: &str) -> bool {
    password.trim().to_lowercase() == self.0
  }
}

pub struct AccessController {
  mode: AccessMode,
  admin: Box<dyn CredentialCheck>,
  spectator: Box<dyn CredentialCheck>,
}

impl AccessController {
  /// Starts in [`AccessMode::Public`].
  pub fn new(admin: Box<dyn CredentialCheck>, spectator: Box<dyn CredentialCheck>) -> Self {
    Self { mode: AccessMode::Public, admin, spectator }
  }

  pub fn mode(&self) -> AccessMode {
    self.mode
  }

  pub fn can_manage(&self) -> bool {
    self.mode.can_manage()
  }

  pub fn can_play(&self) -> bool {
    self.mode.can_play()
  }

  /// Enter Admin (leaving Spectator if active). On a wrong password the mode
  /// is left exactly as it was.
  pub fn request_admin(&mut self, password: &str) -> Result<(), AccessError> {
    if !self.admin.check(password) {
      info!("access: admin challenge failed");
      return Err(AccessError::IncorrectPassword { target: AccessMode::Admin });
    }
    self.mode = AccessMode::Admin;
    info!("access: entered admin mode");
    Ok(())
  }

  /// Enter Spectator (leaving Admin if active).
  pub fn request_spectator(&mut self, password: &str) -> Result<(), AccessError> {
    if !self.spectator.check(password) {
      info!("access: spectator challenge failed");
      return Err(AccessError::IncorrectPassword { target: AccessMode::Spectator });
    }
    self.mode = AccessMode::Spectator;
    info!("access: entered spectator mode");
    Ok(())
  }

  pub fn logout(&mut self) {
    if self.mode != AccessMode::Public {
      info!(from = self.mode.label(), "access: logged out");
    }
    self.mode = AccessMode::Public;
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn controller() -> AccessController {
    AccessController::new(Box::new(ExactSecret::new("admin123")), Box::new(FoldedPhrase::new("prazer ilimitado")))
  }

  #[test]
  fn starts_public() {
    let ctl = controller();
    assert_eq!(ctl.mode(), AccessMode::Public);
    assert!(!ctl.can_play());
    assert!(!ctl.can_manage());
  }

  #[test]
  fn admin_with_correct_secret() {
    let mut ctl = controller();
    ctl.request_admin("admin123").unwrap();
    assert_eq!(ctl.mode(), AccessMode::Admin);
    assert!(ctl.can_manage());
    assert!(ctl.can_play());
  }

  #[test]
  fn admin_secret_is_exact() {
    let mut ctl = controller();
    for attempt in ["", "ADMIN123", " admin123", "admin1234", "admin12"] {
      assert_eq!(
        ctl.request_admin(attempt),
        Err(AccessError::IncorrectPassword { target: AccessMode::Admin }),
        "attempt {:?}",
        attempt
      );
      assert_eq!(ctl.mode(), AccessMode::Public);
    }
  }

  #[test]
  fn failed_admin_keeps_spectator() {
    let mut ctl = controller();
    ctl.request_spectator("prazer ilimitado").unwrap();
    assert!(ctl.request_admin("wrong").is_err());
    assert_eq!(ctl.mode(), AccessMode::Spectator);
  }

  #[test]
  fn spectator_phrase_is_trimmed_and_folded() {
    let mut ctl = controller();
    ctl.request_spectator("  PRAZER ILIMITADO  ").unwrap();
    assert_eq!(ctl.mode(), AccessMode::Spectator);
    assert!(ctl.can_play());
    assert!(!ctl.can_manage());
  }

  #[test]
  fn spectator_wrong_phrase() {
    let mut ctl = controller();
    assert_eq!(
      ctl.request_spectator("prazer"),
      Err(AccessError::IncorrectPassword { target: AccessMode::Spectator })
    );
    assert_eq!(ctl.mode(), AccessMode::Public);
  }

  #[test]
  fn privileged_modes_are_mutually_exclusive() {
    let mut ctl = controller();
    ctl.request_admin("admin123").unwrap();
    ctl.request_spectator("prazer ilimitado").unwrap();
    assert_eq!(ctl.mode(), AccessMode::Spectator);
    assert!(!ctl.can_manage());

    ctl.request_admin("admin123").unwrap();
    assert_eq!(ctl.mode(), AccessMode::Admin);
  }

  #[test]
  fn logout_is_idempotent() {
    let mut ctl = controller();
    ctl.request_admin("admin123").unwrap();
    ctl.logout();
    assert_eq!(ctl.mode(), AccessMode::Public);
    ctl.logout();
    assert_eq!(ctl.mode(), AccessMode::Public);
  }

  #[test]
  fn custom_checks_plug_in() {
    struct Never;
    impl CredentialCheck for Never {
      fn check(&self, _: &str) -> bool {
        false
      }
    }
    let mut ctl = AccessController::new(Box::new(Never), Box::new(Never));
    assert!(ctl.request_admin("admin123").is_err());
    assert!(ctl.request_spectator("prazer ilimitado").is_err());
  }

  #[test]
  fn error_message_is_user_facing() {
    let err = AccessError::IncorrectPassword { target: AccessMode::Admin };
    assert_eq!(err.to_string(), "Senha incorreta.");
  }
}
