//! Activation codes and the links that carry them.
//!
//! A shop shows the rider a numeric code, both as text and as a QR code
//! encoding `<origin>/activate?code=<code>`. The rider either types the code
//! or scans the link; [`parse_activation_payload`] accepts both.

use rand_core::RngCore;

use crate::{Error, Result};

/// Digits in a normal activation code.
pub const CODE_DIGITS: u32 = 6;

/// Digits used once the six-digit space stops yielding free codes.
pub const WIDE_CODE_DIGITS: u32 = 8;

/// Draws per width before giving up on it.
pub const MAX_CODE_ATTEMPTS: usize = 64;

/// A uniformly drawn, zero-padded code of `digits` digits.
pub fn generate_code<R: RngCore + ?Sized>(rng: &mut R, digits: u32) -> String {
  let modulus = 10u64.pow(digits);
  let width = digits as usize;
  format!("{:0width$}", rng.next_u64() % modulus)
}

/// Draw codes until `is_taken` rejects none, widening once from
/// [`CODE_DIGITS`] to [`WIDE_CODE_DIGITS`].
pub fn allocate_code<R, F>(rng: &mut R, mut is_taken: F) -> Result<String>
where
  R: RngCore + ?Sized,
  F: FnMut(&str) -> bool,
{
  for digits in [CODE_DIGITS, WIDE_CODE_DIGITS] {
    for _ in 0..MAX_CODE_ATTEMPTS {
      let code = generate_code(rng, digits);
      if !is_taken(&code) {
        return Ok(code);
      }
    }
  }
  Err(Error::CodeSpaceExhausted { attempts: 2 * MAX_CODE_ATTEMPTS })
}

/// The QR payload for `code`.
pub fn activation_url(origin: &str, code: &str) -> String {
  format!("{}/activate?code={code}", origin.trim_end_matches('/'))
}

/// Extract an activation code from a typed code or a scanned activation link.
pub fn parse_activation_payload(payload: &str) -> Option<String> {
  let payload = payload.trim();
  let candidate = match payload.split_once('?') {
    Some((_, query)) => query
      .split('&')
      .find_map(|pair| pair.strip_prefix("code="))?,
    None => payload,
  };
  is_code(candidate).then(|| candidate.to_owned())
}

fn is_code(s: &str) -> bool {
  (s.len() == CODE_DIGITS as usize || s.len() == WIDE_CODE_DIGITS as usize)
    && s.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
  use std::collections::HashSet;

  use rand_core::{Error as RandError, OsRng};

  use super::*;

  /// Replays a fixed list of values, then repeats the last one.
  struct Scripted(Vec<u64>);

  impl RngCore for Scripted {
    fn next_u32(&mut self) -> u32 { self.next_u64() as u32 }

    fn next_u64(&mut self) -> u64 {
      if self.0.len() > 1 { self.0.remove(0) } else { self.0[0] }
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) { rand_core::impls::fill_bytes_via_next(self, dest) }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), RandError> {
      self.fill_bytes(dest);
      Ok(())
    }
  }

  #[test]
  fn codes_are_zero_padded() {
    let mut rng = Scripted(vec![42]);
    assert_eq!(generate_code(&mut rng, CODE_DIGITS), "000042");
  }

  #[test]
  fn os_rng_codes_are_six_digits() {
    for _ in 0..100 {
      let code = generate_code(&mut OsRng, CODE_DIGITS);
      assert_eq!(code.len(), 6);
      assert!(code.bytes().all(|b| b.is_ascii_digit()));
    }
  }

  #[test]
  fn allocation_retries_past_collisions() {
    let mut rng = Scripted(vec![483_920, 483_920, 111_111]);
    let taken: HashSet<&str> = ["483920"].into();
    let code = allocate_code(&mut rng, |c| taken.contains(c)).unwrap();
    assert_eq!(code, "111111");
  }

  #[test]
  fn allocation_widens_when_six_digits_saturate() {
    let mut rng = Scripted(vec![7]);
    let code = allocate_code(&mut rng, |c| c.len() == 6).unwrap();
    assert_eq!(code, "00000007");
  }

  #[test]
  fn allocation_gives_up_eventually() {
    let err = allocate_code(&mut OsRng, |_| true).unwrap_err();
    assert!(matches!(err, Error::CodeSpaceExhausted { attempts: 128 }));
  }

  #[test]
  fn url_round_trips_through_parser() {
    let url = activation_url("https://scootscoot.app/", "483920");
    assert_eq!(url, "https://scootscoot.app/activate?code=483920");
    assert_eq!(parse_activation_payload(&url).as_deref(), Some("483920"));
  }

  #[test]
  fn parser_accepts_bare_codes_and_rejects_junk() {
    assert_eq!(parse_activation_payload(" 012345 ").as_deref(), Some("012345"));
    assert_eq!(parse_activation_payload("/activate?lang=en&code=00000007").as_deref(), Some("00000007"));
    assert!(parse_activation_payload("12345").is_none());
    assert!(parse_activation_payload("12a456").is_none());
    assert!(parse_activation_payload("https://scootscoot.app/activate?ref=qr").is_none());
  }
}
