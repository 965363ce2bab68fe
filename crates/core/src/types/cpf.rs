//! Brazilian individual taxpayer number (CPF).

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Cpf`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CpfError {
    /// The input contains characters other than digits, dots, dashes and spaces.
    #[error("CPF may only contain digits")]
    InvalidCharacter,
    /// The input does not have exactly 11 digits.
    #[error("CPF must have 11 digits, got {0}")]
    WrongLength(usize),
    /// All digits are the same (e.g. `111.111.111-11`).
    #[error("CPF cannot be a repeated digit sequence")]
    RepeatedDigits,
    /// One of the two check digits does not match.
    #[error("CPF check digits do not match")]
    InvalidCheckDigits,
}

/// A validated CPF, stored as its 11 bare digits.
///
/// ## Examples
///
/// ```
/// use open_bar_core::Cpf;
///
/// let cpf = Cpf::parse("529.982.247-25").unwrap();
/// assert_eq!(cpf.as_str(), "52998224725");
/// assert_eq!(cpf.formatted(), "529.982.247-25");
///
/// assert!(Cpf::parse("529.982.247-24").is_err());
/// assert!(Cpf::parse("000.000.000-00").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct Cpf(String);

impl Cpf {
    /// Number of digits in a CPF.
    pub const DIGITS: usize = 11;

    /// Parse a CPF, accepting either bare digits or the `XXX.XXX.XXX-XX` mask.
    ///
    /// # Errors
    ///
    /// Returns a [`CpfError`] when the input is malformed or the check digits
    /// are wrong.
    pub fn parse(s: &str) -> Result<Self, CpfError> {
        let mut digits = Vec::with_capacity(Self::DIGITS);
        for c in s.trim().chars() {
            match c {
                '0'..='9' => digits.push(c as u32 - '0' as u32),
                '.' | '-' | ' ' => {}
                _ => return Err(CpfError::InvalidCharacter),
            }
        }

        let [first, rest @ ..] = digits.as_slice() else {
            return Err(CpfError::WrongLength(0));
        };
        if digits.len() != Self::DIGITS {
            return Err(CpfError::WrongLength(digits.len()));
        }
        if rest.iter().all(|d| d == first) {
            return Err(CpfError::RepeatedDigits);
        }

        let (body, checks) = digits.split_at(9);
        let d1 = check_digit(body);
        let mut extended = body.to_vec();
        extended.push(d1);
        let d2 = check_digit(&extended);
        if checks != [d1, d2] {
            return Err(CpfError::InvalidCheckDigits);
        }

        Ok(Self(
            digits
                .iter()
                .filter_map(|d| char::from_digit(*d, 10))
                .collect(),
        ))
    }

    /// The 11 bare digits.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Render with the usual `XXX.XXX.XXX-XX` mask.
    #[must_use]
    pub fn formatted(&self) -> String {
        let s = &self.0;
        match (s.get(0..3), s.get(3..6), s.get(6..9), s.get(9..11)) {
            (Some(a), Some(b), Some(c), Some(d)) => format!("{a}.{b}.{c}-{d}"),
            _ => s.clone(),
        }
    }
}

/// Mod-11 check digit over `digits`, weighted from `len + 1` down to 2.
fn check_digit(digits: &[u32]) -> u32 {
    let weight_start = u32::try_from(digits.len()).unwrap_or(0) + 1;
    let sum: u32 = digits
        .iter()
        .zip((2..=weight_start).rev())
        .map(|(d, w)| d * w)
        .sum();
    let rest = sum % 11;
    if rest < 2 { 0 } else { 11 - rest }
}

impl fmt::Display for Cpf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.formatted())
    }
}

impl std::str::FromStr for Cpf {
    type Err = CpfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Cpf {
    type Error = CpfError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Cpf> for String {
    fn from(cpf: Cpf) -> Self {
        cpf.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_masked_and_bare() {
        let masked = Cpf::parse("111.444.777-35").unwrap();
        let bare = Cpf::parse("11144477735").unwrap();
        assert_eq!(masked, bare);
        assert_eq!(bare.formatted(), "111.444.777-35");
    }

    #[test]
    fn test_check_digit_zero_branch() {
        // First check digit falls in the `rest < 2` branch.
        assert!(Cpf::parse("123.456.789-09").is_ok());
    }

    #[test]
    fn test_rejects_bad_input() {
        assert_eq!(Cpf::parse(""), Err(CpfError::WrongLength(0)));
        assert_eq!(Cpf::parse("1234567890"), Err(CpfError::WrongLength(10)));
        assert_eq!(Cpf::parse("111.111.111-11"), Err(CpfError::RepeatedDigits));
        assert_eq!(
            Cpf::parse("111.444.777-36"),
            Err(CpfError::InvalidCheckDigits)
        );
        assert_eq!(Cpf::parse("111.444.777/35"), Err(CpfError::InvalidCharacter));
    }

    #[test]
    fn test_serde_stores_digits() {
        let cpf: Cpf = serde_json::from_str("\"529.982.247-25\"").unwrap();
        assert_eq!(serde_json::to_string(&cpf).unwrap(), "\"52998224725\"");
    }
}
