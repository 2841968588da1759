//! Brazilian CPF numbers.

use core::fmt;

use serde::Serialize;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CpfError {
    /// After stripping punctuation the input is not exactly 11 digits.
    #[error("cpf must have 11 digits")]
    Length,
    #[error("cpf cannot be a repeated digit sequence")]
    Repeated,
    #[error("cpf check digits do not match")]
    CheckDigits,
}

/// A CPF that passed the modulo-11 check, stored as its 11 bare digits.
///
/// Formatting characters (`.`, `-`, spaces) are accepted on input and
/// dropped, so `529.982.247-25` and `52998224725` parse to the same value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Cpf(String);

impl Cpf {
    pub fn parse(raw: &str) -> Result<Self, CpfError> {
        let digits: Vec<u8> = raw
            .chars()
            .filter(|c| !matches!(c, '.' | '-' | ' '))
            .map(|c| c.to_digit(10).map(|d| d as u8).ok_or(CpfError::Length))
            .collect::<Result<_, _>>()?;

        let digits: [u8; 11] = digits.try_into().map_err(|_| CpfError::Length)?;

        if digits.iter().all(|d| *d == digits[0]) {
            return Err(CpfError::Repeated);
        }

        let mut base = [0u8; 9];
        base.copy_from_slice(&digits[..9]);
        if check_digits(&base) != (digits[9], digits[10]) {
            return Err(CpfError::CheckDigits);
        }

        Ok(Self(digits.iter().map(|d| char::from(b'0' + d)).collect()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Computes both verification digits for the first nine digits of a CPF.
pub fn check_digits(base: &[u8; 9]) -> (u8, u8) {
    let first = mod11_digit(base.iter().copied(), 10);
    let second = mod11_digit(base.iter().copied().chain(std::iter::once(first)), 11);
    (first, second)
}

fn mod11_digit(digits: impl Iterator<Item = u8>, top_weight: u32) -> u8 {
    let sum: u32 = digits
        .zip((2..=top_weight).rev())
        .map(|(d, w)| u32::from(d) * w)
        .sum();
    match sum % 11 {
        0 | 1 => 0,
        r => (11 - r) as u8,
    }
}

/// Builds a valid CPF from nine base digits.
pub fn complete(base: [u8; 9]) -> String {
    let (d1, d2) = check_digits(&base);
    base.iter()
        .chain([d1, d2].iter())
        .map(|d| char::from(b'0' + d))
        .collect()
}

impl fmt::Display for Cpf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Cpf {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
