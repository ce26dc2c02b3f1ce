//! GSTIN structural and checksum validation.

use std::fmt;

/// Length of every GSTIN.
pub const GSTIN_LEN: usize = 15;

const CHECK_CHARSET: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Error returned when a GSTIN fails format validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GstinFormatError {
    /// The invalid input value.
    pub value: String,
    /// Why the value failed validation.
    pub reason: String,
}

impl fmt::Display for GstinFormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid GSTIN '{}': {}", self.value, self.reason)
    }
}

impl std::error::Error for GstinFormatError {}

/// The components of a structurally valid GSTIN.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GstinParts<'a> {
    /// Two-digit state code (e.g. "27" for Maharashtra).
    pub state_code: &'a str,
    /// Embedded 10-character PAN of the registered person.
    pub pan: &'a str,
    /// Registration number within the state for the same PAN.
    pub entity_code: char,
    /// Mod-36 check character.
    pub check_char: char,
}

fn is_state_code(code: &str) -> bool {
    matches!(code.parse::<u8>(), Ok(1..=38 | 97 | 99))
}

/// Validate a GSTIN by structure (no registry call).
///
/// Layout: 2-digit state code, 5 letters, 4 digits, 1 letter (the PAN),
/// entity code `1-9A-Z`, the literal `Z`, and an alphanumeric check
/// character. Only uppercase is accepted. Surrounding whitespace is trimmed.
pub fn validate_gstin_format(gstin: &str) -> Result<GstinParts<'_>, GstinFormatError> {
    let gstin = gstin.trim();
    let fail = |reason: String| GstinFormatError {
        value: gstin.into(),
        reason,
    };

    if !gstin.is_ascii() {
        return Err(fail("must contain only ASCII characters".into()));
    }
    if gstin.len() != GSTIN_LEN {
        return Err(fail(format!(
            "expected {GSTIN_LEN} characters, got {}",
            gstin.len()
        )));
    }

    type SegmentValidator = fn(&[u8]) -> bool;
    let layout: &[(std::ops::Range<usize>, &str, SegmentValidator)] = &[
        (0..2, "state code must be 2 digits", |s| {
            s.iter().all(u8::is_ascii_digit)
        }),
        (2..7, "PAN must start with 5 uppercase letters", |s| {
            s.iter().all(u8::is_ascii_uppercase)
        }),
        (7..11, "PAN must have 4 digits at positions 8-11", |s| {
            s.iter().all(u8::is_ascii_digit)
        }),
        (11..12, "PAN must end with an uppercase letter", |s| {
            s[0].is_ascii_uppercase()
        }),
        (12..13, "entity code must be 1-9 or A-Z", |s| {
            matches!(s[0], b'1'..=b'9' | b'A'..=b'Z')
        }),
        (13..14, "14th character must be 'Z'", |s| s[0] == b'Z'),
        (14..15, "check character must be a digit or uppercase letter", |s| {
            s[0].is_ascii_digit() || s[0].is_ascii_uppercase()
        }),
    ];

    let bytes = gstin.as_bytes();
    for (range, reason, validator) in layout {
        if !validator(&bytes[range.clone()]) {
            return Err(fail((*reason).into()));
        }
    }

    if !is_state_code(&gstin[..2]) {
        return Err(fail(format!("unknown state code '{}'", &gstin[..2])));
    }

    Ok(GstinParts {
        state_code: &gstin[..2],
        pan: &gstin[2..12],
        entity_code: bytes[12] as char,
        check_char: bytes[14] as char,
    })
}

/// Compute the mod-36 check character over the first 14 characters.
///
/// Returns `None` if fewer than 14 characters are given or any of them is
/// outside `0-9A-Z`.
pub fn gstin_check_char(gstin: &str) -> Option<char> {
    let bytes = gstin.trim().as_bytes();
    if bytes.len() < GSTIN_LEN - 1 {
        return None;
    }

    let mut sum = 0u32;
    for (i, b) in bytes[..GSTIN_LEN - 1].iter().enumerate() {
        let value = CHECK_CHARSET.iter().position(|c| c == b)? as u32;
        let factor = if i % 2 == 0 { 1 } else { 2 };
        let product = value * factor;
        sum += product / 36 + product % 36;
    }
    let check = (36 - sum % 36) % 36;
    Some(CHECK_CHARSET[check as usize] as char)
}

/// Validate structure and the check character.
pub fn validate_gstin_checksum(gstin: &str) -> Result<GstinParts<'_>, GstinFormatError> {
    let parts = validate_gstin_format(gstin)?;
    let expected = gstin_check_char(gstin);
    if expected != Some(parts.check_char) {
        return Err(GstinFormatError {
            value: gstin.trim().into(),
            reason: format!(
                "check character '{}' does not match expected '{}'",
                parts.check_char,
                expected.unwrap_or('?')
            ),
        });
    }
    Ok(parts)
}
