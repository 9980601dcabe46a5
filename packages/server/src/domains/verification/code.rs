use rand::Rng;

use super::OtpError;

pub const DEFAULT_CODE_LENGTH: u32 = 6;

/// Longest code whose range `[10^(n-1), 10^n - 1]` fits in a `u64`
pub const MAX_CODE_LENGTH: u32 = 19;

/// Generate a numeric code of exactly `length` digits.
///
/// The value is drawn uniformly from `[10^(length-1), 10^length - 1]`, so the
/// first digit is never zero.
pub fn generate_code(length: u32) -> Result<String, OtpError> {
    if !(1..=MAX_CODE_LENGTH).contains(&length) {
        return Err(OtpError::InvalidCodeLength(length));
    }

    let low = 10u64.pow(length - 1);
    let high = 10u64.pow(length) - 1;
    let value = rand::thread_rng().gen_range(low..=high);
    Ok(value.to_string())
}
