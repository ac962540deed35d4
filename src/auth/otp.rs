use rand::Rng;

/// Number of digits in a password-reset code.
pub const RESET_CODE_LEN: usize = 6;

/// Generate a numeric one-time code of `len` digits.
pub fn generate_otp(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len).map(|_| char::from(b'0' + rng.gen_range(0..10u8))).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_has_requested_length() {
        assert_eq!(generate_otp(RESET_CODE_LEN).len(), RESET_CODE_LEN);
        assert_eq!(generate_otp(4).len(), 4);
    }

    #[test]
    fn code_is_all_digits() {
        let code = generate_otp(32);
        assert!(code.chars().all(|c| c.is_ascii_digit()));
    }
}
