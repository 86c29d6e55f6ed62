use rand::Rng;

const ID_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
pub const MEETING_ID_LEN: usize = 6;

/// Short share code for a meeting. Not cryptographically strong; codes are obscurity only.
pub fn generate_meeting_id() -> String {
    let mut rng = rand::thread_rng();
    let id: String = (0..MEETING_ID_LEN)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect();
    debug_assert!(is_meeting_id(&id));
    id
}

pub fn is_meeting_id(candidate: &str) -> bool {
    candidate.len() == MEETING_ID_LEN
        && candidate.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_have_share_code_shape() {
        for _ in 0..500 {
            let id = generate_meeting_id();
            assert!(is_meeting_id(&id), "bad id {id}");
        }
    }

    #[test]
    fn shape_check() {
        assert!(is_meeting_id("ab12cd"));
        assert!(!is_meeting_id("AB12CD"));
        assert!(!is_meeting_id("ab12c"));
        assert!(!is_meeting_id("ab12cd7"));
        assert!(!is_meeting_id("ab-2cd"));
    }
}
