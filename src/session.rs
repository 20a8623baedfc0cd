use rand::Rng;

pub const SESSION_ID_LEN: usize = 33;
pub const MAX_SEED_PREFIX: usize = 20;

const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Generate a session id, optionally prefixed with a user identifier.
pub fn generate_session_id(seed: Option<&str>) -> String {
    generate_session_id_with(&mut rand::thread_rng(), seed)
}

/// Same as [`generate_session_id`] with a caller-supplied random source.
///
/// The seed keeps only its ASCII alphanumeric characters so the id stays
/// inside `[A-Za-z0-9]`, then is cut to [`MAX_SEED_PREFIX`] characters.
pub fn generate_session_id_with<R: Rng + ?Sized>(rng: &mut R, seed: Option<&str>) -> String {
    let prefix: String = seed
        .unwrap_or_default()
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .take(MAX_SEED_PREFIX)
        .collect();

    let mut id = String::with_capacity(SESSION_ID_LEN);
    id.push_str(&prefix);
    while id.len() < SESSION_ID_LEN {
        let idx = rng.gen_range(0..ALPHABET.len());
        id.push(ALPHABET[idx] as char);
    }
    id
}
