pub mod tokens;

pub use tokens::{bearer_token, generate_token, hash_token, TOKEN_PREFIX};
