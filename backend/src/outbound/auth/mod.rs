//! Bearer-credential adapters: HS256 verification and the Redis-backed
//! revocation list written by the identity service at logout.

mod jwt_verifier;
mod redis_revocation_list;

pub use jwt_verifier::JwtAccessTokenVerifier;
pub use redis_revocation_list::{RedisRevocationList, RedisRevocationListConfig, revocation_key};
