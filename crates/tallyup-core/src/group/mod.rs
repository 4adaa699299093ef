//! Group domain module.
//!
//! - `model`: the `Group` entity and join-code helpers
//! - `repository`: persistence trait

mod model;
pub mod repository;

pub use model::{
    Group, GroupId, JOIN_CODE_ALPHABET, JOIN_CODE_LEN, MemberId, generate_join_code,
    is_valid_join_code, normalize_join_code,
};
pub use repository::GroupRepository;
