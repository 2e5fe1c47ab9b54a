pub mod codes;

pub use codes::{RefusalBody, RefusalCode, RefusalEnvelope, build_envelope};
