pub mod jsonl;

pub use jsonl::write_jsonl;
