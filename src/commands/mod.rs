pub mod score;
pub mod shard;
