pub mod pool_type;

pub use pool_type::PoolTypeArgs;
