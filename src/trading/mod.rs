pub mod transaction_builder;

pub use transaction_builder::{
    FnSubmitter, NoopSubmitter, TransactionPayload, TransactionSubmitter, deadline_from_now,
};
