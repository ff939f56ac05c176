//! Common types used across datferry

pub mod transfer;

pub use transfer::{
    load_transfer_jobs, ClusterRootPaths, ScopeDataSet, TransferJob, TransferTask,
};
