pub mod checkpoint_store;
pub mod ledger_submitter;

pub use checkpoint_store::CheckpointStore;
pub use ledger_submitter::LedgerSubmitter;
