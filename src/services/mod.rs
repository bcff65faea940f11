pub mod assembler;
pub mod ethereum;
pub mod fetcher;
pub mod ledger;
pub mod memory;
pub mod submitter;

pub use assembler::{UsernameDirectory, ViewAssembler};
pub use ethereum::EthereumLedger;
pub use fetcher::RecordFetcher;
pub use ledger::{ChainContext, TaxiLedger, TxStatus};
pub use memory::InMemoryLedger;
pub use submitter::MutationSubmitter;
