pub mod dir;
pub mod doctor;
pub mod ledger;
pub mod link;
pub mod store;
pub mod transfer;

pub use dir::DirMediaLink;
pub use ledger::CaptureLedger;
pub use link::{Chunk, MediaLink, MediaLinkError};
pub use store::{FsMediaStore, MediaStore, PersistError};
pub use transfer::{Progress, TransferError, TransferPipeline, TransferReport, TransferSession};
