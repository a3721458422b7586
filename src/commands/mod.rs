pub mod deinit;
pub mod filters;
pub mod init;

pub use deinit::de_init;
pub use filters::{clean, smudge, textconv};
pub use init::init;
