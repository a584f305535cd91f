pub mod csr_file;
pub mod ioctl;

pub use csr_file::CsrFile;
