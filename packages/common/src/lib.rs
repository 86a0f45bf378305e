//! Building blocks shared by the LIBRAS validator services.

pub mod storage;
