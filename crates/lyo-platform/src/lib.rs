//! Browser adapters for the ports defined in `lyo-core`.

pub mod llm;
pub mod notify;
pub mod storage;
