//! Append-only JSONL activity log, one file per local day.

pub mod jsonl;
