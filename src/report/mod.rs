//! Daily report: aggregation of a day's log, Slack mrkdwn rendering and
//! webhook delivery.

pub mod aggregate;
pub mod format;
pub mod webhook;
