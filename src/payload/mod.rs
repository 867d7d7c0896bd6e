//! Query payload normalization
//!
//! Turns the untyped JSON written by the query editor into a strongly
//! typed [`QueryPayload`]:
//!
//! - **Types**: invocation envelope, time window, output format
//! - **Normalize**: decoding plus defaults for every omitted option
//! - **Time format**: `yyyy-MM-dd HH:mm:ss` tokens to strftime
//!
//! # Defaults
//!
//! | option       | default               |
//! |--------------|-----------------------|
//! | `format`     | `Table`               |
//! | `timeField`  | `time`                |
//! | `timezone`   | `Asia/Shanghai`       |
//! | `timeFormat` | `%Y-%m-%d %H:%M:%S`   |

mod error;
mod normalize;
mod time_format;
mod types;

pub use error::{PayloadError, PayloadResult};
pub use normalize::{normalize, normalize_bytes};
pub use time_format::{translate_time_format, DEFAULT_TIME_FORMAT};
pub use types::{
    FrameFormat, QueryInvocation, QueryPayload, TimeWindow, DEFAULT_TIMEZONE, DEFAULT_TIME_FIELD,
    TIME_SERIES_QUERY_TYPE,
};
