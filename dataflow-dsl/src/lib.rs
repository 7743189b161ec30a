//! Parser for the stream and task definition languages.
//!
//! Both languages are single-line expressions:
//!
//! - streams chain apps with `|`, optionally reading from or writing to a
//!   named destination (`:orders > filter | log`, `http | transform > :out`);
//! - tasks chain apps with `&&` and run branches in parallel inside a split
//!   (`<a || b> && c`).
//!
//! Every node carries a [`Span`] of character offsets into the text that was
//! parsed, so callers can map nodes back onto editor positions.

mod app;
mod cursor;
mod error;
mod model;
mod stream;
mod task;

pub use error::Error;
pub use model::{AppNode, ArgumentNode, DestinationNode, NameNode, Span, StreamNode, TaskNode};
pub use stream::parse_stream;
pub use task::parse_task;
