//! Streaming command protocol.
//!
//! A [`StreamWriter`] turns a session's output into tagged commands and
//! writes them in buffered batches; a [`StreamReader`] decodes those
//! batches back into [`Event`]s. The tags are:
//!
//! | Tag | Command        | Arguments                        |
//! |-----|----------------|----------------------------------|
//! | `l` | lexicon reset  | id-to-value table                |
//! | `m` | metadata       | plugin and tool identification   |
//! | `s` | section        | encoded attributes with `name`   |
//! | `f` | free text      | encoded format string and args   |
//! | `t` | table header   | `{"columns": [...]}`             |
//! | `r` | table row      | encoded cells                    |
//! | `p` | progress       | message, args, keyword args      |
//! | `e` | error          | message                          |

mod command;
mod reader;
mod sink;
mod writer;

pub use self::command::{ColumnSpec, Command};
pub use self::reader::{Event, StreamReader};
pub use self::sink::{IoSink, Sink};
pub use self::writer::{SessionState, StreamWriter};
