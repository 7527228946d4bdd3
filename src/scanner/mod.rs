mod classify;
mod comments;
mod reconstruct;
mod scan;
mod types;

pub use classify::{split_literals, ArgumentParts, Classifier};
pub use comments::{classify_line, comment_states, is_comment, strip_marker};
pub use reconstruct::{call_target_before, char_literal_len, reconstruct, Reconstructor};
pub use scan::{scan_and_dispatch, scan_disabled, scan_lines, scan_source};
pub use types::{Classification, CommentState, Reason, SourceLine, Statement};
