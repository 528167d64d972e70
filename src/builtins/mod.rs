//! Built-in utilities. Each is a small [`Program`] over the stream and
//! service contracts; filters decompose payloads with `items()` rather
//! than splitting bytes.

mod file;
mod filter;
mod http;
mod proc;
mod timer;

use crate::editor::Editor;
use crate::kernel::Program;

pub use filter::{Grep, Head, Tail};

/// Look up a built-in by command name.
pub fn build(name: &str) -> Option<Box<dyn Program>> {
    match name {
        "cat" => Some(Box::new(file::Cat::default())),
        "ls" => Some(Box::new(file::Ls::default())),
        "mv" => Some(Box::new(file::Mv::default())),
        "rm" => Some(Box::new(file::Rm::default())),
        "tee" => Some(Box::new(file::Tee::default())),
        "head" => Some(Box::new(Head::default())),
        "tail" => Some(Box::new(Tail::default())),
        "grep" => Some(Box::new(Grep::default())),
        "curl" => Some(Box::new(http::Curl::default())),
        "sleep" => Some(Box::new(timer::Sleep::default())),
        "clear" => Some(Box::new(proc::Clear)),
        "ps" => Some(Box::new(proc::Ps)),
        "vi" => Some(Box::new(Editor::default())),
        _ => None,
    }
}
