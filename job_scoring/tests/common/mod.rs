#![allow(dead_code)]

mod fixtures;
pub use fixtures::*;

pub use job_scoring::{EditorError, EditorState, FileHandle, JobEditor, Mode};
