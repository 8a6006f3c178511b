pub mod editor;
pub mod jobs;
