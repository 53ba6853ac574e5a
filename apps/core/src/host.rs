use serde::{Deserialize, Serialize};

use crate::keyboard::Platform;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SurfaceId(pub u32);

impl std::fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceKind {
    Tab,
    Split,
    Window,
}

/// A file the host has resolved and can display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHandle {
    pub path: String,
}

/// The application the picker opens files in.
pub trait Host {
    fn lookup_file(&self, path: &str) -> Option<FileHandle>;
    fn most_recent_surface(&self) -> Option<SurfaceId>;
    fn is_pinned(&self, surface: SurfaceId) -> bool;
    fn create_surface(&mut self, kind: SurfaceKind) -> Option<SurfaceId>;
    fn display_file(&mut self, surface: SurfaceId, file: &FileHandle);
    fn notify(&mut self, message: &str);
    fn platform(&self) -> Platform;
}
