use std::fs;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::host::{FileHandle, Host, SurfaceId, SurfaceKind};
use crate::keyboard::Platform;

#[derive(Debug, thiserror::Error)]
pub enum WorkspaceError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid workspace file: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Surface {
    pub id: SurfaceId,
    pub kind: SurfaceKind,
    #[serde(default)]
    pub pinned: bool,
    #[serde(default)]
    pub file: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct WorkspaceState {
    surfaces: Vec<Surface>,
    /// Least recent first.
    recent: Vec<SurfaceId>,
    next_id: u32,
}

impl Default for WorkspaceState {
    fn default() -> Self {
        let first = SurfaceId(1);
        Self {
            surfaces: vec![Surface {
                id: first,
                kind: SurfaceKind::Tab,
                pinned: false,
                file: None,
            }],
            recent: vec![first],
            next_id: 2,
        }
    }
}

/// Tabs, splits and windows over a notes folder, persisted between runs.
pub struct Workspace {
    vault_root: Option<PathBuf>,
    state: WorkspaceState,
    notices: Vec<String>,
    platform: Platform,
}

impl Workspace {
    pub fn new(vault_root: Option<PathBuf>) -> Self {
        Self {
            vault_root,
            state: WorkspaceState::default(),
            notices: Vec::new(),
            platform: Platform::current(),
        }
    }

    pub fn load(path: &Path, vault_root: Option<PathBuf>) -> Result<Self, WorkspaceError> {
        let mut workspace = Self::new(vault_root);
        match fs::read_to_string(path) {
            Ok(raw) => workspace.state = serde_json::from_str(&raw)?,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {}
            Err(error) => return Err(error.into()),
        }
        Ok(workspace)
    }

    pub fn save(&self, path: &Path) -> Result<(), WorkspaceError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(&self.state)?)?;
        Ok(())
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn surfaces(&self) -> &[Surface] {
        &self.state.surfaces
    }

    pub fn surface(&self, id: SurfaceId) -> Option<&Surface> {
        self.state.surfaces.iter().find(|surface| surface.id == id)
    }

    pub fn set_pinned(&mut self, id: SurfaceId, pinned: bool) -> bool {
        match self.state.surfaces.iter_mut().find(|surface| surface.id == id) {
            Some(surface) => {
                surface.pinned = pinned;
                true
            }
            None => false,
        }
    }

    pub fn take_notices(&mut self) -> Vec<String> {
        std::mem::take(&mut self.notices)
    }

    pub fn describe(&self) -> String {
        let current = self.most_recent_surface();
        self.state
            .surfaces
            .iter()
            .map(|surface| {
                let marker = if Some(surface.id) == current { "*" } else { " " };
                let pin = if surface.pinned { " [pinned]" } else { "" };
                let kind = match surface.kind {
                    SurfaceKind::Tab => "tab",
                    SurfaceKind::Split => "split",
                    SurfaceKind::Window => "window",
                };
                let file = surface.file.as_deref().unwrap_or("(empty)");
                format!("{marker} {} {kind}{pin}: {file}", surface.id)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn touch(&mut self, id: SurfaceId) {
        self.state.recent.retain(|recent| *recent != id);
        self.state.recent.push(id);
    }
}

impl Host for Workspace {
    fn lookup_file(&self, path: &str) -> Option<FileHandle> {
        let root = self.vault_root.as_ref()?;
        let relative = Path::new(path);
        let escapes = relative
            .components()
            .any(|component| !matches!(component, Component::Normal(_) | Component::CurDir));
        if escapes || !root.join(relative).is_file() {
            return None;
        }
        Some(FileHandle {
            path: path.to_string(),
        })
    }

    fn most_recent_surface(&self) -> Option<SurfaceId> {
        self.state.recent.last().copied()
    }

    fn is_pinned(&self, surface: SurfaceId) -> bool {
        self.surface(surface).map(|s| s.pinned).unwrap_or(false)
    }

    fn create_surface(&mut self, kind: SurfaceKind) -> Option<SurfaceId> {
        let id = SurfaceId(self.state.next_id);
        self.state.next_id = self.state.next_id.checked_add(1)?;
        self.state.surfaces.push(Surface {
            id,
            kind,
            pinned: false,
            file: None,
        });
        self.touch(id);
        Some(id)
    }

    fn display_file(&mut self, surface: SurfaceId, file: &FileHandle) {
        if let Some(target) = self.state.surfaces.iter_mut().find(|s| s.id == surface) {
            target.file = Some(file.path.clone());
            self.touch(surface);
        }
    }

    fn notify(&mut self, message: &str) {
        tracing::info!(target: "recentpick::workspace", "notice: {message}");
        self.notices.push(message.to_string());
    }

    fn platform(&self) -> Platform {
        self.platform
    }
}
