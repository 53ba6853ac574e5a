use serde::{Deserialize, Serialize};

use crate::host::{Host, SurfaceId, SurfaceKind};

/// Where a file goes when a new surface is required.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementPreference {
    #[default]
    Tab,
    Split,
    Window,
}

impl PlacementPreference {
    pub const ALL: [Self; 3] = [Self::Tab, Self::Split, Self::Window];

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "tab" => Some(Self::Tab),
            "split" => Some(Self::Split),
            "window" => Some(Self::Window),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tab => "tab",
            Self::Split => "split",
            Self::Window => "window",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Tab => "In a new tab",
            Self::Split => "In a split pane",
            Self::Window => "In a new window",
        }
    }

    pub fn surface_kind(&self) -> SurfaceKind {
        match self {
            Self::Tab => SurfaceKind::Tab,
            Self::Split => SurfaceKind::Split,
            Self::Window => SurfaceKind::Window,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlacementError {
    #[error("file not found: {0}")]
    FileNotFound(String),
    #[error("no surface available to open {0}")]
    NoSurface(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlacementOutcome {
    Reused(SurfaceId),
    Created(SurfaceId),
    Failed(PlacementError),
}

#[derive(Debug, Clone, Copy)]
pub struct SurfacePlacementPolicy {
    preference: PlacementPreference,
}

impl SurfacePlacementPolicy {
    pub fn new(preference: PlacementPreference) -> Self {
        Self { preference }
    }

    pub fn preference(&self) -> PlacementPreference {
        self.preference
    }

    /// Opens `path` in the host. Failures are reported here and never escape.
    pub fn place(&self, host: &mut dyn Host, path: &str, force_new_surface: bool) -> PlacementOutcome {
        match self.try_place(host, path, force_new_surface) {
            Ok(outcome) => outcome,
            Err(error) => {
                if let PlacementError::FileNotFound(_) = error {
                    host.notify("File not found.");
                }
                tracing::error!(target: "recentpick::placement", "{error}");
                PlacementOutcome::Failed(error)
            }
        }
    }

    fn try_place(
        &self,
        host: &mut dyn Host,
        path: &str,
        force_new_surface: bool,
    ) -> Result<PlacementOutcome, PlacementError> {
        let file = host
            .lookup_file(path)
            .ok_or_else(|| PlacementError::FileNotFound(path.to_string()))?;

        let current = host.most_recent_surface();
        let needs_new = force_new_surface || current.is_some_and(|surface| host.is_pinned(surface));

        let surface = if needs_new {
            host.create_surface(self.preference.surface_kind())
        } else {
            current
        }
        .ok_or_else(|| PlacementError::NoSurface(path.to_string()))?;

        host.display_file(surface, &file);
        tracing::info!(
            target: "recentpick::placement",
            path,
            surface = %surface,
            created = needs_new,
            "file displayed"
        );
        Ok(if needs_new {
            PlacementOutcome::Created(surface)
        } else {
            PlacementOutcome::Reused(surface)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::PlacementPreference;
    use crate::host::SurfaceKind;

    #[test]
    fn parses_known_preferences_only() {
        assert_eq!(PlacementPreference::parse(" Split "), Some(PlacementPreference::Split));
        assert_eq!(PlacementPreference::parse("window"), Some(PlacementPreference::Window));
        assert_eq!(PlacementPreference::parse("popup"), None);
    }

    #[test]
    fn every_preference_maps_to_its_surface_kind() {
        let kinds: Vec<SurfaceKind> = PlacementPreference::ALL
            .iter()
            .map(|preference| preference.surface_kind())
            .collect();
        assert_eq!(kinds, vec![SurfaceKind::Tab, SurfaceKind::Split, SurfaceKind::Window]);
    }

    #[test]
    fn preference_round_trips_through_its_name() {
        for preference in PlacementPreference::ALL {
            assert_eq!(PlacementPreference::parse(preference.as_str()), Some(preference));
        }
    }
}
