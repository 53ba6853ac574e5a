//! The two named actions and the flow behind them: check the engine, await
//! the query, normalize, then open a picker whose selection is placed in
//! the host.

use crate::config::Config;
use crate::host::Host;
use crate::keyboard::{KeyEvent, KeyboardHub};
use crate::normalizer;
use crate::overlay_state::CloseReason;
use crate::picker::{FuzzyPicker, PickerOutcome};
use crate::placement::{PlacementOutcome, SurfacePlacementPolicy};
use crate::query_engine::QueryEngine;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecentCategory {
    Modified,
    Created,
}

impl RecentCategory {
    pub const ALL: [Self; 2] = [Self::Modified, Self::Created];

    pub fn command_id(&self) -> &'static str {
        match self {
            Self::Modified => "show-recently-modified-files",
            Self::Created => "show-recently-created-files",
        }
    }

    pub fn command_name(&self) -> &'static str {
        match self {
            Self::Modified => "Show recently modified files",
            Self::Created => "Show recently created files",
        }
    }

    pub fn hint(&self) -> &'static str {
        match self {
            Self::Modified => "modified",
            Self::Created => "created",
        }
    }

    pub fn query_text<'a>(&self, config: &'a Config) -> &'a str {
        match self {
            Self::Modified => &config.modified_query,
            Self::Created => &config.created_query,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|category| value == category.hint() || value == category.command_id())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    Open,
    Opened(PlacementOutcome),
    Dismissed,
    Closed,
}

/// An open picker plus the policy that places its selection.
pub struct PickerSession {
    picker: FuzzyPicker,
    policy: SurfacePlacementPolicy,
}

impl PickerSession {
    pub fn picker(&self) -> &FuzzyPicker {
        &self.picker
    }

    pub fn picker_mut(&mut self) -> &mut FuzzyPicker {
        &mut self.picker
    }

    pub fn handle_key(&mut self, host: &mut dyn Host, event: &KeyEvent) -> SessionStatus {
        match self.picker.handle_key(event) {
            PickerOutcome::Pending => SessionStatus::Open,
            PickerOutcome::Selected(selection) => SessionStatus::Opened(self.policy.place(
                host,
                &selection.record.path,
                selection.modifier_held,
            )),
            PickerOutcome::Dismissed => SessionStatus::Dismissed,
            PickerOutcome::Closed => SessionStatus::Closed,
        }
    }

    /// Closes the picker when its surrounding context goes away.
    pub fn abort(&mut self) {
        self.picker.close(CloseReason::ContextLost);
    }
}

/// Runs `category`'s query and opens a picker over the result.
///
/// Returns `None` only when the engine is unavailable; the user has been
/// notified. Query failures still open a picker, empty.
pub async fn show_recent_files<E>(
    engine: &E,
    host: &mut dyn Host,
    keyboard: &KeyboardHub,
    config: &Config,
    category: RecentCategory,
) -> Option<PickerSession>
where
    E: QueryEngine + ?Sized,
{
    if let Err(error) = engine.check_available() {
        tracing::warn!(target: "recentpick::commands", "{error}");
        host.notify(&error.to_string());
        return None;
    }

    let outcome = match engine.query(category.query_text(config)).await {
        Ok(outcome) => outcome,
        Err(error) => {
            tracing::error!(
                target: "recentpick::commands",
                command = category.command_id(),
                "failed to execute query: {error}"
            );
            Err(error.to_string())
        }
    };
    let records = normalizer::normalize(outcome);
    tracing::info!(
        target: "recentpick::commands",
        command = category.command_id(),
        candidates = records.len(),
        "opening picker"
    );

    let purpose = format!("to open {}", config.placement.description().to_lowercase());
    let mut picker = FuzzyPicker::new(records, category.hint(), host.platform(), keyboard.clone())
        .with_modifier_purpose(&purpose);
    picker.open();

    Some(PickerSession {
        picker,
        policy: SurfacePlacementPolicy::new(config.placement),
    })
}
