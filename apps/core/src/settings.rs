use crate::config::{self, Config};
use crate::keyboard::Platform;
use crate::placement::PlacementPreference;

pub const SUPPORTED_QUERY_FIELDS: [(&str, &str); 4] = [
    ("Name", "name of the file displayed in the list (mandatory)"),
    ("Path", "path of the file inside the notes folder (mandatory to open it)"),
    ("Tags", "list of tags (optional)"),
    ("Date", "date shown next to the name (optional)"),
];

/// Pending edits to the user-facing settings. `None` leaves a value as is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsDraft {
    pub modified_query: Option<String>,
    pub created_query: Option<String>,
    pub placement: Option<String>,
}

pub fn validate_placement(input: &str) -> Result<PlacementPreference, String> {
    PlacementPreference::parse(input).ok_or_else(|| {
        let options: Vec<&str> = PlacementPreference::ALL
            .iter()
            .map(|preference| preference.as_str())
            .collect();
        format!(
            "Invalid option '{}'. Choose one of: {}.",
            input.trim(),
            options.join(", ")
        )
    })
}

/// Returns an updated copy; the given config is never modified.
pub fn apply_draft(current: &Config, draft: &SettingsDraft) -> Result<Config, String> {
    let mut next = current.clone();
    if let Some(placement) = &draft.placement {
        next.placement = validate_placement(placement)?;
    }
    if let Some(query) = &draft.modified_query {
        next.modified_query = query.clone();
    }
    if let Some(query) = &draft.created_query {
        next.created_query = query.clone();
    }
    config::fill_empty_queries(&mut next);
    config::validate(&next)?;
    Ok(next)
}

pub fn placement_setting_label(platform: Platform) -> (String, String) {
    let key = platform.modifier_label();
    (
        format!("Behavior of modifier {key} key:"),
        format!("Choose how notes should be opened when the modifier {key} key is pressed."),
    )
}
