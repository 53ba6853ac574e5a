use std::io::Write;

use crossterm::event::{
    DisableFocusChange, EnableFocusChange, KeyCode, KeyEvent as TermKeyEvent, KeyEventKind,
    KeyModifiers, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
    PushKeyboardEnhancementFlags,
};
use crossterm::style::{Attribute, Print, SetAttribute};
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, queue};

use crate::keyboard::{Key, KeyEvent, Modifiers, Platform};
use crate::picker::FuzzyPicker;
use crate::search;

/// Raw mode, alternate screen, focus reporting and, where the terminal
/// supports it, disambiguated key codes so Cmd reaches us. Restored on drop.
pub struct TerminalGuard {
    enhanced: bool,
}

impl TerminalGuard {
    pub fn enter() -> std::io::Result<Self> {
        terminal::enable_raw_mode()?;
        let enhanced = terminal::supports_keyboard_enhancement().unwrap_or(false);
        let mut out = std::io::stdout();
        if let Err(error) = begin(&mut out, enhanced).and_then(|_| out.flush()) {
            let _ = finish(&mut out, enhanced);
            let _ = out.flush();
            let _ = terminal::disable_raw_mode();
            return Err(error);
        }
        Ok(Self { enhanced })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let mut out = std::io::stdout();
        let _ = finish(&mut out, self.enhanced);
        let _ = out.flush();
        let _ = terminal::disable_raw_mode();
    }
}

fn begin(out: &mut impl Write, enhanced: bool) -> std::io::Result<()> {
    queue!(out, EnterAlternateScreen, cursor::Hide, EnableFocusChange)?;
    if enhanced {
        queue!(
            out,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES)
        )?;
    }
    Ok(())
}

fn finish(out: &mut impl Write, enhanced: bool) -> std::io::Result<()> {
    if enhanced {
        queue!(out, PopKeyboardEnhancementFlags)?;
    }
    queue!(out, DisableFocusChange, cursor::Show, LeaveAlternateScreen)
}

/// Translates a terminal key press for the picker running on `platform`.
///
/// Terminals without enhanced key reporting never deliver Cmd, so on a Mac
/// Ctrl+Enter (and Ctrl+J, which most terminals send for it) stands in for
/// the platform modifier.
pub fn to_key_event(event: TermKeyEvent, platform: Platform) -> Option<KeyEvent> {
    if event.kind == KeyEventKind::Release {
        return None;
    }

    let mut modifiers = Modifiers {
        ctrl: event.modifiers.contains(KeyModifiers::CONTROL),
        alt: event.modifiers.contains(KeyModifiers::ALT),
        shift: event.modifiers.contains(KeyModifiers::SHIFT),
        meta: event
            .modifiers
            .intersects(KeyModifiers::SUPER | KeyModifiers::META),
    };

    let key = match event.code {
        KeyCode::Enter => Key::Enter,
        KeyCode::Esc => Key::Escape,
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Char('j') if modifiers.ctrl => Key::Enter,
        KeyCode::Char('c') if modifiers.ctrl => {
            return Some(KeyEvent::plain(Key::Escape));
        }
        KeyCode::Char('n') if modifiers.ctrl => return Some(KeyEvent::plain(Key::Down)),
        KeyCode::Char('p') if modifiers.ctrl => return Some(KeyEvent::plain(Key::Up)),
        KeyCode::Char(ch) => Key::Char(ch),
        _ => Key::Other,
    };
    if key == Key::Enter && modifiers.ctrl && platform == Platform::Mac {
        modifiers.meta = true;
    }
    Some(KeyEvent::new(key, modifiers))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRow {
    pub name: String,
    pub detail: String,
    pub highlighted: Vec<usize>,
    pub selected: bool,
}

/// The slice of ranked matches that fits `max_rows`, scrolled to keep the selection visible.
pub fn visible_rows(picker: &FuzzyPicker, max_rows: usize) -> Vec<ListRow> {
    let matches = picker.ranked_matches();
    if max_rows == 0 || matches.is_empty() {
        return Vec::new();
    }

    let selected = picker.selected_index();
    let start = (selected + 1).saturating_sub(max_rows);
    matches
        .iter()
        .enumerate()
        .skip(start)
        .take(max_rows)
        .map(|(index, record)| {
            let mut detail = record.date.clone().unwrap_or_default();
            if let Some(tags) = record.tags.as_ref().filter(|tags| !tags.is_empty()) {
                if !detail.is_empty() {
                    detail.push_str("  ");
                }
                detail.push_str(&tags.join(", "));
            }
            ListRow {
                name: record.name.clone(),
                detail,
                highlighted: search::match_positions(&record.name, picker.query()),
                selected: index == selected,
            }
        })
        .collect()
}

pub fn paint(out: &mut impl Write, picker: &FuzzyPicker) -> std::io::Result<()> {
    let (_, height) = terminal::size().unwrap_or((80, 24));
    let max_rows = (height as usize).saturating_sub(3);

    queue!(out, cursor::MoveTo(0, 0), Clear(ClearType::All))?;
    if picker.query().is_empty() {
        queue!(
            out,
            SetAttribute(Attribute::Dim),
            Print(format!("> {}", picker.placeholder())),
            SetAttribute(Attribute::Reset)
        )?;
    } else {
        queue!(out, Print(format!("> {}", picker.query())))?;
    }

    let instructions = picker
        .instructions()
        .iter()
        .map(|instruction| format!("{} {}", instruction.command, instruction.purpose))
        .collect::<Vec<_>>()
        .join("   ");
    queue!(
        out,
        cursor::MoveTo(0, 1),
        SetAttribute(Attribute::Dim),
        Print(instructions),
        SetAttribute(Attribute::Reset)
    )?;

    let rows = visible_rows(picker, max_rows);
    if rows.is_empty() {
        queue!(out, cursor::MoveTo(0, 3), Print("No matching files."))?;
    }
    for (line, row) in rows.iter().enumerate() {
        queue!(out, cursor::MoveTo(0, (line + 3) as u16))?;
        if row.selected {
            queue!(out, SetAttribute(Attribute::Reverse))?;
        }
        for (position, ch) in row.name.chars().enumerate() {
            if row.highlighted.contains(&position) {
                queue!(out, SetAttribute(Attribute::Bold), Print(ch), SetAttribute(Attribute::NormalIntensity))?;
            } else {
                queue!(out, Print(ch))?;
            }
        }
        queue!(out, SetAttribute(Attribute::Reset))?;
        if !row.detail.is_empty() {
            queue!(
                out,
                SetAttribute(Attribute::Dim),
                Print(format!("  {}", row.detail)),
                SetAttribute(Attribute::Reset)
            )?;
        }
    }
    out.flush()
}
