//! Player preferences and colour themes.
//!
//! Settings travel through eframe's persistence (`eframe::get_value` /
//! `eframe::set_value`); the leaderboard lives in its own record file.

use egui::Color32;
use serde::{Deserialize, Serialize};

use crate::board::BoardSize;

pub const APP_ID: &str = "nqueens_puzzle";
pub const SETTINGS_KEY: &str = eframe::APP_KEY;
/// eframe key for the leaderboard on platforms without a filesystem.
pub const RECORDS_KEY: &str = "records";
pub const RECORDS_ENV: &str = "NQUEENS_RECORDS";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Board size offered when the size dialog opens.
    pub last_size: usize,
    pub theme: String,
    pub show_threats: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            last_size: BoardSize::default().get(),
            theme: Theme::default().name.to_owned(),
            show_threats: false,
        }
    }
}

impl Settings {
    pub fn load(storage: Option<&dyn eframe::Storage>) -> Self {
        storage
            .and_then(|s| eframe::get_value::<Settings>(s, SETTINGS_KEY))
            .unwrap_or_default()
    }

    pub fn save(&self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, SETTINGS_KEY, self);
    }

    /// Stored size if it is still a legal board, otherwise the default.
    pub fn board_size(&self) -> BoardSize {
        BoardSize::new(self.last_size).unwrap_or_default()
    }
}

/// Where the leaderboard file lives: `$NQUEENS_RECORDS` when set, else the
/// eframe storage directory.
#[cfg(not(target_arch = "wasm32"))]
pub fn records_path() -> Option<std::path::PathBuf> {
    if let Some(path) = std::env::var_os(RECORDS_ENV) {
        return Some(path.into());
    }
    eframe::storage_dir(APP_ID).map(|dir| dir.join("records.json"))
}

#[derive(Clone, Debug, PartialEq)]
pub struct Theme {
    pub name: &'static str,
    pub background: Color32,
    pub panel_background: Color32,
    pub text_color: Color32,
    pub accent_color: Color32,
    pub board_light: Color32,
    pub board_dark: Color32,
    pub queen_color: Color32,
    pub conflict_color: Color32,
}

impl Theme {
    pub fn presets() -> Vec<Self> {
        vec![
            Self {
                name: "Tournament",
                background: Color32::from_rgb(242, 242, 247),
                panel_background: Color32::from_rgb(255, 255, 255),
                text_color: Color32::from_rgb(28, 28, 30),
                accent_color: Color32::from_rgb(0, 122, 255),
                board_light: Color32::from_rgb(238, 238, 210),
                board_dark: Color32::from_rgb(118, 150, 86),
                queen_color: Color32::from_rgb(20, 20, 20),
                conflict_color: Color32::from_rgb(220, 38, 38),
            },
            Self {
                name: "Sleek Dark",
                background: Color32::from_rgb(15, 23, 42),
                panel_background: Color32::from_rgb(30, 41, 59),
                text_color: Color32::from_rgb(226, 232, 240),
                accent_color: Color32::from_rgb(99, 102, 241),
                board_light: Color32::from_rgb(241, 245, 249),
                board_dark: Color32::from_rgb(100, 116, 139),
                queen_color: Color32::from_rgb(15, 23, 42),
                conflict_color: Color32::from_rgb(239, 68, 68),
            },
            Self {
                name: "Classic Wood",
                background: Color32::from_rgb(45, 25, 10),
                panel_background: Color32::from_rgb(70, 40, 20),
                text_color: Color32::from_rgb(245, 230, 200),
                accent_color: Color32::from_rgb(180, 100, 40),
                board_light: Color32::from_rgb(210, 180, 140),
                board_dark: Color32::from_rgb(139, 69, 19),
                queen_color: Color32::from_rgb(45, 25, 10),
                conflict_color: Color32::from_rgb(200, 30, 30),
            },
        ]
    }

    /// Preset by name, falling back to the first preset.
    pub fn named(name: &str) -> Self {
        Self::presets()
            .into_iter()
            .find(|t| t.name == name)
            .unwrap_or_default()
    }

    /// Whether the panel colour reads as dark, to pick matching egui visuals.
    pub fn is_dark(&self) -> bool {
        let [r, g, b, _] = self.panel_background.to_array();
        (r as u32 + g as u32 + b as u32) < 384
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::presets()[0].clone()
    }
}
