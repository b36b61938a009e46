use serde::{Deserialize, Serialize};

/// What a single cell shows to a player, derived from engine state.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(tag = "state")]
pub enum CellView {
    #[serde(rename = "closed")]
    Closed,
    #[serde(rename = "marked")]
    Marked,
    #[serde(rename = "opened")]
    Opened { adjacent: u8 },
    #[serde(rename = "mine")]
    Mine,
    #[serde(rename = "detonated")]
    Detonated,
    #[serde(rename = "wrong_mark")]
    WrongMark,
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, Default, PartialEq, Eq)]
pub enum GameState {
    #[default]
    #[serde(rename = "playing")]
    Playing,
    #[serde(rename = "win")]
    Win,
    #[serde(rename = "gameover")]
    GameOver,
}

impl GameState {
    pub fn is_terminal(self) -> bool {
        self != GameState::Playing
    }
}

#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pos {
    pub x: usize,
    pub y: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct GameParams {
    pub cols: usize,
    pub rows: usize,
    pub mines: usize,
}

impl Default for GameParams {
    fn default() -> Self {
        Self {
            cols: 9,
            rows: 9,
            mines: 10,
        }
    }
}

#[derive(Serialize, Deserialize)]
pub struct CreateResponse {
    pub id: String,
}
