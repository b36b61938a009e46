use serde::{Deserialize, Serialize};

use crate::models::{CellView, GameParams, GameState, Pos};

#[derive(Debug, Deserialize, Serialize)]
#[serde(tag = "action")]
pub enum ClientMessage {
    #[serde(rename = "open")]
    Open { pos: Pos },
    #[serde(rename = "mark")]
    Mark { pos: Pos },
    #[serde(rename = "generate")]
    Generate { params: GameParams },
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CellUpdate {
    pub pos: Pos,
    pub value: CellView,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(tag = "type")]
pub enum ServerMessage {
    #[serde(rename = "init")]
    Init {
        cols: usize,
        rows: usize,
        mines: usize,
        state: GameState,
        #[serde(rename = "remainingMines")]
        remaining_mines: usize,
        seconds: i64,
        field: Vec<Vec<CellView>>,
    },
    #[serde(rename = "update")]
    Update {
        updates: Vec<CellUpdate>,
        state: GameState,
        #[serde(rename = "remainingMines")]
        remaining_mines: usize,
        seconds: i64,
        busy: bool,
    },
}
