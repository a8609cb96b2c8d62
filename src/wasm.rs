//! JS bindings. Values cross the boundary as plain objects with the same
//! field names as the Rust types; empty squares are `null`.

use serde::Serialize;
use serde_wasm_bindgen::Serializer;
use wasm_bindgen::prelude::*;

use crate::ai::AiPlayer;
use crate::game::GameState;
use crate::types::{Color, Difficulty, Move, Position};

#[wasm_bindgen]
pub struct WasmGame {
    state: GameState,
    ai: AiPlayer,
}

#[wasm_bindgen]
impl WasmGame {
    /// New game; `seed` drives the easy level's random choices.
    #[wasm_bindgen(constructor)]
    pub fn new(seed: u32) -> WasmGame {
        WasmGame {
            state: GameState::new(),
            ai: AiPlayer::new(seed as u64),
        }
    }

    pub fn state(&self) -> Result<JsValue, JsError> {
        to_js(&self.state)
    }

    pub fn legal_moves(&self) -> Result<JsValue, JsError> {
        to_js(&self.state.board.all_valid_moves(self.state.current_turn))
    }

    pub fn select_piece(&mut self, row: u8, col: u8) {
        self.state = self.state.select_piece(Position::new(row, col));
    }

    /// Moves the selected piece; `false` when the click was ignored.
    pub fn move_to(&mut self, row: u8, col: u8) -> bool {
        match self.state.move_selected(Position::new(row, col)) {
            Some(next) => {
                self.state = next;
                true
            }
            None => false,
        }
    }

    pub fn play(&mut self, mv: JsValue) -> Result<(), JsError> {
        let mv: Move = serde_wasm_bindgen::from_value(mv)?;
        self.state = self.state.play(&mv)?;
        Ok(())
    }

    pub fn ai_move(&mut self, difficulty: &str) -> Result<(), JsError> {
        let difficulty: Difficulty = difficulty.parse()?;
        self.state = self.state.ai_move(&mut self.ai, difficulty)?;
        Ok(())
    }

    pub fn resign(&mut self, red: bool) {
        let loser = if red { Color::Red } else { Color::Black };
        self.state = self.state.resign(loser);
    }

    pub fn board_at(&self, ply: usize) -> Result<JsValue, JsError> {
        to_js(&self.state.board_at(ply)?)
    }
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsError> {
    Ok(value.serialize(&Serializer::json_compatible())?)
}
