//! WebAssembly bindings for the hexchess engine.
//!
//! This module exposes the game engine to JavaScript through wasm-bindgen.

use wasm_bindgen::prelude::*;

use crate::check::CheckmateRule;
use crate::game::{GameState, Rules};
use crate::hex::{HexCoord, OffsetCoord};
use crate::piece::Color;

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Cell from JavaScript numbers, rejecting values without a valid s component
fn cell(q: i32, r: i32) -> Result<HexCoord, JsValue> {
    HexCoord::try_axial(q, r).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// WASM-exposed game wrapper
#[wasm_bindgen]
pub struct WasmGame {
    state: GameState,
}

#[wasm_bindgen]
impl WasmGame {
    /// Create a new game from the standard layout.
    /// Pass `true` to have the game end on checkmate.
    #[wasm_bindgen(constructor)]
    pub fn new(detect_checkmate: bool) -> WasmGame {
        let checkmate = if detect_checkmate {
            CheckmateRule::Detect
        } else {
            CheckmateRule::Disabled
        };
        WasmGame {
            state: GameState::with_rules(Rules { checkmate }),
        }
    }

    /// Get the current game state as JSON
    #[wasm_bindgen(js_name = getState)]
    pub fn get_state(&self) -> String {
        serde_json::to_string(&self.state).unwrap_or_else(|_| "{}".to_string())
    }

    /// Get board state as JSON (for rendering)
    #[wasm_bindgen(js_name = getBoard)]
    pub fn get_board(&self) -> String {
        let board_json = self.state.board().to_json_friendly();
        serde_json::to_string(&board_json).unwrap_or_else(|_| "{}".to_string())
    }

    /// "White" or "Black"
    #[wasm_bindgen(js_name = getSideToMove)]
    pub fn get_side_to_move(&self) -> String {
        self.state.side_to_move().to_string()
    }

    /// Valid destinations of the piece on (q, r) as a JSON array of cells
    #[wasm_bindgen(js_name = getValidMoves)]
    pub fn get_valid_moves(&self, q: i32, r: i32) -> Result<String, JsValue> {
        let moves = self.state.valid_moves(cell(q, r)?);
        Ok(serde_json::to_string(&moves).unwrap_or_else(|_| "[]".to_string()))
    }

    /// Apply a move, returns events JSON or the rejection reason
    #[wasm_bindgen(js_name = requestMove)]
    pub fn request_move(
        &mut self,
        from_q: i32,
        from_r: i32,
        to_q: i32,
        to_r: i32,
    ) -> Result<String, JsValue> {
        let from = cell(from_q, from_r)?;
        let to = cell(to_q, to_r)?;

        match self.state.request_move(from, to) {
            Ok(events) => {
                Ok(serde_json::to_string(&events).unwrap_or_else(|_| "[]".to_string()))
            }
            Err(e) => Err(JsValue::from_str(&format!("Move rejected: {}", e))),
        }
    }

    /// Cube cell for an offset-grid column/row, as JSON
    #[wasm_bindgen(js_name = cellFromOffset)]
    pub fn cell_from_offset(x: i32, y: i32) -> Result<String, JsValue> {
        let cell = HexCoord::try_from_offset(OffsetCoord { x, y })
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(serde_json::to_string(&cell).unwrap_or_else(|_| "null".to_string()))
    }

    /// Offset-grid position of (q, r), as JSON
    #[wasm_bindgen(js_name = cellToOffset)]
    pub fn cell_to_offset(q: i32, r: i32) -> Result<String, JsValue> {
        let offset = cell(q, r)?.to_offset();
        Ok(serde_json::to_string(&offset).unwrap_or_else(|_| "null".to_string()))
    }

    /// Whether `color` ("White" or "Black") is checkmated under the game's rules
    #[wasm_bindgen(js_name = isCheckmate)]
    pub fn is_checkmate(&self, color: &str) -> Result<bool, JsValue> {
        let color = match color {
            "White" => Color::White,
            "Black" => Color::Black,
            other => return Err(JsValue::from_str(&format!("Unknown color: {}", other))),
        };
        Ok(self.state.is_checkmate(color))
    }

    /// Current en-passant opportunity as JSON, or "null"
    #[wasm_bindgen(js_name = getEnPassant)]
    pub fn get_en_passant(&self) -> String {
        serde_json::to_string(&self.state.en_passant()).unwrap_or_else(|_| "null".to_string())
    }

    /// Check if the game is finished
    #[wasm_bindgen(js_name = isFinished)]
    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    /// Get the winner (if game is finished)
    #[wasm_bindgen(js_name = getWinner)]
    pub fn get_winner(&self) -> Option<String> {
        self.state.winner().map(|color| color.to_string())
    }
}
