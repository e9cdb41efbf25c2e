use minesweeper_kb as ms;
use wasm_bindgen::prelude::*;

/// A board being played by the inference agent, owned by the JS side.
#[wasm_bindgen]
pub struct Bot {
    session: ms::Session,
}

#[wasm_bindgen]
impl Bot {
    #[wasm_bindgen(constructor)]
    pub fn new(size: u8, hazards: u8) -> Result<Bot, String> {
        console_error_panic_hook::set_once();

        let session = ms::Session::new(size as usize, size as usize, hazards as usize, None)
            .map_err(|e| e.to_string())?;
        Ok(Bot { session })
    }

    /// Plays one move. Returns 0 for a deduced move, 1 for a safe guess,
    /// 2 when a guess hit a hazard and 3 when no move is left.
    pub fn step(&mut self) -> Result<u8, String> {
        console_error_panic_hook::set_once();

        let turn = self.session.step().map_err(|e| e.to_string())?;
        Ok(match turn {
            ms::Turn::Deduced { .. } => 0,
            ms::Turn::Guessed { .. } => 1,
            ms::Turn::Detonated { .. } => 2,
            ms::Turn::Stuck => 3,
        })
    }

    /// Row-major board: -1 hidden, -2 flagged, 0..=8 revealed.
    pub fn cells(&self) -> Vec<i8> {
        self.session.game().cells()
    }

    /// Cells proven safe but not yet probed, as row-major indices.
    pub fn safe_cells(&self) -> Vec<u32> {
        let agent = self.session.agent();
        agent
            .known_safe()
            .difference(agent.moves_made())
            .map(|p| (p.row * agent.width() + p.col) as u32)
            .collect()
    }

    pub fn won(&self) -> bool {
        self.session.game().won()
    }

    pub fn finished(&self) -> bool {
        self.session.is_finished()
    }
}
