use crate::core::{GameSession, KvStore, PieceProvider, PlaceError, Placement};
use crate::drag::origin_for;

/// Drop the piece in `slot` at a continuous pointer position.
///
/// The piece's bounding box is checked against the board edges (with the
/// half-cell tolerance) before the position is rounded to a cell origin.
pub fn apply_drop<S: KvStore, P: PieceProvider>(
    session: &mut GameSession<S, P>,
    slot: usize,
    pointer: (f32, f32),
) -> Result<Placement, PlaceError> {
    if session.is_clearing() {
        return Err(PlaceError::ClearInProgress);
    }
    let Some(piece) = session.hand().piece(slot) else {
        return Err(if slot >= session.hand().slots().len() {
            PlaceError::InvalidSlot
        } else {
            PlaceError::EmptySlot
        });
    };

    let (w, h) = piece.size();
    let extent = (pointer.0 + (w as f32 - 1.0), pointer.1 + (h as f32 - 1.0));
    if !session.grid().is_in_range(pointer, extent) {
        return Err(PlaceError::OutOfRange);
    }

    session.try_place(slot, origin_for(pointer))
}
