//! Two-player tic-tac-toe

use crate::aggregate::Namespace;
use crate::spec::catalog::{CONSTRAINT, DATA_SCHEMA, EDGE_CASE, FEATURE, REQUIREMENT, SYSTEM_REQUIREMENT};
use crate::spec::{Accessor, Field, SpecClass};

pub static GAME_STATE: SpecClass = SpecClass {
    parent: Some(&DATA_SCHEMA),
    doc: Some(crate::fragment!("Specific notes about this game state for TicTacToe")),
    accessors: &[Accessor::new("model_name", fixed!("tic-tac-toe-state"))],
    fields: Some(&[
        Field::new("board", "list[list[str]]"),
        Field::new("current_turn", "str"),
        Field::new("winner", "str | None"),
    ]),
    ..SpecClass::base("GameState", module_path!(), crate::location!())
};

pub static LOCAL_PLAY: SpecClass = SpecClass {
    parent: Some(&REQUIREMENT),
    doc: Some(crate::fragment!(
        r"
        Two players take turns on the same device, so a game can be played
        without a network.
        "
    )),
    accessors: &[
        Accessor::new("req_id", fixed!("REQ-001")),
        Accessor::new("title", fixed!("Two-Player Local Play")),
    ],
    ..SpecClass::base("LocalPlay", module_path!(), crate::location!())
};

pub static SINGLE_FILE: SpecClass = SpecClass {
    parent: Some(&SYSTEM_REQUIREMENT),
    doc: Some(crate::fragment!(
        "Generate the program in a single source file to ease copy pasting."
    )),
    accessors: &[
        Accessor::new("req_id", fixed!("REQ-002")),
        Accessor::new("title", fixed!("one-source-file")),
    ],
    ..SpecClass::base("SingleFile", module_path!(), crate::location!())
};

/// Platform layer; only its concrete targets are listed in the namespace
pub static TARGET: SpecClass = SpecClass {
    parent: Some(&REQUIREMENT),
    doc: Some(crate::fragment!("Target platform: {{platform}}")),
    accessors: &[
        Accessor::new("req_id", fixed!("REQ-003")),
        Accessor::new("title", fixed!("platform-target")),
        Accessor::unimplemented("platform"),
    ],
    ..SpecClass::base("Target", module_path!(), crate::location!())
};

pub static TARGET_URWID: SpecClass = SpecClass {
    parent: Some(&TARGET),
    doc: Some(crate::fragment!(
        r"
        Ensure the grid layout is actually square and buttons share
        the same width. The elements must be horizontally and
        vertically centered. Use Filler with valign='middle' for
        vertical centering.
        "
    )),
    accessors: &[Accessor::new("platform", fixed!("python using urwid"))],
    ..SpecClass::base("TargetUrwid", module_path!(), crate::location!())
};

pub static CREATE_NEW_GAME: SpecClass = SpecClass {
    parent: Some(&FEATURE),
    doc: Some(crate::fragment!(
        "Resets the GameState board and sets current_turn to 'X'."
    )),
    accessors: &[Accessor::new("feature_name", fixed!("create-new-game"))],
    ..SpecClass::base("CreateNewGame", module_path!(), crate::location!())
};

pub static SAVE_GAME: SpecClass = SpecClass {
    parent: Some(&FEATURE),
    doc: Some(crate::fragment!(
        "Serializes the GameState to local storage for later resumption."
    )),
    accessors: &[Accessor::new("feature_name", fixed!("save-game-state"))],
    ..SpecClass::base("SaveGame", module_path!(), crate::location!())
};

pub static ASK_BEFORE_NEW: SpecClass = SpecClass {
    parent: Some(&EDGE_CASE),
    doc: Some(crate::fragment!(
        r"
        Warn the player that the current game will be lost unless they
        cancel.
        "
    )),
    accessors: &[
        Accessor::new(
            "boundary_condition",
            fixed!("the new game button is pressed during a game"),
        ),
        Accessor::new("error_scenario", fixed!("the player cancelling the warning")),
    ],
    ..SpecClass::base("AskBeforeNew", module_path!(), crate::location!())
};

pub static MOVE_VALIDATION: SpecClass = SpecClass {
    parent: Some(&CONSTRAINT),
    accessors: &[
        Accessor::new("constraint_id", fixed!("CONST-MOVE-01")),
        Accessor::new(
            "description",
            fixed!("Ensures moves are only placed on unoccupied squares."),
        ),
        Accessor::new(
            "enforcement_logic",
            fixed!("Check game_state.board[row][col] is None before writing."),
        ),
    ],
    ..SpecClass::base("MoveValidation", module_path!(), crate::location!())
};

/// `FEATURE` is imported, so discovery skips it
pub static NAMESPACE: Namespace = Namespace {
    name: module_path!(),
    classes: &[
        &GAME_STATE,
        &LOCAL_PLAY,
        &SINGLE_FILE,
        &TARGET_URWID,
        &CREATE_NEW_GAME,
        &SAVE_GAME,
        &ASK_BEFORE_NEW,
        &MOVE_VALIDATION,
        &FEATURE,
    ],
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::Spec;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_game_state() {
        assert_eq!(
            Spec::new(&GAME_STATE).render().unwrap(),
            "Specific notes about this game state for TicTacToe\n\
             \n\
             DATA-MODEL: tic-tac-toe-state\n\
             FIELDS:\n  \
             - board: list[list[str]]\n  \
             - current_turn: str\n  \
             - winner: str | None"
        );
    }

    #[test]
    fn test_intermediate_layer_contributes_template() {
        let text = Spec::new(&TARGET_URWID).render().unwrap();
        assert!(text.starts_with("Ensure the grid layout is actually square"));
        assert!(text.ends_with(
            "Requirement\nTITLE: platform-target\nREQUIREMENT-ID: REQ-003\n\nTarget platform: python using urwid"
        ));
    }

    #[test]
    fn test_intermediate_layer_alone_is_incomplete() {
        assert!(Spec::new(&TARGET).render().is_err());
    }

    #[test]
    fn test_edge_case() {
        assert_eq!(
            Spec::new(&ASK_BEFORE_NEW).render().unwrap(),
            "Warn the player that the current game will be lost unless they\n\
             cancel.\n\
             \n\
             Edge Case\n\
             \n\
             What happens when the new game button is pressed during a game?\n\
             How does system handle the player cancelling the warning?"
        );
    }

    #[test]
    fn test_constraint_without_notes() {
        assert_eq!(
            Spec::new(&MOVE_VALIDATION).render().unwrap(),
            "CONSTRAINT-ID: CONST-MOVE-01\n\
             DESCRIPTION: Ensures moves are only placed on unoccupied squares.\n\
             ENFORCEMENT: Check game_state.board[row][col] is None before writing."
        );
    }

    #[test]
    fn test_declared_classes_skip_imports() {
        let declared: Vec<&str> = NAMESPACE.declared().map(|c| c.name).collect();
        assert_eq!(declared.len(), 8);
        assert!(!declared.contains(&"Feature"));
    }
}
