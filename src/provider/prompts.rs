//! Prompt text for each role.

use super::Role;
use super::response::{ClueResponse, GuessResponse};
use crate::games::codenames::{Affiliation, GameState, Turn};

/// System prompt for `role`, including the reply schema.
pub fn system_prompt(role: Role) -> String {
    let (intro, schema) = match role {
        Role::ClueGiver => (
            "You are playing Codenames as a Spymaster. Give one-word clues that help \
             your team guess several of its words while avoiding the opponent's words, \
             the neutral words and the assassin. The clue must not contain any word on \
             the board. Try to finish the game as soon as possible.",
            schemars::schema_for!(ClueResponse),
        ),
        Role::Guesser => (
            "You are playing Codenames as a Guesser. Guess which board words belong to \
             your team based on your Spymaster's clue. Give exactly one word per reply, \
             your most confident guess first. You may set \"skip\" to true to stop \
             guessing, but only after at least one guess this turn.",
            schemars::schema_for!(GuessResponse),
        ),
    };
    let schema = serde_json::to_string_pretty(&schema).unwrap_or_default();
    format!(
        "{}\n\nRespond with a single JSON object matching this schema and nothing else:\n{}",
        intro, schema
    )
}

/// User prompt asking the current team's clue giver for a clue.
pub fn clue_prompt(state: &GameState) -> String {
    let team = state.current_team();
    let board = state.board();
    format!(
        "You are the {team} team's Spymaster.\n\n\
         Your words are: {own}\n\
         Opponent's words are: {opponent}\n\
         Neutral words are: {neutral}\n\
         The assassin word is: {assassin}\n\n\
         Previous turns:\n{history}\n\n\
         Be creative and take calculated risks; aim to connect multiple words.\n\
         Provide a one-word clue and a number.",
        own = board.unrevealed_labels(team.affiliation()).join(", "),
        opponent = board
            .unrevealed_labels(team.opponent().affiliation())
            .join(", "),
        neutral = board.unrevealed_labels(Affiliation::Neutral).join(", "),
        assassin = board.assassin_label().unwrap_or("(none)"),
        history = history_summary(state.completed_turns()),
    )
}

/// User prompt asking the current team's guesser for one guess.
pub fn guess_prompt(state: &GameState) -> String {
    let team = state.current_team();
    let (clue, made, remaining) = match state.current_turn() {
        Some(turn) => (
            turn.clue.to_string(),
            turn.guesses
                .iter()
                .map(|g| g.word.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            turn.remaining_budget(),
        ),
        None => (String::from("(none)"), String::new(), 0),
    };
    format!(
        "You are guessing for the {team} team.\n\n\
         The clue is: {clue}\n\
         Available words are: {available}\n\
         Guesses already made this turn: {made}\n\
         Guesses remaining: {remaining}\n\n\
         Previous turns:\n{history}\n\n\
         Provide your single most confident guess.",
        available = state.board().unrevealed().join(", "),
        made = if made.is_empty() { "(none)" } else { made.as_str() },
        history = history_summary(state.completed_turns()),
    )
}

fn history_summary(turns: &[Turn]) -> String {
    if turns.is_empty() {
        return "(none)".to_string();
    }
    turns
        .iter()
        .map(Turn::summary)
        .collect::<Vec<_>>()
        .join("\n")
}
