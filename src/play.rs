use std::io::{BufRead, Write};

use serde::Serialize;

use crate::{
    config::Variant,
    error::PlayError,
    game::{Action, BlackjackGame},
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub rounds: u32,
    pub wins: u32,
    pub losses: u32,
    pub pushes: u32,
    pub total_reward: f64,
}

fn allowed_actions(variant: Variant) -> &'static [Action] {
    match variant {
        Variant::Standard => &[Action::Stand, Action::Hit],
        Variant::Manual => &[Action::Stand, Action::Hit, Action::ToggleAce],
    }
}

fn action_menu(variant: Variant) -> String {
    allowed_actions(variant)
        .iter()
        .map(|action| format!("{}={}", action.as_code(), action.name()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Reads one trimmed line. `None` on end of input.
fn read_line<R: BufRead>(input: &mut R) -> Result<Option<String>, PlayError> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Prompts until the player enters an action the variant allows.
fn prompt_action<R: BufRead, W: Write>(
    variant: Variant,
    input: &mut R,
    output: &mut W,
) -> Result<Option<Action>, PlayError> {
    let allowed = allowed_actions(variant);
    loop {
        write!(output, "Choose action ({}): ", action_menu(variant))?;
        output.flush()?;
        let Some(line) = read_line(input)? else {
            return Ok(None);
        };
        let Ok(code) = line.parse::<i64>() else {
            writeln!(output, "Please enter a valid number.")?;
            continue;
        };
        match Action::from_code(code) {
            Ok(action) if allowed.contains(&action) => return Ok(Some(action)),
            _ => {
                let codes: Vec<String> = allowed.iter().map(|a| a.as_code().to_string()).collect();
                writeln!(output, "Invalid action. Please enter {}.", codes.join(" or "))?;
            }
        }
    }
}

/// Runs rounds until the player declines another or input ends.
pub fn run_session<R: BufRead, W: Write>(
    game: &mut BlackjackGame,
    input: &mut R,
    output: &mut W,
) -> Result<SessionSummary, PlayError> {
    let variant = game.rules.variant;
    let mut summary = SessionSummary::default();

    writeln!(output, "Welcome to Blackjack!")?;
    writeln!(output, "Actions: {}", action_menu(variant))?;

    'session: loop {
        game.reset();
        if game.take_reshuffle() {
            writeln!(output, "Reshuffling shoe...")?;
        }
        writeln!(output)?;
        writeln!(output, "--- New Round ({}) ---", game.deck.size)?;
        writeln!(output, "{}", game.display(false))?;

        loop {
            let Some(action) = prompt_action(variant, input, output)? else {
                break 'session;
            };
            let step = game.step(action)?;
            if step.info.reshuffled {
                writeln!(output, "Reshuffling shoe...")?;
            }
            if !step.done {
                writeln!(output, "{}", game.display(false))?;
                continue;
            }

            writeln!(output, "{}", game.display(true))?;
            summary.rounds += 1;
            summary.total_reward += step.reward;
            if step.reward > 0.0 {
                summary.wins += 1;
                writeln!(output, "You win!")?;
            } else if step.reward < 0.0 {
                summary.losses += 1;
                writeln!(output, "You lose!")?;
            } else {
                summary.pushes += 1;
                writeln!(output, "It's a tie!")?;
            }
            break;
        }

        write!(output, "\nPlay again? (y/n): ")?;
        output.flush()?;
        match read_line(input)? {
            Some(answer) if answer.eq_ignore_ascii_case("y") => continue,
            _ => break,
        }
    }

    writeln!(output, "\nThanks for playing! Goodbye.")?;
    writeln!(
        output,
        "Rounds: {}  Wins: {}  Losses: {}  Ties: {}  Net: {:+}",
        summary.rounds, summary.wins, summary.losses, summary.pushes, summary.total_reward
    )?;
    Ok(summary)
}
