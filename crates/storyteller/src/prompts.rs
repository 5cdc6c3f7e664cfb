//! Prompt text sent to player agents.
//!
//! The system instruction is assembled once from the script; every other
//! prompt is a small template filled per turn. Discussion prompts list their
//! actions from the same table the response is validated against.

use std::path::Path;

use anyhow::{Context, Result};
use grimoire::actions::describe;
use grimoire::{join_with_word, ActionKind, NominationResult, PlayerStatus, Role, RoleCatalog};

// ── System instruction ─────────────────────────────────────────────────

fn bullet_section(parts: &mut Vec<String>, heading: String, items: &[String]) {
    parts.push(heading);
    for item in items {
        parts.push(format!(" - {item}"));
    }
}

fn describe_role(parts: &mut Vec<String>, role: &Role) {
    parts.push(format!("\n\n{} ({}): {}", role.name, role.team, role.ability));
    parts.push(format!("\nThis is the detailed description for the {}:", role.name));
    parts.push(role.detailed_description.clone());
    bullet_section(
        parts,
        format!("\nBelow are some tips for playing as the {}:", role.name),
        &role.player_tips,
    );
    if let Some(tips) = &role.bluffing_tips {
        bullet_section(
            parts,
            format!("\nBelow are some tips for bluffing as the {}:", role.name),
            tips,
        );
    }
    if let Some(tips) = &role.fighting_tips {
        bullet_section(
            parts,
            format!("\nBelow are some tips for fighting against the {}:", role.name),
            tips,
        );
    }
    if let Some(examples) = &role.examples {
        bullet_section(
            parts,
            format!("\nBelow are some examples of how the {} role is used:", role.name),
            examples,
        );
    }
}

/// Build the system instruction from already-loaded text and the script.
pub fn build_system_instruction(
    introduction: &str,
    conclusion: &str,
    script: &[&Role],
) -> String {
    let mut parts = vec![
        introduction.trim_end().to_string(),
        "\n\nBelow is a detailed description of each character that is on the script:".into(),
    ];
    for role in script {
        describe_role(&mut parts, role);
    }
    parts.push(
        "\n\nNow that you understand how each of these roles work in detail, below is a recap of the specific roles that are on the script:"
            .into(),
    );
    for role in script {
        parts.push(format!(" - {} ({}): {}", role.name, role.team, role.ability));
    }
    parts.push(format!("\n\n{}", conclusion.trim_end()));
    parts.join("\n")
}

/// Read `introduction.txt` and `conclusion.txt` from `prompts_dir` and build
/// the system instruction for `script`.
pub fn load_system_instruction<S: AsRef<str>>(
    prompts_dir: &Path,
    catalog: &RoleCatalog,
    script: &[S],
) -> Result<String> {
    let read = |name: &str| {
        let path = prompts_dir.join(name);
        std::fs::read_to_string(&path).context(format!("Failed to read {}", path.display()))
    };
    let introduction = read("introduction.txt")?;
    let conclusion = read("conclusion.txt")?;
    let roles = script
        .iter()
        .map(|name| catalog.get(name.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(build_system_instruction(&introduction, &conclusion, &roles))
}

// ── Setup ──────────────────────────────────────────────────────────────

/// Seating introduction for the player in `seat_index`.
pub fn introduction(names: &[&str], seat_index: usize, token: &str) -> String {
    let n = names.len();
    let left = (seat_index + 1) % n;
    let right = (seat_index + n - 1) % n;
    let seating: Vec<String> = names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            if i == seat_index {
                format!(" - {name} (You)")
            } else if i == left {
                format!(" - {name} (Your neighbor to your left)")
            } else if i == right {
                format!(" - {name} (Your neighbor to your right)")
            } else {
                format!(" - {name}")
            }
        })
        .collect();

    [
        "These are the following players in the game, in clockwise order around the circle: \n".to_string(),
        seating.join("\n"),
        format!("\nYou have been given the {token} token. The storyteller puts you to sleep."),
        "You must respond with a JSON object that includes a 'reasoning' property that shows your thought process, as well as an 'action' property that shows what action you would like to take.".into(),
        "For now, the only action you can take is 'idle'. In the future, there may be other actions that you can take which will be communicated to you.".into(),
    ]
    .join(" ")
}

// ── Storyteller conversation ───────────────────────────────────────────

pub fn storyteller_chat(message: &str) -> String {
    format!(
        "{message}\n\nPlease respond with a JSON object that contains a 'reasoning' property which includes your train of thought, as well as an 'action' property and a 'message' property. The action should be either 'talk_to_storyteller' to respond to the storyteller, or 'idle' to end the conversation. If you choose to talk to the storyteller, please include the message in the 'message' property."
    )
}

// ── Discussion ─────────────────────────────────────────────────────────

pub fn discussion(
    nominations_open: bool,
    standing: Option<&NominationResult>,
    status: PlayerStatus,
    allowed: &[ActionKind],
) -> String {
    let context = match (nominations_open, standing, status.is_alive()) {
        (false, _, _) => "It's currently the discussion phase.".to_string(),
        (true, _, false) => "It's currently the nomination phase. You can't nominate anyone because you are dead, but you can still participate in the discussion.".to_string(),
        (true, None, true) => "It's currently the nomination phase. You can nominate a player for execution, or make a public announcement. You can no longer talk to the storyteller in private (e.g. to use character abilities); you'll need to wait until the next day if you want to do this.".to_string(),
        (true, Some(n), true) => format!(
            "It's currently the nomination phase and {} is on the block for execution with {} votes. You can still nominate a different player if you think they should die instead, or you can do nothing and {} will be executed shortly.",
            n.nominee, n.votes, n.nominee
        ),
    };

    let actions: Vec<String> = allowed
        .iter()
        .filter_map(|a| describe(*a).map(|d| format!(" - '{a}': {d}")))
        .collect();

    format!(
        "{context} You can make any of the following actions: \n{}\n\nPlease respond with a JSON object including your 'reasoning', 'action' and the 'message' that you would like to share, if applicable to the action you are taking. If you need to list one or more players as part of your action, include a string array with the property 'players' in your response.",
        actions.join("\n")
    )
}

// ── Nomination ─────────────────────────────────────────────────────────

pub fn nomination_turn(player: &str, nominator: &str, nominee: &str) -> String {
    let whose = if player == nominator {
        "your".to_string()
    } else {
        format!("{nominator}'s")
    };
    let whom = if player == nominee { "yourself" } else { nominee };
    let closing = if player == nominee || player == nominator {
        "Make sure to put your best foot forward and try to convince the town of your viewpoint."
    } else {
        "It's OK to stay quiet if you don't have anything important to add to the nomination. You'll get another chance to speak afterwards if you want to discuss something else."
    };
    format!(
        "Would you like to say anything about {whose} nomination for {whom}? You must respond with a JSON object with three properties. The 'reasoning' property should include a string of your current train of thought, the 'action' property should either be 'idle' (to listen and wait for others to say something) or 'announcement' (to say something publicly). If you choose 'announcement', you must also include a 'message' property with the message you want to share publicly about the nomination. Try to keep on topic and avoid discussing unrelated topics during the nomination. {closing}"
    )
}

/// Broadcast explaining the vote order and how many votes are needed.
pub fn vote_briefing(
    nominee: &str,
    first_voter: &str,
    alive_count: usize,
    threshold: u32,
    standing: Option<&NominationResult>,
) -> String {
    let mut parts = vec![
        format!("Votes for {nominee} will begin with {first_voter} and end with {nominee}, going clockwise around the circle."),
        "You don't have to vote if you don't want to, and sometimes it's beneficial to ensure that not too many people vote so that you can still overturn the nomination later in the day if you find a better candidate or learn new information.".to_string(),
    ];
    match standing {
        None => {
            parts.push(format!("If at least the majority of alive players vote, then {nominee} will be put on the block for execution."));
            parts.push(format!("There are currently {alive_count} alive players, so at least {threshold} votes are required for the nomination to go through."));
        }
        Some(existing) => {
            parts.push(format!(
                "The previous nomination for {} got {} votes, so at least {threshold} votes are required to put {nominee} on the block instead.",
                existing.nominee, existing.votes
            ));
            parts.push(format!(
                "If {nominee} receives the same number of votes as {} received, the nomination will result in a tie and neither player will be executed.",
                existing.nominee
            ));
        }
    }
    parts.push("Remember that if you are dead, you only get one more vote for the rest of the game.".into());
    parts.push("If you have already used your ghost vote, you cannot vote again.".into());
    parts.join(" ")
}

pub fn vote(nominee: &str, status: PlayerStatus) -> String {
    let mut parts = vec![format!("Would you like to vote for {nominee}?")];
    if status == PlayerStatus::DeadWithVote {
        parts.push("Don't forget that you are dead, so if you choose to vote now, you won't be able to vote again for the rest of the game.".into());
    }
    parts.push("Respond with a JSON object containing a 'reasoning' key that includes your train of thought, and an 'action' key which either has the value 'idle' (if you don't want to vote) or 'vote' (if you want to cast your vote).".into());
    parts.join(" ")
}

// ── Private chat ───────────────────────────────────────────────────────

pub fn private_chat_turn(others: &[&str], first_turn: bool) -> String {
    let anything = if first_turn { "anything" } else { "anything else" };
    format!(
        "Would you like to say {anything} in the private chat with {}? You must respond with a JSON object with three properties. The 'reasoning' property should include a string of your current train of thought, the 'action' property should either be 'idle' (to listen and wait for others to say something) or 'private_message' (to say something in the private chat). If you choose 'private_message', you must also include a 'message' property with the message you want to share in the private chat.",
        join_with_word(others, "and")
    )
}

#[cfg(test)]
mod tests {
    use grimoire::actions::{discussion_actions, DayContext};
    use grimoire::{NominationOutcome, Team};

    use super::*;

    #[test]
    fn test_system_instruction_layout() {
        let mut imp = Role::new("Imp", Team::Demon, "Each night*, choose a player: they die.");
        imp.detailed_description = "The Imp kills.".into();
        imp.player_tips = vec!["Bluff well.".into()];
        imp.fighting_tips = Some(vec!["Track deaths.".into()]);
        let empath = Role::new("Empath", Team::Townsfolk, "Learn about your neighbours.");

        let text = build_system_instruction("INTRO\n", "OUTRO\n", &[&imp, &empath]);
        assert!(text.starts_with("INTRO"));
        assert!(text.ends_with("OUTRO"));
        assert!(text.contains("Imp (demon): Each night*, choose a player: they die."));
        assert!(text.contains("Below are some tips for fighting against the Imp:\n - Track deaths."));
        assert!(!text.contains("bluffing as the Imp"));
        assert!(text.contains(" - Empath (townsfolk): Learn about your neighbours."));
    }

    #[test]
    fn test_load_system_instruction_needs_files() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = RoleCatalog::from_roles([Role::new("Imp", Team::Demon, "kills")]);
        assert!(load_system_instruction(dir.path(), &catalog, &["imp"]).is_err());

        std::fs::write(dir.path().join("introduction.txt"), "Hello").unwrap();
        std::fs::write(dir.path().join("conclusion.txt"), "Bye").unwrap();
        let text = load_system_instruction(dir.path(), &catalog, &["imp"]).unwrap();
        assert!(text.contains("Imp (demon): kills"));
    }

    #[test]
    fn test_introduction_marks_neighbours() {
        let names = ["Maya", "Harper", "Arun", "Anne"];
        let text = introduction(&names, 0, "Chambermaid");
        assert!(text.contains(" - Maya (You)"));
        assert!(text.contains(" - Harper (Your neighbor to your left)"));
        assert!(text.contains(" - Anne (Your neighbor to your right)"));
        assert!(text.contains(" - Arun\n") || text.ends_with(" - Arun") || text.contains(" - Arun "));
        assert!(text.contains("You have been given the Chambermaid token."));
    }

    #[test]
    fn test_discussion_prompt_lists_only_allowed_actions() {
        let ctx = DayContext {
            nominations_open: true,
            actor_status: PlayerStatus::Alive,
            has_nominated_today: false,
        };
        let allowed = discussion_actions(&ctx);
        let standing = NominationResult {
            result: NominationOutcome::OnTheBlock,
            votes: 3,
            nominator: "Maya".into(),
            nominee: "Anne".into(),
        };
        let text = discussion(true, Some(&standing), PlayerStatus::Alive, &allowed);
        assert!(text.contains("Anne is on the block for execution with 3 votes"));
        assert!(text.contains(" - 'nominate':"));
        assert!(!text.contains("'talk_to_storyteller'"));
        assert!(!text.contains("'public_ability'"));
    }

    #[test]
    fn test_vote_prompt_warns_dead_players() {
        assert!(vote("Anne", PlayerStatus::DeadWithVote).contains("you are dead"));
        assert!(!vote("Anne", PlayerStatus::Alive).contains("you are dead"));
    }

    #[test]
    fn test_vote_briefing_variants() {
        let fresh = vote_briefing("Anne", "Ziggy", 6, 3, None);
        assert!(fresh.contains("at least 3 votes are required"));

        let standing = NominationResult {
            result: NominationOutcome::OnTheBlock,
            votes: 4,
            nominator: "Maya".into(),
            nominee: "Harper".into(),
        };
        let challenge = vote_briefing("Anne", "Ziggy", 6, 5, Some(&standing));
        assert!(challenge.contains("The previous nomination for Harper got 4 votes"));
        assert!(challenge.contains("at least 5 votes"));
    }

    #[test]
    fn test_nomination_turn_perspective() {
        let own = nomination_turn("Maya", "Maya", "Anne");
        assert!(own.contains("about your nomination for Anne"));
        let defence = nomination_turn("Anne", "Maya", "Anne");
        assert!(defence.contains("about Maya's nomination for yourself"));
        assert!(defence.contains("best foot forward"));
        let bystander = nomination_turn("Arun", "Maya", "Anne");
        assert!(bystander.contains("OK to stay quiet"));
    }
}
