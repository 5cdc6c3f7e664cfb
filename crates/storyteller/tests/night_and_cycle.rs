//! Night controller and whole-game runs.

mod common;

use common::{act, harness, idle, roster};
use grimoire::{ChatRole, GamePhase, GameStatus, PlayerStatus, Seat};
use storyteller::config::RulesConfig;
use storyteller::transcript::RecordKind;
use storyteller::{Flow, GameError};

fn five_players() -> grimoire::Roster {
    roster(&[
        ("Maya", "Chambermaid"),
        ("Harper", "Baron"),
        ("Arun", "Klutz"),
        ("Anne", "Imp"),
        ("Ziggy", "Drunk"),
    ])
}

#[tokio::test]
async fn test_night_kill_and_repeat_kill() {
    let mut h = harness(
        five_players(),
        RulesConfig::default(),
        &["K", "Arun", "K", "arun", "E"],
        |_, _| idle(),
    );
    let flow = h.game.run_night().await.unwrap();

    assert_eq!(flow, Flow::Continue);
    assert_eq!(h.game.roster().get(Seat(2)).status(), PlayerStatus::DeadWithVote);
    assert_eq!(h.game.roster().alive_count(), 4);
    assert!(h.moderator.heard("Arun has died."));
    assert!(h.moderator.heard("Arun is already dead."));
    assert_eq!(h.game.outcome(), None);
}

#[tokio::test]
async fn test_killing_the_demon_ends_the_night() {
    let mut h = harness(five_players(), RulesConfig::default(), &["K", "Anne"], |_, _| {
        idle()
    });
    let flow = h.game.run_night().await.unwrap();

    assert_eq!(flow, Flow::GameOver);
    assert_eq!(h.game.outcome(), Some(GameStatus::GoodWins));
    assert_eq!(h.game.phase(), GamePhase::Finished);
    assert!(h.moderator.heard("The good team wins! Congratulations!"));
    // Nothing else is asked once the game is over.
    assert_eq!(h.moderator.asked().len(), 2);
}

#[tokio::test]
async fn test_two_left_with_demon_is_evil_win() {
    let table = roster(&[("Maya", "Empath"), ("Harper", "Baron"), ("Anne", "Imp")]);
    let mut h = harness(table, RulesConfig::default(), &["K", "Maya"], |_, _| idle());
    assert_eq!(h.game.run_night().await.unwrap(), Flow::GameOver);
    assert_eq!(h.game.outcome(), Some(GameStatus::EvilWins));
    assert!(h.moderator.heard("The evil team wins! Congratulations!"));
}

#[tokio::test]
async fn test_wake_conversation_runs_until_idle() {
    let mut h = harness(
        five_players(),
        RulesConfig::default(),
        &["x", "W", "maya", "Who woke tonight?", "Thank you", "E"],
        |player, prompt| {
            if player == "Maya" && prompt.contains("wakes you in the night") {
                act("talk_to_storyteller", "Which player should I watch?")
            } else {
                idle()
            }
        },
    );
    assert_eq!(h.game.run_night().await.unwrap(), Flow::Continue);

    assert!(h.moderator.heard("You must choose [W], [K] or [E]!"));
    assert!(h.moderator.heard("Maya: Which player should I watch?"));
    assert!(h.moderator.heard("Maya has chosen not to respond."));
    assert!(h
        .moderator
        .asked()
        .contains(&"How would you like to respond to Maya? ".to_string()));

    let history = h.game.roster().get(Seat(0)).chat_history();
    assert_eq!(history.len(), 4);
    assert!(history[0]
        .text
        .starts_with("The storyteller wakes you in the night to tell you: \"Who woke tonight?\""));
    assert_eq!(history[1].role, ChatRole::Model);
    assert!(history[2].text.starts_with("Thank you"));
    assert!(h.game.roster().get(Seat(1)).chat_history().is_empty());
}

#[tokio::test]
async fn test_full_game_quiet_day_then_night_kill() {
    let table = roster(&[
        ("Maya", "Empath"),
        ("Harper", "Baron"),
        ("Anne", "Imp"),
        ("Arun", "Klutz"),
    ]);
    let mut h = harness(
        table,
        RulesConfig::default(),
        &["E", "Good morning, town.", "K", "Anne"],
        |_, _| idle(),
    );
    let status = h.game.run().await.unwrap();

    assert_eq!(status, GameStatus::GoodWins);
    let path: Vec<GamePhase> = h.game.transitions().iter().map(|t| t.to).collect();
    assert_eq!(
        path,
        [
            GamePhase::Night,
            GamePhase::Dawn,
            GamePhase::Discussion,
            GamePhase::Execution,
            GamePhase::Night,
            GamePhase::Finished,
        ]
    );
    assert!(h.moderator.heard("Setting up the game..."));
    assert!(h.moderator.heard(" - Anne: Imp"));
    assert!(h
        .moderator
        .heard("The day is now over and no one made any nominations! Good night!"));

    // Every player was introduced first and heard the morning message.
    assert_eq!(h.prompts.players_prompted("These are the following players").len(), 4);
    for player in h.game.roster().players() {
        let history = player.chat_history();
        assert!(history[0].text.contains(&format!(" - {} (You)", player.name())));
        assert!(history.iter().any(|t| t.text == "Good morning, town."));
    }
}

#[tokio::test]
async fn test_transcripts_mirror_chat_history() {
    let table = roster(&[
        ("Maya", "Empath"),
        ("Harper", "Baron"),
        ("Anne", "Imp"),
        ("Arun", "Klutz"),
    ]);
    let mut h = harness(
        table,
        RulesConfig::default(),
        &["E", "Morning!", "K", "Anne"],
        |_, _| idle(),
    );
    h.game.run().await.unwrap();

    for player in h.game.roster().players() {
        let records = h.transcripts.records(player.name());
        let prompts = records
            .iter()
            .filter(|r| r.kind == RecordKind::Storyteller)
            .count();
        let replies = records.iter().filter(|r| r.kind == RecordKind::Action).count();
        let heard = records.iter().filter(|r| r.kind == RecordKind::Message).count();

        assert_eq!(prompts, replies);
        assert_eq!(player.chat_history().len(), prompts * 2 + heard);
        assert_eq!(player.action_history().len(), replies + heard);
    }
}

#[tokio::test]
async fn test_garbage_replies_exhaust_retries() {
    let mut h = harness(five_players(), RulesConfig::default(), &[], |_, _| {
        "I would rather not say".to_string()
    });
    let err = h.game.run().await.unwrap_err();

    match err {
        GameError::RetriesExhausted { player, attempts, .. } => {
            assert_eq!(player, "Maya");
            assert_eq!(attempts, 3);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(h.prompts.all().len(), 3);
}

#[tokio::test]
async fn test_announcement_without_message_is_fatal() {
    let mut h = harness(
        five_players(),
        RulesConfig::default(),
        &["E", "Morning!"],
        |_, prompt| {
            if prompt.starts_with("It's currently the discussion phase") {
                common::reply("announcement")
            } else {
                idle()
            }
        },
    );
    let err = h.game.run().await.unwrap_err();
    assert!(matches!(err, GameError::ProtocolViolation { .. }));
    assert_eq!(h.game.outcome(), None);
}
