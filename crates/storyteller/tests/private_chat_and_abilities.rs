//! Private chats and public ability claims.

mod common;

use common::{act, harness, idle, six_players};
use grimoire::{GamePhase, GameStatus, PlayerStatus, Seat};
use storyteller::config::RulesConfig;
use storyteller::{Flow, GameError};

#[tokio::test]
async fn test_private_chat_stays_private() {
    let mut h = harness(six_players(), RulesConfig::default(), &[], |_, prompt| {
        if prompt.starts_with("Would you like to say anything in") {
            act("private_message", "I think Anne is lying")
        } else {
            idle()
        }
    });
    h.game
        .run_private_chat(Seat(0), &["harper".to_string()])
        .await
        .unwrap();

    assert!(h.moderator.heard("Maya -> Harper: I think Anne is lying"));
    assert!(h.moderator.heard("The private chat is now over!"));
    assert_eq!(
        h.prompts.players_prompted("Would you like to say anything in"),
        ["Maya"]
    );

    let harper = h.game.roster().get(Seat(1)).chat_history();
    assert_eq!(harper[0].text, "You are now in a private chat with Maya");
    assert!(harper
        .iter()
        .any(|t| t.text == "In your private chat, Maya says: I think Anne is lying"));
    let maya = h.game.roster().get(Seat(0)).chat_history();
    assert_eq!(
        maya.last().unwrap().text,
        "You have now finished the private chat with Harper and rejoined the other players"
    );

    for outsider in [Seat(2), Seat(3), Seat(4), Seat(5)] {
        assert!(h.game.roster().get(outsider).chat_history().is_empty());
    }
}

#[tokio::test]
async fn test_private_chat_rejects_bad_groups() {
    let mut h = harness(six_players(), RulesConfig::default(), &[], |_, _| idle());

    let unknown = h
        .game
        .run_private_chat(Seat(0), &["Zed".to_string()])
        .await
        .unwrap_err();
    assert!(matches!(unknown, GameError::InvalidPlayer { ref name, .. } if name == "Zed"));

    let alone = h
        .game
        .run_private_chat(Seat(0), &["maya".to_string(), "MAYA".to_string()])
        .await
        .unwrap_err();
    assert!(matches!(alone, GameError::InvalidPlayer { .. }));
    assert!(h.prompts.all().is_empty());
}

#[tokio::test]
async fn test_public_ability_can_end_the_game() {
    let mut h = harness(six_players(), RulesConfig::default(), &["E", "G"], |_, _| idle());
    let flow = h
        .game
        .use_public_ability(Seat(0), "I slay Anne", Some("Anne"))
        .await
        .unwrap();

    assert_eq!(flow, Flow::GameOver);
    assert_eq!(h.game.outcome(), Some(GameStatus::GoodWins));
    assert_eq!(h.game.phase(), GamePhase::Finished);
    assert!(h.moderator.heard("Maya wants to use a public ability on Anne: I slay Anne"));
    assert!(h.moderator.heard("The good team wins! Congratulations!"));
    assert!(h.game.roster().get(Seat(0)).chat_history().is_empty());
}

#[tokio::test]
async fn test_public_ability_message_reaches_the_town() {
    let mut h = harness(
        six_players(),
        RulesConfig::default(),
        &["S", "Nothing happens."],
        |_, _| idle(),
    );
    let flow = h
        .game
        .use_public_ability(Seat(2), "I am the Klutz", None)
        .await
        .unwrap();

    assert_eq!(flow, Flow::Continue);
    assert!(h.moderator.heard("Arun wants to use a public ability: I am the Klutz"));
    for player in h.game.roster().players() {
        assert_eq!(player.chat_history().last().unwrap().text, "Nothing happens.");
    }
    let harper = h.game.roster().get(Seat(1)).chat_history();
    assert!(harper
        .iter()
        .any(|t| t.text == "Arun has used a public ability: I am the Klutz"));
}

#[tokio::test]
async fn test_public_ability_kill_then_reply() {
    let mut h = harness(
        six_players(),
        RulesConfig::default(),
        &["x", "K", "Maya", "Maya falls down."],
        |_, _| idle(),
    );
    let flow = h
        .game
        .use_public_ability(Seat(5), "I slay Maya", Some("Maya"))
        .await
        .unwrap();

    assert_eq!(flow, Flow::Continue);
    assert!(h.moderator.heard("You must choose [S], [K] or [E]!"));
    assert!(h.moderator.heard("Maya has died."));
    assert_eq!(h.game.roster().get(Seat(0)).status(), PlayerStatus::DeadWithVote);
    assert_eq!(h.game.outcome(), None);
    assert_eq!(
        h.moderator.asked().last().unwrap(),
        "How would you respond to the town: "
    );
}
