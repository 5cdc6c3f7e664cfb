//! Declarative action table.
//!
//! One table drives both sides of the agent contract: the whitelist sent with
//! each request and the validation applied to each response. Prompt text for
//! each action lives next to its legality predicate so the two cannot drift.
//!
//! | Action                 | Legal during discussion when…                   | Needs message | Targets      |
//! |------------------------|-------------------------------------------------|---------------|--------------|
//! | `announcement`         | always                                          | yes           | none         |
//! | `public_ability`       | nominations closed                              | yes           | optional (1) |
//! | `request_private_chat` | nominations closed                              | yes           | at least one |
//! | `talk_to_storyteller`  | nominations closed                              | yes           | none         |
//! | `nominate`             | nominations open, actor alive, not yet nominated| yes           | exactly one  |
//! | `idle`                 | always                                          | no            | none         |

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ProtocolViolation;
use crate::player::PlayerStatus;
use crate::response::PlayerResponse;

/// Every entry that can appear in a player's action history.
///
/// The first eight are chosen by agents; `HearMessage` and `StartNomination`
/// are recorded by the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Announcement,
    PublicAbility,
    RequestPrivateChat,
    TalkToStoryteller,
    Nominate,
    Idle,
    Vote,
    PrivateMessage,
    HearMessage,
    StartNomination,
}

impl ActionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Announcement => "announcement",
            Self::PublicAbility => "public_ability",
            Self::RequestPrivateChat => "request_private_chat",
            Self::TalkToStoryteller => "talk_to_storyteller",
            Self::Nominate => "nominate",
            Self::Idle => "idle",
            Self::Vote => "vote",
            Self::PrivateMessage => "private_message",
            Self::HearMessage => "hear_message",
            Self::StartNomination => "start_nomination",
        }
    }

    /// Whether an agent may choose this action (as opposed to it being
    /// recorded by the orchestrator).
    pub fn is_agent_action(self) -> bool {
        !matches!(self, Self::HearMessage | Self::StartNomination)
    }

    fn requires_message(self) -> bool {
        !matches!(
            self,
            Self::Idle | Self::Vote | Self::HearMessage | Self::StartNomination
        )
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = ProtocolViolation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "announcement" => Ok(Self::Announcement),
            "public_ability" => Ok(Self::PublicAbility),
            "request_private_chat" => Ok(Self::RequestPrivateChat),
            "talk_to_storyteller" => Ok(Self::TalkToStoryteller),
            "nominate" => Ok(Self::Nominate),
            "idle" => Ok(Self::Idle),
            "vote" => Ok(Self::Vote),
            "private_message" => Ok(Self::PrivateMessage),
            "hear_message" => Ok(Self::HearMessage),
            "start_nomination" => Ok(Self::StartNomination),
            other => Err(ProtocolViolation::UnknownAction(other.to_string())),
        }
    }
}

// ── Fixed action sets ──────────────────────────────────────────────────

/// Seating introduction before the first night.
pub const INTRODUCTION_ACTIONS: &[ActionKind] = &[ActionKind::Idle];
/// One-to-one conversation with the storyteller (night wake or day request).
pub const STORYTELLER_CHAT_ACTIONS: &[ActionKind] =
    &[ActionKind::TalkToStoryteller, ActionKind::Idle];
/// Forced turns and open floor during a nomination.
pub const NOMINATION_ACTIONS: &[ActionKind] = &[ActionKind::Idle, ActionKind::Announcement];
/// A single yes/no vote.
pub const VOTE_ACTIONS: &[ActionKind] = &[ActionKind::Idle, ActionKind::Vote];
/// Turns inside a private chat.
pub const PRIVATE_CHAT_ACTIONS: &[ActionKind] = &[ActionKind::Idle, ActionKind::PrivateMessage];

// ── Discussion table ───────────────────────────────────────────────────

/// Inputs to the discussion-phase legality predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayContext {
    pub nominations_open: bool,
    pub actor_status: PlayerStatus,
    pub has_nominated_today: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Targets {
    None,
    Optional,
    AtLeastOne,
    ExactlyOne,
}

struct ActionRule {
    kind: ActionKind,
    legal: fn(&DayContext) -> bool,
    targets: Targets,
    description: &'static str,
}

const DISCUSSION_TABLE: &[ActionRule] = &[
    ActionRule {
        kind: ActionKind::Announcement,
        legal: |_| true,
        targets: Targets::None,
        description: "Publicly announce some information to all players. You must put your announcement in the 'message' property.",
    },
    ActionRule {
        kind: ActionKind::PublicAbility,
        legal: |ctx| !ctx.nominations_open,
        targets: Targets::Optional,
        description: "Use a character ability that functions in public, such as the Slayer or the Klutz. If you are targeting a player with your ability, put their name as the single entry of the 'players' array. You must also include a message to the storyteller and the town explaining what you are doing in the 'message' property. You can attempt to use a public ability even if you don't actually have it; if it doesn't work you can always claim that you might be drunk or poisoned.",
    },
    ActionRule {
        kind: ActionKind::RequestPrivateChat,
        legal: |ctx| !ctx.nominations_open,
        targets: Targets::AtLeastOne,
        description: "Request a private chat with one or more players. List the players in the 'players' array and include a message publicly asking those players to chat in the 'message' property.",
    },
    ActionRule {
        kind: ActionKind::TalkToStoryteller,
        legal: |ctx| !ctx.nominations_open,
        targets: Targets::None,
        description: "Privately ask the storyteller a question. Put your message for the storyteller in the 'message' property.",
    },
    ActionRule {
        kind: ActionKind::Nominate,
        legal: |ctx| {
            ctx.nominations_open
                && ctx.actor_status == PlayerStatus::Alive
                && !ctx.has_nominated_today
        },
        targets: Targets::ExactlyOne,
        description: "Nominate a specific player for execution. You can only nominate once per day. Include a message to share with the town in the 'message' property and the name of the player you are nominating as the single entry of the 'players' array.",
    },
    ActionRule {
        kind: ActionKind::Idle,
        legal: |_| true,
        targets: Targets::None,
        description: "Do nothing, and listen to what other members of the town do first. Don't be afraid to idle; it is often better to stay quiet than to over-share, even if you are good.",
    },
];

/// Actions legal for a discussion turn, in table order.
pub fn discussion_actions(ctx: &DayContext) -> Vec<ActionKind> {
    DISCUSSION_TABLE
        .iter()
        .filter(|rule| (rule.legal)(ctx))
        .map(|rule| rule.kind)
        .collect()
}

/// Prompt description for a discussion action.
pub fn describe(kind: ActionKind) -> Option<&'static str> {
    DISCUSSION_TABLE
        .iter()
        .find(|rule| rule.kind == kind)
        .map(|rule| rule.description)
}

fn target_rule(kind: ActionKind) -> Targets {
    DISCUSSION_TABLE
        .iter()
        .find(|rule| rule.kind == kind)
        .map(|rule| rule.targets)
        .unwrap_or(Targets::None)
}

// ── Validation ─────────────────────────────────────────────────────────

/// A validated agent decision with the payload its action requires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Idle,
    Vote,
    Announcement { message: String },
    PublicAbility { message: String, target: Option<String> },
    RequestPrivateChat { message: String, targets: Vec<String> },
    TalkToStoryteller { message: String },
    Nominate { message: String, nominee: String },
    PrivateMessage { message: String },
}

impl Decision {
    pub fn kind(&self) -> ActionKind {
        match self {
            Self::Idle => ActionKind::Idle,
            Self::Vote => ActionKind::Vote,
            Self::Announcement { .. } => ActionKind::Announcement,
            Self::PublicAbility { .. } => ActionKind::PublicAbility,
            Self::RequestPrivateChat { .. } => ActionKind::RequestPrivateChat,
            Self::TalkToStoryteller { .. } => ActionKind::TalkToStoryteller,
            Self::Nominate { .. } => ActionKind::Nominate,
            Self::PrivateMessage { .. } => ActionKind::PrivateMessage,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}

/// Validate a response against the whitelist it was requested with and the
/// field requirements of its action.
pub fn validate(
    response: &PlayerResponse,
    allowed: &[ActionKind],
) -> Result<Decision, ProtocolViolation> {
    let kind: ActionKind = response.action.parse()?;
    if !allowed.contains(&kind) || !kind.is_agent_action() {
        return Err(ProtocolViolation::NotAllowed {
            action: kind,
            allowed: join_actions(allowed),
        });
    }

    let message = response
        .message
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(String::from);
    if kind.requires_message() && message.is_none() {
        return Err(ProtocolViolation::MissingMessage(kind));
    }
    let message = message.unwrap_or_default();

    let targets: Vec<String> = response
        .players
        .iter()
        .flatten()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .map(String::from)
        .collect();

    match target_rule(kind) {
        Targets::AtLeastOne if targets.is_empty() => {
            return Err(ProtocolViolation::TargetCount {
                action: kind,
                expected: "at least one",
                got: 0,
            })
        }
        Targets::ExactlyOne if targets.len() != 1 => {
            return Err(ProtocolViolation::TargetCount {
                action: kind,
                expected: "exactly one",
                got: targets.len(),
            })
        }
        _ => {}
    }

    Ok(match kind {
        ActionKind::Idle => Decision::Idle,
        ActionKind::Vote => Decision::Vote,
        ActionKind::Announcement => Decision::Announcement { message },
        ActionKind::PublicAbility => Decision::PublicAbility {
            message,
            target: targets.into_iter().next(),
        },
        ActionKind::RequestPrivateChat => Decision::RequestPrivateChat { message, targets },
        ActionKind::TalkToStoryteller => Decision::TalkToStoryteller { message },
        ActionKind::Nominate => Decision::Nominate {
            message,
            nominee: targets.into_iter().next().unwrap_or_default(),
        },
        ActionKind::PrivateMessage => Decision::PrivateMessage { message },
        ActionKind::HearMessage | ActionKind::StartNomination => unreachable!(
            "orchestrator-only actions are rejected above"
        ),
    })
}

/// Render an action list as `'a', 'b' or 'c'` for prompts and errors.
pub fn join_actions(actions: &[ActionKind]) -> String {
    let quoted: Vec<String> = actions.iter().map(|a| format!("'{a}'")).collect();
    crate::join_with_word(&quoted, "or")
}
