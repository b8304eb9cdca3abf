//! Game event decoding.
//!
//! The explorer reports each decoded log with its canonical event signature.
//! Signatures are matched exactly and turned into a closed [`GameEvent`];
//! anything else becomes [`GameEvent::Unknown`] so new contract events do
//! not break aggregation.

use alloy::primitives::{Address, U256};
use guess_data::ContractLog;

/// Canonical event signatures emitted by the game contract.
pub mod signatures {
    /// A challenge's prize pool was paid out.
    pub const PRIZE_AWARDED: &str =
        "PrizeAwarded(uint256 indexed challengeId, address indexed winner, uint256 amount)";

    /// A player paid the fee and submitted a guess.
    pub const GUESS_MADE: &str =
        "GuessMade(uint256 indexed challengeId, address indexed guesser, string guessString, bool isCorrect)";

    /// A new image challenge was created.
    pub const CHALLENGE_CREATED: &str =
        "ChallengeCreated(uint256 indexed challengeId, address indexed creator, string imageUrl, uint256 initialPrizePool)";

    /// A guess fee was split between creator and platform.
    pub const FEE_DISTRIBUTED: &str =
        "FeeDistributed(uint256 indexed challengeId, address indexed creator, uint256 creatorAmount, address indexed platform, uint256 platformAmount)";
}

/// A recognized contract event, reduced to the fields the stats fold needs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    /// `winner` received `amount` wei.
    PrizeAwarded { winner: Address, amount: U256 },
    /// `guesser` submitted a guess.
    GuessMade { guesser: Address, is_correct: bool },
    /// `creator` opened a challenge.
    ChallengeCreated { creator: Address },
    /// Fees of a challenge owned by `creator` were distributed.
    FeeDistributed { creator: Address },
    /// Signature not produced by this contract version.
    Unknown,
}

/// A recognized event is missing data it must carry.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum MalformedEvent {
    /// The parameter is absent or empty.
    #[error("{event}: missing parameter `{param}`")]
    MissingParameter {
        /// Event name.
        event: &'static str,
        /// Parameter name.
        param: &'static str,
    },
    /// The parameter is present but does not parse.
    #[error("{event}: invalid `{param}` value {value:?}")]
    InvalidValue {
        /// Event name.
        event: &'static str,
        /// Parameter name.
        param: &'static str,
        /// Raw value.
        value: String,
    },
}

impl GameEvent {
    /// Decodes `log` by exact signature match.
    ///
    /// # Errors
    /// Returns [`MalformedEvent`] when a recognized event lacks a required
    /// parameter or carries an unparseable one.
    pub fn decode(log: &ContractLog) -> Result<Self, MalformedEvent> {
        use signatures::*;

        match log.method_signature.as_str() {
            PRIZE_AWARDED => Ok(Self::PrizeAwarded {
                winner: address_param(log, "PrizeAwarded", "winner")?,
                amount: uint_param(log, "PrizeAwarded", "amount")?,
            }),
            GUESS_MADE => Ok(Self::GuessMade {
                guesser: address_param(log, "GuessMade", "guesser")?,
                is_correct: log.param("isCorrect") == Some("true"),
            }),
            CHALLENGE_CREATED => Ok(Self::ChallengeCreated {
                creator: address_param(log, "ChallengeCreated", "creator")?,
            }),
            FEE_DISTRIBUTED => Ok(Self::FeeDistributed {
                creator: address_param(log, "FeeDistributed", "creator")?,
            }),
            _ => Ok(Self::Unknown),
        }
    }

    /// The player this event is attributed to.
    pub fn player(&self) -> Option<Address> {
        match self {
            Self::PrizeAwarded { winner, .. } => Some(*winner),
            Self::GuessMade { guesser, .. } => Some(*guesser),
            Self::ChallengeCreated { creator } | Self::FeeDistributed { creator } => Some(*creator),
            Self::Unknown => None,
        }
    }
}

fn required<'a>(
    log: &'a ContractLog,
    event: &'static str,
    param: &'static str,
) -> Result<&'a str, MalformedEvent> {
    log.param(param)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or(MalformedEvent::MissingParameter { event, param })
}

fn address_param(
    log: &ContractLog,
    event: &'static str,
    param: &'static str,
) -> Result<Address, MalformedEvent> {
    let value = required(log, event, param)?;
    value.parse().map_err(|_| MalformedEvent::InvalidValue {
        event,
        param,
        value: value.to_string(),
    })
}

fn uint_param(
    log: &ContractLog,
    event: &'static str,
    param: &'static str,
) -> Result<U256, MalformedEvent> {
    let value = required(log, event, param)?;
    value.parse().map_err(|_| MalformedEvent::InvalidValue {
        event,
        param,
        value: value.to_string(),
    })
}
