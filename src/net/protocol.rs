//! Line protocol spoken between peers
//!
//! Every message is one `\n`-terminated line of space-separated tokens.
//!
//! Handshake (server first):
//! ```text
//! S: <n> is client number
//! C: <player name>
//! S: RED | BLUE            (n mod 2)
//! ```
//!
//! Gameplay lines, relayed verbatim to every other peer:
//! ```text
//! LOCATE <id> <x> <y>
//! BULLET <id>
//! START_CHARGE <id>
//! FINISH_CHARGE <id>
//! AIM <id> <x> <y>
//! BLOCK <id>
//! ```

use std::fmt;
use std::str::{FromStr, SplitWhitespace};

use glam::Vec2;

use crate::error::{NetError, ProtocolError};
use crate::sim::{Command, EntityId, Team};

const LOCATE: &str = "LOCATE";
const BULLET: &str = "BULLET";
const START_CHARGE: &str = "START_CHARGE";
const FINISH_CHARGE: &str = "FINISH_CHARGE";
const AIM: &str = "AIM";
const BLOCK: &str = "BLOCK";

const CLIENT_NUMBER_SUFFIX: &str = " is client number";

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Locate { tank, position } => {
                write!(f, "{LOCATE} {tank} {} {}", position.x, position.y)
            }
            Command::Shoot { tank } => write!(f, "{BULLET} {tank}"),
            Command::StartCharge { tank } => write!(f, "{START_CHARGE} {tank}"),
            Command::FinishCharge { tank } => write!(f, "{FINISH_CHARGE} {tank}"),
            Command::Aim { tank, target } => write!(f, "{AIM} {tank} {} {}", target.x, target.y),
            Command::PlaceBlock { tank } => write!(f, "{BLOCK} {tank}"),
        }
    }
}

struct Tokens<'a> {
    command: &'static str,
    rest: SplitWhitespace<'a>,
}

impl<'a> Tokens<'a> {
    fn next(&mut self, field: &'static str) -> Result<&'a str, ProtocolError> {
        self.rest.next().ok_or(ProtocolError::MissingToken {
            command: self.command,
            field,
        })
    }

    fn id(&mut self) -> Result<EntityId, ProtocolError> {
        let token = self.next("id")?;
        token
            .parse()
            .map(EntityId)
            .map_err(|_| ProtocolError::BadNumber {
                field: "id",
                token: token.to_string(),
            })
    }

    fn coord(&mut self, field: &'static str) -> Result<f32, ProtocolError> {
        let token = self.next(field)?;
        match token.parse::<f32>() {
            Ok(value) if value.is_finite() => Ok(value),
            _ => Err(ProtocolError::BadNumber {
                field,
                token: token.to_string(),
            }),
        }
    }

    fn point(&mut self) -> Result<Vec2, ProtocolError> {
        Ok(Vec2::new(self.coord("x")?, self.coord("y")?))
    }

    fn finish<T>(mut self, value: T) -> Result<T, ProtocolError> {
        match self.rest.next() {
            None => Ok(value),
            Some(token) => Err(ProtocolError::TrailingToken {
                command: self.command,
                token: token.to_string(),
            }),
        }
    }
}

impl FromStr for Command {
    type Err = ProtocolError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let head = words.next().ok_or(ProtocolError::Empty)?;
        let command = match head {
            LOCATE => LOCATE,
            BULLET => BULLET,
            START_CHARGE => START_CHARGE,
            FINISH_CHARGE => FINISH_CHARGE,
            AIM => AIM,
            BLOCK => BLOCK,
            other => return Err(ProtocolError::UnknownCommand(other.to_string())),
        };
        let mut tokens = Tokens {
            command,
            rest: words,
        };
        let tank = tokens.id()?;
        let parsed = match command {
            LOCATE => Command::Locate {
                tank,
                position: tokens.point()?,
            },
            AIM => Command::Aim {
                tank,
                target: tokens.point()?,
            },
            BULLET => Command::Shoot { tank },
            START_CHARGE => Command::StartCharge { tank },
            FINISH_CHARGE => Command::FinishCharge { tank },
            _ => Command::PlaceBlock { tank },
        };
        tokens.finish(parsed)
    }
}

/// First server line of the handshake
pub fn client_number_line(client_number: usize) -> String {
    format!("{client_number}{CLIENT_NUMBER_SUFFIX}")
}

pub fn parse_client_number(line: &str) -> Result<usize, NetError> {
    line.trim()
        .strip_suffix(CLIENT_NUMBER_SUFFIX)
        .and_then(|n| n.trim().parse().ok())
        .ok_or_else(|| NetError::Handshake(line.to_string()))
}

/// Side assigned to a client: even numbers play red
pub fn team_for_client(client_number: usize) -> Team {
    if client_number % 2 == 0 {
        Team::Red
    } else {
        Team::Blue
    }
}

pub fn parse_team(line: &str) -> Result<Team, NetError> {
    match line.trim() {
        "RED" => Ok(Team::Red),
        "BLUE" => Ok(Team::Blue),
        _ => Err(NetError::Handshake(line.to_string())),
    }
}
