//! # Drag Script Parser
//!
//! A line-based format for replaying gizmo edits deterministically.
//!
//! ## Format
//!
//! One action per line:
//! - `drag <handle> <amount> [on <index>]`: moves a handle (default session 0)
//! - `tick [count]`: runs registry ticks (default 1)
//! - `delete <index>`: closes a session and fires its deletion listeners
//! - `epoch <index> <time>`: moves a maneuver along its orbit
//! - Comments: `# anything`, whole-line or trailing
//!
//! Handle names are `prograde`, `retrograde`, `normal`, `antinormal`,
//! `radialin` and `radialout`. Session indices refer to the planner's sessions
//! in the order they were open when the script started.
//!
//! ## Example
//!
//! ```text
//! # burn a little harder, then tilt
//! drag prograde 50
//! tick
//! drag normal 12.5 on 1    # second maneuver
//! tick 2
//! ```

use crate::SimPlanner;
use core_types::SessionId;
use maneuver_types::GizmoHandle;
use services_gizmo_registry::{SessionError, SessionRegistry, SessionSource};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum DragScriptError {
    #[error("Parse error at line {line}: {message}")]
    ParseError { line: usize, message: String },

    #[error("Unknown handle at line {line}: {name}")]
    UnknownHandle { line: usize, name: String },

    #[error("Empty script")]
    EmptyScript,

    #[error("Session index {index} out of range ({available} open)")]
    SessionIndex { index: usize, available: usize },

    #[error("Session error: {0}")]
    Session(#[from] SessionError),
}

/// A single scripted action
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptedAction {
    Drag {
        session: usize,
        handle: GizmoHandle,
        amount: f64,
    },
    Tick(usize),
    Delete(usize),
    Epoch { session: usize, time: f64 },
}

/// Totals accumulated while replaying a script
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScriptSummary {
    pub ticks: usize,
    pub corrected: usize,
    pub removed: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DragScript {
    actions: Vec<ScriptedAction>,
}

impl DragScript {
    /// Parses a script from text
    pub fn from_text(text: &str) -> Result<Self, DragScriptError> {
        let mut actions = Vec::new();

        for (index, raw) in text.lines().enumerate() {
            let line = match raw.split_once('#') {
                Some((code, _)) => code.trim(),
                None => raw.trim(),
            };
            if line.is_empty() {
                continue;
            }
            actions.push(Self::parse_line(line, index + 1)?);
        }

        if actions.is_empty() {
            return Err(DragScriptError::EmptyScript);
        }
        Ok(Self { actions })
    }

    pub fn actions(&self) -> &[ScriptedAction] {
        &self.actions
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    fn parse_line(line: &str, line_num: usize) -> Result<ScriptedAction, DragScriptError> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let parse_error = |message: &str| DragScriptError::ParseError {
            line: line_num,
            message: message.to_string(),
        };

        match words.as_slice() {
            ["drag", handle, amount, rest @ ..] => {
                let handle = GizmoHandle::from_name(&handle.to_lowercase()).ok_or_else(|| {
                    DragScriptError::UnknownHandle {
                        line: line_num,
                        name: handle.to_string(),
                    }
                })?;
                let amount = parse_number(amount).ok_or_else(|| parse_error("invalid amount"))?;
                let session = match rest {
                    [] => 0,
                    ["on", index] => index
                        .parse()
                        .map_err(|_| parse_error("invalid session index"))?,
                    _ => return Err(parse_error("expected `on <index>`")),
                };
                Ok(ScriptedAction::Drag {
                    session,
                    handle,
                    amount,
                })
            }
            ["tick"] => Ok(ScriptedAction::Tick(1)),
            ["tick", count] => count
                .parse()
                .map(ScriptedAction::Tick)
                .map_err(|_| parse_error("invalid tick count")),
            ["delete", index] => index
                .parse()
                .map(ScriptedAction::Delete)
                .map_err(|_| parse_error("invalid session index")),
            ["epoch", index, time] => {
                let session = index
                    .parse()
                    .map_err(|_| parse_error("invalid session index"))?;
                let time = parse_number(time).ok_or_else(|| parse_error("invalid epoch"))?;
                Ok(ScriptedAction::Epoch { session, time })
            }
            [command, ..] => Err(parse_error(&format!("unknown command `{command}`"))),
            [] => Err(parse_error("empty line")),
        }
    }

    /// Replays the script against `planner`, ticking `registry` where asked
    pub fn run(
        &self,
        planner: &mut SimPlanner,
        registry: &mut SessionRegistry,
    ) -> Result<ScriptSummary, DragScriptError> {
        let sessions = planner.sessions();
        let resolve = |index: usize| -> Result<SessionId, DragScriptError> {
            sessions
                .get(index)
                .copied()
                .ok_or(DragScriptError::SessionIndex {
                    index,
                    available: sessions.len(),
                })
        };

        let mut summary = ScriptSummary::default();
        for action in &self.actions {
            match *action {
                ScriptedAction::Drag {
                    session,
                    handle,
                    amount,
                } => {
                    let delivered = planner.drag(resolve(session)?, handle, amount)?;
                    debug!(
                        session = session,
                        handle = %handle,
                        amount = amount,
                        delivered = delivered,
                        "Scripted drag"
                    );
                }
                ScriptedAction::Tick(count) => {
                    for _ in 0..count {
                        let report = registry.tick(&mut *planner);
                        summary.ticks += 1;
                        summary.corrected += report.corrected;
                        summary.removed += report.removed;
                    }
                }
                ScriptedAction::Delete(session) => planner.delete_session(resolve(session)?)?,
                ScriptedAction::Epoch { session, time } => {
                    planner.set_epoch(resolve(session)?, time)?
                }
            }
        }
        Ok(summary)
    }
}

fn parse_number(text: &str) -> Option<f64> {
    text.parse::<f64>().ok().filter(|value| value.is_finite())
}
