// Copyright 2025 Sushanth (https://github.com/sushanthpy)
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Build lifecycle state machine.
//!
//! `Idle → Extracting → Resolving → Inferring → Assembling → Done`, with
//! `Failed` reachable only through a collaborator fault. Item-level errors
//! never move a build to `Failed`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildState {
    Idle,
    Extracting,
    Resolving,
    Inferring,
    Assembling,
    Done,
    Failed,
}

impl BuildState {
    pub fn is_terminal(self) -> bool {
        matches!(self, BuildState::Done | BuildState::Failed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildEvent {
    DocumentsFetched,
    CandidatesExtracted,
    EntitiesResolved,
    EdgesInferred,
    GraphAssembled,
    CollaboratorFault,
}

#[derive(Debug, Error)]
#[error("Invalid transition: {current:?} -> {event:?}")]
pub struct InvalidTransition {
    pub current: BuildState,
    pub event: BuildEvent,
}

impl BuildState {
    pub fn transition(self, event: BuildEvent) -> Result<BuildState, InvalidTransition> {
        use BuildEvent::*;
        use BuildState::*;

        let next = match (self, event) {
            (Idle, DocumentsFetched) => Extracting,
            (Extracting, CandidatesExtracted) => Resolving,
            (Resolving, EntitiesResolved) => Inferring,
            (Inferring, EdgesInferred) => Assembling,
            (Assembling, GraphAssembled) => Done,
            (s, CollaboratorFault) if !s.is_terminal() => Failed,
            _ => {
                return Err(InvalidTransition {
                    current: self,
                    event,
                })
            }
        };

        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path() {
        let mut state = BuildState::Idle;
        for event in [
            BuildEvent::DocumentsFetched,
            BuildEvent::CandidatesExtracted,
            BuildEvent::EntitiesResolved,
            BuildEvent::EdgesInferred,
            BuildEvent::GraphAssembled,
        ] {
            state = state.transition(event).unwrap();
        }
        assert_eq!(state, BuildState::Done);
        assert!(state.is_terminal());
    }

    #[test]
    fn test_fault_from_idle() {
        let state = BuildState::Idle
            .transition(BuildEvent::CollaboratorFault)
            .unwrap();
        assert_eq!(state, BuildState::Failed);
    }

    #[test]
    fn test_stage_skipping_is_rejected() {
        let err = BuildState::Extracting
            .transition(BuildEvent::EdgesInferred)
            .unwrap_err();
        assert_eq!(err.current, BuildState::Extracting);
        assert_eq!(err.event, BuildEvent::EdgesInferred);
    }

    #[test]
    fn test_terminal_states_are_final() {
        assert!(BuildState::Done
            .transition(BuildEvent::CollaboratorFault)
            .is_err());
        assert!(BuildState::Failed
            .transition(BuildEvent::DocumentsFetched)
            .is_err());
    }
}
