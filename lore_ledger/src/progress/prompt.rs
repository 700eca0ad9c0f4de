//! Modal prompts owed to the player.

use serde::{Deserialize, Serialize};

use super::FragmentId;

/// Which modal, if any, the presentation layer should be showing.
///
/// Persisted so a reload resumes the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "fragment", rename_all = "camelCase")]
pub enum PromptRef {
    /// First-time unlock celebration for a fragment.
    Celebration(FragmentId),
    /// Plain detail view of an already-owned fragment.
    FragmentDetail(FragmentId),
    /// The result screen of the allegiance quiz.
    AllegianceReveal,
}
