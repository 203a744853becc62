//! Hook script deployed into a host's `hooks/` directory.
use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};

use super::fs::{ensure_parent_dir, remove_existing, set_executable};
use super::ownership::OwnershipClassifier;
use super::{Applicable, Resource, ResourceChange, ResourceState};

const FOREIGN: &str = "not managed by agentdeck";

/// A hook script that can be checked, deployed, and removed.
///
/// A file at the target path that lacks agentdeck's content markers is
/// foreign: it is reported as [`ResourceState::Invalid`] and never
/// overwritten or deleted.
#[derive(Debug, Clone)]
pub struct HookScriptResource {
    /// Bundled template; `None` when only removal is wanted.
    pub template: Option<PathBuf>,
    /// Deployed location under the host's hooks directory.
    pub target: PathBuf,
    owner: OwnershipClassifier,
}

impl HookScriptResource {
    /// Deploy `template` to `target`.
    #[must_use]
    pub fn new(template: PathBuf, target: PathBuf, owner: &OwnershipClassifier) -> Self {
        Self {
            template: Some(template),
            target,
            owner: owner.clone(),
        }
    }

    /// A resource that can only be checked for ownership and removed.
    #[must_use]
    pub fn deployed(target: PathBuf, owner: &OwnershipClassifier) -> Self {
        Self {
            template: None,
            target,
            owner: owner.clone(),
        }
    }

    fn read_template(template: &Path) -> Result<Vec<u8>> {
        std::fs::read(template).with_context(|| format!("read template: {}", template.display()))
    }
}

impl Applicable for HookScriptResource {
    fn description(&self) -> String {
        self.target.display().to_string()
    }

    fn apply(&self) -> Result<ResourceChange> {
        let Some(template) = &self.template else {
            return Ok(ResourceChange::Skipped {
                reason: "no template".to_string(),
            });
        };
        if let ResourceState::Invalid { reason } = self.current_state()? {
            return Ok(ResourceChange::Skipped { reason });
        }
        let content = Self::read_template(template)?;
        ensure_parent_dir(&self.target)?;
        remove_existing(&self.target)?;
        std::fs::write(&self.target, content)
            .with_context(|| format!("write hook script: {}", self.target.display()))?;
        set_executable(&self.target)?;
        Ok(ResourceChange::Applied)
    }

    fn remove(&self) -> Result<ResourceChange> {
        match self.current_state()? {
            ResourceState::Missing => Ok(ResourceChange::AlreadyCorrect),
            ResourceState::Invalid { reason } => Ok(ResourceChange::Skipped { reason }),
            ResourceState::Correct | ResourceState::Incorrect { .. } => {
                std::fs::remove_file(&self.target)
                    .with_context(|| format!("remove hook script: {}", self.target.display()))?;
                Ok(ResourceChange::Applied)
            }
        }
    }
}

impl Resource for HookScriptResource {
    fn current_state(&self) -> Result<ResourceState> {
        if self.target.symlink_metadata().is_err() {
            return Ok(ResourceState::Missing);
        }
        if !self.target.is_file() {
            return Ok(ResourceState::Invalid {
                reason: "not a regular file".to_string(),
            });
        }
        let deployed = std::fs::read(&self.target)
            .with_context(|| format!("read hook script: {}", self.target.display()))?;
        if !self.owner.owns_script(&String::from_utf8_lossy(&deployed)) {
            return Ok(ResourceState::Invalid {
                reason: FOREIGN.to_string(),
            });
        }
        let Some(template) = &self.template else {
            return Ok(ResourceState::Correct);
        };
        if Self::read_template(template)? == deployed {
            Ok(ResourceState::Correct)
        } else {
            Ok(ResourceState::Incorrect {
                current: "content differs".to_string(),
            })
        }
    }
}
