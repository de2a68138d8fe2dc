//! Privilege elevation detection
//!
//! Decides whether container CLI invocations must be prefixed with `sudo`.
//! On Unix the decision depends on whether the current user belongs to the
//! tool's administrative group (`docker` by default). The lookup happens at
//! most once per [`Elevation`] family (clones share the cached answer);
//! concurrent first callers block until the single lookup completes.
//!
//! Failing to read group membership is treated as a broken environment and
//! panics rather than returning a per-call error.

use crate::config::ElevationMode;
use std::fmt;
use std::io;
use std::sync::{Arc, OnceLock};
use tracing::debug;

/// Token prepended to the command line when elevation is required
pub const ELEVATION_TOKEN: &str = "sudo";

/// Source of the current process owner's group memberships
pub trait GroupMembership: Send + Sync + fmt::Debug {
    /// Names of every group the current user belongs to
    fn group_names(&self) -> io::Result<Vec<String>>;
}

/// Reads group membership from the operating system's user database
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemGroups;

#[cfg(unix)]
impl GroupMembership for SystemGroups {
    fn group_names(&self) -> io::Result<Vec<String>> {
        use nix::unistd::{getuid, Group, User};

        let user = User::from_uid(getuid())?.ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "no user entry for current uid")
        })?;

        #[cfg(target_os = "linux")]
        let gids = {
            let name = std::ffi::CString::new(user.name.as_str())?;
            nix::unistd::getgrouplist(&name, user.gid)?
        };
        #[cfg(not(target_os = "linux"))]
        let gids = {
            let mut gids = nix::unistd::getgroups()?;
            gids.push(user.gid);
            gids
        };

        let mut names = Vec::with_capacity(gids.len());
        for gid in gids {
            if let Some(group) = Group::from_gid(gid)? {
                names.push(group.name);
            }
        }
        Ok(names)
    }
}

#[cfg(not(unix))]
impl GroupMembership for SystemGroups {
    fn group_names(&self) -> io::Result<Vec<String>> {
        Ok(Vec::new())
    }
}

/// Cached elevation policy for one container CLI
#[derive(Clone)]
pub struct Elevation {
    mode: ElevationMode,
    group: String,
    source: Arc<dyn GroupMembership>,
    decision: Arc<OnceLock<bool>>,
}

impl fmt::Debug for Elevation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Elevation")
            .field("mode", &self.mode)
            .field("group", &self.group)
            .field("decision", &self.decision.get())
            .finish()
    }
}

impl Elevation {
    /// Elevation policy backed by the system user database
    pub fn new(mode: ElevationMode, group: impl Into<String>) -> Self {
        Self::with_source(mode, group, Arc::new(SystemGroups))
    }

    /// Elevation policy backed by a custom group membership source
    pub fn with_source(
        mode: ElevationMode,
        group: impl Into<String>,
        source: Arc<dyn GroupMembership>,
    ) -> Self {
        Self {
            mode,
            group: group.into(),
            source,
            decision: Arc::new(OnceLock::new()),
        }
    }

    pub fn mode(&self) -> ElevationMode {
        self.mode
    }

    /// Name of the group whose members may use the CLI without elevation
    pub fn group(&self) -> &str {
        &self.group
    }

    /// Whether invocations must be elevated.
    ///
    /// In [`ElevationMode::Auto`] the first call performs the group lookup and
    /// every later call, from any thread, sees the same cached answer.
    ///
    /// # Panics
    ///
    /// Panics if group membership cannot be read.
    pub fn required(&self) -> bool {
        match self.mode {
            ElevationMode::Never => false,
            ElevationMode::Always => true,
            ElevationMode::Auto => *self.decision.get_or_init(|| self.detect()),
        }
    }

    /// The elevation token to prepend, if any
    pub fn prefix(&self) -> Option<&'static str> {
        self.required().then_some(ELEVATION_TOKEN)
    }

    fn detect(&self) -> bool {
        if !cfg!(unix) {
            return false;
        }
        let groups = match self.source.group_names() {
            Ok(groups) => groups,
            Err(err) => panic!("failed to read group membership for current user: {}", err),
        };
        let member = groups.iter().any(|name| name.trim() == self.group);
        debug!(
            group = %self.group,
            member,
            "Determined container CLI elevation requirement"
        );
        !member
    }
}
