//! Team roster and transition authorization
//!
//! The roster lives at `.motordesk/equipo.yaml`. When the file is absent the
//! engine applies no authorization checks; once a roster exists, transitions
//! on each workflow require the matching role (admins pass everywhere).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::core::identity::EntityPrefix;
use crate::core::project::Project;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full access to every workflow
    Admin,
    /// Repair workflow
    Taller,
    /// Return workflow
    Ventas,
    /// Advisory workflow
    Atencion,
}

impl Role {
    /// The role required to transition records of the given workflow prefix
    pub fn required_for(prefix: EntityPrefix) -> Option<Role> {
        match prefix {
            EntityPrefix::Rep => Some(Role::Taller),
            EntityPrefix::Dev => Some(Role::Ventas),
            EntityPrefix::Ase => Some(Role::Atencion),
            _ => None,
        }
    }

    pub fn all() -> &'static [Role] {
        &[Role::Admin, Role::Taller, Role::Ventas, Role::Atencion]
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Role::Admin => "admin",
            Role::Taller => "taller",
            Role::Ventas => "ventas",
            Role::Atencion => "atencion",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "taller" => Ok(Role::Taller),
            "ventas" => Ok(Role::Ventas),
            "atencion" | "atención" => Ok(Role::Atencion),
            _ => Err(format!("unknown role: {} (expected admin, taller, ventas, atencion)", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamMember {
    pub nombre: String,
    pub email: String,
    /// Short login name matched against the transition actor
    pub usuario: String,
    pub roles: Vec<Role>,
    #[serde(default = "default_activo")]
    pub activo: bool,
}

fn default_activo() -> bool {
    true
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TeamRoster {
    #[serde(default)]
    pub members: Vec<TeamMember>,
}

impl TeamRoster {
    fn path(project: &Project) -> PathBuf {
        project.motordesk_dir().join("equipo.yaml")
    }

    /// Load the roster if one is configured
    pub fn load(project: &Project) -> Result<Option<Self>, TeamError> {
        let path = Self::path(project);
        if !path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&path).map_err(|e| TeamError::Io {
            path: path.clone(),
            source: e,
        })?;
        let roster = serde_yml::from_str(&contents).map_err(|e| TeamError::Yaml {
            path,
            message: e.to_string(),
        })?;
        Ok(Some(roster))
    }

    pub fn save(&self, project: &Project) -> Result<(), TeamError> {
        let path = Self::path(project);
        let yaml = serde_yml::to_string(self).map_err(|e| TeamError::Yaml {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, yaml).map_err(|e| TeamError::Io { path, source: e })?;
        Ok(())
    }

    /// Look up an active member by login name
    pub fn member_for(&self, usuario: &str) -> Option<&TeamMember> {
        self.members
            .iter()
            .find(|m| m.activo && m.usuario == usuario)
    }

    /// Whether the member may transition records of the given prefix
    pub fn can_transition(&self, member: &TeamMember, prefix: EntityPrefix) -> bool {
        if member.roles.contains(&Role::Admin) {
            return true;
        }
        match Role::required_for(prefix) {
            Some(required) => member.roles.contains(&required),
            None => false,
        }
    }
}

#[derive(Debug, Error)]
pub enum TeamError {
    #[error("failed to read roster at {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid roster YAML at {path:?}: {message}")]
    Yaml { path: PathBuf, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn member(usuario: &str, roles: Vec<Role>) -> TeamMember {
        TeamMember {
            nombre: usuario.to_string(),
            email: format!("{}@example.com", usuario),
            usuario: usuario.to_string(),
            roles,
            activo: true,
        }
    }

    #[test]
    fn test_roster_roundtrip_through_project() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();

        assert!(TeamRoster::load(&project).unwrap().is_none());

        let mut roster = TeamRoster::default();
        roster.members.push(member("ana", vec![Role::Ventas]));
        roster.save(&project).unwrap();

        let loaded = TeamRoster::load(&project).unwrap().unwrap();
        assert_eq!(loaded.members.len(), 1);
        assert_eq!(loaded.members[0].roles, vec![Role::Ventas]);
    }

    #[test]
    fn test_role_workflow_mapping() {
        let mut roster = TeamRoster::default();
        roster.members.push(member("ana", vec![Role::Ventas]));
        roster.members.push(member("root", vec![Role::Admin]));

        let ana = roster.member_for("ana").unwrap().clone();
        assert!(roster.can_transition(&ana, EntityPrefix::Dev));
        assert!(!roster.can_transition(&ana, EntityPrefix::Rep));
        assert!(!roster.can_transition(&ana, EntityPrefix::Car));

        let root = roster.member_for("root").unwrap().clone();
        assert!(roster.can_transition(&root, EntityPrefix::Rep));
        assert!(roster.can_transition(&root, EntityPrefix::Ase));
    }

    #[test]
    fn test_inactive_members_are_invisible() {
        let mut roster = TeamRoster::default();
        let mut m = member("ana", vec![Role::Admin]);
        m.activo = false;
        roster.members.push(m);

        assert!(roster.member_for("ana").is_none());
    }
}
