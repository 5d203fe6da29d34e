use serde::{Deserialize, Serialize};

use super::Entity;

/// A person presenting radio programs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Host {
    pub id: i64,
    pub name: String,
    pub email: String,
    /// Ids of the programs this host presents
    pub programs: Vec<i64>,
}

impl Entity for Host {
    const NAME: &'static str = "host";

    fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostCreateRequest {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostView {
    pub id: i64,
    pub name: String,
    pub email: String,
}

impl From<&Host> for HostView {
    fn from(host: &Host) -> Self {
        Self {
            id: host.id,
            name: host.name.clone(),
            email: host.email.clone(),
        }
    }
}
