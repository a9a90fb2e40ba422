use serde::{Deserialize, Serialize};

use splitledger_core::{DomainError, DomainResult, Entity, MemberId};

/// A person who can belong to zero or more groups.
///
/// Members are referenced by id everywhere else in the model and never embed
/// other entities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    id: MemberId,
    name: String,
}

impl Member {
    pub fn new(id: MemberId, name: impl Into<String>) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("member name must not be empty"));
        }
        Ok(Self { id, name })
    }

    pub fn id_typed(&self) -> MemberId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Entity for Member {
    type Id = MemberId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
