use crate::id::ServiceId;

/// What a provider knows about the request it serves.
#[derive(Debug, Clone)]
pub struct CallContext<'a> {
    id: &'a ServiceId,
}

impl<'a> CallContext<'a> {
    pub fn new(id: &'a ServiceId) -> Self {
        Self { id }
    }

    pub fn id(&self) -> &ServiceId {
        self.id
    }
}
