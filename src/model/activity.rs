use super::Object;

/// Activity types the dispatch engine gives side effects to; anything else
/// rides along as `Other` and is persisted without extra bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ActivityKind {
    Accept,
    Add,
    Announce,
    Create,
    Delete,
    Follow,
    Like,
    Reject,
    Remove,
    Undo,
    Update,
    Other(String),
}

impl ActivityKind {
    pub(crate) fn from_object(object: &Object) -> Option<ActivityKind> {
        object.get_first_type().map(|ty| ActivityKind::from_type(&ty))
    }

    pub(crate) fn from_type(ty: &str) -> ActivityKind {
        match ty {
            "Accept" => ActivityKind::Accept,
            "Add" => ActivityKind::Add,
            "Announce" => ActivityKind::Announce,
            "Create" => ActivityKind::Create,
            "Delete" => ActivityKind::Delete,
            "Follow" => ActivityKind::Follow,
            "Like" => ActivityKind::Like,
            "Reject" => ActivityKind::Reject,
            "Remove" => ActivityKind::Remove,
            "Undo" => ActivityKind::Undo,
            "Update" => ActivityKind::Update,
            other => ActivityKind::Other(other.to_string()),
        }
    }

    pub(crate) fn is_activity_type(ty: &str) -> bool {
        ACTIVITY_TYPES.contains(&ty)
    }

    /// Types whose `object` property is mandatory in client-to-server
    /// requests.
    pub(crate) fn requires_object(&self) -> bool {
        !matches!(self, ActivityKind::Other(_))
    }

    pub(crate) fn requires_target(&self) -> bool {
        matches!(self, ActivityKind::Add | ActivityKind::Remove)
    }
}

const ACTIVITY_TYPES: [&str; 28] = [
    "Accept",
    "Add",
    "Announce",
    "Arrive",
    "Block",
    "Create",
    "Delete",
    "Dislike",
    "Flag",
    "Follow",
    "Ignore",
    "Invite",
    "Join",
    "Leave",
    "Like",
    "Listen",
    "Move",
    "Offer",
    "Question",
    "Reject",
    "Read",
    "Remove",
    "TentativeReject",
    "TentativeAccept",
    "Travel",
    "Undo",
    "Update",
    "View",
];

#[cfg(test)]
mod tests {
    use super::ActivityKind;

    #[test]
    fn known_and_unknown_types() {
        assert_eq!(ActivityKind::from_type("Like"), ActivityKind::Like);
        assert_eq!(
            ActivityKind::from_type("Arrive"),
            ActivityKind::Other("Arrive".to_string())
        );
        assert!(ActivityKind::is_activity_type("Arrive"));
        assert!(!ActivityKind::is_activity_type("Note"));
    }

    #[test]
    fn required_properties() {
        assert!(ActivityKind::Create.requires_object());
        assert!(ActivityKind::Undo.requires_object());
        assert!(!ActivityKind::Other("Arrive".to_string()).requires_object());
        assert!(ActivityKind::Add.requires_target());
        assert!(!ActivityKind::Like.requires_target());
    }
}
