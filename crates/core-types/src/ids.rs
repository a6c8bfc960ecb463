use uuid::Uuid;

macro_rules! uuid_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
        #[derive(Clone, Debug, Eq, PartialEq, Hash)]
        pub struct $name(pub String);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4().to_string())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

uuid_id!(SessionId, "Browser session identifier owned by the caller.");
uuid_id!(PageId, "Browser page/tab identifier owned by the caller.");
uuid_id!(TaskId, "Identifier for one InteractionEngine run.");
uuid_id!(
    ActivityId,
    "Key all ActivityLog entries for a single run are tagged with."
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        assert_ne!(TaskId::new(), TaskId::new());
    }

    #[test]
    fn display_matches_inner_string() {
        let id = ActivityId::new();
        assert_eq!(format!("{}", id), id.0);
    }
}
