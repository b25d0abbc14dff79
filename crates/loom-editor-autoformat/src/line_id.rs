//! Line identifiers stamped on new lines as the `id` line format.

use smol_str::{SmolStr, format_smolstr};

pub trait LineIdSource {
    fn next_id(&mut self) -> SmolStr;
}

/// Random v4 UUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidLineIds;

impl LineIdSource for UuidLineIds {
    fn next_id(&mut self) -> SmolStr {
        SmolStr::new(uuid::Uuid::new_v4().to_string())
    }
}

/// `line-1`, `line-2`, ... Deterministic, for tests and fixtures.
#[derive(Debug, Clone, Default)]
pub struct SequentialLineIds {
    next: u64,
}

impl LineIdSource for SequentialLineIds {
    fn next_id(&mut self) -> SmolStr {
        self.next += 1;
        format_smolstr!("line-{}", self.next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential() {
        let mut ids = SequentialLineIds::default();
        assert_eq!(ids.next_id(), "line-1");
        assert_eq!(ids.next_id(), "line-2");
    }

    #[test]
    fn test_uuid_ids_are_unique() {
        let mut ids = UuidLineIds;
        let a = ids.next_id();
        let b = ids.next_id();
        assert_ne!(a, b);
        assert!(uuid::Uuid::parse_str(&a).is_ok());
    }
}
