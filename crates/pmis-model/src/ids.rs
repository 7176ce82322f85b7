//! Typed record identifiers
//!
//! Every record kind gets its own identifier newtype so that a KRA id can
//! never be passed where an objective id is expected. Identifiers are plain
//! integers assigned by the persistence layer.

use serde::{Deserialize, Serialize};

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// Wrap a raw identifier
            #[inline]
            #[must_use]
            pub const fn new(raw: u64) -> Self {
                Self(raw)
            }

            /// Raw identifier value
            #[inline]
            #[must_use]
            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

record_id!(
    /// Strategic goal identifier
    GoalId
);
record_id!(
    /// Strategic objective identifier
    ObjectiveId
);
record_id!(
    /// Key result area identifier
    KraId
);
record_id!(
    /// Strategic KPI identifier
    KpiId
);
record_id!(
    /// Programme identifier
    ProgrammeId
);
record_id!(
    /// Programme objective identifier
    ProgrammeObjectiveId
);
record_id!(
    /// Intermediate outcome identifier
    OutcomeId
);
record_id!(
    /// Intervention identifier
    InterventionId
);
record_id!(
    /// Output identifier
    OutputId
);
record_id!(
    /// PIAP action identifier
    PiapActionId
);
record_id!(
    /// Programme performance indicator identifier
    IndicatorId
);
record_id!(
    /// Directorate identifier
    DirectorateId
);
record_id!(
    /// Division identifier
    DivisionId
);
record_id!(
    /// Programme-directorate relationship row identifier
    ProgrammeDirectorateLinkId
);
record_id!(
    /// Division-programme relationship row identifier
    DivisionProgrammeLinkId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_serialize_as_plain_integers() {
        let json = serde_json::to_string(&KraId::new(7)).unwrap();
        assert_eq!(json, "7");
        let back: KraId = serde_json::from_str(&json).unwrap();
        assert_eq!(back.get(), 7);
    }

    #[test]
    fn ids_order_by_raw_value() {
        assert!(GoalId(1) < GoalId(2));
        assert_eq!(DivisionId::from(3).to_string(), "3");
    }
}
