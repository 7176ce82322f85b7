//! Common surface of hierarchy records

use crate::category::NodeRef;
use crate::period::DateWindow;
use std::borrow::Cow;

/// A record that can appear as a node of the hierarchy
pub trait Entity {
    /// Typed reference to this record
    fn node(&self) -> NodeRef;

    /// Display name
    fn name(&self) -> Cow<'_, str>;

    /// Archived records are invisible to rollups
    fn is_active(&self) -> bool;

    /// Validity window, open unless the record is dated
    fn window(&self) -> DateWindow {
        DateWindow::OPEN
    }
}

pub(crate) fn default_active() -> bool {
    true
}

pub(crate) fn default_weight() -> f64 {
    1.0
}

/// Implements [`Entity`] for a record with `id`, `name` and `active` fields.
macro_rules! named_entity {
    ($ty:ty, $variant:ident) => {
        impl $crate::entity::Entity for $ty {
            fn node(&self) -> $crate::category::NodeRef {
                $crate::category::NodeRef::$variant(self.id)
            }

            fn name(&self) -> ::std::borrow::Cow<'_, str> {
                ::std::borrow::Cow::Borrowed(&self.name)
            }

            fn is_active(&self) -> bool {
                self.active
            }
        }
    };
    ($ty:ty, $variant:ident, dated) => {
        impl $crate::entity::Entity for $ty {
            fn node(&self) -> $crate::category::NodeRef {
                $crate::category::NodeRef::$variant(self.id)
            }

            fn name(&self) -> ::std::borrow::Cow<'_, str> {
                ::std::borrow::Cow::Borrowed(&self.name)
            }

            fn is_active(&self) -> bool {
                self.active
            }

            fn window(&self) -> $crate::period::DateWindow {
                self.window
            }
        }
    };
}

pub(crate) use named_entity;
