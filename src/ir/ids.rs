// Copyright (c) 2021 Saadi Save
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

macro_rules! handle {
    ($(#[$outer:meta])* $name:ident, $prefix:literal) => {
        $(#[$outer])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            #[inline]
            pub fn new(raw: u32) -> Self {
                Self(raw)
            }

            #[inline]
            pub fn raw(self) -> u32 {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }
    };
}

handle! {
    /// Stable identity of an [`super::Operation`]
    ///
    /// Assigned once when the operation is created and kept by every step that
    /// rewrites the operation in place. An operation replaced wholesale gets a
    /// new id.
    OpId, "%"
}

handle! {
    /// Opaque subprogram record attached to a function
    SubprogramRef, "!sp"
}

handle! {
    /// Opaque source location attached to an operation
    LocationRef, "!loc"
}
