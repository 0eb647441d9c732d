// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Registration errors.

use core::fmt;

/// Error returned when a container cannot be registered or reconfigured.
#[derive(Clone, PartialEq, Eq)]
pub enum RegisterError<E> {
    /// No value getter was supplied.
    MissingValues(E),
    /// No value setter was supplied.
    MissingSetValues(E),
    /// The container is not attached to the tree.
    Disconnected(E),
    /// The container was never registered.
    NotRegistered(E),
}

impl<E: Copy> RegisterError<E> {
    /// The container the error is about.
    #[must_use]
    pub fn element(&self) -> E {
        match self {
            Self::MissingValues(el)
            | Self::MissingSetValues(el)
            | Self::Disconnected(el)
            | Self::NotRegistered(el) => *el,
        }
    }
}

impl<E: fmt::Debug> fmt::Debug for RegisterError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingValues(el) => write!(f, "MissingValues({el:?})"),
            Self::MissingSetValues(el) => write!(f, "MissingSetValues({el:?})"),
            Self::Disconnected(el) => write!(f, "Disconnected({el:?})"),
            Self::NotRegistered(el) => write!(f, "NotRegistered({el:?})"),
        }
    }
}

impl<E: fmt::Debug> fmt::Display for RegisterError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingValues(el) => write!(f, "container {el:?} has no value getter"),
            Self::MissingSetValues(el) => write!(f, "container {el:?} has no value setter"),
            Self::Disconnected(el) => write!(f, "container {el:?} is not attached to the tree"),
            Self::NotRegistered(el) => write!(f, "container {el:?} is not registered"),
        }
    }
}

impl<E: fmt::Debug> core::error::Error for RegisterError<E> {}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn display_names_the_container() {
        assert_eq!(
            RegisterError::MissingSetValues(7_u32).to_string(),
            "container 7 has no value setter"
        );
        assert_eq!(RegisterError::Disconnected(3_u32).element(), 3);
    }
}
